//! Assignments, submissions and grading.

use serde_json::{Value, json};

use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

pub struct AssignmentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AssignmentsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/assignments/")).await
    }

    pub async fn get(&self, assignment_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/assignments/{assignment_id}/")))
            .await
    }

    pub async fn create(&self, assignment: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post("/assignments/").json(assignment))
            .await
    }

    pub async fn delete(&self, assignment_id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!("/assignments/{assignment_id}/")))
            .await
    }

    pub async fn submissions(&self, assignment_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/assignments/{assignment_id}/submissions/"
            )))
            .await
    }

    /// Record a score and feedback on a student's submission.
    pub async fn grade_submission(
        &self,
        submission_id: i64,
        score: f64,
        feedback: &str,
    ) -> ClientResult<Value> {
        self.client
            .json(
                ApiRequest::patch(format!("/assignments/submissions/{submission_id}/"))
                    .json(json!({ "score": score, "feedback": feedback })),
            )
            .await
    }

    /// Partial update of a submission (status, feedback, ...).
    pub async fn review_submission(
        &self,
        submission_id: i64,
        review: Value,
    ) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::patch(format!("/submissions/{submission_id}/")).json(review))
            .await
    }

    pub async fn for_course(&self, course_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/courses/{course_id}/assignments/")))
            .await
    }

    pub async fn in_course(&self, course_id: i64, assignment_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/courses/{course_id}/assignments/{assignment_id}/"
            )))
            .await
    }

    pub async fn submit(
        &self,
        course_id: i64,
        assignment_id: i64,
        submission: Value,
    ) -> ClientResult<Value> {
        self.client
            .json(
                ApiRequest::post(format!(
                    "/courses/{course_id}/assignments/{assignment_id}/submit/"
                ))
                .json(submission),
            )
            .await
    }

    pub async fn course_submissions(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/courses/{course_id}/assignments/{assignment_id}/submissions/"
            )))
            .await
    }
}
