//! Student area: enrolled modules, assessments, messages, announcements.

use serde_json::{Value, json};

use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

pub struct StudentApi<'a> {
    client: &'a ApiClient,
}

impl<'a> StudentApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/student/dashboard/")).await
    }

    pub async fn profile(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/student/profile/")).await
    }

    pub async fn update_profile(&self, profile: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::patch("/student/profile/").json(profile))
            .await
    }

    pub async fn grades(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/student/grades/")).await
    }

    pub async fn grade(&self, grade_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/student/grades/{grade_id}/")))
            .await
    }

    pub async fn modules(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/student/modules/")).await
    }

    pub async fn module(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/student/modules/{module_id}/")))
            .await
    }

    pub async fn module_contents(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/student/modules/{module_id}/contents/"
            )))
            .await
    }

    pub async fn mark_content_complete(
        &self,
        module_id: i64,
        content_id: i64,
    ) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::patch(format!(
                "/student/modules/{module_id}/contents/{content_id}/complete/"
            )))
            .await
    }

    pub async fn assessments(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/student/assessments/")).await
    }

    pub async fn assessment(&self, assessment_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/student/assessments/{assessment_id}/")))
            .await
    }

    pub async fn submit_assessment(
        &self,
        assessment_id: i64,
        answers: Value,
    ) -> ClientResult<Value> {
        self.client
            .json(
                ApiRequest::post(format!("/student/assessments/{assessment_id}/submit/"))
                    .json(json!({ "answers": answers })),
            )
            .await
    }

    pub async fn messages(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/student/messages/")).await
    }

    pub async fn thread(&self, thread_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/student/messages/{thread_id}/")))
            .await
    }

    pub async fn send_message(&self, thread_id: i64, content: &str) -> ClientResult<Value> {
        self.client
            .json(
                ApiRequest::post(format!("/student/messages/{thread_id}/"))
                    .json(json!({ "content": content })),
            )
            .await
    }

    pub async fn announcements(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/student/announcements/")).await
    }

    pub async fn announcement(&self, announcement_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/student/announcements/{announcement_id}/"
            )))
            .await
    }

    pub async fn mark_announcement_read(&self, announcement_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!(
                "/student/announcements/{announcement_id}/read/"
            )))
            .await
    }
}
