//! Quizzes: authoring (instructor) and attempts (student).

use serde_json::{Value, json};

use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

pub struct QuizzesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> QuizzesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn for_module(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/modules/{module_id}/quizzes/")))
            .await
    }

    pub async fn create(&self, module_id: i64, quiz: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!("/modules/{module_id}/quizzes/create/")).json(quiz))
            .await
    }

    pub async fn add_question(&self, quiz_id: i64, question: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!("/quizzes/{quiz_id}/questions/")).json(question))
            .await
    }

    pub async fn publish(&self, quiz_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!("/quizzes/{quiz_id}/publish/")))
            .await
    }

    pub async fn questions(&self, quiz_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/quizzes/{quiz_id}/get-questions/")))
            .await
    }

    /// Quizzes visible to the signed-in student.
    pub async fn for_student_module(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/student/modules/{module_id}/quizzes/")))
            .await
    }

    pub async fn start_attempt(&self, quiz_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!("/quizzes/{quiz_id}/attempt/")))
            .await
    }

    pub async fn submit_attempt(&self, attempt_id: i64, answers: Value) -> ClientResult<Value> {
        self.client
            .json(
                ApiRequest::post(format!("/quiz-attempts/{attempt_id}/submit/"))
                    .json(json!({ "answers": answers })),
            )
            .await
    }
}
