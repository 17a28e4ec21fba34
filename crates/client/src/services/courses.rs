use serde_json::Value;

use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

pub struct CoursesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CoursesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/courses/")).await
    }

    pub async fn enrolled(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/courses/enrolled/")).await
    }

    pub async fn get(&self, course_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/courses/{course_id}/")))
            .await
    }

    pub async fn enroll(&self, course_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!("/courses/{course_id}/enroll/")))
            .await
    }

    pub async fn unenroll(&self, course_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!("/courses/{course_id}/unenroll/")))
            .await
    }

    pub async fn modules(&self, course_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/courses/{course_id}/modules/")))
            .await
    }

    pub async fn module(&self, course_id: i64, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/courses/{course_id}/modules/{module_id}/"
            )))
            .await
    }

    pub async fn complete_module(&self, course_id: i64, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!(
                "/courses/{course_id}/modules/{module_id}/complete/"
            )))
            .await
    }

    pub async fn progress(&self, course_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/courses/{course_id}/progress/")))
            .await
    }
}
