//! Instructor account area: profile, roster and authored modules.

use serde_json::Value;

use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

pub struct InstructorApi<'a> {
    client: &'a ApiClient,
}

impl<'a> InstructorApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get("/accounts/instructors/profile/"))
            .await
    }

    pub async fn update_profile(&self, profile: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::patch("/accounts/instructors/profile/").json(profile))
            .await
    }

    pub async fn students(&self) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get("/accounts/instructors/students/"))
            .await
    }

    pub async fn add_student(&self, student: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post("/accounts/instructors/add_student/").json(student))
            .await
    }

    pub async fn delete_student(&self, student_id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!(
                "/accounts/instructors/students/{student_id}/"
            )))
            .await
    }

    pub async fn assigned_modules(&self) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get("/accounts/instructors/assigned_modules/"))
            .await
    }

    pub async fn modules(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/instructor/modules/")).await
    }

    pub async fn module(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/instructor/modules/{module_id}/")))
            .await
    }

    pub async fn create_module(&self, module: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post("/instructor/modules/").json(module))
            .await
    }

    pub async fn update_module(&self, module_id: i64, changes: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::patch(format!("/instructor/modules/{module_id}/")).json(changes))
            .await
    }

    pub async fn delete_module(&self, module_id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!("/instructor/modules/{module_id}/")))
            .await
    }

    pub async fn module_students(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/instructor/modules/{module_id}/students/"
            )))
            .await
    }

    pub async fn module_content(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/instructor/modules/{module_id}/content/"
            )))
            .await
    }

    pub async fn add_module_content(&self, module_id: i64, content: Value) -> ClientResult<Value> {
        self.client
            .json(
                ApiRequest::post(format!("/instructor/modules/{module_id}/content/"))
                    .json(content),
            )
            .await
    }

    pub async fn update_module_content(
        &self,
        module_id: i64,
        content_id: i64,
        content: Value,
    ) -> ClientResult<Value> {
        self.client
            .json(
                ApiRequest::put(format!(
                    "/instructor/modules/{module_id}/content/{content_id}/"
                ))
                .json(content),
            )
            .await
    }

    pub async fn delete_module_content(&self, module_id: i64, content_id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!(
                "/instructor/modules/{module_id}/content/{content_id}/"
            )))
            .await
    }
}
