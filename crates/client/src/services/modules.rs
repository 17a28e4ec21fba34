//! Course modules shared by both roles.

use serde_json::{Value, json};

use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

pub struct ModulesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ModulesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/modules/")).await
    }

    pub async fn get(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/modules/{module_id}/")))
            .await
    }

    pub async fn create(&self, module: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post("/modules/").json(module))
            .await
    }

    pub async fn update(&self, module_id: i64, module: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::put(format!("/modules/{module_id}/")).json(module))
            .await
    }

    pub async fn delete(&self, module_id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!("/modules/{module_id}/")))
            .await
    }

    pub async fn students(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/modules/{module_id}/students/")))
            .await
    }

    /// Replace the module's enrolment list.
    pub async fn set_students(&self, module_id: i64, student_ids: &[i64]) -> ClientResult<Value> {
        self.client
            .json(
                ApiRequest::put(format!("/modules/{module_id}/students/"))
                    .json(json!({ "student_ids": student_ids })),
            )
            .await
    }

    pub async fn contents(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/modules/{module_id}/contents/")))
            .await
    }

    pub async fn update_contents(&self, module_id: i64, contents: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::put(format!("/modules/{module_id}/contents/")).json(contents))
            .await
    }

    pub async fn delete_content(&self, module_id: i64, content_id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!(
                "/modules/{module_id}/contents/{content_id}/"
            )))
            .await
    }

    pub async fn assignments(&self, module_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/modules/{module_id}/assignments/")))
            .await
    }

    pub async fn create_assignment(
        &self,
        module_id: i64,
        assignment: Value,
    ) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post(format!("/modules/{module_id}/assignments/")).json(assignment))
            .await
    }

    pub async fn templates(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/modules/templates/")).await
    }

    pub async fn create_template(&self, template: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::post("/modules/templates/").json(template))
            .await
    }

    pub async fn update_template(&self, template_id: i64, template: Value) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::patch(format!("/modules/templates/{template_id}/")).json(template))
            .await
    }

    pub async fn delete_template(&self, template_id: i64) -> ClientResult<()> {
        self.client
            .execute(ApiRequest::delete(format!("/modules/templates/{template_id}/")))
            .await
    }
}
