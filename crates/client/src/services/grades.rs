use serde_json::Value;

use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

pub struct GradesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> GradesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn all(&self) -> ClientResult<Value> {
        self.client.json(ApiRequest::get("/grades/")).await
    }

    pub async fn for_course(&self, course_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!("/courses/{course_id}/grades/")))
            .await
    }

    pub async fn for_assignment(&self, course_id: i64, assignment_id: i64) -> ClientResult<Value> {
        self.client
            .json(ApiRequest::get(format!(
                "/courses/{course_id}/assignments/{assignment_id}/grade/"
            )))
            .await
    }
}
