use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, Uri};
use axum::{Json, Router};
use gasportal_auth::{MemoryStore, Session, SessionManager};
use gasportal_client::{ApiClient, ClientConfig};
use gasportal_core::{Role, UserProfile};
use serde_json::{Value, json};

type Recorded = Arc<Mutex<Vec<(Method, String, Value)>>>;

/// Accepts everything and records what it was sent.
async fn record(
    State(calls): State<Recorded>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Json<Value> {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    calls.lock().unwrap().push((method, uri.to_string(), body));
    Json(json!({ "ok": true }))
}

struct TestServer {
    base_url: String,
    calls: Recorded,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let calls = Recorded::default();
        let app = Router::new().fallback(record).with_state(calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            calls,
            handle,
        }
    }

    async fn client(&self) -> ApiClient {
        let session = SessionManager::with_backend(Arc::new(MemoryStore::new()));
        session
            .establish(Session::new("t1", "r1", UserProfile::new(3), Role::Instructor))
            .await
            .unwrap();
        ApiClient::new(ClientConfig::new(&self.base_url), session).unwrap()
    }

    fn take(&self) -> Vec<(Method, String, Value)> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn grading_patches_the_submission() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    client
        .assignments()
        .grade_submission(9, 88.5, "Well argued")
        .await
        .unwrap();

    assert_eq!(
        server.take(),
        vec![(
            Method::PATCH,
            "/api/assignments/submissions/9/".to_string(),
            json!({ "score": 88.5, "feedback": "Well argued" }),
        )]
    );
}

#[tokio::test]
async fn balance_adjustment_records_the_difference() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    client.wallet().adjust_balance(4, 10.0, 25.0).await.unwrap();

    assert_eq!(
        server.take(),
        vec![
            (
                Method::PATCH,
                "/api/ewallets/4/".to_string(),
                json!({ "balance": 25.0 }),
            ),
            (
                Method::POST,
                "/api/transactions/".to_string(),
                json!({
                    "ewallet": 4,
                    "amount": 15.0,
                    "transaction_type": "balance_adjustment",
                    "description": "Balance adjusted by instructor",
                    "status": "completed",
                }),
            ),
        ]
    );
}

#[tokio::test]
async fn quiz_attempts_submit_answers() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    client
        .quizzes()
        .submit_attempt(12, json!([{ "question": 1, "choice": 3 }]))
        .await
        .unwrap();

    assert_eq!(
        server.take(),
        vec![(
            Method::POST,
            "/api/quiz-attempts/12/submit/".to_string(),
            json!({ "answers": [{ "question": 1, "choice": 3 }] }),
        )]
    );
}

#[tokio::test]
async fn module_roster_is_replaced_in_one_call() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    client.modules().set_students(2, &[5, 6]).await.unwrap();
    client.student().mark_content_complete(2, 8).await.unwrap();

    assert_eq!(
        server.take(),
        vec![
            (
                Method::PUT,
                "/api/modules/2/students/".to_string(),
                json!({ "student_ids": [5, 6] }),
            ),
            (
                Method::PATCH,
                "/api/student/modules/2/contents/8/complete/".to_string(),
                Value::Null,
            ),
        ]
    );
}

#[tokio::test]
async fn query_parameters_reach_the_server() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    let _: Value = client
        .json(gasportal_client::ApiRequest::get("/grades/").query("course", 3))
        .await
        .unwrap();

    let calls = server.take();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "/api/grades/?course=3");
}
