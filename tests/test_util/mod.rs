#![allow(dead_code)]

use argon2::Params;
use axum::Router;
use axum::body::{self, Body};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use task_board::{SharedData, build_router, hashing, persistence};
use tempfile::TempDir;
use tower::ServiceExt;

/// A full application backed by a store file in a temporary directory. The directory is
/// removed when this is dropped.
pub struct TestApp {
    _dir: TempDir,
    pub router: Router,
    pub store_path: PathBuf,
}

/// Argon2 with the cheapest parameters it accepts, so tests don't spend their time hashing
pub fn cheap_hasher() -> hashing::Argon2PasswordHasher {
    let params = Params::new(8, 1, 1, None).expect("test Argon2 parameters should be valid");
    hashing::Argon2PasswordHasher::with_params(params)
}

pub fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("could not create temp dir");
    let store_path = dir.path().join("db.json");
    let assets_dir = dir.path().join("dist");
    fs::create_dir(&assets_dir).expect("could not create assets dir");
    fs::write(assets_dir.join("index.html"), "<html>task board</html>")
        .expect("could not write index page");

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(&store_path),
        password_hasher: cheap_hasher(),
    });

    TestApp {
        router: build_router(shared_data, &assets_dir),
        store_path,
        _dir: dir,
    }
}

impl TestApp {
    /// Sends a request and returns the status with the body parsed as JSON. An empty body
    /// comes back as [Value::Null] and a non-JSON body as a [Value::String].
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json_body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json_body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request should build");

        self.send_request(request).await
    }

    /// Like [TestApp::send] but with a raw body, for exercising malformed input
    pub async fn send_raw(&self, method: Method, uri: &str, raw_body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw_body.to_owned()))
            .expect("request should build");

        self.send_request(request).await
    }

    async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should always produce a response");
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");

        if bytes.is_empty() {
            return (status, Value::Null);
        }
        let parsed = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, parsed)
    }

    /// The store file as currently written to disk
    pub fn stored_document(&self) -> Value {
        let contents = fs::read(&self.store_path).expect("store file should exist");
        serde_json::from_slice(&contents).expect("store file should hold valid JSON")
    }

    /// Creates an account and returns the user from the response
    pub async fn sign_up(&self, email: &str, password: &str) -> Value {
        let (status, user) = self
            .send(
                Method::POST,
                "/api/signup",
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(StatusCode::CREATED, status, "signup failed: {user}");

        user
    }

    /// Creates a task and returns it from the response
    pub async fn create_task(&self, task_list_id: &str, title: &str) -> Value {
        let (status, task) = self
            .send(
                Method::POST,
                "/api/tasks",
                Some(json!({ "taskListId": task_list_id, "title": title })),
            )
            .await;
        assert_eq!(StatusCode::CREATED, status, "task creation failed: {task}");

        task
    }

    pub async fn tasks_in_list(&self, task_list_id: &str) -> Vec<Value> {
        let (status, tasks) = self
            .send(
                Method::GET,
                &format!("/api/tasklists/{task_list_id}/tasks"),
                None,
            )
            .await;
        assert_eq!(StatusCode::OK, status);

        serde_json::from_value(tasks).expect("task listing should be an array")
    }
}

/// Pulls a string field out of a JSON object, failing the test if it isn't there
pub fn str_field<'v>(value: &'v Value, field: &str) -> &'v str {
    value[field]
        .as_str()
        .unwrap_or_else(|| panic!("expected string field {field} in {value}"))
}
