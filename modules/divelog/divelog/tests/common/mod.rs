#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use divelog::{DiveLogConfig, DiveLogModule};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestApp {
    pub router: Router,
    pub module: DiveLogModule,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` part of the `Set-Cookie` header.
    pub fn cookie_pair(&self) -> String {
        let header = self.set_cookie.as_deref().expect("response sets a cookie");
        header.split(';').next().unwrap().to_owned()
    }

    pub fn clears_cookie(&self) -> bool {
        self.set_cookie
            .as_deref()
            .is_some_and(|c| c.contains("Max-Age=0"))
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

pub fn test_config() -> DiveLogConfig {
    DiveLogConfig {
        session_secret: SecretString::from(TEST_SECRET.to_owned()),
        ..DiveLogConfig::default()
    }
}

/// Fresh in-memory database with migrations applied.
pub async fn test_app() -> TestApp {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");

    let module = DiveLogModule::new(db, &test_config()).expect("module");
    module.migrate().await.expect("migrate");
    TestApp {
        router: module.router(),
        module,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(cookie), None).await
    }

    pub async fn post(&self, uri: &str, cookie: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(cookie), Some(body)).await
    }

    /// Register an account and return its session cookie pair.
    pub async fn register(&self, email: &str) -> String {
        let res = self
            .send(
                Method::POST,
                "/divelog/v1/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "display_name": "Test Diver",
                    "password": "correct-horse-battery",
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register: {}", res.body);
        res.cookie_pair()
    }
}
