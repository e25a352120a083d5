#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use courtside_api::app;
use courtside_api::auth::hash_password;
use courtside_api::config::AppConfig;
use courtside_api::database::models::NewUser;
use courtside_api::database::{MemoryStore, UserStore};
use courtside_api::state::AppState;
use courtside_api::types::Role;

pub const PASSWORD: &str = "courtside1";

/// Full router over a fresh in-memory store; requests go through `oneshot`
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn app() -> TestApp {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = 4;
    let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(config));
    TestApp {
        router: app::router(state.clone()),
        state,
    }
}

/// A registered account and its bearer token
pub struct Session {
    pub token: String,
    pub id: String,
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body from {}", uri))?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, name: &str) -> Result<Session> {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": format!("{}@example.com", name),
                    "password": PASSWORD,
                    "name": name,
                    "city": "Austin"
                })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        session(&body)
    }

    /// SUPER_ADMIN accounts cannot self-register; seed one through the store
    pub async fn admin(&self) -> Result<Session> {
        self.state
            .store
            .create_user(NewUser {
                email: "root@example.com".to_string(),
                name: "Root".to_string(),
                password_hash: hash_password(PASSWORD, 4)?,
                phone: None,
                city: None,
                role: Role::SuperAdmin,
            })
            .await?;

        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": "root@example.com", "password": PASSWORD })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "admin login failed: {}", body);
        session(&body)
    }

    pub async fn club(&self, token: &str, name: &str) -> Result<String> {
        let (status, body) = self
            .post(
                "/api/clubs",
                token,
                json!({ "name": name, "address": "1 Baseline Ave", "city": "Austin" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "club create failed: {}", body);
        id(&body["data"])
    }

    pub async fn court(&self, token: &str, club_id: &str, name: &str) -> Result<String> {
        let (status, body) = self
            .post(
                &format!("/api/clubs/{}/courts", club_id),
                token,
                json!({ "name": name }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "court create failed: {}", body);
        id(&body["data"])
    }

    pub async fn add_member(&self, token: &str, club_id: &str, user_id: &str, status: &str) -> Result<()> {
        let (code, body) = self
            .post(
                &format!("/api/clubs/{}/members", club_id),
                token,
                json!({ "userId": user_id, "status": status }),
            )
            .await?;
        anyhow::ensure!(code == StatusCode::CREATED, "add member failed: {}", body);
        Ok(())
    }
}

fn session(body: &Value) -> Result<Session> {
    Ok(Session {
        token: body["data"]["token"]
            .as_str()
            .context("missing token")?
            .to_string(),
        id: id(&body["data"]["user"])?,
    })
}

pub fn id(value: &Value) -> Result<String> {
    Ok(value["id"].as_str().context("missing id")?.to_string())
}
