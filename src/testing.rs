//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::repo::{RepoError, UserStore};
use crate::auth::repo_types::{LoginRecord, NewAccount, UserRecord};
use crate::inference::client::{InferenceClient, InferenceError};
use crate::inference::dto::FaceRegion;
use crate::state::AppState;

#[derive(Default)]
struct Tables {
    login: HashMap<String, LoginRecord>,
    users: Vec<UserRecord>,
}

/// Both tables behind one lock, so `create_account` is all-or-nothing.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// `(login rows, user rows)` for an email.
    pub fn row_counts(&self, email: &str) -> (usize, usize) {
        let t = self.tables.lock().unwrap();
        let logins = usize::from(t.login.contains_key(email));
        let users = t.users.iter().filter(|u| u.email == email).count();
        (logins, users)
    }

    pub fn insert_orphan_login(&self, email: &str, password_hash: &str) {
        self.tables.lock().unwrap().login.insert(
            email.to_string(),
            LoginRecord {
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> Result<UserRecord, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if t.login.contains_key(&account.email) || t.users.iter().any(|u| u.email == account.email) {
            return Err(RepoError::Duplicate);
        }
        let user = UserRecord {
            id: t.users.len() as i64 + 1,
            name: account.name,
            email: account.email.clone(),
            entries: 0,
            joined: account.joined,
        };
        t.login.insert(
            account.email.clone(),
            LoginRecord {
                email: account.email,
                password_hash: account.password_hash,
            },
        );
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_password_hash(&self, email: &str) -> Result<Option<String>, RepoError> {
        let t = self.tables.lock().unwrap();
        Ok(t.login.get(email).map(|l| l.password_hash.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn increment_entries(&self, user_id: i64) -> Result<Option<i64>, RepoError> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.users.iter_mut().find(|u| u.id == user_id).map(|u| {
            u.entries += 1;
            u.entries
        }))
    }
}

/// Every call fails as if the pool were exhausted.
pub struct FailingStore;

#[async_trait]
impl UserStore for FailingStore {
    async fn create_account(&self, _account: NewAccount) -> Result<UserRecord, RepoError> {
        Err(RepoError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_password_hash(&self, _email: &str) -> Result<Option<String>, RepoError> {
        Err(RepoError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<UserRecord>, RepoError> {
        Err(RepoError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn increment_entries(&self, _user_id: i64) -> Result<Option<i64>, RepoError> {
        Err(RepoError::Database(sqlx::Error::PoolTimedOut))
    }
}

pub enum StubInference {
    Regions(Vec<FaceRegion>),
    Fails { code: u32, description: String },
}

#[async_trait]
impl InferenceClient for StubInference {
    async fn detect_faces(&self, _image_url: &str) -> Result<Vec<FaceRegion>, InferenceError> {
        match self {
            StubInference::Regions(r) => Ok(r.clone()),
            StubInference::Fails { code, description } => Err(InferenceError::Upstream {
                code: *code,
                description: description.clone(),
                details: String::new(),
            }),
        }
    }
}

pub fn fake_with_store() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let mut st = AppState::fake();
    st.store = store.clone() as Arc<dyn UserStore>;
    (st, store)
}

/// Sends a JSON request through the router and decodes the JSON response.
pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
