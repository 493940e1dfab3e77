//! Shared setup for router-level tests: the real router and guard, backed by
//! in-memory repositories instead of Postgres.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use jsonwebtoken::Algorithm;
use postboard::{
    app::build_app,
    config::{AppConfig, JwtConfig},
    posts::{
        repo::PostRepo,
        repo_types::{Post, PostFields, PostFilter},
    },
    state::AppState,
    users::{repo::UserRepo, repo_types::User},
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt;

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
    next_id: Mutex<i64>,
}

impl MemoryUsers {
    pub fn remove(&self, id: i64) {
        self.rows.lock().unwrap().retain(|u| u.id != id);
    }

    pub fn exists(&self, id: i64) -> bool {
        self.rows.lock().unwrap().iter().any(|u| u.id == id)
    }
}

#[async_trait]
impl UserRepo for MemoryUsers {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let user = User {
            id: *next_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(user.clone());
        Ok(Some(user))
    }
}

pub struct MemoryPosts {
    users: Arc<MemoryUsers>,
    rows: Mutex<Vec<Post>>,
    next_id: Mutex<i64>,
}

impl MemoryPosts {
    pub fn new(users: Arc<MemoryUsers>) -> Self {
        Self {
            users,
            rows: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl PostRepo for MemoryPosts {
    async fn create(&self, author_id: i64, fields: &PostFields) -> anyhow::Result<Post> {
        anyhow::ensure!(
            self.users.exists(author_id),
            "author {author_id} does not exist"
        );
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let post = Post {
            id: *next_id,
            title: fields.title.clone(),
            content: fields.content.clone(),
            published: fields.published,
            created_at: OffsetDateTime::now_utc(),
            author_id,
        };
        self.rows.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Post>> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, filter: &PostFilter) -> anyhow::Result<Vec<Post>> {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<Post> = rows
            .iter()
            .filter(|p| filter.search.is_empty() || p.title.contains(&filter.search))
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.id);
        Ok(matching
            .into_iter()
            .skip(filter.skip as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn update(&self, id: i64, fields: &PostFields) -> anyhow::Result<Option<Post>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(post) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.title = fields.title.clone();
        post.content = fields.content.clone();
        post.published = fields.published;
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() < before)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        max_connections: 1,
        host: "127.0.0.1".into(),
        port: 0,
        jwt: JwtConfig {
            secret: "test-secret-key-for-testing-only".into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 30,
        },
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub users: Arc<MemoryUsers>,
    pub posts: Arc<MemoryPosts>,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUsers::default());
        let posts = Arc::new(MemoryPosts::new(users.clone()));
        let state = AppState::from_parts(
            Arc::new(test_config()),
            users.clone() as Arc<dyn UserRepo>,
            posts.clone() as Arc<dyn PostRepo>,
        );
        let app = build_app(state.clone());
        Self {
            app,
            state,
            users,
            posts,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn register(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/users",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers and logs in, returning `(user_id, access_token)`.
    pub async fn signup(&self, email: &str, password: &str) -> (i64, String) {
        let registered = self.register(email, password).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
        let logged_in = self.login(email, password).await;
        assert_eq!(logged_in.status, StatusCode::OK, "{:?}", logged_in.body);
        (
            registered.body["id"].as_i64().unwrap(),
            logged_in.body["access_token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_post(&self, token: &str, title: &str) -> TestResponse {
        self.request(
            "POST",
            "/posts",
            Some(token),
            Some(json!({ "title": title, "content": format!("{title} body") })),
        )
        .await
    }
}
