#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use chrono::Utc;
use ragchat::{
    AppState,
    cache::{MemoryStore, SharedStore},
    config::Config,
    database::{MessageEntity, SessionEntity},
    database::repositories::{MessageRepository, NewMessage, SessionChanges, SessionRepository},
    models::page::{Page, PageRequest},
    router::build_router,
};
use serde_json::Value;
use uuid::Uuid;

pub const API_KEY: &str = "test-key";

/// In-memory stand-in for both Postgres repositories. Sessions are kept in
/// insertion order so "newest first" is a reverse walk.
#[derive(Default)]
pub struct InMemoryDb {
    sessions: Mutex<Vec<SessionEntity>>,
    messages: Mutex<Vec<MessageEntity>>,
    list_queries: AtomicUsize,
}

impl InMemoryDb {
    /// Number of session list queries that reached the repository.
    pub fn list_queries(&self) -> usize {
        self.list_queries.load(Ordering::SeqCst)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

fn paginate<T: Clone>(rows: Vec<T>, page: PageRequest) -> Page<T> {
    let total_elements = rows.len() as i64;
    let content = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Page {
        content,
        total_elements,
    }
}

#[async_trait]
impl SessionRepository for InMemoryDb {
    async fn create(&self, user_id: &str, title: &str) -> Result<SessionEntity, sqlx::Error> {
        let now = Utc::now();
        let session = SessionEntity {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        favorite: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<SessionEntity>, sqlx::Error> {
        self.list_queries.fetch_add(1, Ordering::SeqCst);
        let rows: Vec<_> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .filter(|s| favorite.is_none_or(|f| s.is_favorite == f))
            .cloned()
            .collect();
        Ok(paginate(rows, page))
    }

    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<SessionEntity>, sqlx::Error> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id && s.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: &str,
        changes: SessionChanges,
    ) -> Result<Option<SessionEntity>, sqlx::Error> {
        let mut sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions
            .iter_mut()
            .find(|s| s.id == id && s.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            session.title = title;
        }
        if let Some(favorite) = changes.favorite {
            session.is_favorite = favorite;
        }
        session.updated_at = Utc::now();
        Ok(Some(session.clone()))
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<bool, sqlx::Error> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| !(s.id == id && s.user_id == user_id));
        let removed = sessions.len() != before;
        if removed {
            self.messages.lock().unwrap().retain(|m| m.session_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MessageRepository for InMemoryDb {
    async fn create(&self, message: NewMessage) -> Result<MessageEntity, sqlx::Error> {
        let entity = MessageEntity {
            id: Uuid::new_v4(),
            session_id: message.session_id,
            sender: message.sender,
            content: message.content,
            context: message.context,
            created_at: Utc::now(),
        };
        self.messages.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_session(
        &self,
        session_id: Uuid,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<MessageEntity>, sqlx::Error> {
        let owned = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.id == session_id && s.user_id == user_id);
        let rows = if owned {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.session_id == session_id)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        Ok(paginate(rows, page))
    }
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("DATABASE_URL".to_string(), "postgres://unused".to_string()),
        ("API_KEY".to_string(), API_KEY.to_string()),
        ("STORE_BACKEND".to_string(), "memory".to_string()),
    ]);
    for (name, value) in overrides {
        vars.insert(name.to_string(), value.to_string());
    }
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub db: Arc<InMemoryDb>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new(overrides: &[(&str, &str)]) -> Self {
        let db = Arc::new(InMemoryDb::default());
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn SharedStore> = store.clone();
        let state = AppState::new(test_config(overrides), db.clone(), db.clone(), Some(shared));
        Self {
            router: build_router(state),
            db,
            store,
        }
    }

    /// App with no shared store: no limiter, no list cache.
    pub fn without_store() -> Self {
        let db = Arc::new(InMemoryDb::default());
        let state = AppState::new(test_config(&[]), db.clone(), db.clone(), None);
        Self {
            router: build_router(state),
            db,
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub async fn send(&self, req: Request<Body>) -> anyhow::Result<Response<Body>> {
        use tower::ServiceExt;
        Ok(self.router.clone().oneshot(req).await?)
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        user: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(u16, Value)> {
        let response = self.send(api_request(method, uri, user, body)?).await?;
        let status = response.status().as_u16();
        Ok((status, json_body(response).await?))
    }
}

pub fn api_request(
    method: &str,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> anyhow::Result<Request<Body>> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", API_KEY)
        .header("x-user-id", user);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(req)
}

pub async fn json_body(response: Response<Body>) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
