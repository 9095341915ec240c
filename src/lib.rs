use std::sync::Arc;

use cache::{FixedWindowLimiter, SessionListCache, SharedStore};
use config::Config;
use database::{MessageRepository, SessionRepository};
use middleware::{Admission, ApiKeyAuth};
use routes::{message::MessageService, session::SessionService};

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionService,
    pub messages: MessageService,
    pub admission: Admission,
    pub auth: ApiKeyAuth,
    pub store: Option<Arc<dyn SharedStore>>,
}

impl AppState {
    /// Wires services around the repositories. Without a shared store the
    /// list cache and the limiter are both disabled.
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionRepository>,
        messages: Arc<dyn MessageRepository>,
        store: Option<Arc<dyn SharedStore>>,
    ) -> Self {
        let cache = store
            .clone()
            .map(|store| SessionListCache::new(store, config.session_list_ttl()));
        let limiter = store
            .clone()
            .map(|store| Arc::new(FixedWindowLimiter::from_config(store, &config)));

        Self {
            sessions: SessionService::new(sessions.clone(), cache),
            messages: MessageService::new(messages, sessions),
            admission: Admission::new(limiter, &config.health_path_prefix),
            auth: ApiKeyAuth::new(&config.api_key),
            store,
            config: Arc::new(config),
        }
    }
}
