use std::error::Error;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use ragchat::{
    AppState,
    cache::{MemoryStore, RedisStore, SharedStore},
    config::{Config, StoreBackend},
    database::{self, PgMessageRepository, PgSessionRepository},
    router::build_router,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env()?;

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'ragchat';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await?;
    database::migrate(&pool).await?;
    tracing::info!("Database ready");

    // 选择共享存储
    let store: Option<Arc<dyn SharedStore>> = match (config.store_backend, &config.redis_url) {
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using in-process store: limits and cache are not shared between instances");
            let memory: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
            Some(memory)
        }
        (StoreBackend::Redis, Some(url)) => {
            let redis: Arc<dyn SharedStore> =
                Arc::new(RedisStore::connect(url, config.store_timeout()).await?);
            tracing::info!("Connected to Redis");
            Some(redis)
        }
        (StoreBackend::Redis, None) => {
            tracing::warn!("REDIS_URL not set: rate limiting and session list cache disabled");
            None
        }
    };

    // 设置应用状态
    let state = AppState::new(
        config.clone(),
        Arc::new(PgSessionRepository::new(pool.clone())),
        Arc::new(PgMessageRepository::new(pool)),
        store,
    );
    let app = build_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
