//! Meetup session backend entrypoint wiring REST, SSE and the document store.

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meetup_session_back::{
    config::AppConfig,
    dao::{
        document_store::{DocumentStore, memory::MemoryDocumentStore},
        identity::AccountDirectory,
        realtime::RealtimeDatabase,
    },
    facade::SessionBackend,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let documents = document_store().await?;
    let backend = SessionBackend::new(
        Arc::new(AccountDirectory::new(config.accounts().to_vec())),
        documents,
        Arc::new(RealtimeDatabase::new()),
    );
    backend
        .seed_members(config.seed_members())
        .await
        .context("seeding members")?;

    let app_state = AppState::new(backend, config);
    tokio::spawn(run_roster_refresher(app_state.clone()));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the document store: MongoDB when `MONGO_URI` is set, in-memory otherwise.
async fn document_store() -> anyhow::Result<Arc<dyn DocumentStore>> {
    #[cfg(feature = "mongo-store")]
    if let Ok(uri) = env::var("MONGO_URI") {
        use meetup_session_back::dao::document_store::mongodb::{MongoConfig, MongoDocumentStore};

        let mongo_db = env::var("MONGO_DB").ok();
        let config = MongoConfig::from_uri(&uri, mongo_db.as_deref())
            .await
            .context("parsing MONGO_URI")?;
        let store = MongoDocumentStore::connect(config)
            .await
            .context("connecting to MongoDB")?;
        info!("using MongoDB document store");
        return Ok(Arc::new(store));
    }

    info!("MONGO_URI not set; using in-memory document store");
    Ok(Arc::new(MemoryDocumentStore::new()))
}

/// Keep the shared roster current, backing off while the document store is unreachable.
async fn run_roster_refresher(state: SharedState) {
    let interval = state.config().roster_refresh();
    let initial_delay_ms = 1000;
    let mut delay = Duration::from_millis(initial_delay_ms);
    let max_delay = interval.max(Duration::from_millis(initial_delay_ms));

    loop {
        match state.roster().refresh(state.backend()).await {
            Ok(_) => {
                delay = Duration::from_millis(initial_delay_ms);
                sleep(interval).await;
            }
            Err(err) => {
                warn!(error = %err, "roster load failed; retrying");
                sleep(delay).await;
                delay = (delay * 2).min(max_delay);
            }
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
