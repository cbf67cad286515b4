use std::process;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use departure_board::config::{AppConfig, FEED_API_KEY_VAR};
use departure_board::engine::Engine;
use departure_board::realtime::{FeedCache, FeedClient, FeedClientConfig};
use departure_board::store::MemoryStore;
use departure_board::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("departure_board=info")),
        )
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        error!(error = %e, "failed to load config");
        process::exit(1);
    });

    // The initial import must succeed; without it there is nothing to show.
    let store = MemoryStore::load(&config.schedule).unwrap_or_else(|e| {
        error!(error = %e, "schedule store unavailable");
        process::exit(1);
    });

    let feed = if config.realtime.is_enabled() {
        let mut client_config = FeedClientConfig::new(config.realtime.clone());
        match std::env::var(FEED_API_KEY_VAR) {
            Ok(key) => client_config = client_config.with_api_key(key),
            Err(_) => warn!("{FEED_API_KEY_VAR} not set, fetching feed without a key"),
        }
        let client = FeedClient::new(client_config).unwrap_or_else(|e| {
            error!(error = %e, "failed to create feed client");
            process::exit(1);
        });
        FeedCache::new(client)
    } else {
        info!("no realtime feed configured, showing scheduled times only");
        FeedCache::disabled()
    };

    let broadcast_every = config.board.broadcast_interval();
    let realtime_every = config.board.realtime_interval();
    let schedule_every = config.board.schedule_refresh();
    let engine = Arc::new(Engine::new(store, feed, config.board.clone()));

    if let Err(e) = engine.register(config.queries.clone()).await {
        error!(error = %e, "failed to register startup queries");
        process::exit(1);
    }
    if engine.feed().is_enabled() {
        // A failed first fetch is logged inside; the board starts schedule-only.
        let _ = engine.refresh_realtime().await;
    }
    if let Err(e) = engine.broadcast_now().await {
        warn!(error = %e, "initial broadcast failed");
    }

    // Broadcast on a fixed cadence.
    let broadcaster = Arc::clone(&engine);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(broadcast_every);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            if let Err(e) = broadcaster.broadcast_now().await {
                warn!(error = %e, "broadcast failed");
            }
        }
    });

    // Fetch realtime data and rebroadcast whenever it changes.
    if engine.feed().is_enabled() {
        let poller = Arc::clone(&engine);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(realtime_every);
            interval.tick().await;
            loop {
                interval.tick().await;
                if poller.refresh_realtime().await.is_ok()
                    && let Err(e) = poller.broadcast_now().await
                {
                    warn!(error = %e, "broadcast after realtime refresh failed");
                }
            }
        });
    }

    // Reload the schedule snapshot periodically.
    let reloader = Arc::clone(&engine);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(schedule_every);
        interval.tick().await;
        loop {
            interval.tick().await;
            match reloader.refresh_schedule().await {
                Ok(watches) => {
                    info!(watches, "schedule reloaded");
                    if let Err(e) = reloader.broadcast_now().await {
                        warn!(error = %e, "broadcast after schedule reload failed");
                    }
                }
                Err(e) => warn!(error = %e, "schedule reload failed, keeping previous data"),
            }
        }
    });

    let app = create_router(AppState::new(engine));

    let addr = config.listen;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, %addr, "failed to bind");
            process::exit(1);
        });
    info!("departure board listening on http://{addr}");
    info!("  GET  /health      - Health check");
    info!("  GET  /departures  - Latest board");
    info!("  POST /watch       - Add watches");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        process::exit(1);
    }
}
