use std::{net::SocketAddr, sync::Arc};

use mongodb::Client;
use tracing_subscriber::EnvFilter;

use stockwatch::{
    config::{self, Settings, StoreBackend},
    routes,
    services::{
        alert_monitor::MonitorDeps,
        alert_sink::{AlertSink, BroadcastSink, FanoutSink},
        db_init,
        file_store::JsonFileStore,
        finnhub::FinnhubClient,
        mongo_store::MongoWatchlistStore,
        session_controller::SessionController,
        telegram::TelegramSink,
        watchlist_store::{MemoryStore, WatchlistStore},
    },
    templates, AppState,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn build_store(settings: &Settings) -> Result<Arc<dyn WatchlistStore>, BoxError> {
    let store: Arc<dyn WatchlistStore> = match settings.store_backend {
        StoreBackend::Json => Arc::new(JsonFileStore::open(&settings.watchlist_file).await?),
        StoreBackend::Mongo => {
            let client = Client::with_uri_str(&settings.mongodb_uri).await?;
            let db = client.database(&settings.mongodb_db);

            if let Err(e) = db_init::ensure_indexes(&db).await {
                tracing::warn!(error = %e, "could not create watchlist indexes");
            }

            Arc::new(MongoWatchlistStore::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("memory backend: the watchlist is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();
    tracing::info!(backend = ?settings.store_backend, tz = %settings.market_tz, "starting stockwatch");

    let store = build_store(&settings).await?;

    if settings.finnhub_api_key.trim().is_empty() {
        tracing::warn!("FINNHUB_API_KEY is not set, every price fetch will fail");
    }
    let feed = Arc::new(
        FinnhubClient::new(settings.finnhub_api_key.clone()).with_timeout(settings.fetch_timeout),
    );

    let (events_tx, _events_rx) = tokio::sync::broadcast::channel::<String>(64);

    let mut sinks: Vec<Arc<dyn AlertSink>> = vec![Arc::new(BroadcastSink::new(events_tx.clone()))];
    if !settings.telegram_bot_token.trim().is_empty() {
        sinks.push(Arc::new(
            TelegramSink::new(settings.telegram_bot_token.clone()).with_timeout(settings.fetch_timeout),
        ));
    }

    let hbs = templates::build_handlebars();

    let deps = MonitorDeps {
        store: store.clone(),
        feed: feed.clone(),
        sink: Arc::new(FanoutSink::new(sinks)),
        hours: Arc::new(settings.calendar()),
        hbs: hbs.clone(),
        recovery_delay: settings.recovery_delay,
        fetch_timeout: settings.fetch_timeout,
    };
    let sessions = Arc::new(SessionController::new(deps));

    let state = AppState {
        hbs,
        store,
        feed,
        sessions: sessions.clone(),
        settings: settings.clone(),
        events_tx,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    sessions.shutdown().await;
    Ok(())
}
