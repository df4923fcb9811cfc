// Framework bootstrap for the laser tag server runtime.

use crate::domain::Detector;
use crate::frameworks::config;
use crate::interface_adapters::clients::DetectorClient;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{
    AdjudicatorSettings, ConnectionManager, GameController, ImageAudit, RosterSettings,
    ShotAdjudicator, UserRegistry,
};

use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the API on an already bound listener with the given state.
pub async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) -> Result<()> {
    let address = listener.local_addr()?;
    let router = app(state);

    tracing::info!(%address, "listening");

    axum::serve(listener, router).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let detector_url = config::detector_service_url();
    let detector_timeout = config::detector_timeout();
    let marker_size = config::marker_size_cm();
    // The adjudicator bounds the call; the client timeout only reaps abandoned requests.
    let client_timeout = detector_timeout + config::DETECT_TIMEOUT_GRACE;
    let detector = DetectorClient::new(detector_url.clone(), client_timeout, marker_size)
        .map_err(|e| std::io::Error::other(format!("failed to initialize detector client: {e}")))?;
    tracing::debug!(
        detector_url = %detector_url,
        detector_timeout_ms = detector_timeout.as_millis(),
        marker_size,
        "detector client configured"
    );

    serve(listener, build_state(Arc::new(detector))).await
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = format!("{}:{}", config::http_host(), config::http_port());

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

/// Wires the game services around a detector using environment settings.
pub fn build_state(detector: Arc<dyn Detector>) -> Arc<AppState> {
    let registry = Arc::new(UserRegistry::new(RosterSettings {
        max_health: config::player_max_health(),
        hit_score: config::hit_score(),
    }));
    let audit = Arc::new(ImageAudit::new(config::image_audit_capacity()));
    let connections = Arc::new(ConnectionManager::new(config::outbound_queue_capacity()));

    let adjudicator = ShotAdjudicator::new(
        registry.clone(),
        audit.clone(),
        detector,
        AdjudicatorSettings {
            damage: config::hit_damage(),
            detect_timeout: config::detector_timeout(),
        },
    );

    Arc::new(AppState {
        game: Arc::new(GameController::new(registry, audit, connections, adjudicator)),
    })
}
