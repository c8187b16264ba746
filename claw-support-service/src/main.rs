use anyhow::{Context, Result};
use claw_support_service::{
    Config, LogFormat, build_app_state, build_router, spawn_session_sweeper,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "claw_support_service=debug,claw_flow=debug,tower_http=debug".into()
    });

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let state = build_app_state(&config)?;

    if let (Some(max_idle), Some(every)) = (config.session_idle_timeout, config.sweep_interval()) {
        info!(
            idle_timeout_secs = max_idle.as_secs(),
            "Idle session eviction enabled"
        );
        spawn_session_sweeper(state.flow_runner.storage().clone(), max_idle, every);
    }

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Server running on http://{addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
