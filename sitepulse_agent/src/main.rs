use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sitepulse_agent::config::{AgentConfig, ConfigError};
use sitepulse_agent::http::router;
use sitepulse_agent::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match AgentConfig::from_env_and_args() {
        Ok(cfg) => cfg,
        Err(ConfigError::Help(usage)) => {
            println!("{usage}");
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sitepulse_agent=info")),
        )
        .init();

    if cfg.admin_token.is_none() {
        tracing::warn!("no admin token configured; authenticated endpoints will refuse every caller");
    }

    let state = AppState::from_config(&cfg)?;
    info!(
        settings = %state.settings.path().display(),
        db = cfg.db_url.is_some(),
        "agent state ready"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("sitepulse agent listening on http://{addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
