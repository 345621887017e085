use expense_ledger::{
    api::{start_server, ApiState},
    config::Config,
    gemini::GeminiClassifier,
    ledger::Ledger,
    state::{Session, SharedSession},
    taxonomy::Taxonomy,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    if config.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY not set; extraction requests will fail until it is configured");
    }

    info!("Expense Ledger - API Server");
    info!("Port: {}", config.api_port);
    info!("Model: {}", config.gemini_model);

    let ledger = if config.seed_ledger {
        Ledger::seeded()
    } else {
        Ledger::new()
    };
    let session = SharedSession::new(Session::new(Taxonomy::default(), ledger));
    let classifier = Arc::new(GeminiClassifier::new(
        config.gemini_api_key.clone(),
        &config.gemini_model,
    )?);

    let state = ApiState {
        session,
        classifier,
        timeout: config.extraction_timeout,
    };

    info!("Session initialized");

    start_server(state, config.api_port).await?;

    Ok(())
}
