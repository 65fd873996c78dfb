use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod dashboard;
mod error;
mod predictor;

use config::Config;
use dashboard::AppState;
use predictor::{LogisticPipeline, Predictor, UnavailableClassifier, WinClassifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Load the classifier once; it stays read-only for the process lifetime.
    // A broken artifact keeps the page up and reports on every predict.
    let classifier: Arc<dyn WinClassifier> = match LogisticPipeline::load(&config.model_path) {
        Ok(model) => {
            info!("Loaded classifier {} from {}", model.name(), config.model_path);
            Arc::new(model)
        }
        Err(e) => {
            error!("Failed to load classifier from {}: {}", config.model_path, e);
            Arc::new(UnavailableClassifier::new(e.to_string()))
        }
    };

    let app = dashboard::router(AppState {
        predictor: Predictor::new(classifier),
    });
    let addr = config.socket_addr()?;
    info!("Predictor listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
