pub mod audio;
pub mod config;
pub mod correction;
pub mod http;
pub mod logging;
pub mod providers;
pub mod scoring;
pub mod storage;
pub mod stt;
pub mod task;
pub mod transport;
pub mod tts;

#[cfg(test)]
mod testing;

use anyhow::Context;
use config::AppConfig;
use correction::AudioCorrectionLoop;
use http::{create_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use storage::LocalAudioStore;
use task::{InMemoryTaskStore, TaskRunner};

const RETENTION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();

    logging::init_tracing(&logging::TracingConfig::from_env());

    let config = AppConfig::load().context("failed to load configuration")?;
    config.log_summary();

    let synthesizer = providers::synthesizer_from_config(&config)?;
    let transcriber = providers::transcriber_from_config(&config)?;
    let audio_store = Arc::new(
        LocalAudioStore::new(config.audio_dir.clone())
            .with_context(|| format!("failed to open audio dir {}", config.audio_dir.display()))?,
    );

    let correction = AudioCorrectionLoop::new(synthesizer, transcriber, audio_store.clone());
    let task_store = Arc::new(InMemoryTaskStore::new());
    let runner = TaskRunner::new(
        Arc::new(correction),
        task_store.clone(),
        config.worker_concurrency,
    );

    if let Some(retention) = config.task_retention() {
        task::spawn_retention_sweeper(
            task_store,
            audio_store.clone(),
            retention,
            RETENTION_SWEEP_INTERVAL.min(retention),
        );
    }

    let app = create_router(AppState::new(
        runner,
        audio_store,
        config.request_defaults(),
    ));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Audio correction service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
