// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Porter Daemon (porterd)
//!
//! Background process that arms task timers, dispatches due fires, and
//! prunes old run history. Configuration comes from a TOML file (first
//! argument, default `porter.toml`) with `PORTER_*` environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use porter_adapters::{
    NoOpNotifier, NoOpTransfer, Notifier, NotifyError, NotifyPayload, TracedTransfer,
    UniformBackends, WebhookNotifier,
};
use porter_core::{EngineConfig, SystemClock};
use porter_engine::{RetentionSweeper, Scheduler};
use porter_storage::WalRepository;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("porter.toml")
    };

    let config = EngineConfig::load_or_default(&config_path)?.apply_env()?;

    let _log_guard = setup_logging(&config)?;

    info!(
        config = %config_path.display(),
        data_dir = %config.data_dir.display(),
        max_concurrent = config.max_concurrent,
        retention_days = config.retention_days,
        "starting porterd"
    );

    let repo = WalRepository::open(&config.data_dir, Utc::now())?;

    let notifier = match &config.webhook_url {
        Some(url) => {
            info!(url = %url, "webhook notifications enabled");
            DaemonNotifier::Webhook(WebhookNotifier::new(url.clone()))
        }
        None => DaemonNotifier::Silent(NoOpNotifier),
    };

    // Transfer backends are wired here; the shipped binary runs the traced
    // no-op backend until real mysql/smb/minio movers land.
    let backends = UniformBackends::new(TracedTransfer::new(NoOpTransfer));

    let scheduler = Scheduler::new(
        repo.clone(),
        backends,
        notifier,
        SystemClock,
        &config,
    );
    scheduler.load().await?;

    let sweeper = RetentionSweeper::new(repo, SystemClock, &config)?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("porterd ready");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                scheduler.tick().await;
                sweeper.tick().await;
            }

            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                scheduler.shutdown(config.shutdown_grace).await;
                break;
            }

            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                scheduler.shutdown(config.shutdown_grace).await;
                break;
            }
        }
    }

    info!("porterd stopped");
    Ok(())
}

/// Webhook delivery when configured, silence otherwise
#[derive(Clone)]
enum DaemonNotifier {
    Webhook(WebhookNotifier),
    Silent(NoOpNotifier),
}

#[async_trait]
impl Notifier for DaemonNotifier {
    async fn notify(&self, payload: &NotifyPayload) -> Result<(), NotifyError> {
        match self {
            DaemonNotifier::Webhook(notifier) => notifier.notify(payload).await,
            DaemonNotifier::Silent(notifier) => notifier.notify(payload).await,
        }
    }
}

fn setup_logging(
    config: &EngineConfig,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = tracing_appender::rolling::never(&config.log_dir, "porterd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
