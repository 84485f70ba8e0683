//! git2consul
//!
//! Long-running daemon that keeps a local mirror of a git repository and
//! writes its files into Consul's key-value store on a fixed interval.

mod cli;
mod error;
mod logging;
mod router;

use clap::Parser;
use colored::Colorize;
use git2consul_core::{ConfigLayer, SyncConfig, SyncController};
use git2consul_git::{Credential, GitMirror};
use git2consul_kv::ConsulStore;
use tokio::sync::watch;

use cli::Cli;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    logging::init(&config.log_level)?;

    tracing::info!(
        repository = %config.repository,
        directory = %config.directory.display(),
        polling_interval = ?config.polling_interval,
        consul = %config.consul,
        "Starting git2consul"
    );

    let mirror = build_mirror(&config)?;
    let store = ConsulStore::new(&config.consul.host, config.consul.port, config.store_timeout)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config, mirror, store))
}

fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let file = match &cli.config {
        Some(path) => ConfigLayer::load(path)?,
        None => ConfigLayer::default(),
    };
    Ok(cli.layer().merge(file).resolve()?)
}

fn build_mirror(config: &SyncConfig) -> Result<GitMirror> {
    let mirror = GitMirror::new(config.repository.clone(), config.directory.clone());
    match &config.credential {
        Some(credential) => {
            let credential = Credential::new(credential.user.clone(), &credential.private_key)?;
            Ok(mirror.with_credential(credential))
        }
        None => Ok(mirror),
    }
}

/// Run the sync loop and the liveness endpoint until a signal arrives or
/// either of them fails.
async fn serve(config: SyncConfig, mirror: GitMirror, store: ConsulStore) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = signal_tx.send(true);
    });

    let mut liveness = tokio::spawn(router::serve(config.router.clone(), shutdown_rx.clone()));
    let controller = SyncController::new(&config, mirror, store);

    let outcome = tokio::select! {
        synced = controller.run(shutdown_rx) => synced.map_err(CliError::from),
        served = &mut liveness => served.unwrap_or_else(|e| Err(CliError::Task { message: e.to_string() })),
    };

    let _ = shutdown_tx.send(true);
    if !liveness.is_finished() {
        let _ = liveness.await;
    }
    tracing::info!("git2consul stopped");
    outcome
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
