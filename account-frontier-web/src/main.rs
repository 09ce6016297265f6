//! Account frontier tracker server
//!
//! Finds the highest allocated account id of the configured remote service,
//! follows it as new accounts appear and serves the result over HTTP.

mod config;
mod logging;
mod routes;
mod shutdown;

use std::process::ExitCode;
use std::sync::Arc;

use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tokio_util::sync::CancellationToken;

use account_frontier_app::{AppState, AppStateBuilder};
use config::AppConfig;

#[actix_web::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The subscriber may not be installed yet
            eprintln!("account-frontier: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let (config, from_file) = AppConfig::load()?;
    let _log_guard = logging::init(&config.log)?;

    if from_file {
        tracing::info!("Configuration loaded");
    } else {
        tracing::info!("No configuration file found, using defaults");
    }

    let mut builder = AppStateBuilder::new()
        .endpoints(config.endpoints())
        .http_options(config.http_options())
        .settings(config.tracker_settings());
    if let Some(path) = config.state_file() {
        builder = builder.state_file(path);
    }
    let state: Arc<AppState> = Arc::new(
        builder
            .build()
            .context("failed to build application state")?,
    );

    let cancel = CancellationToken::new();
    shutdown::install_signal_handler(cancel.clone());

    let tracker = {
        let state = Arc::clone(&state);
        let cancel = cancel.clone();
        tokio::spawn(async move { state.run_tracker(cancel).await })
    };

    let data = web::Data::from(Arc::clone(&state));
    let (host, port) = config.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")))
            .configure(routes::configure)
    })
    .disable_signals()
    .bind((host.as_str(), port))
    .with_context(|| format!("failed to bind {host}:{port}"));

    let server = match server {
        Ok(server) => server.run(),
        Err(e) => {
            cancel.cancel();
            let _ = tracker.await;
            return Err(e);
        }
    };
    tracing::info!("Listening on http://{host}:{port}");

    let handle = server.handle();
    let stopper = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            handle.stop(true).await;
        })
    };

    let served = server.await;
    // The server may also stop on its own; make sure the tracker follows.
    cancel.cancel();
    let _ = stopper.await;

    match tracker.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Tracker failed: {e}"),
        Err(e) => tracing::error!("Tracker task failed: {e}"),
    }

    served.context("HTTP server error")?;
    tracing::info!("Shut down cleanly");
    Ok(())
}
