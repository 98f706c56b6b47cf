#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use ads_contact_server::api::ServiceContainer;
use ads_contact_server::config::Config;
use ads_contact_server::services::notification::LoggingEmailSender;
use ads_contact_server::workers::RateLimitCleanupWorker;
use ads_contact_server::{api, telemetry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init_telemetry(&config.telemetry)?;

    ads_contact_server::setup_panic_hook();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    ads_contact_server::spawn_signal_handler(shutdown_tx.clone());

    let sender = Arc::new(LoggingEmailSender);
    let services = ServiceContainer::build(&config, sender);

    let cleanup_worker = RateLimitCleanupWorker::new(
        vec![Arc::clone(&services.contact_limiter), Arc::clone(&services.email_check_limiter)],
        config.rate_limit.cleanup_interval_secs,
    );
    let worker_task = tokio::spawn(cleanup_worker.run(shutdown_rx.clone()));

    let app_router = api::app_router(services);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "listening");

    let mut serve_rx = shutdown_rx.clone();
    axum::serve(listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = serve_rx.wait_for(|&s| s).await;
        })
        .await?;

    let _ = shutdown_tx.send(true);
    tokio::select! {
        _ = worker_task => {
            tracing::info!("Background tasks finished.");
        }
        () = tokio::time::sleep(std::time::Duration::from_secs(config.server.shutdown_timeout_secs)) => {
            tracing::warn!("Timeout waiting for background tasks to finish.");
        }
    }

    Ok(())
}
