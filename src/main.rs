use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use transferd::application::{self, EngineConfig};
use transferd::interfaces::http;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 80)]
    port: u16,

    /// Maximum number of queued commands
    #[arg(long, default_value_t = 1024)]
    queue_capacity: usize,

    /// How long a request may wait for queue capacity, in milliseconds
    #[arg(long, default_value_t = 100)]
    offer_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = EngineConfig {
        queue_capacity: cli.queue_capacity,
        offer_timeout: Duration::from_millis(cli.offer_timeout_ms),
    };

    tracing::info!("about to start transfer application");
    let (publisher, mut processor) = application::build(&config);
    processor.start();

    let app = http::router(Arc::new(publisher));
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, cli.port))
        .await
        .into_diagnostic()?;
    tracing::info!("listening on {}", listener.local_addr().into_diagnostic()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    // HTTP no longer accepts requests; now stop draining the queue.
    tracing::info!("about to stop transfer application");
    processor.close().await;
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            tracing::error!(error = %err, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigterm.recv() => {},
    }
}
