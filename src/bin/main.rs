use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use bmp_collector::publisher::KafkaPublisher;
use bmp_collector::session::supervisor::{self, SupervisorStats};

/// Passive BMP collector: decodes router telemetry into typed Kafka
/// records.
#[derive(Parser, Debug)]
#[clap(name = "bmp-collector", version)]
struct Opts {
    /// Address to accept router BMP connections on.
    #[clap(long, default_value = "0.0.0.0:5000")]
    listen: String,

    /// Kafka broker as host:port.
    #[clap(long, default_value = "localhost:9092")]
    kafka: String,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    let publisher = match KafkaPublisher::start(&opts.kafka) {
        Ok(publisher) => publisher,
        Err(e) => {
            // no bus, no reason to run
            error!("failed to start publisher: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(&opts.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind {}: {}", opts.listen, e);
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let stats = Arc::new(SupervisorStats::default());

    let server = tokio::spawn(supervisor::serve(
        listener,
        publisher.clone(),
        shutdown_rx,
        Arc::clone(&stats),
    ));

    tokio::signal::ctrl_c().await.expect("signal handler");
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("supervisor failed: {}", e),
        Err(e) => error!("supervisor task panicked: {}", e),
    }
    publisher.stop().await;
    info!(
        "done: {} sessions served, {} decode errors",
        stats
            .sessions_opened
            .load(std::sync::atomic::Ordering::Relaxed),
        stats
            .decode_errors
            .load(std::sync::atomic::Ordering::Relaxed),
    );
}
