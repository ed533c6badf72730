//! Algoviz Visualization Server
//!
//! Load an algorithm and input, then serve the playback viewer.

use algoviz_vis::{VisConfig, VisServer};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoviz_vis=info,algoviz_trace=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VisConfig::parse();
    tracing::info!(
        algorithm = %config.algorithm,
        speed = config.speed,
        "Starting Algoviz on http://{}:{}",
        config.host,
        config.port
    );

    let server = VisServer::new(config)?;
    server.serve().await?;

    Ok(())
}
