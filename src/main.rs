//! File action server - Entry Point
//!
//! Validates and executes path-based file operations (retrieval, copy, drive
//! listing) for remote callers.

use log::{error, info};

use fs_action_server::{Server, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Launching file action server...");

    let server = Server::new(config).await?;
    server.start().await?;
    Ok(())
}
