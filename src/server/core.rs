use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::server::routes::router;

pub struct Server {
    listener: TcpListener,
    config: Arc<ServiceConfig>,
}

impl Server {
    /// Binds the listener described by `config`
    pub async fn new(config: ServiceConfig) -> io::Result<Self> {
        let socket = config.socket_address();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e);
            }
        };

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until the process is stopped
    pub async fn start(self) -> io::Result<()> {
        info!(
            "Starting file action server on {} (stream buffer {} bytes)",
            self.local_addr()?,
            self.config.stream_buffer_size
        );

        axum::serve(self.listener, router(self.config)).await
    }
}
