pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;

pub use config::ServiceConfig;
pub use server::Server;
