// pgw-api: Async Rust client for the proxy gateway API and reconciliation agent

pub mod agent;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use agent::AgentClient;
pub use client::GatewayClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
