// revogi-api: Async Rust client for the Revogi cloud-relay power strip API

mod auth;
pub mod client;
mod devices;
pub mod envelope;
pub mod error;
pub mod models;
mod power;
mod session;
mod stats;
pub mod transport;

pub use client::{ClientConfig, DEFAULT_API_URL, RevogiClient};
pub use envelope::{Command, CommandCode, Envelope};
pub use error::Error;
pub use models::{Device, DeviceStats, PortState};
pub use transport::{TlsMode, TransportConfig};
