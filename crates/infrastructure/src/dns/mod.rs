pub mod client;
pub mod codec;
pub mod transport;

pub use client::{AuditTrail, ClientConfig, LookupClient, LookupResult};
