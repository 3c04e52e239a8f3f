use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DnsError {
    #[error("Invalid domain name: {0}")]
    InvalidName(String),

    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Timeout waiting for {server} over {protocol}")]
    TransportTimeout {
        server: String,
        protocol: &'static str,
    },

    #[error("Transport error on {server} over {protocol}: {reason}")]
    Transport {
        server: String,
        protocol: &'static str,
        reason: String,
    },

    #[error("Resolution failed after {attempts} attempt(s), last tried {server} over {protocol}: {reason}")]
    ResolutionFailed {
        server: String,
        protocol: &'static str,
        attempts: u32,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DnsError {
    /// True for errors the lookup engine may retry (timeouts only;
    /// everything else propagates to the caller unchanged).
    pub fn is_timeout(&self) -> bool {
        matches!(self, DnsError::TransportTimeout { .. })
    }
}
