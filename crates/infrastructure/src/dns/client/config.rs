use crate::dns::codec::EdnsParams;
use ferrous_dig_domain::{DigConfig, DnsError, ServerAddr};
use std::str::FromStr;
use std::time::Duration;

/// Immutable settings for a [`super::LookupClient`].
///
/// Built once from the file/flag layer and handed to the client at
/// construction; nothing mutates it afterwards, so a client can be shared
/// freely across tasks.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server: ServerAddr,
    pub timeout: Duration,
    /// Additional attempts after a timed-out one.
    pub retries: u32,
    pub recursion: bool,
    pub tcp_only: bool,
    pub edns_enabled: bool,
    pub udp_payload_size: u16,
    pub dnssec_ok: bool,
    pub audit_trail: bool,
}

impl ClientConfig {
    pub fn new(server: ServerAddr) -> Self {
        Self {
            server,
            timeout: Duration::from_millis(2000),
            retries: 2,
            recursion: true,
            tcp_only: false,
            edns_enabled: true,
            udp_payload_size: 1232,
            dnssec_ok: false,
            audit_trail: false,
        }
    }

    /// Freezes a merged file/flag configuration into engine settings.
    /// Fails with [`DnsError::Config`] when no server was configured.
    pub fn from_dig_config(config: &DigConfig) -> Result<Self, DnsError> {
        let server_str = config
            .server
            .as_deref()
            .ok_or_else(|| DnsError::Config("No server configured (use -s/--server)".to_string()))?;
        let server = ServerAddr::from_str(server_str).map_err(DnsError::Config)?;

        Ok(Self {
            server,
            timeout: Duration::from_millis(config.query_timeout_ms),
            retries: config.retries,
            recursion: config.recursion,
            tcp_only: config.tcp_only,
            edns_enabled: config.edns.enabled,
            udp_payload_size: config.edns.udp_payload_size,
            dnssec_ok: config.edns.dnssec_ok,
            audit_trail: config.audit_trail,
        })
    }

    pub(crate) fn edns_params(&self) -> Option<EdnsParams> {
        self.edns_enabled.then_some(EdnsParams {
            udp_payload_size: self.udp_payload_size,
            dnssec_ok: self.dnssec_ok,
        })
    }
}
