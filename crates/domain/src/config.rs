use crate::errors::DnsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// EDNS0 advertisement settings for outgoing queries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EdnsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Advertised maximum UDP payload size. Values below 512 are clamped
    /// up to 512 when the query is built (RFC 6891 §6.2.3).
    #[serde(default = "default_udp_payload_size")]
    pub udp_payload_size: u16,

    #[serde(default = "default_false")]
    pub dnssec_ok: bool,
}

impl Default for EdnsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            udp_payload_size: default_udp_payload_size(),
            dnssec_ok: default_false(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// File-level configuration for the dig client, loaded from TOML and then
/// overlaid with CLI flags. Everything here has a default so a config
/// file is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DigConfig {
    /// Default name server, used when `-s/--server` is not given.
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default = "default_query_timeout")]
    pub query_timeout_ms: u64,

    /// Additional attempts after the first one times out.
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_true")]
    pub recursion: bool,

    #[serde(default = "default_false")]
    pub tcp_only: bool,

    #[serde(default = "default_false")]
    pub audit_trail: bool,

    #[serde(default)]
    pub edns: EdnsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DigConfig {
    fn default() -> Self {
        Self {
            server: None,
            query_timeout_ms: default_query_timeout(),
            retries: default_retries(),
            recursion: default_true(),
            tcp_only: default_false(),
            audit_trail: default_false(),
            edns: EdnsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Values from CLI flags that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub recursion: Option<bool>,
    pub tcp_only: Option<bool>,
    pub audit_trail: Option<bool>,
    pub query_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl DigConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, DnsError> {
        toml::from_str(raw).map_err(|e| DnsError::Config(format!("Invalid config file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self, DnsError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DnsError::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(server) = &overrides.server {
            self.server = Some(server.clone());
        }
        if let Some(recursion) = overrides.recursion {
            self.recursion = recursion;
        }
        if let Some(tcp_only) = overrides.tcp_only {
            self.tcp_only = tcp_only;
        }
        if let Some(audit_trail) = overrides.audit_trail {
            self.audit_trail = audit_trail;
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.query_timeout_ms = timeout;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_udp_payload_size() -> u16 {
    1232
}

fn default_query_timeout() -> u64 {
    2000
}

fn default_retries() -> u32 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}
