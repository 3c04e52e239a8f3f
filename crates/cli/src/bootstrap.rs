use ferrous_dig_domain::{CliOverrides, DigConfig, DnsError};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Loads the TOML config (defaults when no file is given) and overlays
/// the CLI flags on top.
pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> Result<DigConfig, DnsError> {
    let mut config = match path {
        Some(p) => DigConfig::load(Path::new(p))?,
        None => DigConfig::default(),
    };
    config.apply_overrides(&overrides);
    Ok(config)
}

/// Logs go to stderr so the rendered lookup result owns stdout.
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(config: &DigConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
