use clap::Parser;
use ferrous_dig_domain::{CliOverrides, RecordClass, RecordType};
use ferrous_dig_infrastructure::dns::{ClientConfig, LookupClient};
use std::net::IpAddr;
use tracing::debug;

mod bootstrap;
mod output;

#[derive(Parser)]
#[command(name = "ferrous-dig")]
#[command(version)]
#[command(about = "Ferrous Dig - DNS lookup client with a native wire codec")]
struct Cli {
    /// Name or IP address of the name server to query (IP, IP:PORT or [IPv6]:PORT)
    #[arg(short = 's', long)]
    server: Option<String>,

    /// Name of the resource record that is to be looked up
    #[arg(short = 'n', long)]
    name: String,

    /// Query type - ANY, A, MX, TXT, etc.
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "ANY")]
    query_type: RecordType,

    /// Query class, such as IN, CH or HS
    #[arg(short = 'c', long = "class", value_name = "CLASS", default_value = "IN")]
    query_class: RecordClass,

    /// Whether the server should do a recursive lookup
    #[arg(short = 'r', long = "recursive", value_name = "BOOL")]
    recursive: Option<bool>,

    /// Use TCP only; UDP is skipped entirely (AXFR forces this)
    #[arg(long)]
    tcp: bool,

    /// Record a full audit trail of the attempts taken
    #[arg(long = "audittrail")]
    audit_trail: bool,

    /// Query timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

/// A PTR query for an IP literal is rewritten to its reverse-mapping
/// name; anything else is queried verbatim.
fn effective_qname(name: &str, rtype: RecordType) -> String {
    if rtype != RecordType::PTR {
        return name.to_string();
    }
    match name.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            let o = v4.octets();
            format!("{}.{}.{}.{}.in-addr.arpa", o[3], o[2], o[1], o[0])
        }
        Ok(IpAddr::V6(v6)) => {
            let mut nibbles = Vec::with_capacity(32);
            for byte in v6.octets().iter().rev() {
                nibbles.push(format!("{:x}", byte & 0x0F));
                nibbles.push(format!("{:x}", byte >> 4));
            }
            format!("{}.ip6.arpa", nibbles.join("."))
        }
        Err(_) => name.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        server: cli.server.clone(),
        recursion: cli.recursive,
        tcp_only: cli.tcp.then_some(true),
        audit_trail: cli.audit_trail.then_some(true),
        query_timeout_ms: cli.timeout,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    let client_config = ClientConfig::from_dig_config(&config)?;
    let client = LookupClient::new(client_config);

    let qname = effective_qname(&cli.name, cli.query_type);
    if qname != cli.name {
        debug!(original = %cli.name, rewritten = %qname, "PTR target rewritten to reverse-mapping name");
    }
    let result = client.lookup(&qname, cli.query_type, cli.query_class).await?;

    output::print_result(&result);
    Ok(())
}
