use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// One EDNS option from an OPT record's RDATA: a code plus opaque bytes
/// (RFC 6891 §6.1.2). Options this client does not understand are kept
/// verbatim so callers can still inspect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

/// Decoded EDNS0 OPT pseudo-record fields (RFC 6891 §6.1.3): the CLASS
/// field carries the requestor's UDP payload size and the TTL field is
/// reinterpreted as extended RCODE / version / flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptData {
    pub udp_payload_size: u16,
    pub extended_rcode: u8,
    pub version: u8,
    pub dnssec_ok: bool,
    /// The remaining 15 flag bits after DO, kept for round-tripping.
    pub flags: u16,
    pub options: Vec<EdnsOption>,
}

/// Type-specific decoded payload of a resource record.
///
/// Unregistered types land in `Unknown` with their raw bytes; an unknown
/// type never fails the decode of the rest of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(String),
    Cname(String),
    Ptr(String),
    Soa {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Mx {
        preference: u16,
        exchange: String,
    },
    Txt(Vec<String>),
    Hinfo {
        cpu: String,
        os: String,
    },
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    Naptr {
        order: u16,
        preference: u16,
        flags: String,
        services: String,
        regexp: String,
        replacement: String,
    },
    Opt(OptData),
    Unknown {
        rr_type: u16,
        bytes: Vec<u8>,
    },
}

fn fqdn(name: &str) -> String {
    format!("{}.", name.trim_end_matches('.'))
}

impl fmt::Display for RData {
    /// Zone-file presentation format, matching what dig prints.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{}", addr),
            RData::Aaaa(addr) => write!(f, "{}", addr),
            RData::Ns(name) => write!(f, "{}", fqdn(name)),
            RData::Cname(name) => write!(f, "{}", fqdn(name)),
            RData::Ptr(name) => write!(f, "{}", fqdn(name)),
            RData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                fqdn(mname),
                fqdn(rname),
                serial,
                refresh,
                retry,
                expire,
                minimum
            ),
            RData::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, fqdn(exchange)),
            RData::Txt(strings) => {
                let mut first = true;
                for s in strings {
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    write!(f, "\"{}\"", s)?;
                }
                Ok(())
            }
            RData::Hinfo { cpu, os } => write!(f, "\"{}\" \"{}\"", cpu, os),
            RData::Srv {
                priority,
                weight,
                port,
                target,
            } => write!(f, "{} {} {} {}", priority, weight, port, fqdn(target)),
            RData::Naptr {
                order,
                preference,
                flags,
                services,
                regexp,
                replacement,
            } => write!(
                f,
                "{} {} \"{}\" \"{}\" \"{}\" {}",
                order,
                preference,
                flags,
                services,
                regexp,
                fqdn(replacement)
            ),
            RData::Opt(opt) => write!(
                f,
                "; EDNS: version: {}, flags:{}; udp: {}",
                opt.version,
                if opt.dnssec_ok { " do" } else { "" },
                opt.udp_payload_size
            ),
            RData::Unknown { bytes, .. } => {
                // RFC 3597 generic encoding: \# <length> <hex>
                write!(f, "\\# {}", bytes.len())?;
                if !bytes.is_empty() {
                    write!(f, " ")?;
                    for b in bytes {
                        write!(f, "{:02x}", b)?;
                    }
                }
                Ok(())
            }
        }
    }
}
