pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_dig_domain::{DnsError, ServerAddr};
use std::time::Duration;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Bytes,

    pub protocol_used: &'static str,
}

/// One round over a single connection: send the encoded query, return the
/// encoded response. No retries, no truncation handling — that is lookup
/// engine policy, not transport policy.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError>;

    fn protocol_name(&self) -> &'static str;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
        }
    }
}

/// `recv_buf_size` bounds the UDP receive buffer; pass the EDNS payload
/// size advertised in the query (ignored for TCP).
pub fn create_transport(server: ServerAddr, use_tcp: bool, recv_buf_size: u16) -> Transport {
    if use_tcp {
        Transport::Tcp(tcp::TcpTransport::new(server))
    } else {
        Transport::Udp(udp::UdpTransport::new(server, recv_buf_size))
    }
}
