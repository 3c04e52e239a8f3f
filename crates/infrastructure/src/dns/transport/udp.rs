//! UDP transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is, no framing. Responses are limited to 512
//! bytes unless the query advertised a larger EDNS(0) payload size.
//! If the response has the TC (truncated) bit set, the caller should
//! retry via TCP.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_dig_domain::{DnsError, ServerAddr};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Smallest receive buffer: the classic pre-EDNS message limit.
const MIN_UDP_RESPONSE_SIZE: u16 = 512;

pub struct UdpTransport {
    server: ServerAddr,
    recv_buf_size: u16,
}

impl UdpTransport {
    pub fn new(server: ServerAddr, recv_buf_size: u16) -> Self {
        Self {
            server,
            recv_buf_size: recv_buf_size.max(MIN_UDP_RESPONSE_SIZE),
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError> {
        let server_addr = self.server.socket_addr();

        // Bind to ephemeral port (0 = OS assigns), family matched to the server
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(bind_addr).await.map_err(|e| DnsError::Transport {
            server: self.server.to_string(),
            protocol: "UDP",
            reason: format!("failed to bind socket: {}", e),
        })?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send_to(message_bytes, server_addr))
            .await
            .map_err(|_| DnsError::TransportTimeout {
                server: self.server.to_string(),
                protocol: "UDP",
            })?
            .map_err(|e| DnsError::Transport {
                server: self.server.to_string(),
                protocol: "UDP",
                reason: format!("failed to send query: {}", e),
            })?;

        debug!(
            server = %server_addr,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; self.recv_buf_size as usize];

        let (bytes_received, from_addr) =
            tokio::time::timeout(timeout, socket.recv_from(&mut recv_buf))
                .await
                .map_err(|_| DnsError::TransportTimeout {
                    server: self.server.to_string(),
                    protocol: "UDP",
                })?
                .map_err(|e| DnsError::Transport {
                    server: self.server.to_string(),
                    protocol: "UDP",
                    reason: format!("failed to receive response: {}", e),
                })?;

        if from_addr.ip() != server_addr.ip() {
            warn!(
                expected = %server_addr,
                received_from = %from_addr,
                "UDP response from unexpected source"
            );
        }

        recv_buf.truncate(bytes_received);

        debug!(
            server = %server_addr,
            bytes_received = bytes_received,
            "UDP response received"
        );

        Ok(TransportResponse {
            bytes: Bytes::from(recv_buf),
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn transport_creation() {
        let server = ServerAddr::from_str("8.8.8.8:53").unwrap();
        let transport = UdpTransport::new(server, 1232);
        assert_eq!(transport.protocol_name(), "UDP");
        assert_eq!(transport.recv_buf_size, 1232);
    }

    #[test]
    fn receive_buffer_never_below_512() {
        let server = ServerAddr::from_str("8.8.8.8").unwrap();
        let transport = UdpTransport::new(server, 0);
        assert_eq!(transport.recv_buf_size, 512);
    }

    #[test]
    fn transport_creation_ipv6() {
        let server = ServerAddr::from_str("[2001:4860:4860::8888]:53").unwrap();
        let transport = UdpTransport::new(server, 1232);
        assert_eq!(transport.server.port(), 53);
    }
}
