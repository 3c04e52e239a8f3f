//! TCP transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Each message is framed with a 2-byte big-endian length prefix. One
//! fresh connection per call; the response body is read with `read_exact`,
//! so fragmented delivery across multiple segments reassembles correctly.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_dig_domain::{DnsError, ServerAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpTransport {
    server: ServerAddr,
}

impl TcpTransport {
    pub fn new(server: ServerAddr) -> Self {
        Self { server }
    }

    fn timeout_error(&self) -> DnsError {
        DnsError::TransportTimeout {
            server: self.server.to_string(),
            protocol: "TCP",
        }
    }

    fn transport_error(&self, reason: String) -> DnsError {
        DnsError::Transport {
            server: self.server.to_string(),
            protocol: "TCP",
            reason,
        }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError> {
        let server_addr = self.server.socket_addr();

        let mut stream = tokio::time::timeout(timeout, TcpStream::connect(server_addr))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.transport_error(format!("connection failed: {}", e)))?;

        stream
            .set_nodelay(true)
            .map_err(|e| self.transport_error(format!("failed to set TCP_NODELAY: {}", e)))?;

        tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.transport_error(format!("failed to send query: {}", e)))?;

        debug!(
            server = %server_addr,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response_bytes = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| self.transport_error(format!("failed to read response: {}", e)))?;

        debug!(
            server = %server_addr,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: Bytes::from(response_bytes),
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), std::io::Error>
where
    S: AsyncWriteExt + Unpin,
{
    let length = message_bytes.len() as u16;
    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await?;
    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, std::io::Error>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len > MAX_TCP_MESSAGE_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "response of {} bytes exceeds maximum {}",
                response_len, MAX_TCP_MESSAGE_SIZE
            ),
        ));
    }

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn transport_creation() {
        let server = ServerAddr::from_str("8.8.8.8:53").unwrap();
        let transport = TcpTransport::new(server);
        assert_eq!(transport.protocol_name(), "TCP");
    }

    #[test]
    fn length_prefix_encoding() {
        let len: u16 = 300;
        let bytes = len.to_be_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 44);
        assert_eq!(u16::from_be_bytes(bytes), 300);
    }

    #[tokio::test]
    async fn framed_write_then_read_round_trips() {
        let message = b"\x12\x34\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00";

        let mut writer = std::io::Cursor::new(Vec::new());
        send_with_length_prefix(&mut writer, &message[..])
            .await
            .unwrap();
        let framed = writer.into_inner();
        assert_eq!(framed.len(), 2 + message.len());

        let mut reader = std::io::Cursor::new(framed);
        let body = read_with_length_prefix(&mut reader).await.unwrap();
        assert_eq!(body, message);
    }
}
