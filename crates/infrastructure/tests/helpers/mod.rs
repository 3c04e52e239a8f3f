#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// How the mock UDP server treats incoming queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdpMode {
    /// Answer with one A record.
    Answer,
    /// Answer with an empty, TC=1 response so the client falls back to TCP.
    Truncated,
    /// Swallow queries so the client times out.
    Silent,
}

/// Walks the question section of a query (queries never use compression)
/// and returns the offset just past QCLASS.
fn question_end(query: &[u8]) -> usize {
    let mut pos = 12;
    while pos < query.len() {
        let len = query[pos] as usize;
        pos += 1;
        if len == 0 {
            break;
        }
        pos += len;
    }
    pos + 4
}

/// Minimal response builder: echoes the header id and question, then
/// appends a single A record (via a compression pointer to the qname)
/// unless `truncated`.
fn build_a_response(query: &[u8], truncated: bool) -> Vec<u8> {
    if query.len() < 12 {
        return vec![];
    }
    let q_end = question_end(query).min(query.len());

    let mut response = Vec::with_capacity(q_end + 16);
    response.extend_from_slice(&query[0..2]);

    // QR + RD + RA, plus TC when asked for
    let flags: u16 = if truncated { 0x8380 } else { 0x8180 };
    response.extend_from_slice(&flags.to_be_bytes());

    response.extend_from_slice(&[0x00, 0x01]); // QDCOUNT
    let ancount: u16 = if truncated { 0 } else { 1 };
    response.extend_from_slice(&ancount.to_be_bytes());
    response.extend_from_slice(&[0x00, 0x00]); // NSCOUNT
    response.extend_from_slice(&[0x00, 0x00]); // ARCOUNT

    response.extend_from_slice(&query[12..q_end]);

    if !truncated {
        response.extend_from_slice(&[
            0xC0, 0x0C, // NAME: pointer to qname
            0x00, 0x01, // TYPE A
            0x00, 0x01, // CLASS IN
            0x00, 0x00, 0x00, 0x3C, // TTL 60
            0x00, 0x04, // RDLENGTH
            93, 184, 216, 34,
        ]);
    }

    response
}

pub struct MockUdpServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    queries_seen: Arc<AtomicUsize>,
}

impl MockUdpServer {
    pub async fn start(mode: UdpMode) -> std::io::Result<(Self, SocketAddr)> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        Self::start_on(socket, mode).await
    }

    /// Binds on a caller-chosen port, for tests that pair a UDP and a TCP
    /// mock on the same address.
    pub async fn start_at(addr: SocketAddr, mode: UdpMode) -> std::io::Result<(Self, SocketAddr)> {
        let socket = UdpSocket::bind(addr).await?;
        Self::start_on(socket, mode).await
    }

    async fn start_on(socket: UdpSocket, mode: UdpMode) -> std::io::Result<(Self, SocketAddr)> {
        let local_addr = socket.local_addr()?;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let queries_seen = Arc::new(AtomicUsize::new(0));
        let counter = queries_seen.clone();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 1500];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);
                            match mode {
                                UdpMode::Silent => {}
                                UdpMode::Answer => {
                                    let response = build_a_response(&buf[..len], false);
                                    let _ = socket.send_to(&response, peer).await;
                                }
                                UdpMode::Truncated => {
                                    let response = build_a_response(&buf[..len], true);
                                    let _ = socket.send_to(&response, peer).await;
                                }
                            }
                        }
                    }
                }
            }
        });

        Ok((
            Self {
                addr: local_addr,
                shutdown_tx: Some(shutdown_tx),
                queries_seen,
            },
            local_addr,
        ))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries_seen(&self) -> usize {
        self.queries_seen.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockUdpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub struct MockTcpServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    queries_seen: Arc<AtomicUsize>,
}

impl MockTcpServer {
    pub async fn start() -> std::io::Result<(Self, SocketAddr)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Self::start_on(listener).await
    }

    pub async fn start_at(addr: SocketAddr) -> std::io::Result<(Self, SocketAddr)> {
        let listener = TcpListener::bind(addr).await?;
        Self::start_on(listener).await
    }

    async fn start_on(listener: TcpListener) -> std::io::Result<(Self, SocketAddr)> {
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let queries_seen = Arc::new(AtomicUsize::new(0));
        let counter = queries_seen.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        if let Ok((mut stream, _)) = result {
                            counter.fetch_add(1, Ordering::SeqCst);

                            let mut len_buf = [0u8; 2];
                            if stream.read_exact(&mut len_buf).await.is_err() {
                                continue;
                            }
                            let query_len = u16::from_be_bytes(len_buf) as usize;
                            let mut query = vec![0u8; query_len];
                            if stream.read_exact(&mut query).await.is_err() {
                                continue;
                            }

                            let response = build_a_response(&query, false);
                            let mut framed =
                                Vec::with_capacity(2 + response.len());
                            framed.extend_from_slice(
                                &(response.len() as u16).to_be_bytes(),
                            );
                            framed.extend_from_slice(&response);

                            // Dribble the frame out in tiny chunks so the
                            // client has to reassemble across reads.
                            for chunk in framed.chunks(3) {
                                if stream.write_all(chunk).await.is_err() {
                                    break;
                                }
                                let _ = stream.flush().await;
                                tokio::time::sleep(Duration::from_millis(1)).await;
                            }
                        }
                    }
                }
            }
        });

        Ok((
            Self {
                addr: local_addr,
                shutdown_tx: Some(shutdown_tx),
                queries_seen,
            },
            local_addr,
        ))
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries_seen(&self) -> usize {
        self.queries_seen.load(Ordering::SeqCst)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockTcpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
