//! Lookup engine: builds the query, drives the transport with the retry
//! and truncation policy, and decodes the response.
//!
//! Each call walks one query through Built -> Sent -> Received/Decoded,
//! with TimedOut feeding the retry budget and TransportFailed surfacing
//! immediately. A truncated UDP answer triggers exactly one automatic
//! retry over TCP.

use super::{AuditTrail, ClientConfig};
use crate::dns::codec;
use crate::dns::transport::create_transport;
use ferrous_dig_domain::{
    DnsError, Header, Message, Question, RecordClass, RecordType, ResourceRecord,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct LookupClient {
    config: ClientConfig,
}

/// Outcome of a successful lookup: the decoded message plus where it came
/// from, how, and how long it took.
#[derive(Debug)]
pub struct LookupResult {
    pub message: Message,
    pub server: String,
    pub protocol: &'static str,
    pub elapsed: Duration,
    pub audit: Option<AuditTrail>,
}

impl LookupResult {
    pub fn header(&self) -> &Header {
        &self.message.header
    }

    pub fn questions(&self) -> &[Question] {
        &self.message.questions
    }

    pub fn answers(&self) -> &[ResourceRecord] {
        &self.message.answers
    }

    pub fn authorities(&self) -> &[ResourceRecord] {
        &self.message.authorities
    }

    pub fn additionals(&self) -> &[ResourceRecord] {
        &self.message.additionals
    }

    /// The EDNS OPT pseudo-record from the additional section, if present.
    pub fn opt(&self) -> Option<&ResourceRecord> {
        self.message.opt()
    }
}

impl LookupClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves one question against the configured server.
    ///
    /// UDP is tried first unless the configuration says `tcp_only` or the
    /// type demands TCP (AXFR). Timeouts consume the retry budget; any
    /// other transport or decode error propagates unchanged.
    pub async fn lookup(
        &self,
        name: &str,
        rtype: RecordType,
        rclass: RecordClass,
    ) -> Result<LookupResult, DnsError> {
        let id = fastrand::u16(..);
        let query_bytes = codec::encode_query(
            name,
            rtype,
            rclass,
            id,
            self.config.recursion,
            self.config.edns_params(),
        )?;

        let started = Instant::now();
        let mut audit = self.config.audit_trail.then(AuditTrail::default);
        let tcp_first = self.config.tcp_only || rtype.requires_tcp();

        debug!(
            name = %name,
            rtype = %rtype,
            rclass = %rclass,
            server = %self.config.server,
            id = id,
            "lookup started"
        );

        let (message, protocol) = {
            let (message, protocol) = self
                .exchange(&query_bytes, id, tcp_first, audit.as_mut())
                .await?;

            if message.is_truncated() && protocol == "UDP" {
                info!(server = %self.config.server, "UDP response truncated, retrying over TCP");
                if let Some(trail) = audit.as_mut() {
                    trail.note("response truncated (TC=1), retrying over TCP");
                }
                self.exchange(&query_bytes, id, true, audit.as_mut())
                    .await?
            } else {
                (message, protocol)
            }
        };

        let elapsed = started.elapsed();
        debug!(
            server = %self.config.server,
            protocol = protocol,
            answers = message.answers.len(),
            status = %message.rcode(),
            elapsed_ms = elapsed.as_millis() as u64,
            "lookup finished"
        );

        Ok(LookupResult {
            message,
            server: self.config.server.to_string(),
            protocol,
            elapsed,
            audit,
        })
    }

    /// Runs the attempt loop over one transport. Returns the decoded
    /// message or, once the retry budget is spent on timeouts, the
    /// terminal [`DnsError::ResolutionFailed`].
    async fn exchange(
        &self,
        query_bytes: &[u8],
        id: u16,
        use_tcp: bool,
        mut audit: Option<&mut AuditTrail>,
    ) -> Result<(Message, &'static str), DnsError> {
        let transport = create_transport(self.config.server, use_tcp, self.config.udp_payload_size);
        let protocol = transport.protocol_name();
        let server = self.config.server.to_string();
        let attempts = self.config.retries.saturating_add(1);

        for attempt in 1..=attempts {
            let attempt_started = Instant::now();
            match transport.send(query_bytes, self.config.timeout).await {
                Ok(response) => {
                    let message = match codec::decode_message(&response.bytes) {
                        Ok(message) => message,
                        Err(e) => {
                            if let Some(trail) = audit.as_deref_mut() {
                                trail.record(
                                    attempt,
                                    &server,
                                    protocol,
                                    attempt_started.elapsed(),
                                    format!("received {} bytes, {}", response.bytes.len(), e),
                                );
                            }
                            return Err(e);
                        }
                    };

                    if message.header.id != id {
                        if let Some(trail) = audit.as_deref_mut() {
                            trail.record(
                                attempt,
                                &server,
                                protocol,
                                attempt_started.elapsed(),
                                "response id mismatch",
                            );
                        }
                        return Err(DnsError::MalformedMessage(format!(
                            "response id {:#06x} does not match query id {:#06x}",
                            message.header.id, id
                        )));
                    }

                    if let Some(trail) = audit.as_deref_mut() {
                        trail.record(
                            attempt,
                            &server,
                            protocol,
                            attempt_started.elapsed(),
                            format!(
                                "{} ({} bytes, {} answers)",
                                message.rcode(),
                                response.bytes.len(),
                                message.answers.len()
                            ),
                        );
                    }
                    return Ok((message, protocol));
                }
                Err(e) if e.is_timeout() => {
                    warn!(
                        server = %server,
                        protocol = protocol,
                        attempt = attempt,
                        attempts = attempts,
                        "query attempt timed out"
                    );
                    if let Some(trail) = audit.as_deref_mut() {
                        trail.record(
                            attempt,
                            &server,
                            protocol,
                            attempt_started.elapsed(),
                            "timed out",
                        );
                    }
                }
                Err(e) => {
                    if let Some(trail) = audit.as_deref_mut() {
                        trail.record(
                            attempt,
                            &server,
                            protocol,
                            attempt_started.elapsed(),
                            format!("transport failed: {}", e),
                        );
                    }
                    return Err(e);
                }
            }
        }

        Err(DnsError::ResolutionFailed {
            server,
            protocol,
            attempts,
            reason: format!(
                "no response within {}ms on any attempt",
                self.config.timeout.as_millis()
            ),
        })
    }
}
