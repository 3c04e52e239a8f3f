use std::fmt;
use std::time::Duration;

/// One step of a lookup: which server was tried, over what, how long it
/// took and how it ended.
#[derive(Debug, Clone)]
pub struct AuditStep {
    pub attempt: u32,
    pub server: String,
    pub protocol: &'static str,
    pub elapsed: Duration,
    pub outcome: String,
}

impl fmt::Display for AuditStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "; attempt {}: {} over {} in {}ms: {}",
            self.attempt,
            self.server,
            self.protocol,
            self.elapsed.as_millis(),
            self.outcome
        )
    }
}

/// Ordered trace of the steps a lookup took, recorded only when the
/// configuration asks for it.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    steps: Vec<AuditStep>,
    notes: Vec<String>,
}

impl AuditTrail {
    pub fn record(
        &mut self,
        attempt: u32,
        server: &str,
        protocol: &'static str,
        elapsed: Duration,
        outcome: impl Into<String>,
    ) {
        self.steps.push(AuditStep {
            attempt,
            server: server.to_string(),
            protocol,
            elapsed,
            outcome: outcome.into(),
        });
    }

    /// A free-form line, for decisions that are not tied to one attempt
    /// (e.g. "truncated, retrying over TCP").
    pub fn note(&mut self, text: impl Into<String>) {
        self.notes.push(text.into());
    }

    pub fn steps(&self) -> &[AuditStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.notes.is_empty()
    }
}

impl fmt::Display for AuditTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        for note in &self.notes {
            writeln!(f, "; {}", note)?;
        }
        Ok(())
    }
}
