//! Security Audit Logging
//!
//! Records every privileged decision taken by the registry and the gate:
//! - Account registrations (accepted or rejected)
//! - Authorization failures on votes
//! - Votes cast in a round
//! - Commits of the operational flag

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::types::account::Account;

/// Audit event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuditSeverity {
    /// Informational - normal operation
    Info,
    /// Warning - rejected call
    Warning,
    /// Critical - breaker state changed
    Critical,
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditSeverity::Info => write!(f, "INFO"),
            AuditSeverity::Warning => write!(f, "WARN"),
            AuditSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Audit event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditCategory {
    /// Profile creation
    Registration,
    /// Privilege checks that failed
    Authorization,
    /// Votes counted in a round
    Vote,
    /// Operational flag changes
    Commit,
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditCategory::Registration => write!(f, "REGISTER"),
            AuditCategory::Authorization => write!(f, "AUTHZ"),
            AuditCategory::Vote => write!(f, "VOTE"),
            AuditCategory::Commit => write!(f, "COMMIT"),
        }
    }
}

/// Audit outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// Audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub event_id: String,

    /// Timestamp (Unix millis)
    pub timestamp: i64,

    /// Event severity
    pub severity: AuditSeverity,

    /// Event category
    pub category: AuditCategory,

    /// Event action (e.g., "register", "new_round", "commit")
    pub action: String,

    /// Outcome (success/failure)
    pub outcome: AuditOutcome,

    /// Account that performed the call
    pub actor: Option<Account>,

    /// Account the call acted upon
    pub target: Option<Account>,

    /// Additional details
    pub details: HashMap<String, String>,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(category: AuditCategory, action: &str, outcome: AuditOutcome) -> Self {
        Self {
            event_id: uuid::Uuid::now_v7().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            severity: match outcome {
                AuditOutcome::Success => AuditSeverity::Info,
                AuditOutcome::Failure => AuditSeverity::Warning,
            },
            category,
            action: action.to_string(),
            outcome,
            actor: None,
            target: None,
            details: HashMap::new(),
        }
    }

    /// Set severity
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Set actor
    pub fn with_actor(mut self, actor: Account) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set target
    pub fn with_target(mut self, target: Account) -> Self {
        self.target = Some(target);
        self
    }

    /// Add detail
    pub fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

/// Audit log sink
pub trait AuditSink: Send + Sync {
    /// Write an audit event
    fn write(&self, event: &AuditEvent);

    /// Flush pending events
    fn flush(&self);
}

/// Sink that forwards events to `tracing`
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, event: &AuditEvent) {
        let actor = event.actor.map(|a| a.to_string());
        let target = event.target.map(|a| a.to_string());

        match event.severity {
            AuditSeverity::Info => info!(
                category = %event.category,
                action = %event.action,
                event_id = %event.event_id,
                actor = actor.as_deref().unwrap_or("-"),
                target = target.as_deref().unwrap_or("-"),
                "audit"
            ),
            AuditSeverity::Warning => warn!(
                category = %event.category,
                action = %event.action,
                event_id = %event.event_id,
                actor = actor.as_deref().unwrap_or("-"),
                target = target.as_deref().unwrap_or("-"),
                details = ?event.details,
                "audit"
            ),
            AuditSeverity::Critical => error!(
                category = %event.category,
                action = %event.action,
                event_id = %event.event_id,
                actor = actor.as_deref().unwrap_or("-"),
                details = ?event.details,
                "audit: breaker state changed"
            ),
        }
    }

    fn flush(&self) {
        // Tracing output is immediate
    }
}

/// In-memory sink retaining every event, for inspection and export
#[derive(Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<RwLock<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all retained events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Retained events of one category
    pub fn by_category(&self, category: AuditCategory) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn write(&self, event: &AuditEvent) {
        self.events.write().push(event.clone());
    }

    fn flush(&self) {}
}

/// Audit logger
pub struct AuditLogger {
    sinks: Vec<Box<dyn AuditSink>>,
    /// Minimum severity to log
    min_severity: AuditSeverity,
}

impl AuditLogger {
    /// Create a new audit logger writing through `tracing`
    pub fn new() -> Self {
        Self {
            sinks: vec![Box::new(TracingAuditSink)],
            min_severity: AuditSeverity::Info,
        }
    }

    /// Create a logger with no sinks
    pub fn silent() -> Self {
        Self {
            sinks: Vec::new(),
            min_severity: AuditSeverity::Info,
        }
    }

    /// Add a sink
    pub fn add_sink(&mut self, sink: Box<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    /// Builder-style variant of [`AuditLogger::add_sink`]
    pub fn with_sink(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.add_sink(sink);
        self
    }

    /// Set minimum severity
    pub fn set_min_severity(&mut self, severity: AuditSeverity) {
        self.min_severity = severity;
    }

    /// Log an audit event
    pub fn log(&self, event: AuditEvent) {
        if event.severity < self.min_severity {
            return;
        }

        for sink in &self.sinks {
            sink.write(&event);
        }
    }

    /// Log a registration attempt
    pub fn log_registration(
        &self,
        caller: Account,
        target: Account,
        as_admin: bool,
        rejection: Option<&str>,
    ) {
        let outcome = if rejection.is_none() {
            AuditOutcome::Success
        } else {
            AuditOutcome::Failure
        };

        let mut event = AuditEvent::new(AuditCategory::Registration, "register", outcome)
            .with_actor(caller)
            .with_target(target)
            .with_detail("as_admin", as_admin);

        if let Some(reason) = rejection {
            event = event.with_detail("reason", reason);
        }

        self.log(event);
    }

    /// Log a vote rejected because the caller is not an admin
    pub fn log_unauthorized_vote(&self, caller: Account, target_value: bool) {
        let event = AuditEvent::new(AuditCategory::Authorization, "vote", AuditOutcome::Failure)
            .with_actor(caller)
            .with_detail("target_value", target_value);

        self.log(event);
    }

    /// Log a vote counted (or ignored as duplicate) in the current round
    pub fn log_vote(
        &self,
        caller: Account,
        action: &str,
        target_value: bool,
        votes: usize,
        threshold: usize,
    ) {
        let event = AuditEvent::new(AuditCategory::Vote, action, AuditOutcome::Success)
            .with_actor(caller)
            .with_detail("target_value", target_value)
            .with_detail("votes", votes)
            .with_detail("threshold", threshold);

        self.log(event);
    }

    /// Log a commit of the operational flag
    pub fn log_commit(&self, caller: Account, previous: bool, committed: bool, quorum: usize) {
        let event = AuditEvent::new(AuditCategory::Commit, "commit", AuditOutcome::Success)
            .with_severity(AuditSeverity::Critical)
            .with_actor(caller)
            .with_detail("previous", previous)
            .with_detail("operational", committed)
            .with_detail("quorum", quorum);

        self.log(event);
    }

    /// Flush all sinks
    pub fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}
