//! Security module - audit trail for privileged operations

pub mod audit;

pub use audit::{
    AuditCategory, AuditEvent, AuditLogger, AuditOutcome, AuditSeverity, AuditSink,
    MemoryAuditSink, TracingAuditSink,
};
