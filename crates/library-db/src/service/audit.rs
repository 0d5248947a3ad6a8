//! Audit hook for author email changes.

use std::fmt::Debug;

use tracing::info;

/// Receives audit events from [`AuthorService`](super::author::AuthorService).
///
/// Called after the write has committed, and only when the email actually
/// changed.
pub trait AuditSink: Send + Sync + Debug {
    fn email_changed(&self, author_name: &str, new_email: &str);
}

/// Writes audit events to the `audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn email_changed(&self, author_name: &str, new_email: &str) {
        info!(
            target: "audit",
            author = %author_name,
            email = %new_email,
            "Author email updated"
        );
    }
}
