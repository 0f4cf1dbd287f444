//! Fire-and-forget audit trail.
//!
//! Audit events are plain `tracing` events on a dedicated target so the
//! subscriber decides where they end up.

use tracing::info;

pub const AUDIT_TARGET: &str = "portwatch::audit";

/// Records one audit event.
pub fn record<S: AsRef<str>>(event: S) {
    info!(target: AUDIT_TARGET, "{}", event.as_ref());
}
