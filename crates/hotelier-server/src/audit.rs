// crates/hotelier-server/src/audit.rs
// ============================================================================
// Module: Guard Audit Sinks
// Description: JSON-lines sinks for guard audit events.
// Purpose: Route every guard decision to stderr, a file, or nowhere.
// Dependencies: hotelier-config, hotelier-core, serde_json
// ============================================================================

//! ## Overview
//! Guard events are serialized as one JSON object per line. Sink failures are
//! swallowed so a broken log never changes a decision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use hotelier_config::AuditConfig;
use hotelier_config::AuditSinkKind;
use hotelier_core::GuardAuditEvent;
use hotelier_core::GuardAuditSink;
use hotelier_core::NoopGuardAuditSink;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl GuardAuditSink for StderrAuditSink {
    fn record(&self, event: &GuardAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl GuardAuditSink for FileAuditSink {
    fn record(&self, event: &GuardAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Builds the sink selected by `[audit]`.
///
/// # Errors
///
/// Returns an error when the file sink cannot open its path.
pub fn build_audit_sink(config: &AuditConfig) -> io::Result<Arc<dyn GuardAuditSink>> {
    Ok(match (config.sink, config.path.as_deref()) {
        (AuditSinkKind::Stderr, _) => Arc::new(StderrAuditSink),
        (AuditSinkKind::File, Some(path)) => Arc::new(FileAuditSink::new(path)?),
        (AuditSinkKind::File, None) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "file audit sink requires path",
            ));
        }
        (AuditSinkKind::None, _) => Arc::new(NoopGuardAuditSink),
    })
}
