//! Core types and error definitions for the MediBot backend.
//!
//! This crate provides the foundational types shared across all MediBot
//! crates: the unified error enum, the message model, and the role
//! enumeration used throughout transcripts.
//!
//! # Main types
//!
//! - [`MediError`] — Unified error enum for all MediBot subsystems.
//! - [`MediResult`] — Convenience alias for `Result<T, MediError>`.
//! - [`Role`] — Message author (user or bot).
//! - [`Message`] — A single message within a consultation session.

pub mod message;

pub use message::{Message, Role};

/// Top-level error type for the MediBot backend.
///
/// The first four variants map directly onto how the HTTP layer reports
/// failures: validation problems are the caller's fault, not-found is a
/// "no results" condition rather than a fault, and upstream/store errors
/// are internal and surfaced generically.
#[derive(Debug, thiserror::Error)]
pub enum MediError {
    /// Missing or out-of-range caller input. Never retried, reported verbatim.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A queried entity or day bucket does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote conversational agent call failed at the transport level.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The persistent store failed to read or write a document.
    #[error("Store error: {0}")]
    Store(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediError {
    /// Whether this error should be reported to the caller verbatim.
    ///
    /// Upstream and store failures are logged in full but surfaced as a
    /// generic internal error; validation and not-found pass through.
    pub fn is_reportable(&self) -> bool {
        matches!(self, MediError::Validation(_) | MediError::NotFound(_))
    }
}

/// A convenience `Result` alias using [`MediError`].
pub type MediResult<T> = Result<T, MediError>;
