//! Session lifecycle and transcript persistence for the MediBot backend.
//!
//! A session is one continuous chat interaction between a user and the
//! agent, scoped by a single reported symptom. The [`SessionManager`]
//! threads messages into ordered, session-scoped conversations while the
//! agent call is in flight: the user turn is written before the agent is
//! invoked and the bot turn after, which is the only mechanism behind the
//! per-session ordering guarantee.

pub mod manager;
pub mod session;
pub mod store;
pub mod transcript;

pub use manager::{intent_failed, OpenedSession, SessionManager, UserConversation};
pub use session::Session;
pub use store::{FileSessionStore, InMemorySessionStore, SessionFilter, SessionStore};
pub use transcript::{FileTranscriptStore, InMemoryTranscriptStore, TranscriptStore};
