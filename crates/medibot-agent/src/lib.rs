//! Agent Gateway: adapts one outbound user message into a call to the
//! remote conversational agent and assembles the streamed byte-chunk
//! fragments into a single reply string.
//!
//! The remote agent is opaque: it accepts `(agentId, sessionId, inputText)`
//! and answers with a finite, non-restartable stream of chunk events. An
//! empty stream is not an error — the gateway substitutes a fixed fallback
//! reply instead of failing the surrounding turn.

pub mod client;
pub mod config;
pub mod stream;

pub use client::{AgentClient, HttpAgentClient};
pub use config::AgentConfig;
pub use stream::{ChunkEvent, NO_CONTENT_REPLY};
