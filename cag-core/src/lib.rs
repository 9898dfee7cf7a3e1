//! # cag-core
//!
//! Shared error types, configuration, tracing setup, domain ids, atomic
//! file I/O, the retry helper, and the collaborator trait boundary used by
//! every other crate in this workspace. Transport-agnostic; no crate here
//! depends on a specific storage backend or host binary.

pub mod atomic;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod ids;
pub mod logger;
pub mod retry;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use collaborators::{ConversationMessage, ConversationSnapshot, ConversationStore, Document, DocumentProcessor};
pub use config::Config;
pub use error::{Error, Result};
pub use ids::{ConversationId, UserId};
pub use logger::init_tracing;
pub use retry::retry_with_backoff;
