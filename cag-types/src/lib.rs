//! # cag-types
//!
//! Data model shared by the context pipeline and memory fabric:
//! [`ContextMap`], [`Entity`], [`Topic`], [`MemoryItem`], [`Memory`], and
//! [`GlobalMemoryDoc`], plus the smaller value types they're built from.
//! Field-per-concept structs mirror `memory-core::MemoryEntry`'s style;
//! payload/metadata are split the way `memory::context::Context` splits
//! from `ContextMetadata`.

mod context_map;
mod entity;
mod global_memory;
mod intent;
mod language;
mod memory;
mod reference;
mod sentiment;
mod structure;
mod topic;

pub use context_map::{
    ContextMap, DocumentSummary, GlobalMemoryContext, MemoryView, MessageRole, RecentMessage, RelevantDocument,
};
pub use entity::{Entity, EntityType, Relation, RelationType, SensitivityLevel};
pub use global_memory::{DomainKnowledge, GlobalMemoryDoc, GlobalMemoryStats};
pub use intent::{Intent, IntentName};
pub use language::{Language, LanguageCode};
pub use memory::{Memory, MemoryItem};
pub use reference::{Reference, ReferenceType};
pub use sentiment::{Sentiment, SentimentLabel, SentimentStats};
pub use structure::{Complexity, MessageStructure, MessageType, QuestionType};
pub use topic::Topic;
