//! # RoboTutor Core
//!
//! Domain types, traits, and error definitions for the RoboTutor relay.
//! This crate has **no web or HTTP dependencies**: it defines the domain
//! model that all other crates implement against.
//!
//! The two seams are traits: [`Provider`] for the external completion API
//! and [`SessionStore`] for per-session conversation state. Implementations
//! live in their own crates so tests can swap in mocks.

pub mod document;
pub mod error;
pub mod level;
pub mod message;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use document::Document;
pub use error::{Error, ProviderError, Result};
pub use level::{Level, describe_prompt};
pub use message::{Content, ContentPart, FileAttachment, Message, Role};
pub use provider::{Completion, CompletionRequest, Provider, Usage};
pub use session::{Exchange, SessionRecord, SessionStore};
