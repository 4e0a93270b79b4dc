//! Memory Keeper Core
//!
//! Headless admin core for a personal memory-sharing gallery: an owner
//! batch-edits memories, categories, music tracks and the page title in a
//! local draft, and the session reconciles the draft against the remote
//! store — only changed records are written, creates and deletes go out
//! eagerly, and file uploads are linked to their records in two phases.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - store: Data access abstractions and implementations
//! - session: Draft/baseline reconciliation and batch persistence

pub mod domain;
pub mod session;
pub mod store;

pub use domain::{Category, DomainError, DomainResult, IconName, MediaKind, Memory, MemoryKind, Track};
pub use session::{AdminSession, Attachment, AttachmentPhase, Snapshot};
pub use store::{StoreConfig, Stores};
