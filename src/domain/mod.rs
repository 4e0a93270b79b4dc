//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has no external dependencies beyond serde, chrono and uuid.

mod category;
mod entity;
mod memory;
mod track;

pub use category::{Category, IconName};
pub use entity::{DomainError, DomainResult, Entity};
pub use memory::{MediaKind, Memory, MemoryKind};
pub use track::Track;
