//! Session Layer
//!
//! Draft/baseline reconciliation for one owner's editing session: the diff
//! engine, the batched save coordinator and the media attachment workflow.

mod admin;
pub mod diff;
mod media;
mod snapshot;

#[cfg(test)]
mod tests;

pub use admin::AdminSession;
pub use media::{Attachment, AttachmentPhase};
pub use snapshot::Snapshot;
