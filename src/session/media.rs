//! Media Attachment
//!
//! Transient state carried while a file upload is bound to its owning
//! record. An attachment starts out `Created` on a record that already
//! exists with a placeholder reference, moves to `Uploading` when the bytes
//! go out, and ends `Linked` once the public reference is patched onto the
//! record, or `Failed` if either step rejects. Failed and Linked are
//! terminal; there is no automatic retry.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult, MediaKind};

/// Lifecycle phase of one attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentPhase {
    Created,
    Uploading,
    Linked,
    Failed,
}

/// One in-flight binding of an uploaded file to a record
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Id of the record the upload attaches to
    pub target_id: i64,
    /// Which bucket the binary belongs in
    pub kind: MediaKind,
    phase: AttachmentPhase,
    url: Option<String>,
}

impl Attachment {
    pub fn new(target_id: i64, kind: MediaKind) -> Self {
        Self {
            target_id,
            kind,
            phase: AttachmentPhase::Created,
            url: None,
        }
    }

    pub fn phase(&self) -> AttachmentPhase {
        self.phase
    }

    /// Public reference, present once linked
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Created -> Uploading
    pub fn begin_upload(&mut self) -> DomainResult<()> {
        if self.phase != AttachmentPhase::Created {
            return Err(DomainError::Conflict(format!(
                "attachment for {} is not awaiting upload",
                self.target_id
            )));
        }
        self.phase = AttachmentPhase::Uploading;
        Ok(())
    }

    /// Uploading -> Linked
    pub fn link(&mut self, url: String) -> DomainResult<()> {
        if self.phase != AttachmentPhase::Uploading {
            return Err(DomainError::Conflict(format!(
                "attachment for {} has no upload in flight",
                self.target_id
            )));
        }
        self.phase = AttachmentPhase::Linked;
        self.url = Some(url);
        Ok(())
    }

    /// Uploading -> Failed
    pub fn fail(&mut self) {
        if self.phase == AttachmentPhase::Uploading {
            self.phase = AttachmentPhase::Failed;
        }
    }
}
