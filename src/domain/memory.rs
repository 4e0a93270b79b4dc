//! Memory Entity
//!
//! A single gallery entry: an image or a video with a caption, a date and an
//! optional category reference.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::Entity;

/// What a memory record holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    #[default]
    Image,
    Video,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Image => "image",
            MemoryKind::Video => "video",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "video" => MemoryKind::Video,
            _ => MemoryKind::Image,
        }
    }
}

/// Kind of binary a media attachment carries, which also selects the
/// storage bucket an upload lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Storage bucket for this kind of binary
    pub fn bucket(&self) -> &'static str {
        match self {
            MediaKind::Image => "memories_photo",
            MediaKind::Video => "memories_video",
            MediaKind::Audio => "music",
        }
    }
}

impl From<MemoryKind> for MediaKind {
    fn from(kind: MemoryKind) -> Self {
        match kind {
            MemoryKind::Image => MediaKind::Image,
            MemoryKind::Video => MediaKind::Video,
        }
    }
}

/// A gallery memory scoped to one owner
///
/// `url` stays empty until a media attachment is linked to the record.
/// The category reference is by id; a memory with no category carries `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Unique identifier (store-assigned)
    pub id: i64,
    /// Image or video
    pub kind: MemoryKind,
    /// Public media reference, empty until an upload is linked
    pub url: String,
    /// Caption shown under the media
    pub caption: String,
    /// Date the memory is filed under
    pub date: NaiveDate,
    /// Referenced category id, if any
    pub category: Option<i64>,
    /// Owner this memory belongs to
    pub owner: Uuid,
}

impl Memory {
    /// Create a blank memory of the given kind, dated today
    pub fn new(id: i64, kind: MemoryKind, owner: Uuid) -> Self {
        Self {
            id,
            kind,
            url: String::new(),
            caption: String::new(),
            date: Local::now().date_naive(),
            category: None,
            owner,
        }
    }
}

impl Entity for Memory {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn set_id(&mut self, id: Self::Id) {
        self.id = id;
    }

    fn owner(&self) -> Uuid {
        self.owner
    }
}
