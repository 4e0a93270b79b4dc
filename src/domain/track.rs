//! Track Entity
//!
//! Background music tracks played on the gallery page, ordered by
//! playlist position.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::Entity;

/// A background music track scoped to one owner
///
/// `music_url` stays empty until an audio upload is linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique identifier (store-assigned)
    pub id: i64,
    /// Public audio reference, empty until an upload is linked
    pub music_url: String,
    /// Playback position within the playlist
    pub playlist: i32,
    /// Display name of the track
    pub name: String,
    /// Owner this track belongs to
    pub owner: Uuid,
}

impl Track {
    /// Create a blank track at playlist position 0
    pub fn new(id: i64, owner: Uuid) -> Self {
        Self {
            id,
            music_url: String::new(),
            playlist: 0,
            name: String::new(),
            owner,
        }
    }
}

impl Entity for Track {
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
