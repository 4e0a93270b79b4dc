//! Collection Snapshot
//!
//! One copy of everything the admin surface edits. The session keeps two of
//! these: the baseline (last state known to match the remote store) and the
//! draft (the working copy every edit lands in).

use crate::domain::{Category, Memory, Track};

/// All editable collections plus the singleton page title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub memories: Vec<Memory>,
    pub categories: Vec<Category>,
    pub tracks: Vec<Track>,
    pub title: String,
}

impl Snapshot {
    pub fn new(
        memories: Vec<Memory>,
        categories: Vec<Category>,
        tracks: Vec<Track>,
        title: String,
    ) -> Self {
        Self {
            memories,
            categories,
            tracks,
            title,
        }
    }
}
