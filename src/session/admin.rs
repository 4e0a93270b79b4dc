//! Admin Session
//!
//! Owns the draft/baseline pair for one owner's editing session and
//! coordinates every remote write: eager create/delete, the batched save of
//! field edits, and the two-phase media attachment.
//!
//! Mutation follows a two-tier protocol. Structural edits (create/delete)
//! go to the remote store immediately and keep both snapshots in step, so
//! record existence always matches the store. Field edits only touch the
//! draft and are flushed in one concurrent batch by `save`, which advances
//! the baseline as its commit step.

use futures::future::{try_join_all, BoxFuture};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    Category, DomainError, DomainResult, Entity, MediaKind, Memory, MemoryKind, Track,
};
use crate::store::Stores;

use super::diff;
use super::media::Attachment;
use super::snapshot::Snapshot;

/// One owner's editing session over all four collections
pub struct AdminSession {
    pub(crate) owner: Uuid,
    pub(crate) store: Stores,
    pub(crate) draft: Snapshot,
    pub(crate) baseline: Snapshot,
}

/// Find a draft record by id and apply an edit, keeping the id fixed
fn edit_record<T: Entity>(
    rows: &mut [T],
    id: T::Id,
    what: &str,
    edit: impl FnOnce(&mut T),
) -> DomainResult<()> {
    let record = rows
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or_else(|| DomainError::NotFound(format!("{} {} not in draft", what, id)))?;
    let keep = record.id();
    edit(record);
    record.set_id(keep); // ids are store-assigned and immutable
    Ok(())
}

impl AdminSession {
    /// Fetch every collection for the owner and seed draft and baseline
    /// identically. All four fetches run concurrently; any failure surfaces
    /// without leaving a half-seeded session behind.
    pub async fn load(store: Stores, owner: Uuid) -> DomainResult<Self> {
        let (memories, categories, tracks, title) = tokio::try_join!(
            store.memories.list_by_owner(owner),
            store.categories.list_by_owner(owner),
            store.tracks.list_by_owner(owner),
            store.title.fetch(owner),
        )?;
        info!(
            "session loaded: {} memories, {} categories, {} tracks",
            memories.len(),
            categories.len(),
            tracks.len()
        );

        let baseline = Snapshot::new(memories, categories, tracks, title);
        Ok(Self {
            owner,
            store,
            draft: baseline.clone(),
            baseline,
        })
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    /// The working copy every edit lands in
    pub fn draft(&self) -> &Snapshot {
        &self.draft
    }

    /// The last state known to match the remote store
    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    /// Whether any field edit is waiting to be saved
    pub fn has_changes(&self) -> bool {
        diff::has_changes(&self.draft, &self.baseline)
    }

    // ---- field edits (draft only, flushed by `save`) ----

    pub fn edit_memory(&mut self, id: i64, edit: impl FnOnce(&mut Memory)) -> DomainResult<()> {
        edit_record(&mut self.draft.memories, id, "memory", edit)
    }

    pub fn edit_category(&mut self, id: i64, edit: impl FnOnce(&mut Category)) -> DomainResult<()> {
        edit_record(&mut self.draft.categories, id, "category", edit)
    }

    pub fn edit_track(&mut self, id: i64, edit: impl FnOnce(&mut Track)) -> DomainResult<()> {
        edit_record(&mut self.draft.tracks, id, "track", edit)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    // ---- structural edits (eager remote writes) ----

    /// Create a blank memory of the given kind. The store assigns the id and
    /// the returned record enters both snapshots, already synced.
    pub async fn add_memory(&mut self, kind: MemoryKind) -> DomainResult<Memory> {
        let created = self
            .store
            .memories
            .create(&Memory::new(0, kind, self.owner))
            .await?;
        debug!("created memory {}", created.id);
        self.draft.memories.push(created.clone());
        self.baseline.memories.push(created.clone());
        Ok(created)
    }

    /// Create a blank category (default icon, empty name and description)
    pub async fn add_category(&mut self) -> DomainResult<Category> {
        let created = self
            .store
            .categories
            .create(&Category::new(0, self.owner))
            .await?;
        debug!("created category {}", created.id);
        self.draft.categories.push(created.clone());
        self.baseline.categories.push(created.clone());
        Ok(created)
    }

    /// Create a blank track at playlist position 0
    pub async fn add_track(&mut self) -> DomainResult<Track> {
        let created = self.store.tracks.create(&Track::new(0, self.owner)).await?;
        debug!("created track {}", created.id);
        self.draft.tracks.push(created.clone());
        self.baseline.tracks.push(created.clone());
        Ok(created)
    }

    /// Delete a memory remotely, then drop it from both snapshots
    pub async fn remove_memory(&mut self, id: i64) -> DomainResult<()> {
        self.store.memories.delete(id).await?;
        self.draft.memories.retain(|m| m.id != id);
        self.baseline.memories.retain(|m| m.id != id);
        debug!("deleted memory {}", id);
        Ok(())
    }

    /// Delete a category remotely, then drop it from both snapshots
    pub async fn remove_category(&mut self, id: i64) -> DomainResult<()> {
        self.store.categories.delete(id).await?;
        self.draft.categories.retain(|c| c.id != id);
        self.baseline.categories.retain(|c| c.id != id);
        debug!("deleted category {}", id);
        Ok(())
    }

    /// Delete a track remotely, then drop it from both snapshots
    pub async fn remove_track(&mut self, id: i64) -> DomainResult<()> {
        self.store.tracks.delete(id).await?;
        self.draft.tracks.retain(|t| t.id != id);
        self.baseline.tracks.retain(|t| t.id != id);
        debug!("deleted track {}", id);
        Ok(())
    }

    // ---- batch persistence ----

    /// Flush every dirty record in one concurrent batch, then advance the
    /// baseline to the draft.
    ///
    /// One update is issued per dirty record, plus one title update when the
    /// title differs; clean records cost nothing, so calling this twice in a
    /// row issues zero writes the second time. The batch is all-or-nothing
    /// at the commit step only: if any single update rejects, the baseline
    /// stays put and the error propagates, but updates that already
    /// succeeded remotely are not rolled back. A later save recomputes the
    /// dirty set against the unchanged baseline and resends it.
    pub async fn save(&mut self) -> DomainResult<()> {
        let mut writes: Vec<BoxFuture<'static, DomainResult<()>>> = Vec::new();

        for record in diff::pending_updates(&self.draft.memories, &self.baseline.memories) {
            let store = self.store.memories.clone();
            let record = record.clone();
            writes.push(Box::pin(async move {
                store.update(&record).await.map(|_| ())
            }));
        }
        for record in diff::pending_updates(&self.draft.categories, &self.baseline.categories) {
            let store = self.store.categories.clone();
            let record = record.clone();
            writes.push(Box::pin(async move {
                store.update(&record).await.map(|_| ())
            }));
        }
        for record in diff::pending_updates(&self.draft.tracks, &self.baseline.tracks) {
            let store = self.store.tracks.clone();
            let record = record.clone();
            writes.push(Box::pin(async move {
                store.update(&record).await.map(|_| ())
            }));
        }
        if self.draft.title != self.baseline.title {
            let store = self.store.title.clone();
            let owner = self.owner;
            let title = self.draft.title.clone();
            writes.push(Box::pin(
                async move { store.update(owner, &title).await },
            ));
        }

        if writes.is_empty() {
            debug!("save: nothing dirty");
        } else {
            info!("save: writing {} record(s)", writes.len());
            try_join_all(writes).await?;
        }

        // Commit point: from here the draft is the new known-synced state.
        self.baseline = self.draft.clone();
        Ok(())
    }

    // ---- media attachment ----

    /// Upload a file for a memory and link the public reference onto it.
    ///
    /// This bypasses the batched path: the link is an eager write, and on
    /// success both snapshots take the new url together. On failure the
    /// record keeps its previous reference in both and the error propagates;
    /// there is no retry.
    pub async fn attach_memory_media(
        &mut self,
        id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> DomainResult<Attachment> {
        let memory = self
            .draft
            .memories
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("memory {} not in draft", id)))?;
        let kind = MediaKind::from(memory.kind);
        let mut attachment = Attachment::new(id, kind);
        attachment.begin_upload()?;

        let uploaded = match self
            .store
            .uploader
            .upload(kind.bucket(), file_name, bytes)
            .await
        {
            Ok(object) => object,
            Err(e) => {
                attachment.fail();
                warn!("upload for memory {} failed: {}", id, e);
                return Err(e);
            }
        };
        let url = self.store.uploader.public_url(&uploaded.full_path);

        let mut updated = memory;
        updated.url = url.clone();
        if let Err(e) = self.store.memories.update(&updated).await {
            attachment.fail();
            warn!("linking upload to memory {} failed: {}", id, e);
            return Err(e);
        }

        // The linked record is synced by construction, so both copies
        // advance together.
        if let Some(record) = self.draft.memories.iter_mut().find(|m| m.id == id) {
            record.url = url.clone();
        }
        if let Some(record) = self.baseline.memories.iter_mut().find(|m| m.id == id) {
            record.url = url.clone();
        }

        attachment.link(url)?;
        info!("linked upload to memory {}", id);
        Ok(attachment)
    }

    /// Upload an audio file for a track and link it, same workflow as
    /// memory media but against the audio bucket and `music_url`.
    pub async fn attach_track_audio(
        &mut self,
        id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> DomainResult<Attachment> {
        let track = self
            .draft
            .tracks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("track {} not in draft", id)))?;
        let mut attachment = Attachment::new(id, MediaKind::Audio);
        attachment.begin_upload()?;

        let uploaded = match self
            .store
            .uploader
            .upload(MediaKind::Audio.bucket(), file_name, bytes)
            .await
        {
            Ok(object) => object,
            Err(e) => {
                attachment.fail();
                warn!("upload for track {} failed: {}", id, e);
                return Err(e);
            }
        };
        let url = self.store.uploader.public_url(&uploaded.full_path);

        let mut updated = track;
        updated.music_url = url.clone();
        if let Err(e) = self.store.tracks.update(&updated).await {
            attachment.fail();
            warn!("linking upload to track {} failed: {}", id, e);
            return Err(e);
        }

        if let Some(record) = self.draft.tracks.iter_mut().find(|t| t.id == id) {
            record.music_url = url.clone();
        }
        if let Some(record) = self.baseline.tracks.iter_mut().find(|t| t.id == id) {
            record.music_url = url.clone();
        }

        attachment.link(url)?;
        info!("linked upload to track {}", id);
        Ok(attachment)
    }
}
