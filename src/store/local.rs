//! In-Memory Store Backend
//!
//! Backs the store traits with plain vectors. Used by the test suite and by
//! offline demos; every write is observable, and individual operations can
//! be told to refuse so failure paths stay testable.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, DomainError, DomainResult, Entity, Memory, Track};

use super::traits::{Collection, Stores, TitleStore, UploadedObject, Uploader};

/// In-memory collection handle for one entity type
pub struct LocalCollection<T> {
    rows: Mutex<Vec<T>>,
    next_id: AtomicI64,
    update_log: Mutex<Vec<i64>>,
    refused_updates: Mutex<HashSet<i64>>,
    refuse_creates: AtomicBool,
    refuse_deletes: AtomicBool,
    refuse_lists: AtomicBool,
}

impl<T: Entity<Id = i64>> LocalCollection<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            update_log: Mutex::new(Vec::new()),
            refused_updates: Mutex::new(HashSet::new()),
            refuse_creates: AtomicBool::new(false),
            refuse_deletes: AtomicBool::new(false),
            refuse_lists: AtomicBool::new(false),
        }
    }

    fn rows(&self) -> MutexGuard<'_, Vec<T>> {
        self.rows.lock().expect("collection lock poisoned")
    }

    /// Replace the stored rows, keeping the id counter ahead of them
    pub fn seed(&self, rows: Vec<T>) {
        let highest = rows.iter().map(|r| r.id()).max().unwrap_or(0);
        self.next_id.store(highest + 1, Ordering::SeqCst);
        *self.rows() = rows;
    }

    /// Every row currently stored
    pub fn all(&self) -> Vec<T> {
        self.rows().clone()
    }

    /// Ids passed to `update`, in call order
    pub fn updated_ids(&self) -> Vec<i64> {
        self.update_log.lock().expect("log lock poisoned").clone()
    }

    pub fn clear_update_log(&self) {
        self.update_log.lock().expect("log lock poisoned").clear();
    }

    /// Make every `update` for the given id fail
    pub fn refuse_updates_for(&self, id: i64) {
        self.refused_updates
            .lock()
            .expect("refusal lock poisoned")
            .insert(id);
    }

    pub fn accept_all_updates(&self) {
        self.refused_updates
            .lock()
            .expect("refusal lock poisoned")
            .clear();
    }

    pub fn refuse_creates(&self) {
        self.refuse_creates.store(true, Ordering::SeqCst);
    }

    pub fn refuse_deletes(&self) {
        self.refuse_deletes.store(true, Ordering::SeqCst);
    }

    pub fn refuse_lists(&self) {
        self.refuse_lists.store(true, Ordering::SeqCst);
    }
}

impl<T: Entity<Id = i64>> Default for LocalCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity<Id = i64> + 'static> Collection<T> for LocalCollection<T> {
    async fn list_by_owner(&self, owner: Uuid) -> DomainResult<Vec<T>> {
        if self.refuse_lists.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("list refused".to_string()));
        }
        Ok(self
            .rows()
            .iter()
            .filter(|row| row.owner() == owner)
            .cloned()
            .collect())
    }

    async fn create(&self, entity: &T) -> DomainResult<T> {
        if self.refuse_creates.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("create refused".to_string()));
        }
        let mut created = entity.clone();
        created.set_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.rows().push(created.clone());
        Ok(created)
    }

    async fn update(&self, entity: &T) -> DomainResult<T> {
        let refused = self
            .refused_updates
            .lock()
            .expect("refusal lock poisoned")
            .contains(&entity.id());
        if refused {
            return Err(DomainError::Internal(format!(
                "update of {} refused",
                entity.id()
            )));
        }

        let mut rows = self.rows();
        let row = rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or_else(|| DomainError::NotFound(format!("no row with id {}", entity.id())))?;
        *row = entity.clone();
        drop(rows);

        self.update_log
            .lock()
            .expect("log lock poisoned")
            .push(entity.id());
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        if self.refuse_deletes.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("delete refused".to_string()));
        }
        self.rows().retain(|row| row.id() != id);
        Ok(())
    }
}

/// In-memory singleton title store
pub struct LocalTitle {
    titles: Mutex<HashMap<Uuid, String>>,
    update_count: AtomicUsize,
    refuse_updates: AtomicBool,
}

impl LocalTitle {
    pub fn new() -> Self {
        Self {
            titles: Mutex::new(HashMap::new()),
            update_count: AtomicUsize::new(0),
            refuse_updates: AtomicBool::new(false),
        }
    }

    pub fn seed(&self, owner: Uuid, title: &str) {
        self.titles
            .lock()
            .expect("title lock poisoned")
            .insert(owner, title.to_string());
    }

    /// How many times `update` has been called
    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    pub fn refuse_updates(&self) {
        self.refuse_updates.store(true, Ordering::SeqCst);
    }
}

impl Default for LocalTitle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TitleStore for LocalTitle {
    async fn fetch(&self, owner: Uuid) -> DomainResult<String> {
        Ok(self
            .titles
            .lock()
            .expect("title lock poisoned")
            .get(&owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn update(&self, owner: Uuid, title: &str) -> DomainResult<()> {
        if self.refuse_updates.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("title update refused".to_string()));
        }
        self.titles
            .lock()
            .expect("title lock poisoned")
            .insert(owner, title.to_string());
        self.update_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory upload service
pub struct LocalUploader {
    uploads: Mutex<Vec<String>>,
    refuse_uploads: AtomicBool,
}

impl LocalUploader {
    pub fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            refuse_uploads: AtomicBool::new(false),
        }
    }

    /// Full paths of every accepted upload, in call order
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().expect("upload lock poisoned").clone()
    }

    pub fn refuse_uploads(&self) {
        self.refuse_uploads.store(true, Ordering::SeqCst);
    }
}

impl Default for LocalUploader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Uploader for LocalUploader {
    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> DomainResult<UploadedObject> {
        if self.refuse_uploads.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("upload refused".to_string()));
        }
        let full_path = format!("{}/{}", bucket, file_name);
        self.uploads
            .lock()
            .expect("upload lock poisoned")
            .push(full_path.clone());
        Ok(UploadedObject { full_path })
    }

    fn public_url(&self, full_path: &str) -> String {
        format!("local://object/{}", full_path)
    }
}

/// The full in-memory backend, with the concrete handles kept around so
/// tests can seed data and observe writes.
pub struct LocalStore {
    pub memories: Arc<LocalCollection<Memory>>,
    pub categories: Arc<LocalCollection<Category>>,
    pub tracks: Arc<LocalCollection<Track>>,
    pub title: Arc<LocalTitle>,
    pub uploader: Arc<LocalUploader>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self {
            memories: Arc::new(LocalCollection::new()),
            categories: Arc::new(LocalCollection::new()),
            tracks: Arc::new(LocalCollection::new()),
            title: Arc::new(LocalTitle::new()),
            uploader: Arc::new(LocalUploader::new()),
        }
    }

    /// Trait-object view of this backend for an admin session
    pub fn stores(&self) -> Stores {
        Stores {
            memories: self.memories.clone(),
            categories: self.categories.clone(),
            tracks: self.tracks.clone(),
            title: self.title.clone(),
            uploader: self.uploader.clone(),
        }
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}
