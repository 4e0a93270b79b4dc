//! Store Layer - Core Traits
//!
//! Defines the abstract interfaces for remote data access.
//! Implementations can be REST-backed, in-memory, etc.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Category, DomainResult, Entity, Memory, Track};

/// Per-entity-type handle onto the remote store
///
/// Generic over any Entity type. All operations are async; every call is a
/// remote round trip and can fail with a generic store error.
#[async_trait]
pub trait Collection<T: Entity>: Send + Sync {
    /// List every record scoped to the given owner
    async fn list_by_owner(&self, owner: Uuid) -> DomainResult<Vec<T>>;

    /// Create a new record; the store assigns the id
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Full-record replace by id (idempotent)
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Remove the record with the given id
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Handle onto the per-owner singleton page title
#[async_trait]
pub trait TitleStore: Send + Sync {
    /// Fetch the owner's title; empty string when none is stored yet
    async fn fetch(&self, owner: Uuid) -> DomainResult<String>;

    /// Replace the owner's title
    async fn update(&self, owner: Uuid, title: &str) -> DomainResult<()>;
}

/// Location of an uploaded binary inside the storage service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedObject {
    #[serde(rename = "fullPath")]
    pub full_path: String,
}

/// Binary upload service
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload a file into the given bucket and return where it landed
    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> DomainResult<UploadedObject>;

    /// Public reference for an uploaded object
    fn public_url(&self, full_path: &str) -> String;
}

/// Auth collaborator, used only to scope owner ids
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Id of the signed-in user, if any
    async fn current_user(&self) -> DomainResult<Option<Uuid>>;
}

/// The full set of handles an admin session works against
#[derive(Clone)]
pub struct Stores {
    pub memories: Arc<dyn Collection<Memory>>,
    pub categories: Arc<dyn Collection<Category>>,
    pub tracks: Arc<dyn Collection<Track>>,
    pub title: Arc<dyn TitleStore>,
    pub uploader: Arc<dyn Uploader>,
}
