//! REST Store Backend
//!
//! Talks to the hosted data store over its REST conventions: row endpoints
//! under `/rest/v1/{table}`, binary uploads under `/storage/v1/object`, and
//! the signed-in user under `/auth/v1/user`.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, Entity};

use super::config::StoreConfig;
use super::traits::{AuthProvider, Collection, Stores, TitleStore, UploadedObject, Uploader};

use std::sync::Arc;

/// Characters escaped when a file name becomes a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'/');

/// Map a non-success response into a store error
async fn check(response: Response, context: &str) -> DomainResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        Err(DomainError::NotFound(format!("{}: {}", context, body)))
    } else {
        Err(DomainError::Internal(format!(
            "{} failed ({}): {}",
            context, status, body
        )))
    }
}

fn transport_error(context: &str, error: reqwest::Error) -> DomainError {
    DomainError::Internal(format!("{}: {}", context, error))
}

/// REST-backed collection handle for one table
pub struct RestCollection<T> {
    http: Client,
    config: StoreConfig,
    table: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> RestCollection<T> {
    pub fn new(http: Client, config: StoreConfig, table: &'static str) -> Self {
        Self {
            http,
            config,
            table,
            _entity: PhantomData,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.table)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }
}

#[async_trait]
impl<T> Collection<T> for RestCollection<T>
where
    T: Entity + Serialize + DeserializeOwned + 'static,
{
    async fn list_by_owner(&self, owner: Uuid) -> DomainResult<Vec<T>> {
        let response = self
            .authed(self.http.get(self.endpoint()))
            .query(&[
                ("owner", format!("eq.{}", owner)),
                ("select", "*".to_string()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(self.table, e))?;

        let response = check(response, self.table).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| transport_error(self.table, e))
    }

    async fn create(&self, entity: &T) -> DomainResult<T> {
        // The store assigns the id, so the local placeholder is stripped
        let mut body = serde_json::to_value(entity)
            .map_err(|e| DomainError::Internal(format!("{}: {}", self.table, e)))?;
        if let Some(fields) = body.as_object_mut() {
            fields.remove("id");
        }

        let response = self
            .authed(self.http.post(self.endpoint()))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(self.table, e))?;

        let response = check(response, self.table).await?;
        let mut rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| transport_error(self.table, e))?;
        rows.pop()
            .ok_or_else(|| DomainError::Internal(format!("{}: create returned no row", self.table)))
    }

    async fn update(&self, entity: &T) -> DomainResult<T> {
        let url = format!("{}?id=eq.{}", self.endpoint(), entity.id());
        let response = self
            .authed(self.http.patch(url))
            .header("Prefer", "return=representation")
            .json(entity)
            .send()
            .await
            .map_err(|e| transport_error(self.table, e))?;

        let response = check(response, self.table).await?;
        let mut rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| transport_error(self.table, e))?;
        rows.pop().ok_or_else(|| {
            DomainError::NotFound(format!("{}: no row with id {}", self.table, entity.id()))
        })
    }

    async fn delete(&self, id: T::Id) -> DomainResult<()> {
        let url = format!("{}?id=eq.{}", self.endpoint(), id);
        let response = self
            .authed(self.http.delete(url))
            .send()
            .await
            .map_err(|e| transport_error(self.table, e))?;

        check(response, self.table).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct TitleRow {
    title: String,
}

/// REST-backed handle for the singleton page title
pub struct RestTitle {
    http: Client,
    config: StoreConfig,
}

impl RestTitle {
    pub fn new(http: Client, config: StoreConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/title", self.config.url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }
}

#[async_trait]
impl TitleStore for RestTitle {
    async fn fetch(&self, owner: Uuid) -> DomainResult<String> {
        let response = self
            .authed(self.http.get(self.endpoint()))
            .query(&[
                ("owner", format!("eq.{}", owner)),
                ("select", "*".to_string()),
            ])
            .send()
            .await
            .map_err(|e| transport_error("title", e))?;

        let response = check(response, "title").await?;
        let rows: Vec<TitleRow> = response
            .json()
            .await
            .map_err(|e| transport_error("title", e))?;
        Ok(rows.into_iter().next().map(|r| r.title).unwrap_or_default())
    }

    async fn update(&self, owner: Uuid, title: &str) -> DomainResult<()> {
        let url = format!("{}?owner=eq.{}", self.endpoint(), owner);
        let response = self
            .authed(self.http.patch(url))
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .map_err(|e| transport_error("title", e))?;

        check(response, "title").await?;
        Ok(())
    }
}

/// REST-backed binary upload service
pub struct RestUploader {
    http: Client,
    config: StoreConfig,
}

impl RestUploader {
    pub fn new(http: Client, config: StoreConfig) -> Self {
        Self { http, config }
    }
}

/// Collision-free object name: upload time, a random fragment, then the
/// original file name.
fn unique_object_name(file_name: &str) -> String {
    let fragment = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        Utc::now().timestamp_millis(),
        &fragment[..8],
        file_name
    )
}

#[async_trait]
impl Uploader for RestUploader {
    async fn upload(
        &self,
        bucket: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> DomainResult<UploadedObject> {
        let object_name = unique_object_name(file_name);
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.url,
            bucket,
            utf8_percent_encode(&object_name, PATH_SEGMENT)
        );
        let content_type = mime_guess::from_path(file_name).first_or_octet_stream();

        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
            .header(CONTENT_TYPE, content_type.as_ref())
            .body(bytes)
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;

        let response = check(response, "upload").await?;
        response
            .json::<UploadedObject>()
            .await
            .map_err(|e| transport_error("upload", e))
    }

    fn public_url(&self, full_path: &str) -> String {
        format!("{}/storage/v1/object/public/{}", self.config.url, full_path)
    }
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
}

/// REST-backed auth collaborator
pub struct RestAuth {
    http: Client,
    config: StoreConfig,
}

impl RestAuth {
    pub fn new(http: Client, config: StoreConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl AuthProvider for RestAuth {
    async fn current_user(&self) -> DomainResult<Option<Uuid>> {
        let url = format!("{}/auth/v1/user", self.config.url);
        let response = self
            .http
            .get(url)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
            .send()
            .await
            .map_err(|e| transport_error("auth", e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        let response = check(response, "auth").await?;
        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| transport_error("auth", e))?;
        Ok(Some(user.id))
    }
}

/// Build the full set of REST-backed store handles over one shared client
pub fn connect(config: &StoreConfig) -> Stores {
    let http = Client::new();
    Stores {
        memories: Arc::new(RestCollection::new(
            http.clone(),
            config.clone(),
            "memories",
        )),
        categories: Arc::new(RestCollection::new(
            http.clone(),
            config.clone(),
            "categories",
        )),
        tracks: Arc::new(RestCollection::new(http.clone(), config.clone(), "music")),
        title: Arc::new(RestTitle::new(http.clone(), config.clone())),
        uploader: Arc::new(RestUploader::new(http, config.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_object_names_differ() {
        let a = unique_object_name("song.mp3");
        let b = unique_object_name("song.mp3");
        assert_ne!(a, b);
        assert!(a.ends_with("_song.mp3"));
    }

    #[test]
    fn test_public_url_shape() {
        let uploader = RestUploader::new(
            Client::new(),
            StoreConfig {
                url: "https://store.example.com".to_string(),
                key: "k".to_string(),
            },
        );
        assert_eq!(
            uploader.public_url("music/123_abc_song.mp3"),
            "https://store.example.com/storage/v1/object/public/music/123_abc_song.mp3"
        );
    }
}
