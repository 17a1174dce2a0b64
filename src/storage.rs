//! Object storage for user avatars.
//!
//! The production backend speaks the Supabase storage REST API: objects are written to
//! `POST /storage/v1/object/<bucket>/<path>` and served from
//! `/storage/v1/object/public/<bucket>/<path>`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;

use crate::config::StorageConfig;

/// Largest avatar accepted, in decoded bytes (1.5 MiB).
pub const MAX_AVATAR_BYTES: usize = 1536 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage rejected the upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image payload is empty")]
    Empty,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write `bytes` at `path`, replacing any existing object. Returns the stored path.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Public URL an uploaded object is served from.
    fn public_url(&self, path: &str) -> String;
}

/// Deterministic avatar key; re-uploads overwrite.
pub fn avatar_path(username: &str) -> String {
    format!("avatars/{username}.png")
}

/// Decode a `data:<mime>;base64,<payload>` string. Everything up to the last `,` is
/// treated as the header and discarded; a string without a header is decoded whole.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, DataUrlError> {
    let payload = match data_url.rsplit_once(',') {
        Some((_, payload)) => payload,
        None => data_url,
    };
    let bytes = STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(DataUrlError::Empty);
    }
    Ok(bytes)
}

pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    key: String,
    bucket: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

impl SupabaseStorage {
    pub fn new(client: reqwest::Client, config: &StorageConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
            key: config.key.clone(),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        );
        let res = self
            .client
            .post(url)
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
            .header("x-upsert", "true")
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // The response key is `<bucket>/<path>`; fall back to what we asked for.
        let stored = res
            .json::<UploadResponse>()
            .await
            .ok()
            .and_then(|r| r.key)
            .and_then(|key| {
                key.strip_prefix(&format!("{}/", self.bucket))
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| path.to_owned());
        tracing::debug!(path = %stored, "object uploaded");

        Ok(stored)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}
