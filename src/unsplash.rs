//! Server-side proxy for Unsplash photo search.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const UNSPLASH_API: &str = "https://api.unsplash.com";

#[derive(Debug, Error)]
pub enum PhotoSearchError {
    #[error("photo search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("photo search returned status {0}")]
    Status(u16),
}

/// One page of search results. Field names are read in Unsplash's snake_case and written in camelCase.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPage {
    pub total: u64,
    #[serde(alias = "total_pages")]
    pub total_pages: u64,
    pub results: Vec<Photo>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub color: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "alt_description")]
    pub alt_description: Option<String>,
    pub urls: PhotoUrls,
    pub user: Option<Photographer>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PhotoUrls {
    pub raw: String,
    pub full: String,
    pub regular: String,
    pub small: String,
    pub thumb: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Photographer {
    pub name: String,
    pub username: String,
}

#[async_trait]
pub trait PhotoSearch: Send + Sync {
    /// Landscape photos matching `query`, most relevant first.
    async fn search(&self, query: &str) -> Result<PhotoPage, PhotoSearchError>;
}

pub struct UnsplashClient {
    client: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl UnsplashClient {
    pub fn new(client: reqwest::Client, access_key: impl Into<String>) -> Self {
        Self {
            client,
            access_key: access_key.into(),
            base_url: UNSPLASH_API.to_owned(),
        }
    }
}

#[async_trait]
impl PhotoSearch for UnsplashClient {
    async fn search(&self, query: &str) -> Result<PhotoPage, PhotoSearchError> {
        let res = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .query(&[
                ("query", query),
                ("orientation", "landscape"),
                ("order_by", "relevant"),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(PhotoSearchError::Status(res.status().as_u16()));
        }

        Ok(res.json().await?)
    }
}
