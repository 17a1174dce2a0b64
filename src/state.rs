use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::Config,
    identity::{GoogleProvider, IdentityProvider},
    storage::{ObjectStorage, SupabaseStorage},
    unsplash::{PhotoSearch, UnsplashClient},
};

/// Everything a handler needs. Cheap to clone; shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub conn: DatabaseConnection,
    pub storage: Arc<dyn ObjectStorage>,
    pub photos: Arc<dyn PhotoSearch>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wire the production backends. All outbound clients share one connection pool.
    pub fn from_config(conn: DatabaseConnection, config: &Config) -> Self {
        let http = reqwest::Client::new();

        Self {
            conn,
            storage: Arc::new(SupabaseStorage::new(http.clone(), &config.storage)),
            photos: Arc::new(UnsplashClient::new(
                http.clone(),
                config.unsplash_access_key.clone(),
            )),
            identity: Arc::new(GoogleProvider::new(
                http,
                &config.google,
                config.oauth_redirect_uri(),
            )),
        }
    }
}
