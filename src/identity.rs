//! OAuth sign-in against an external identity provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::GoogleConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity provider rejected the request with status {0}")]
    Status(u16),
    #[error("invalid provider url: {0}")]
    Url(#[from] url::ParseError),
}

/// The subset of OpenID userinfo claims the service keeps.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderProfile {
    /// Stable provider-side subject id
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

impl ProviderProfile {
    /// Display name, falling back to the email's local part.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| "user".to_owned())
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider key stored on linked accounts, e.g. `"google"`.
    fn name(&self) -> &str;

    /// Where to send the browser to start sign-in; `state` is echoed back to the callback.
    fn authorization_url(&self, state: &str) -> Result<String, IdentityError>;

    /// Exchange an authorization code for the signed-in user's profile.
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, IdentityError>;
}

pub struct GoogleProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleProvider {
    pub fn new(client: reqwest::Client, config: &GoogleConfig, redirect_uri: String) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> Result<String, IdentityError> {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
            ],
        )?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, IdentityError> {
        let res = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(IdentityError::Status(res.status().as_u16()));
        }
        let token: TokenResponse = res.json().await?;

        let res = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(IdentityError::Status(res.status().as_u16()));
        }

        Ok(res.json().await?)
    }
}
