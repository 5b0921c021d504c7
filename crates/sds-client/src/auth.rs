//! OAuth2 client-credentials authentication
//!
//! The token endpoint is discovered from the identity server's OpenID
//! configuration once, then tokens are cached until shortly before expiry.

use crate::error::{ClientError, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Tokens are refreshed this long before the service says they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Client credentials for the tenant's identity server
#[derive(Clone)]
pub struct Credentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct OpenIdConfiguration {
    token_endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

#[derive(Debug, Default)]
struct TokenState {
    token_endpoint: Option<String>,
    token: Option<CachedToken>,
}

/// Hands out bearer tokens for requests
#[derive(Debug)]
pub struct TokenProvider {
    discovery_url: String,
    credentials: Credentials,
    state: Mutex<TokenState>,
}

impl TokenProvider {
    /// Create a provider for `resource`, the service root URL
    #[must_use]
    pub fn new(resource: &str, credentials: Credentials) -> Self {
        Self {
            discovery_url: discovery_url(resource),
            credentials,
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Return a valid access token, fetching a new one if needed
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String> {
        let mut state = self.state.lock().await;

        if let Some(token) = &state.token {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let endpoint = match &state.token_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => {
                let endpoint = self.discover(http).await?;
                state.token_endpoint = Some(endpoint.clone());
                endpoint
            }
        };

        tracing::debug!("Requesting access token from {}", endpoint);
        let response = http
            .post(&endpoint)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Authentication(format!(
                "token request returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        state.token = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    async fn discover(&self, http: &reqwest::Client) -> Result<String> {
        tracing::debug!("Discovering token endpoint at {}", self.discovery_url);
        let response = http.get(&self.discovery_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Authentication(format!(
                "identity discovery returned {status}"
            )));
        }

        let configuration: OpenIdConfiguration = response.json().await?;
        Ok(configuration.token_endpoint)
    }
}

fn discovery_url(resource: &str) -> String {
    format!(
        "{}/identity/.well-known/openid-configuration",
        resource.trim_end_matches('/')
    )
}
