//! OAuth access token manager with automatic refresh.
//!
//! Holds one set of installed-app credentials, caches the access token
//! in-memory, and refreshes it via the refresh_token grant when expired.

use tokio::sync::Mutex;
use tracing::{debug, info};

/// Google OAuth2 client credentials plus a long-lived refresh token.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Cached token with expiration.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        chrono::Utc::now() >= self.expires_at - chrono::Duration::minutes(5)
    }
}

#[derive(Debug)]
struct TokenState {
    cached: Option<CachedToken>,
    /// Google may rotate the refresh token on refresh.
    refresh_token: String,
}

/// Manages the access token with caching and automatic refresh.
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    state: Mutex<TokenState>,
}

impl TokenManager {
    pub fn new(credentials: OAuthCredentials, token_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: token_url.into(),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            state: Mutex::new(TokenState {
                cached: None,
                refresh_token: credentials.refresh_token,
            }),
        }
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_valid_token(&self) -> anyhow::Result<String> {
        let mut state = self.state.lock().await;

        if let Some(cached) = &state.cached {
            if !cached.is_expired() {
                debug!("Access token cache hit");
                return Ok(cached.access_token.clone());
            }
            debug!("Access token expired, refreshing");
        }

        let refreshed = self.refresh_token(&mut state).await?;
        Ok(refreshed)
    }

    /// Drop the cached access token; the next call refreshes.
    pub async fn invalidate(&self) {
        self.state.lock().await.cached = None;
    }

    /// Refresh the access token using the refresh_token grant.
    async fn refresh_token(&self, state: &mut TokenState) -> anyhow::Result<String> {
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", state.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OAuth token refresh failed: {} {}", status, body);
        }

        #[derive(serde::Deserialize)]
        struct RefreshResponse {
            access_token: String,
            expires_in: u64,
            refresh_token: Option<String>,
        }

        let token_resp: RefreshResponse = resp.json().await?;

        let expires_at =
            chrono::Utc::now() + chrono::Duration::seconds(token_resp.expires_in as i64);

        if let Some(rotated) = token_resp.refresh_token {
            state.refresh_token = rotated;
        }

        state.cached = Some(CachedToken {
            access_token: token_resp.access_token.clone(),
            expires_at,
        });

        info!("Refreshed OAuth access token, expires at {}", expires_at.to_rfc3339());

        Ok(token_resp.access_token)
    }
}
