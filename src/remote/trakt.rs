use crate::auth::{AuthService, CredentialRecord, DeviceCode, DevicePoll};
use crate::models::Movie;
use crate::remote::WatchlistSource;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const TRAKT_API_BASE: &str = "https://api.trakt.tv";
const TRAKT_API_VERSION: &str = "2";
const PAGE_LIMIT: u32 = 100;

/// Watchlist items older than this many release years are skipped; the
/// tracker has nothing to announce for back-catalog titles.
pub const RECENCY_WINDOW_YEARS: i32 = 2;

#[derive(Debug, Serialize)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_url: String,
    expires_in: u64,
    interval: u64,
}

#[derive(Debug, Serialize)]
struct DeviceTokenRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Serialize)]
struct RevokeTokenRequest<'a> {
    token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

impl From<TokenResponse> for CredentialRecord {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListedMovie {
    #[serde(default)]
    movie: Option<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct MovieSummary {
    title: String,
    year: Option<i32>,
}

/// Unauthenticated half of the Trakt v2 client: the OAuth device-code and
/// token endpoints. Cheap to clone, the inner reqwest client is shared.
#[derive(Clone)]
pub struct TraktApi {
    client: Client,
    client_id: String,
    client_secret: String,
}

impl TraktApi {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("autodl-sync/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| {
                    AppError::RemoteService(format!("Failed to create HTTP client: {}", e))
                })?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    fn with_api_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("trakt-api-version", TRAKT_API_VERSION)
            .header("trakt-api-key", &self.client_id)
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<reqwest::Response> {
        let url = format!("{}{}", TRAKT_API_BASE, path);
        self.with_api_headers(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::RemoteService(format!("Request to {} failed: {}", path, e)))
    }

    async fn parse_token_response(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> AppResult<CredentialRecord> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteService(format!(
                "{} returned {} - {}",
                path, status, error_text
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::RemoteService(format!("Failed to parse token response: {}", e))
        })?;
        Ok(token.into())
    }
}

#[async_trait]
impl AuthService for TraktApi {
    async fn generate_device_code(&self) -> AppResult<DeviceCode> {
        let request = DeviceCodeRequest {
            client_id: &self.client_id,
        };
        let response = self.post_json("/oauth/device/code", &request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteService(format!(
                "Device code request returned {} - {}",
                status, error_text
            )));
        }

        let device: DeviceCodeResponse = response.json().await.map_err(|e| {
            AppError::RemoteService(format!("Failed to parse device code response: {}", e))
        })?;

        Ok(DeviceCode {
            device_code: device.device_code,
            user_code: device.user_code,
            verification_url: device.verification_url,
            expires_in_secs: device.expires_in,
            interval_secs: device.interval,
        })
    }

    async fn poll_device_token(&self, device: &DeviceCode) -> AppResult<DevicePoll> {
        let request = DeviceTokenRequest {
            code: &device.device_code,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
        };
        let response = self.post_json("/oauth/device/token", &request).await?;

        // Trakt reports poll progress through status codes.
        match response.status() {
            StatusCode::OK => {
                let token: TokenResponse = response.json().await.map_err(|e| {
                    AppError::RemoteService(format!("Failed to parse token response: {}", e))
                })?;
                Ok(DevicePoll::Approved(token.into()))
            }
            StatusCode::BAD_REQUEST => Ok(DevicePoll::Pending),
            StatusCode::TOO_MANY_REQUESTS => Ok(DevicePoll::SlowDown),
            StatusCode::GONE => Ok(DevicePoll::Expired),
            StatusCode::IM_A_TEAPOT => Ok(DevicePoll::Denied),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(AppError::RemoteService(format!(
                    "Device token poll returned {} - {}",
                    status, error_text
                )))
            }
        }
    }

    async fn check_token_revoked(&self, access_token: &str) -> AppResult<bool> {
        // No dedicated introspection endpoint; an authenticated probe that
        // comes back unauthorized means the token is revoked or expired.
        let url = format!("{}/sync/last_activities", TRAKT_API_BASE);
        let response = self
            .with_api_headers(self.client.get(&url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::RemoteService(format!("Token validity probe failed: {}", e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(true),
            status if status.is_success() => Ok(false),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(AppError::RemoteService(format!(
                    "Token validity probe returned {} - {}",
                    status, error_text
                )))
            }
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> AppResult<CredentialRecord> {
        let request = RefreshTokenRequest {
            refresh_token,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri: "urn:ietf:wg:oauth:2.0:oob",
            grant_type: "refresh_token",
        };
        let response = self.post_json("/oauth/token", &request).await?;
        self.parse_token_response("/oauth/token", response).await
    }

    async fn revoke_token(&self, access_token: &str) -> AppResult<()> {
        let request = RevokeTokenRequest {
            token: access_token,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
        };
        let response = self.post_json("/oauth/revoke", &request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteService(format!(
                "Token revocation returned {} - {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

/// Authenticated reads of a user's watchlist and collection. Constructed
/// after credential acquisition, so the token it carries is live for the
/// whole run.
pub struct TraktWatchlist {
    api: TraktApi,
    username: String,
    access_token: String,
    current_year: i32,
}

impl TraktWatchlist {
    pub fn new(
        api: TraktApi,
        username: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            api,
            username: username.into(),
            access_token: access_token.into(),
            current_year: Utc::now().year(),
        }
    }

    async fn get_pages<T: DeserializeOwned>(&self, path: &str) -> AppResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}{}?page={}&limit={}",
                TRAKT_API_BASE, path, page, PAGE_LIMIT
            );
            let response = self
                .api
                .with_api_headers(self.api.client.get(&url))
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| {
                    AppError::RemoteService(format!("Request to {} failed: {}", path, e))
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(AppError::RemoteService(format!(
                    "{} returned {} - {}",
                    path, status, error_text
                )));
            }

            let page_count: u32 = response
                .headers()
                .get("X-Pagination-Page-Count")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);

            let mut batch: Vec<T> = response.json().await.map_err(|e| {
                AppError::RemoteService(format!("Failed to parse response from {}: {}", path, e))
            })?;
            items.append(&mut batch);

            if page >= page_count {
                return Ok(items);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl WatchlistSource for TraktWatchlist {
    async fn fetch_watchlist(&self) -> AppResult<Vec<Movie>> {
        let path = format!("/users/{}/watchlist/movies", self.username);
        let items: Vec<ListedMovie> = self.get_pages(&path).await?;
        Ok(recent_movies(items, self.current_year))
    }

    async fn fetch_collected(&self) -> AppResult<Vec<Movie>> {
        let path = format!("/users/{}/collection/movies", self.username);
        let items: Vec<ListedMovie> = self.get_pages(&path).await?;
        // No recency filter here: everything owned excludes, however old.
        Ok(items
            .into_iter()
            .filter_map(|item| item.movie)
            .map(|movie| Movie::new(movie.title))
            .collect())
    }
}

fn within_recency_window(year: Option<i32>, current_year: i32) -> bool {
    match year {
        Some(year) => current_year - RECENCY_WINDOW_YEARS <= year,
        None => false,
    }
}

fn recent_movies(items: Vec<ListedMovie>, current_year: i32) -> Vec<Movie> {
    items
        .into_iter()
        .filter_map(|item| item.movie)
        .filter(|movie| within_recency_window(movie.year, current_year))
        .map(|movie| Movie::new(movie.title))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recency_window_bounds() {
        assert!(within_recency_window(Some(2026), 2026));
        assert!(within_recency_window(Some(2024), 2026));
        assert!(!within_recency_window(Some(2023), 2026));
        assert!(!within_recency_window(None, 2026));
        // Not-yet-released titles count as recent.
        assert!(within_recency_window(Some(2027), 2026));
    }

    #[test]
    fn test_recent_movies_filters_and_preserves_order() {
        let items: Vec<ListedMovie> = serde_json::from_str(
            r#"[
                {"movie": {"title": "Interstellar", "year": 2014}},
                {"movie": {"title": "Dune Part Three", "year": 2026}},
                {"movie": {"title": "Arrival", "year": 2025}},
                {"movie": {"title": "Unknown", "year": null}},
                {"movie": null}
            ]"#,
        )
        .unwrap();

        let movies = recent_movies(items, 2026);
        assert_eq!(
            movies,
            vec![Movie::new("Dune Part Three"), Movie::new("Arrival")]
        );
    }

    #[test]
    fn test_token_response_without_refresh_token() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "token_type": "bearer"}"#).unwrap();
        let record: CredentialRecord = token.into();
        assert_eq!(record.access_token, "abc");
        assert!(record.refresh_token.is_none());
    }

    #[test]
    fn test_device_code_response_shape() {
        let device: DeviceCodeResponse = serde_json::from_str(
            r#"{
                "device_code": "d123",
                "user_code": "5055CC52",
                "verification_url": "https://trakt.tv/activate",
                "expires_in": 600,
                "interval": 5
            }"#,
        )
        .unwrap();
        assert_eq!(device.user_code, "5055CC52");
        assert_eq!(device.interval, 5);
    }
}
