use crate::{
    config::Config,
    dto::{LeaderboardResponse, ReputationResponse, ToggleResponse},
    errors::ApiError,
    models::{ContentKind, LeaderboardEntry, Reputation},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

/// The remote SitVerse backend, the final authority on popularity state.
#[async_trait]
pub trait PopularityApi: Send + Sync {
    /// Flip the session user's like on a content item.
    async fn toggle(&self, kind: ContentKind, content_id: &str) -> Result<ToggleResponse, ApiError>;

    async fn reputation(&self, user_id: &str) -> Result<Reputation, ApiError>;

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError>;
}

pub struct HttpPopularityApi {
    base_url: Url,
    session_token: Option<String>,
    http_client: Client,
}

impl HttpPopularityApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::InternalError(format!("failed to create http client: {}", e)))?;

        let base_url = Url::parse(&config.api_url).map_err(|e| {
            ApiError::ValidationError(format!("invalid backend url {}: {}", config.api_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::ValidationError(format!(
                "backend url cannot carry a path: {}",
                config.api_url
            )));
        }

        Ok(Self {
            base_url,
            session_token: config.session_token.clone(),
            http_client,
        })
    }

    /// Append `segments` to the base URL. Each segment is percent-encoded on
    /// its own, so an id containing `/`, `?` or `#` stays a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InternalError("backend url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn toggle_url(&self, kind: ContentKind, content_id: &str) -> Result<Url, ApiError> {
        let content_id = path_id("content id", content_id)?;
        let mut segments = vec!["api", "popularity", "add-popularity"];
        match kind {
            ContentKind::Post => {}
            ContentKind::Profile => segments.push("profile"),
            ContentKind::Comment => segments.push("comment"),
        }
        segments.push(content_id);
        self.endpoint(&segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

/// An id that is safe to use as one path segment. `.` and `..` would be
/// dropped or resolved by URL normalization, so they are refused.
fn path_id<'a>(name: &str, value: &'a str) -> Result<&'a str, ApiError> {
    ApiError::require_id(name, value)?;
    if value == "." || value == ".." {
        return Err(ApiError::ValidationError(format!("{} is not a valid id", name)));
    }
    Ok(value)
}

/// Pull the backend's `message` field out of an error body if it has one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl PopularityApi for HttpPopularityApi {
    async fn toggle(&self, kind: ContentKind, content_id: &str) -> Result<ToggleResponse, ApiError> {
        let url = self.toggle_url(kind, content_id)?;
        debug!(%kind, content_id, "toggling popularity");

        let response = self.send(self.http_client.post(url)).await?;
        let body: serde_json::Value = Self::json(response).await?;
        Ok(ToggleResponse::from(&body))
    }

    async fn reputation(&self, user_id: &str) -> Result<Reputation, ApiError> {
        let user_id = path_id("userId", user_id)?;
        let url = self.endpoint(&["api", "popularity", "reputation", user_id])?;

        let response = self.send(self.http_client.get(url)).await?;
        let body: ReputationResponse = Self::json(response).await?;
        Ok(body.reputation)
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let url = self.endpoint(&["api", "popularity", "leaderboard"])?;

        let response = self.send(self.http_client.get(url)).await?;
        let body: LeaderboardResponse = Self::json(response).await?;
        Ok(body.leaderboard)
    }
}
