//! HTTP JSON card backend client.

use crate::config::BackendConfig;
use crate::model::card::{Card, CardPatch};
use crate::remote::{CardBackend, RemoteError, RemoteResult};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// `reqwest`-backed client for the card routes.
#[derive(Clone)]
pub struct HttpCardBackend {
    client: reqwest::Client,
    cards_url: Url,
}

impl HttpCardBackend {
    pub fn new(config: &BackendConfig) -> RemoteResult<Self> {
        config
            .validate()
            .map_err(|err| RemoteError::Config(err.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .default_headers(build_auth_headers(config.auth_token.as_deref())?)
            .build()?;
        let cards_url = Url::parse(&format!("{}/cards", config.normalized_base_url()))
            .map_err(|err| RemoteError::Config(format!("invalid base_url: {err}")))?;

        Ok(Self { client, cards_url })
    }

    fn generate_url(&self) -> RemoteResult<Url> {
        self.child_url("generate")
    }

    /// `/cards/{id}` with the id escaped as one path segment.
    fn card_url(&self, id: &str) -> RemoteResult<Url> {
        self.child_url(id)
    }

    fn child_url(&self, segment: &str) -> RemoteResult<Url> {
        let mut url = self.cards_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::Config("base_url cannot carry a path".to_string()))?
            .push(segment);
        Ok(url)
    }
}

#[async_trait]
impl CardBackend for HttpCardBackend {
    async fn list_cards(&self) -> RemoteResult<Vec<Card>> {
        debug!("event=http_request module=remote method=GET path={}", self.cards_url.path());
        let response = self.client.get(self.cards_url.clone()).send().await?;
        read_json(response, None).await
    }

    async fn generate_cards(&self) -> RemoteResult<Vec<Card>> {
        let url = self.generate_url()?;
        debug!("event=http_request module=remote method=POST path={}", url.path());
        let response = self.client.post(url).send().await?;
        read_json(response, None).await
    }

    async fn patch_card(&self, id: &str, patch: &CardPatch) -> RemoteResult<Card> {
        let url = self.card_url(id)?;
        debug!("event=http_request module=remote method=PATCH path={}", url.path());
        let response = self.client.patch(url).json(patch).send().await?;
        read_json(response, Some(id)).await
    }

    async fn delete_card(&self, id: &str) -> RemoteResult<()> {
        let url = self.card_url(id)?;
        debug!("event=http_request module=remote method=DELETE path={}", url.path());
        let response = self.client.delete(url).send().await?;
        ensure_success(response, Some(id)).await.map(|_| ())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, id: Option<&str>) -> RemoteResult<T> {
    let body = ensure_success(response, id).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Returns the body of a 2xx response, or the matching error.
async fn ensure_success(response: Response, id: Option<&str>) -> RemoteResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(RemoteError::NotFound(id.to_string())),
        _ => Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        }),
    }
}

fn build_auth_headers(token: Option<&str>) -> RemoteResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|err| RemoteError::Config(format!("invalid auth_token: {err}")))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
