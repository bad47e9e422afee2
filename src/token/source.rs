// src/token/source.rs
use crate::endpoint;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Token endpoint responded with HTTP {0}")]
    HttpStatus(StatusCode),

    #[error("Token endpoint returned no csrf_token")]
    MissingToken,

    #[error("{0} cannot be a base URL")]
    InvalidBaseUrl(Url),
}

/// Where fresh anti-forgery tokens come from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<String, TokenError>;
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    csrf_token: Option<String>,
}

pub struct HttpTokenSource {
    url: Url,
    client: Client,
}

impl HttpTokenSource {
    /// `path` is resolved below `base_url`'s own path, the same way the
    /// check endpoints are.
    pub fn new(base_url: &Url, path: &str, timeout: Duration) -> Result<Self, TokenError> {
        let url = endpoint::path_under_base(base_url, path)
            .ok_or_else(|| TokenError::InvalidBaseUrl(base_url.clone()))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch_token(&self) -> Result<String, TokenError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TokenError::HttpStatus(status));
        }

        let body: RefreshResponse = response.json().await?;
        match body.csrf_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(TokenError::MissingToken),
        }
    }
}
