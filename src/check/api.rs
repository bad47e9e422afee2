// src/check/api.rs
use super::error::CheckError;
use super::types::{CheckRequest, CheckResponse, StartBody};
use crate::endpoint;
use crate::page::Page;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Transport for the campaign-check endpoints.
#[async_trait]
pub trait CheckApi: Send + Sync {
    async fn start_check(&self, request: &CheckRequest) -> Result<CheckResponse, CheckError>;

    async fn check_status(&self, check_id: &str) -> Result<CheckResponse, CheckError>;
}

pub struct HttpCheckApi {
    base_url: Url,
    client: Client,
    page: Arc<Page>,
}

impl HttpCheckApi {
    /// The anti-forgery header is read from `page` on every start request.
    pub fn new(base_url: Url, timeout: Duration, page: Arc<Page>) -> Result<Self, CheckError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            client,
            page,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CheckError> {
        endpoint::under_base(&self.base_url, segments)
            .ok_or_else(|| CheckError::Protocol(format!("{} cannot be a base URL", self.base_url)))
    }

    async fn decode(response: Response) -> Result<CheckResponse, CheckError> {
        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::HttpStatus(status));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CheckError::Protocol(format!("invalid JSON body: {}", e)))
    }
}

#[async_trait]
impl CheckApi for HttpCheckApi {
    async fn start_check(&self, request: &CheckRequest) -> Result<CheckResponse, CheckError> {
        let url = self.endpoint(&["campaigns", "check", &request.campaign_id])?;
        debug!("Starting check for campaign {} via {}", request.campaign_id, url);

        let response = self
            .client
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("X-CSRFToken", self.page.meta_token().as_str())
            .json(&StartBody {
                check_period: request.period,
            })
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn check_status(&self, check_id: &str) -> Result<CheckResponse, CheckError> {
        let url = self.endpoint(&["campaigns", "check-status", check_id])?;
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }
}
