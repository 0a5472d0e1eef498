//! Bridge API HTTP client

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use lockbridge_readiness::{BridgeHeadState, EthFinalityState, StageTimings};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::BatchDepositsResponse;

/// HTTP client for the bridge's feed and proof endpoints
#[derive(Debug, Clone)]
pub struct BridgeClient {
    client: reqwest::Client,
    base_url: String,
}

impl BridgeClient {
    /// Create a new client from `config`
    pub fn try_new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Latest source-chain finality frontier
    pub async fn get_eth_finality(&self) -> Result<EthFinalityState> {
        self.get_json("/api/v1/feeds/eth-finality").await
    }

    /// Current batch job and sub-stage
    pub async fn get_bridge_head(&self) -> Result<BridgeHeadState> {
        self.get_json("/api/v1/feeds/bridge-head").await
    }

    /// Published average stage durations
    pub async fn get_stage_timings(&self) -> Result<StageTimings> {
        self.get_json("/api/v1/feeds/stage-timings").await
    }

    /// Deposits and committed root of the batch containing `block`
    pub async fn get_batch_deposits(&self, block: u64) -> Result<BatchDepositsResponse> {
        self.get_json(&format!("/api/v1/batches/{}/deposits", block))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else if status.as_u16() == 404 {
            Err(ClientError::NotFound(path.to_string()))
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Unauthorized(body))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::ApiError {
                status: status.as_u16(),
                message: body,
            })
        }
    }
}
