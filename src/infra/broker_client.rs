//! HTTP client for the broker API.

use crate::domain::contract::Contract;
use crate::transport::http::types::{ContractSummary, MatrixResponse, VerificationResultRequest};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum BrokerClientError {
    #[error("invalid broker URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("broker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("broker returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode broker response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Typed access to a running broker.
#[derive(Debug, Clone)]
pub struct BrokerClient {
    base: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl BrokerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BrokerClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, BrokerClientError> {
        let base = Url::parse(base_url).map_err(|e| BrokerClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(BrokerClientError::InvalidUrl {
                url: base_url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        Ok(Self {
            base,
            token: None,
            client,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn expect_success(response: reqwest::Response) -> Result<String, BrokerClientError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BrokerClientError::Status { status, body });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BrokerClientError> {
        let response = self.authorize(self.client.get(url)).send().await?;
        let body = Self::expect_success(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Publishes under `version`; the broker takes names from the contract.
    pub async fn publish(&self, contract: &Contract, version: &str) -> Result<(), BrokerClientError> {
        let url = self.endpoint(&[
            "pacts",
            "provider",
            &contract.provider.name,
            "consumer",
            &contract.consumer.name,
            "version",
            version,
        ]);
        tracing::debug!(%url, "publishing contract");
        let response = self.authorize(self.client.put(url).json(contract)).send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    pub async fn fetch(&self, consumer: &str, provider: &str, version: Option<&str>) -> Result<Contract, BrokerClientError> {
        let url = match version {
            Some(v) => self.endpoint(&["pacts", "provider", provider, "consumer", consumer, "version", v]),
            None => self.endpoint(&["pacts", "provider", provider, "consumer", consumer, "latest"]),
        };
        self.get_json(url).await
    }

    pub async fn list(&self) -> Result<Vec<ContractSummary>, BrokerClientError> {
        self.get_json(self.endpoint(&["pacts"])).await
    }

    pub async fn record_verification(
        &self,
        consumer: &str,
        provider: &str,
        version: &str,
        success: bool,
        provider_version: Option<&str>,
    ) -> Result<(), BrokerClientError> {
        let url = self.endpoint(&[
            "pacts",
            "provider",
            provider,
            "consumer",
            consumer,
            "version",
            version,
            "verification-results",
        ]);
        let body = VerificationResultRequest {
            success,
            provider_version: provider_version.map(str::to_string),
        };
        let response = self.authorize(self.client.post(url).json(&body)).send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    pub async fn can_i_deploy(&self, pacticipant: &str, version: &str) -> Result<MatrixResponse, BrokerClientError> {
        let mut url = self.endpoint(&["matrix"]);
        url.query_pairs_mut()
            .append_pair("pacticipant", pacticipant)
            .append_pair("version", version);
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_encode_segments_and_keep_base_path() {
        let client = BrokerClient::new("http://broker.local/api/", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["pacts", "provider", "User Service", "latest"]);
        assert_eq!(url.as_str(), "http://broker.local/api/pacts/provider/User%20Service/latest");
    }

    #[test]
    fn non_base_urls_are_rejected() {
        assert!(BrokerClient::new("mailto:ops@example.com", Duration::from_secs(1)).is_err());
        assert!(BrokerClient::new("not a url", Duration::from_secs(1)).is_err());
    }
}
