use crate::domain::contract::Contract;
use crate::domain::matrix::Deployability;
use crate::storage::{ContractStore, StoreError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContractStore>,
    /// When set, every route except `/health` requires `Authorization: Bearer <token>`.
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContractStore>) -> Self {
        Self { store, api_token: None }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        let token: String = token.into();
        self.api_token = (!token.is_empty()).then(|| Arc::from(token));
        self
    }
}

/// Envelope for errors and non-contract payloads.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One row of a contract listing: the latest version of a pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ContractSummary {
    pub consumer: String,
    pub provider: String,
    pub version: String,
}

impl From<&Contract> for ContractSummary {
    fn from(contract: &Contract) -> Self {
        Self {
            consumer: contract.consumer.name.clone(),
            provider: contract.provider.name.clone(),
            version: contract.version().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResultRequest {
    pub success: bool,
    #[serde(default)]
    pub provider_version: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct MatrixQuery {
    /// Consumer whose version is about to be deployed.
    #[serde(default)]
    pub pacticipant: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct MatrixSummary {
    pub deployable: bool,
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct MatrixResponse {
    pub deployable: bool,
    pub summary: MatrixSummary,
}

impl From<Deployability> for MatrixResponse {
    fn from(d: Deployability) -> Self {
        Self {
            deployable: d.deployable,
            summary: MatrixSummary {
                deployable: d.deployable,
                reason: d.reason,
            },
        }
    }
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiResponse>) {
    (status, Json(ApiResponse::error(message)))
}

/// Not-found maps to 404, everything else to 500.
pub fn store_error_response(err: StoreError) -> (StatusCode, Json<ApiResponse>) {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        tracing::error!(error = %err, "contract store failure");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_response(status, err.to_string())
}

pub fn json_400(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid JSON body: {} (expected: {})", err, expected),
    )
}
