use crate::domain::contract::Contract;
use crate::storage::StoreError;
use crate::transport::http::types::{
    json_400, store_error_response, ApiResponse, AppState, ContractSummary, StatusResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

fn summaries(result: Result<Vec<Contract>, StoreError>) -> axum::response::Response {
    match result {
        Ok(contracts) => {
            let rows: Vec<ContractSummary> = contracts.iter().map(ContractSummary::from).collect();
            (StatusCode::OK, Json(rows)).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

fn contract_document(result: Result<Contract, StoreError>) -> axum::response::Response {
    match result {
        Ok(contract) => (StatusCode::OK, Json(contract)).into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/pacts",
    responses(
        (status = 200, description = "Latest contract of every pair", body = [ContractSummary]),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_contracts_handler(State(state): State<AppState>) -> impl IntoResponse {
    summaries(state.store.list_contracts().await)
}

#[utoipa::path(
    get,
    path = "/pacts/provider/{provider}",
    params(("provider" = String, Path, description = "Provider name")),
    responses(
        (status = 200, description = "Latest contract of every consumer of the provider", body = [ContractSummary]),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn provider_contracts_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    summaries(state.store.contracts_by_provider(&provider).await)
}

#[utoipa::path(
    get,
    path = "/pacts/consumer/{consumer}",
    params(("consumer" = String, Path, description = "Consumer name")),
    responses(
        (status = 200, description = "Latest contract of every provider of the consumer", body = [ContractSummary]),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn consumer_contracts_handler(
    State(state): State<AppState>,
    Path(consumer): Path<String>,
) -> impl IntoResponse {
    summaries(state.store.contracts_by_consumer(&consumer).await)
}

#[utoipa::path(
    get,
    path = "/pacts/provider/{provider}/consumer/{consumer}/version/{version}",
    params(
        ("provider" = String, Path, description = "Provider name"),
        ("consumer" = String, Path, description = "Consumer name"),
        ("version" = String, Path, description = "Consumer version")
    ),
    responses(
        (status = 200, description = "Contract document"),
        (status = 404, description = "No such contract", body = ApiResponse)
    )
)]
pub async fn get_contract_handler(
    State(state): State<AppState>,
    Path((provider, consumer, version)): Path<(String, String, String)>,
) -> impl IntoResponse {
    contract_document(state.store.get_contract(&consumer, &provider, &version).await)
}

#[utoipa::path(
    get,
    path = "/pacts/provider/{provider}/consumer/{consumer}/latest",
    params(
        ("provider" = String, Path, description = "Provider name"),
        ("consumer" = String, Path, description = "Consumer name")
    ),
    responses(
        (status = 200, description = "Contract document at the latest version"),
        (status = 404, description = "Pair has no versions", body = ApiResponse)
    )
)]
pub async fn latest_contract_handler(
    State(state): State<AppState>,
    Path((provider, consumer)): Path<(String, String)>,
) -> impl IntoResponse {
    contract_document(state.store.get_contract(&consumer, &provider, "").await)
}

/// Consumer, provider and version in the stored document come from the URL.
#[utoipa::path(
    post,
    path = "/pacts/provider/{provider}/consumer/{consumer}/version/{version}",
    params(
        ("provider" = String, Path, description = "Provider name"),
        ("consumer" = String, Path, description = "Consumer name"),
        ("version" = String, Path, description = "Consumer version")
    ),
    request_body(content = Object, content_type = "application/json", description = "Contract document"),
    responses(
        (status = 201, description = "Contract stored", body = StatusResponse),
        (status = 400, description = "Invalid JSON body", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn publish_contract_handler(
    State(state): State<AppState>,
    Path((provider, consumer, version)): Path<(String, String, String)>,
    request: Result<Json<Contract>, JsonRejection>,
) -> impl IntoResponse {
    let Json(mut contract) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e, "a contract document").into_response(),
    };

    contract.consumer.name = consumer;
    contract.provider.name = provider;
    contract.set_version(version);

    match state.store.save_contract(&contract).await {
        Ok(()) => {
            tracing::info!(
                consumer = %contract.consumer.name,
                provider = %contract.provider.name,
                version = %contract.version(),
                interactions = contract.interactions.len(),
                "contract published"
            );
            (StatusCode::CREATED, Json(StatusResponse::new("created"))).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/pacts/provider/{provider}/consumer/{consumer}/version/{version}",
    params(
        ("provider" = String, Path, description = "Provider name"),
        ("consumer" = String, Path, description = "Consumer name"),
        ("version" = String, Path, description = "Consumer version")
    ),
    responses(
        (status = 204, description = "Contract and its verification result removed"),
        (status = 404, description = "No such contract", body = ApiResponse)
    )
)]
pub async fn delete_contract_handler(
    State(state): State<AppState>,
    Path((provider, consumer, version)): Path<(String, String, String)>,
) -> impl IntoResponse {
    match state.store.delete_contract(&consumer, &provider, &version).await {
        Ok(()) => {
            tracing::info!(%consumer, %provider, %version, "contract deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}
