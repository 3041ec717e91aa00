use crate::transport::http::handlers::{contracts, health, matrix, verification};
use crate::transport::http::middleware::auth_middleware;
use crate::transport::http::types::{
    ApiResponse, AppState, ContractSummary, MatrixResponse, MatrixSummary, StatusResponse,
    VerificationResultRequest,
};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        contracts::list_contracts_handler,
        contracts::provider_contracts_handler,
        contracts::consumer_contracts_handler,
        contracts::get_contract_handler,
        contracts::latest_contract_handler,
        contracts::publish_contract_handler,
        contracts::delete_contract_handler,
        verification::record_verification_handler,
        matrix::matrix_handler
    ),
    components(schemas(
        ApiResponse,
        ContractSummary,
        StatusResponse,
        VerificationResultRequest,
        MatrixResponse,
        MatrixSummary
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/pacts", get(contracts::list_contracts_handler))
        .route("/pacts/provider/:provider", get(contracts::provider_contracts_handler))
        .route("/pacts/consumer/:consumer", get(contracts::consumer_contracts_handler))
        .route(
            "/pacts/provider/:provider/consumer/:consumer/version/:version",
            get(contracts::get_contract_handler)
                .post(contracts::publish_contract_handler)
                .put(contracts::publish_contract_handler)
                .delete(contracts::delete_contract_handler),
        )
        .route(
            "/pacts/provider/:provider/consumer/:consumer/latest",
            get(contracts::latest_contract_handler),
        )
        .route(
            "/pacts/provider/:provider/consumer/:consumer/version/:version/verification-results",
            post(verification::record_verification_handler),
        )
        .route("/matrix", get(matrix::matrix_handler))
        .layer(from_fn_with_state(app_state.clone(), auth_middleware))
        .with_state(app_state)
}
