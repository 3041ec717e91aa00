use crate::transport::http::types::{
    json_400, store_error_response, ApiResponse, AppState, StatusResponse, VerificationResultRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/pacts/provider/{provider}/consumer/{consumer}/version/{version}/verification-results",
    params(
        ("provider" = String, Path, description = "Provider name"),
        ("consumer" = String, Path, description = "Consumer name"),
        ("version" = String, Path, description = "Consumer version")
    ),
    request_body = VerificationResultRequest,
    responses(
        (status = 201, description = "Verification recorded", body = StatusResponse),
        (status = 400, description = "Invalid JSON body", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn record_verification_handler(
    State(state): State<AppState>,
    Path((provider, consumer, version)): Path<(String, String, String)>,
    request: Result<Json<VerificationResultRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_400(e, r#"{"success": bool, "providerVersion": string}"#).into_response(),
    };

    match state
        .store
        .record_verification(&consumer, &provider, &version, request.success)
        .await
    {
        Ok(()) => {
            tracing::info!(
                %consumer,
                %provider,
                %version,
                success = request.success,
                provider_version = request.provider_version.as_deref().unwrap_or_default(),
                "verification result recorded"
            );
            (StatusCode::CREATED, Json(StatusResponse::new("recorded"))).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}
