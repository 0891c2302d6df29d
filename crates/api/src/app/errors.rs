use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use scriptaudit_ai::{AiError, ProviderError};

pub fn ai_error_to_response(err: AiError) -> axum::response::Response {
    match err {
        AiError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_request", msg),
        AiError::Provider(ProviderError::NotConfigured) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "provider_unconfigured",
            "no completion provider is configured (set OPENROUTER_API_KEY)",
        ),
        AiError::Provider(e) => json_error(StatusCode::BAD_GATEWAY, "analysis_failed", e.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
