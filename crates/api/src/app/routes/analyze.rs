use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::Extension,
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
};
use serde_json::Value;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub const ANALYSIS_ID_HEADER: HeaderName = HeaderName::from_static("x-analysis-id");
pub const ANALYSIS_OUTCOME_HEADER: HeaderName = HeaderName::from_static("x-analysis-outcome");

pub async fn analyze(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request_body", e.to_string());
        }
    };

    let request = match dto::parse_analyze_request(&body) {
        Ok(r) => r,
        Err(res) => return res,
    };

    let (id, normalized) = match services.analyze(request).await {
        Ok(done) => done,
        Err(e) => return errors::ai_error_to_response(e),
    };

    let mut res = (StatusCode::OK, Json(normalized.result)).into_response();
    let headers = res.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        headers.insert(ANALYSIS_ID_HEADER, value);
    }
    headers.insert(
        ANALYSIS_OUTCOME_HEADER,
        HeaderValue::from_static(normalized.outcome.label()),
    );
    res
}
