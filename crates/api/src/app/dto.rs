use axum::http::StatusCode;
use serde_json::Value;

use scriptaudit_ai::AnalysisRequest;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Validate a decoded `POST /api/analyze` body.
///
/// A field that is absent, `null`, `false`, `0` or `""` counts as missing.
/// Present but blank or non-string values are invalid.
pub fn parse_analyze_request(body: &Value) -> Result<AnalysisRequest, axum::response::Response> {
    let Some(obj) = body.as_object() else {
        return Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_request_body",
            "request body must be a JSON object",
        ));
    };

    let script = obj.get("script").filter(|v| !is_falsy(v));
    let model = obj.get("model").filter(|v| !is_falsy(v));
    let (Some(script), Some(model)) = (script, model) else {
        return Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_required_fields",
            "both script and model are required",
        ));
    };

    let script = non_blank(script).ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_script",
            "script must be a non-empty string",
        )
    })?;
    let model = non_blank(model).ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_model",
            "model must be a non-empty string",
        )
    })?;

    Ok(AnalysisRequest::new(script, model))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}
