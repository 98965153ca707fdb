use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Uniform response envelope. Every endpoint, success or failure, returns this
/// shape; whichever of `data`/`error` is unused defaults to an empty string.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Value,
    pub error: Value,
}

impl ApiResponse {
    pub fn success(data: impl Serialize) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).unwrap_or(Value::String(String::new())),
            error: Value::String(String::new()),
        }
    }

    pub fn failure(error: impl Serialize) -> Self {
        Self {
            success: false,
            data: Value::String(String::new()),
            error: serde_json::to_value(error).unwrap_or(Value::String(String::new())),
        }
    }
}

/// 200 with the success envelope.
pub fn ok(data: impl Serialize) -> (StatusCode, Json<ApiResponse>) {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// 201 with the success envelope.
pub fn created(data: impl Serialize) -> (StatusCode, Json<ApiResponse>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_has_empty_error() {
        let body = serde_json::to_value(ApiResponse::success(json!({"id": 1}))).unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["id"], json!(1));
        assert_eq!(body["error"], json!(""));
    }

    #[test]
    fn failure_envelope_has_empty_data() {
        let body = serde_json::to_value(ApiResponse::failure("Invalid credentials")).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["data"], json!(""));
        assert_eq!(body["error"], json!("Invalid credentials"));
    }
}
