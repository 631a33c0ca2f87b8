//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Deserialization failures become 400 responses; `validator` failures become
/// 422 responses with field-level details.
///
/// # Example
///
/// ```ignore
/// use fileshare::web::dto::ValidatedJson;
///
/// async fn login(
///     ValidatedJson(payload): ValidatedJson<LoginRequest>,
/// ) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
///     // payload.username is not empty here
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First, extract the JSON body
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        // Then, validate the deserialized value
        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_control_chars_valid() {
        assert!(no_control_chars("Hello, world!").is_ok());
        assert!(no_control_chars("Line 1\nLine 2").is_ok());
        assert!(no_control_chars("Tab\there").is_ok());
        assert!(no_control_chars("Return\rhere").is_ok());
    }

    #[test]
    fn test_no_control_chars_invalid() {
        assert!(no_control_chars("Hello\x00World").is_err()); // NULL byte
        assert!(no_control_chars("Hello\x07World").is_err()); // Bell
        assert!(no_control_chars("Hello\x1bWorld").is_err()); // Escape
    }

    #[tokio::test]
    async fn test_validated_json_rejects_invalid_body() {
        use crate::web::dto::LoginRequest;
        use crate::web::error::ErrorCode;
        use axum::body::Body;
        use axum::http::header::CONTENT_TYPE;

        let req = axum::http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"","password":"x"}"#))
            .unwrap();
        let err = ValidatedJson::<LoginRequest>::from_request(req, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let req = axum::http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let err = ValidatedJson::<LoginRequest>::from_request(req, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::BadRequest);
    }
}
