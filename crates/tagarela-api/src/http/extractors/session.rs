//! Session identifier header extractor.
//!
//! Reads the optional `X-Session-UUID` header. Its value is handed to the
//! orchestrator untouched; parsing and validation happen there.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::http::error::AppError;

/// Header carrying the caller's session identifier.
pub const SESSION_HEADER: &str = "x-session-uuid";

/// Session identifier from the `X-Session-UUID` header, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionHeader(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for SessionHeader {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(SESSION_HEADER) else {
            return Ok(SessionHeader(None));
        };

        let value = value.to_str().map_err(|_| {
            AppError::Validation("Invalid X-Session-UUID header encoding".to_string())
        })?;

        let trimmed = value.trim();
        Ok(SessionHeader((!trimmed.is_empty()).then(|| trimmed.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<SessionHeader, AppError> {
        let (mut parts, _) = request.into_parts();
        SessionHeader::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_header_is_none() {
        let header = extract(Request::new(())).await.unwrap();
        assert!(header.0.is_none());
    }

    #[tokio::test]
    async fn test_header_value_is_trimmed() {
        let request = Request::builder()
            .header("X-Session-UUID", "  0190a1b2-0000-7000-8000-000000000001 ")
            .body(())
            .unwrap();
        let header = extract(request).await.unwrap();
        assert_eq!(header.0.as_deref(), Some("0190a1b2-0000-7000-8000-000000000001"));
    }

    #[tokio::test]
    async fn test_blank_header_is_none() {
        let request = Request::builder()
            .header("X-Session-UUID", "   ")
            .body(())
            .unwrap();
        assert!(extract(request).await.unwrap().0.is_none());
    }
}
