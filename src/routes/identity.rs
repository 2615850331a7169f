//! Caller identity extraction from the `x-participant` header.
//!
//! The header carries an opaque participant token issued by the upstream
//! authentication layer; this extractor only checks presence. Token
//! verification is the upstream's job.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{AppError, ServiceError};

/// Name of the header carrying the participant token.
pub const PARTICIPANT_HEADER: &str = "x-participant";

/// Authenticated caller identity, extracted per request.
#[derive(Debug, Clone)]
pub struct Identity(pub String);

impl Identity {
    /// The participant identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(PARTICIPANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        if value.is_empty() {
            return Err(ServiceError::Unauthorized(format!(
                "missing `{PARTICIPANT_HEADER}` header"
            ))
            .into());
        }

        Ok(Identity(value.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Result<Identity, AppError> {
        let (mut parts, _body) = request.into_parts();
        Identity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn present_header_yields_identity() {
        let request = Request::builder()
            .header(PARTICIPANT_HEADER, "alice")
            .body(())
            .unwrap();
        let identity = extract(request).await.unwrap();
        assert_eq!(identity.as_str(), "alice");
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_unauthorized() {
        let missing = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(missing).await.unwrap_err(),
            AppError::Unauthorized(_)
        ));

        let blank = Request::builder()
            .header(PARTICIPANT_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(blank).await.unwrap_err(),
            AppError::Unauthorized(_)
        ));
    }
}
