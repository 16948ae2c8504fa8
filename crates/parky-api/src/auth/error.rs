//! Authentication and authorization failures and their HTTP rendering

use super::jwt::TokenError;
use super::repository::RepositoryError;
use crate::error::ApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    DuplicateUser,

    #[error("Username or Password is incorrect")]
    InvalidCredentials,

    #[error("Error while registering: {0}")]
    RegistrationFailed(String),

    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UsernameTaken => AuthError::DuplicateUser,
            RepositoryError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
        }
    }
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::DuplicateUser
            | AuthError::InvalidCredentials
            | AuthError::RegistrationFailed(_) => StatusCode::BAD_REQUEST,
            AuthError::MissingToken | AuthError::InvalidAuthHeader | AuthError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Bodies never echo internals: every token failure reads the same,
        // and credential failures do not say which half was wrong.
        let error = match &self {
            AuthError::DuplicateUser => ApiError::new("DUPLICATE_USER", "Username already exists"),
            AuthError::InvalidCredentials => {
                ApiError::new("INVALID_CREDENTIALS", "Username or Password is incorrect")
            }
            AuthError::RegistrationFailed(_) => {
                ApiError::new("REGISTRATION_FAILED", "Error while registering")
            }
            AuthError::MissingToken | AuthError::InvalidAuthHeader | AuthError::InvalidToken(_) => {
                ApiError::unauthorized()
            }
            AuthError::Forbidden => ApiError::forbidden(),
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => ApiError::internal_error(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "authentication request failed");
        }

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_credential_errors_are_bad_requests_with_fixed_messages() {
        let (status, body) = body_of(AuthError::DuplicateUser).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username already exists");

        let (status, body) = body_of(AuthError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username or Password is incorrect");

        let (status, body) = body_of(AuthError::RegistrationFailed("hash".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Error while registering");
    }

    #[tokio::test]
    async fn test_token_errors_render_identically() {
        let expired = body_of(AuthError::InvalidToken(TokenError::Expired)).await;
        let tampered = body_of(AuthError::InvalidToken(TokenError::InvalidSignature)).await;
        let missing = body_of(AuthError::MissingToken).await;

        assert_eq!(expired.0, StatusCode::UNAUTHORIZED);
        assert_eq!(expired, tampered);
        assert_eq!(expired, missing);
    }

    #[tokio::test]
    async fn test_forbidden_and_store_errors() {
        let (status, _) = body_of(AuthError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = body_of(AuthError::StoreUnavailable("db down".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("db down"));
    }

    #[test]
    fn test_repository_errors_convert() {
        assert!(matches!(
            AuthError::from(RepositoryError::UsernameTaken),
            AuthError::DuplicateUser
        ));
        assert!(matches!(
            AuthError::from(RepositoryError::Unavailable("x".into())),
            AuthError::StoreUnavailable(_)
        ));
    }
}
