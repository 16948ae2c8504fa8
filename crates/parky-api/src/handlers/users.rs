//! Registration and authentication handlers
//!
//! Both routes are public. Failures carry only the fixed user-facing
//! messages; the reason is recorded in the audit log instead. Bodies that do
//! not parse as credentials fail the same way as credentials that do.

use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::auth::{AuthError, Credentials, IssuedToken, RegisteredUser};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// `POST /api/v1/users/register`
///
/// * `200 OK` - account created, body is the new user's id, name and role
/// * `400 Bad Request` - "Username already exists" or "Error while registering"
/// * `500 Internal Server Error` - credential store unavailable
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<RegisteredUser>, AuthError> {
    let ip_address = extract_ip_address(&headers);
    let user_agent = extract_user_agent(&headers);

    let Json(credentials) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let error = AuthError::RegistrationFailed(rejection.body_text());
            audit_log(&AuditEvent::RegistrationFailure {
                username: String::new(),
                reason: error.to_string(),
                ip_address,
                user_agent,
            });
            return Err(error);
        }
    };

    let result = match credentials.validate() {
        Ok(()) => state.authenticator.register(&credentials).await,
        Err(e) => Err(AuthError::RegistrationFailed(e.to_string())),
    };

    match result {
        Ok(user) => {
            audit_log(&AuditEvent::RegistrationSuccess {
                user_id: user.id,
                username: user.username.clone(),
                role: user.role.to_string(),
                ip_address,
                user_agent,
            });
            Ok(Json(RegisteredUser::from(&user)))
        }
        Err(e) => {
            audit_log(&AuditEvent::RegistrationFailure {
                username: credentials.username.clone(),
                reason: e.to_string(),
                ip_address,
                user_agent,
            });
            Err(e)
        }
    }
}

/// `POST /api/v1/users/authenticate`
///
/// * `200 OK` - body is the issued token with its metadata
/// * `400 Bad Request` - "Username or Password is incorrect"
/// * `500 Internal Server Error` - credential store unavailable
pub async fn authenticate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<IssuedToken>, AuthError> {
    let ip_address = extract_ip_address(&headers);
    let user_agent = extract_user_agent(&headers);

    let Json(credentials) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            audit_log(&AuditEvent::LoginFailure {
                username: String::new(),
                reason: format!("unreadable request body: {}", rejection.body_text()),
                ip_address,
                user_agent,
            });
            return Err(AuthError::InvalidCredentials);
        }
    };

    let result = match credentials.validate() {
        Ok(()) => state.authenticator.authenticate(&credentials).await,
        Err(_) => Err(AuthError::InvalidCredentials),
    };

    match result {
        Ok(issued) => {
            audit_log(&AuditEvent::LoginSuccess {
                user_id: issued.user_id,
                username: issued.username.clone(),
                role: issued.role.to_string(),
                ip_address,
                user_agent,
            });
            Ok(Json(issued))
        }
        Err(e) => {
            audit_log(&AuditEvent::LoginFailure {
                username: credentials.username.clone(),
                reason: e.to_string(),
                ip_address,
                user_agent,
            });
            Err(e)
        }
    }
}
