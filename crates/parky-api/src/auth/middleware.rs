/// Token validation and authorization middleware
///
/// Runs once per protected request, before the handler:
/// 1. Extract the `Authorization: Bearer <token>` header
/// 2. Validate signature, issuer and expiry
/// 3. Ask the access policy whether the token's role may call this route
/// 4. Attach the [`AuthenticatedUser`] to request extensions
///
/// Any failure rejects the request without reaching the handler.
use super::error::AuthError;
use super::models::AuthenticatedUser;
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Pull the bearer token out of the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Authentication middleware that requires a valid token
///
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .route_layer(middleware::from_fn_with_state(state, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let ip_address = extract_ip_address(request.headers());
    let user_agent = extract_user_agent(request.headers());

    let token = match extract_bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => {
            audit_log(&AuditEvent::InvalidToken {
                ip_address,
                user_agent,
                reason: e.to_string(),
            });
            return Err(e);
        }
    };

    let claims = match state.tokens.validate(token) {
        Ok(claims) => claims,
        Err(e) => {
            audit_log(&AuditEvent::InvalidToken {
                ip_address,
                user_agent,
                reason: e.to_string(),
            });
            return Err(AuthError::InvalidToken(e));
        }
    };

    let user = AuthenticatedUser::from(claims);

    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().clone();

    if let Err(e) = state.policy.authorize(&method, &route, &user) {
        audit_log(&AuditEvent::AccessDenied {
            user_id: user.user_id,
            username: user.username.clone(),
            role: user.role.to_string(),
            resource: format!("{method} {route}"),
            token_id: user.jti.clone(),
            ip_address,
            user_agent,
        });
        return Err(e);
    }

    tracing::debug!(username = %user.username, role = %user.role, %method, %route, "request authorized");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
