//! API route definitions

use crate::auth::middleware::auth_middleware;
use crate::handlers::{health, national_parks, trails, users};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Route templates
///
/// Shared by the router and the access policy, which keys its rules on the
/// matched template.
pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const READY: &str = "/ready";

    pub const REGISTER: &str = "/api/v1/users/register";
    pub const AUTHENTICATE: &str = "/api/v1/users/authenticate";

    pub const NATIONAL_PARKS: &str = "/api/v1/nationalparks";
    pub const NATIONAL_PARK: &str = "/api/v1/nationalparks/:national_park_id";

    pub const TRAILS: &str = "/api/v1/trails";
    pub const TRAIL: &str = "/api/v1/trails/:trail_id";
    pub const TRAILS_IN_PARK: &str = "/api/v1/trails/in-national-park/:national_park_id";
}

/// Build the public and protected routes
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route(paths::HEALTH, get(health::health_check))
        .route(paths::READY, get(health::readiness_check))
        .route(paths::REGISTER, post(users::register_handler))
        .route(paths::AUTHENTICATE, post(users::authenticate_handler));

    // Protected routes (token required, then the access policy)
    let protected_routes = Router::new()
        .route(
            paths::NATIONAL_PARKS,
            get(national_parks::list_national_parks).post(national_parks::create_national_park),
        )
        .route(
            paths::NATIONAL_PARK,
            get(national_parks::get_national_park)
                .patch(national_parks::update_national_park)
                .delete(national_parks::delete_national_park),
        )
        .route(
            paths::TRAILS,
            get(trails::list_trails).post(trails::create_trail),
        )
        .route(
            paths::TRAIL,
            get(trails::get_trail)
                .patch(trails::update_trail)
                .delete(trails::delete_trail),
        )
        .route(paths::TRAILS_IN_PARK, get(trails::trails_in_national_park))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
