//! Gate Router
//!
//! One nested router per portal. The login and logout routes are merged in
//! after the guard layer is applied, so they are never behind the guard.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::domain::entity::portal_definition::PortalDefinition;
use crate::domain::repository::{IdentityProvider, RoleDirectory};
use crate::presentation::handlers::{self, GateAppState, PortalState};
use crate::presentation::middleware::require_portal_access;

/// Create the gate router: public home plus every registered portal
pub fn gate_router<P, D>(state: GateAppState<P, D>) -> Router
where
    P: IdentityProvider + Send + Sync + 'static,
    D: RoleDirectory + Send + Sync + 'static,
{
    let mut router = Router::new()
        .route("/", get(handlers::home))
        .with_state(state.registry.clone());

    for portal in state.registry.iter() {
        router = router.nest(&portal.path_prefix, portal_router(state.clone(), portal.clone()));
    }

    router
}

/// Routes of one portal, relative to its path prefix
pub fn portal_router<P, D>(app: GateAppState<P, D>, portal: Arc<PortalDefinition>) -> Router
where
    P: IdentityProvider + Send + Sync + 'static,
    D: RoleDirectory + Send + Sync + 'static,
{
    let state = PortalState { app, portal };
    let guard_state = state.clone();

    let guarded = Router::new()
        .route("/", get(handlers::index::<P, D>))
        .route("/{page}", get(handlers::page::<P, D>))
        .route_layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
            require_portal_access(guard_state.clone(), req, next)
        }));

    let unguarded = Router::new()
        .route(
            "/login",
            get(handlers::show_login::<P, D>).post(handlers::submit_login::<P, D>),
        )
        .route("/logout", post(handlers::logout::<P, D>));

    guarded.merge(unguarded).with_state(state)
}
