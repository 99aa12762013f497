//! Portal Guard Middleware
//!
//! Mounts the portal's guard over the request's browser session and waits
//! for it to settle. Authorized requests continue with a [`PortalAccess`]
//! extension; everything else is redirected.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::application::check_session::session_from_headers;
use crate::application::mount::mount;
use crate::application::redirect::{GuardView, RedirectPolicy};
use crate::domain::entity::guard_state::GuardState;
use crate::domain::repository::{IdentityProvider, RoleDirectory};
use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag, uid::Uid};
use crate::presentation::handlers::PortalState;

/// Admission stored in request extensions
#[derive(Debug, Clone)]
pub struct PortalAccess {
    pub portal: PortalId,
    pub uid: Uid,
    pub role: RoleTag,
}

/// Middleware that requires admission to the portal
pub async fn require_portal_access<P, D>(
    state: PortalState<P, D>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    P: IdentityProvider + Send + Sync + 'static,
    D: RoleDirectory + Send + Sync + 'static,
{
    let config = &state.app.config;
    let portal = &state.portal;

    let session = session_from_headers(config, req.headers());
    let subscription = state.app.provider.subscribe(session);

    let mut mounted = mount(
        portal.id,
        subscription,
        state.app.directory.clone(),
        config.role_lookup_timeout,
    );
    let settled = mounted.settled().await;
    drop(mounted);

    let Some(guard_state) = settled else {
        tracing::error!(portal = %portal.id, "Guard stopped before deciding");
        return Redirect::to(&RedirectPolicy::denied_target(portal, None, &config.home_path))
            .into_response();
    };

    match (RedirectPolicy::resolve(portal, &guard_state, &config.home_path), guard_state) {
        (GuardView::Render, GuardState::Authorized { uid, role }) => {
            req.extensions_mut().insert(PortalAccess {
                portal: portal.id,
                uid,
                role,
            });
            next.run(req).await
        }
        (GuardView::Redirect(target), _) => Redirect::to(&target).into_response(),
        // Settled states never load; anything unexpected fails closed
        (_, other) => {
            tracing::error!(portal = %portal.id, state = other.name(), "Unexpected guard view");
            Redirect::to(&RedirectPolicy::denied_target(portal, None, &config.home_path))
                .into_response()
        }
    }
}
