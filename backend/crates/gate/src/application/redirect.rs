//! Redirect Policy
//!
//! Maps a guard's state to what the portal shows: the loading indicator,
//! the protected page, or a redirect.

use crate::domain::entity::{
    guard_state::GuardState,
    portal_definition::{DeniedRedirect, PortalDefinition},
};
use crate::domain::taxonomy;
use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardView {
    /// No decision yet; block on a loading indicator
    Loading,
    /// Render the protected subtree
    Render,
    Redirect(String),
}

pub struct RedirectPolicy;

impl RedirectPolicy {
    pub fn resolve(definition: &PortalDefinition, state: &GuardState, home: &str) -> GuardView {
        match state {
            GuardState::Unknown | GuardState::CheckingRole { .. } => GuardView::Loading,
            GuardState::SignedOut => GuardView::Redirect(definition.login_path.clone()),
            GuardState::Authorized { .. } => GuardView::Render,
            GuardState::Denied { reason, .. } => {
                GuardView::Redirect(Self::denied_target(definition, reason.role(), home))
            }
        }
    }

    /// Where a denied caller goes. Caller-landing portals send the caller to
    /// their own portal when the role is known and that portal is elsewhere.
    pub fn denied_target(definition: &PortalDefinition, role: Option<RoleTag>, home: &str) -> String {
        match definition.denied_redirect {
            DeniedRedirect::Home => home.to_string(),
            DeniedRedirect::CallerLanding => role
                .and_then(taxonomy::landing_portal)
                .filter(|landing| *landing != definition.id)
                .map(landing_path)
                .unwrap_or_else(|| home.to_string()),
        }
    }
}

/// Default page of a portal
pub fn landing_path(portal: PortalId) -> String {
    format!("/{}/{}", portal.slug(), taxonomy::row(portal).default_page)
}
