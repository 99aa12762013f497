//! Portal Definition Entity
//!
//! Static, compiled-in description of one portal, derived from the taxonomy
//! table when the registry is built.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::capability::{Capability, can};
use crate::domain::taxonomy;
use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag};

/// Where a denied caller is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeniedRedirect {
    /// Public site home
    Home,
    /// The default page of the caller's own landing portal, falling back to home
    CallerLanding,
}

#[derive(Debug, Clone)]
pub struct PortalDefinition {
    pub id: PortalId,
    /// `/{slug}`, no trailing slash
    pub path_prefix: String,
    /// Never empty
    pub allowed_roles: BTreeSet<RoleTag>,
    /// `{path_prefix}/login`, reachable without a session
    pub login_path: String,
    pub denied_redirect: DeniedRedirect,
    pub default_page: &'static str,
    pub pages: &'static [&'static str],
}

impl PortalDefinition {
    /// Build the definition for `id` from the taxonomy table
    pub fn from_taxonomy(id: PortalId) -> Self {
        let row = taxonomy::row(id);
        let path_prefix = format!("/{}", id.slug());

        Self {
            id,
            login_path: format!("{path_prefix}/login"),
            path_prefix,
            allowed_roles: taxonomy::allowed_roles(id),
            denied_redirect: row.denied,
            default_page: row.default_page,
            pages: row.pages,
        }
    }

    /// The whole admission rule, answered by the shared capability lookup
    #[inline]
    pub fn admits(&self, role: RoleTag) -> bool {
        can(role, Capability::EnterPortal(self.id))
    }

    pub fn has_page(&self, page: &str) -> bool {
        self.pages.contains(&page)
    }

    pub fn page_path(&self, page: &str) -> String {
        format!("{}/{}", self.path_prefix, page)
    }

    pub fn default_path(&self) -> String {
        self.page_path(self.default_page)
    }
}
