//! Page DTOs
//!
//! Portal pages are served as small JSON descriptors; their content and
//! styling belong to the front end.

use serde::{Deserialize, Serialize};

use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag};

// ============================================================================
// Home
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub portals: Vec<PortalLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalLink {
    pub portal: PortalId,
    pub title: String,
    pub login_path: String,
}

// ============================================================================
// Login
// ============================================================================

/// Login form body (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPage {
    pub portal: PortalId,
    pub title: String,
    /// Form target
    pub action: String,
    /// Inline notice after a failed attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Protected Pages
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub portal: PortalId,
    pub title: String,
    pub page: String,
    pub uid: String,
    pub role: RoleTag,
    /// Navigation entries this role may open
    pub nav: Vec<NavLink>,
    pub logout_action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLink {
    pub page: String,
    pub path: String,
}
