//! Capability Lookup
//!
//! One answer to "can this role do X": entering a portal, and seeing or
//! opening a restricted navigation item inside one. The guard, the nav
//! rendering, and the page handlers all ask [`can`].

use serde::Serialize;

use crate::domain::taxonomy;
use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag};

/// Navigation entries narrower than their portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavItem {
    SundaySchoolSuperintendent,
    FinanceReports,
    UsherRoster,
    MediaUploads,
}

impl NavItem {
    pub const ALL: [NavItem; 4] = [
        NavItem::SundaySchoolSuperintendent,
        NavItem::FinanceReports,
        NavItem::UsherRoster,
        NavItem::MediaUploads,
    ];

    pub const fn portal(&self) -> PortalId {
        match self {
            NavItem::SundaySchoolSuperintendent => PortalId::SundaySchool,
            NavItem::FinanceReports => PortalId::Finance,
            NavItem::UsherRoster => PortalId::Usher,
            NavItem::MediaUploads => PortalId::Media,
        }
    }

    pub const fn page(&self) -> &'static str {
        match self {
            NavItem::SundaySchoolSuperintendent => "superintendent",
            NavItem::FinanceReports => "reports",
            NavItem::UsherRoster => "roster",
            NavItem::MediaUploads => "uploads",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            NavItem::SundaySchoolSuperintendent => "Superintendent",
            NavItem::FinanceReports => "Reports",
            NavItem::UsherRoster => "Roster",
            NavItem::MediaUploads => "Uploads",
        }
    }

    /// Domain roles that unlock the item; the portal's override roles are added on top
    const fn domain_roles(&self) -> &'static [RoleTag] {
        match self {
            NavItem::SundaySchoolSuperintendent => &[RoleTag::SundaySchoolSuperintendent],
            NavItem::FinanceReports => &[RoleTag::Treasurer],
            NavItem::UsherRoster => &[RoleTag::UsherLeader],
            NavItem::MediaUploads => &[RoleTag::MediaLeader],
        }
    }

    /// The restricted item behind `page` of `portal`, if any
    pub fn for_page(portal: PortalId, page: &str) -> Option<NavItem> {
        Self::ALL
            .into_iter()
            .find(|item| item.portal() == portal && item.page() == page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    EnterPortal(PortalId),
    OpenNavItem(NavItem),
}

/// The single decision point for role-based access
pub fn can(role: RoleTag, capability: Capability) -> bool {
    match capability {
        Capability::EnterPortal(portal) => taxonomy::allowed_roles(portal).contains(&role),
        Capability::OpenNavItem(item) => {
            let overrides = taxonomy::row(item.portal()).overrides.roles();
            can(role, Capability::EnterPortal(item.portal()))
                && (item.domain_roles().contains(&role) || overrides.contains(&role))
        }
    }
}

/// Whether `role` may open `page` of `portal`, given it may enter the portal
pub fn can_open_page(role: RoleTag, portal: PortalId, page: &str) -> bool {
    match NavItem::for_page(portal, page) {
        Some(item) => can(role, Capability::OpenNavItem(item)),
        None => can(role, Capability::EnterPortal(portal)),
    }
}
