//! Role Taxonomy
//!
//! The single table that says which roles open which portal. Every
//! allow-list is derived as `domain_roles ∪ overrides.roles()`; nothing else
//! in the crate lists role tags per portal.

use std::collections::{BTreeSet, HashSet};

use crate::domain::entity::portal_definition::DeniedRedirect;
use crate::domain::value_object::{portal_id::PortalId, role_tag::RoleTag};
use crate::error::{GateError, GateResult};

/// Which global-override tags a portal admits on top of its domain roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverridePolicy {
    /// `admin` and `super_admin`
    Standard,
    /// `admin` only. Kept for the volunteer portal until the church office
    /// confirms whether `super_admin` should be admitted there.
    AdminOnly,
    /// `super_admin` only
    SuperAdminOnly,
}

impl OverridePolicy {
    pub const fn roles(&self) -> &'static [RoleTag] {
        match self {
            OverridePolicy::Standard => &RoleTag::GLOBAL_OVERRIDES,
            OverridePolicy::AdminOnly => &[RoleTag::Admin],
            OverridePolicy::SuperAdminOnly => &[RoleTag::SuperAdmin],
        }
    }
}

/// One row of the taxonomy table
#[derive(Debug)]
pub struct PortalRow {
    pub id: PortalId,
    pub domain_roles: &'static [RoleTag],
    pub overrides: OverridePolicy,
    pub denied: DeniedRedirect,
    pub default_page: &'static str,
    pub pages: &'static [&'static str],
}

use OverridePolicy::*;
use RoleTag as R;

const DASHBOARD: &str = "dashboard";

/// Indexed by `PortalId::index()`
pub static PORTALS: [PortalRow; 17] = [
    PortalRow {
        id: PortalId::Youth,
        domain_roles: &[R::YouthLeader, R::YouthMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "events", "members"],
    },
    PortalRow {
        id: PortalId::Esther,
        domain_roles: &[R::EstherLeader, R::EstherMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "events", "members", "prayer-requests"],
    },
    PortalRow {
        id: PortalId::Men,
        domain_roles: &[R::MenLeader, R::MenMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "events", "members"],
    },
    PortalRow {
        id: PortalId::Worship,
        domain_roles: &[R::WorshipLeader, R::WorshipMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "setlists", "rehearsals"],
    },
    PortalRow {
        id: PortalId::Hospitality,
        domain_roles: &[R::HospitalityLeader, R::HospitalityMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "schedule", "requests"],
    },
    PortalRow {
        id: PortalId::Prayer,
        domain_roles: &[R::PrayerLeader, R::PrayerMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "requests", "chains"],
    },
    PortalRow {
        id: PortalId::Media,
        domain_roles: &[R::MediaLeader, R::MediaMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "gallery", "uploads"],
    },
    PortalRow {
        id: PortalId::Evangelism,
        domain_roles: &[R::EvangelismLeader, R::EvangelismMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "outreach", "contacts"],
    },
    PortalRow {
        id: PortalId::Usher,
        domain_roles: &[R::UsherLeader, R::UsherMember],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "incidents", "roster"],
    },
    PortalRow {
        id: PortalId::Finance,
        domain_roles: &[R::FinanceOfficer, R::Treasurer],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "ledger", "reports"],
    },
    PortalRow {
        id: PortalId::Children,
        domain_roles: &[R::ChildrenLeader, R::ChildrenTeacher],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "classes", "check-in"],
    },
    PortalRow {
        id: PortalId::Members,
        domain_roles: &[R::Member],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "profile", "directory"],
    },
    PortalRow {
        id: PortalId::SundaySchool,
        domain_roles: &[
            R::SundaySchoolSuperintendent,
            R::SundaySchoolTeacher,
            R::SundaySchoolStudent,
        ],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "lessons", "attendance", "superintendent"],
    },
    PortalRow {
        id: PortalId::Volunteer,
        domain_roles: &[R::Volunteer],
        overrides: AdminOnly,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "opportunities", "schedule"],
    },
    PortalRow {
        id: PortalId::Store,
        domain_roles: &[R::StoreManager, R::StoreStaff],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "products", "orders"],
    },
    PortalRow {
        id: PortalId::Admin,
        domain_roles: &[],
        overrides: Standard,
        denied: DeniedRedirect::Home,
        default_page: DASHBOARD,
        pages: &["dashboard", "users", "portals"],
    },
    PortalRow {
        id: PortalId::SuperAdmin,
        domain_roles: &[],
        overrides: SuperAdminOnly,
        denied: DeniedRedirect::CallerLanding,
        default_page: DASHBOARD,
        pages: &["dashboard", "roles", "audit"],
    },
];

/// Taxonomy row for a portal. Total over `PortalId`.
#[inline]
pub fn row(id: PortalId) -> &'static PortalRow {
    let row = &PORTALS[id.index()];
    debug_assert_eq!(row.id, id, "taxonomy table out of order");
    row
}

/// `domain_roles(p) ∪ override_roles(p)`
pub fn allowed_roles(id: PortalId) -> BTreeSet<RoleTag> {
    let row = row(id);
    row.domain_roles
        .iter()
        .chain(row.overrides.roles())
        .copied()
        .collect()
}

/// The portal a role "belongs to": where it lands after sign-in and where
/// a caller-landing redirect sends it.
pub fn landing_portal(role: RoleTag) -> Option<PortalId> {
    match role {
        RoleTag::Admin => Some(PortalId::Admin),
        RoleTag::SuperAdmin => Some(PortalId::SuperAdmin),
        _ => PORTALS
            .iter()
            .find(|row| row.domain_roles.contains(&role))
            .map(|row| row.id),
    }
}

/// Check the table's structural invariants. Called once at startup so a bad
/// edit fails before the server binds.
pub fn validate() -> GateResult<()> {
    let mut slugs = HashSet::new();

    for (i, row) in PORTALS.iter().enumerate() {
        if row.id.index() != i {
            return Err(GateError::InvalidConfig(format!(
                "taxonomy row {i} holds portal {}",
                row.id
            )));
        }
        if allowed_roles(row.id).is_empty() {
            return Err(GateError::InvalidConfig(format!(
                "portal {} admits no roles",
                row.id
            )));
        }
        if !row.pages.contains(&row.default_page) {
            return Err(GateError::InvalidConfig(format!(
                "portal {} default page {:?} is not one of its pages",
                row.id, row.default_page
            )));
        }
        if row.pages.iter().any(|page| *page == "login" || *page == "logout") {
            return Err(GateError::InvalidConfig(format!(
                "portal {} declares a page that shadows its login routes",
                row.id
            )));
        }
        if !slugs.insert(row.id.slug()) {
            return Err(GateError::InvalidConfig(format!(
                "duplicate portal slug {}",
                row.id.slug()
            )));
        }
    }

    Ok(())
}
