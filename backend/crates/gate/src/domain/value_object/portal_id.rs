use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GateError;

/// Identity of a role-gated portal.
///
/// The discriminant doubles as the row index into the taxonomy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum PortalId {
    Youth = 0,
    Esther = 1,
    Men = 2,
    Worship = 3,
    Hospitality = 4,
    Prayer = 5,
    Media = 6,
    Evangelism = 7,
    Usher = 8,
    Finance = 9,
    Children = 10,
    Members = 11,
    SundaySchool = 12,
    Volunteer = 13,
    Store = 14,
    Admin = 15,
    SuperAdmin = 16,
}

impl PortalId {
    pub const ALL: [PortalId; 17] = {
        use PortalId::*;
        [
            Youth,
            Esther,
            Men,
            Worship,
            Hospitality,
            Prayer,
            Media,
            Evangelism,
            Usher,
            Finance,
            Children,
            Members,
            SundaySchool,
            Volunteer,
            Store,
            Admin,
            SuperAdmin,
        ]
    };

    #[inline]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// URL slug; the portal lives under `/{slug}`
    #[inline]
    pub const fn slug(&self) -> &'static str {
        use PortalId::*;
        match self {
            Youth => "youth",
            Esther => "esther",
            Men => "men",
            Worship => "worship",
            Hospitality => "hospitality",
            Prayer => "prayer",
            Media => "media",
            Evangelism => "evangelism",
            Usher => "usher",
            Finance => "finance",
            Children => "children",
            Members => "members",
            SundaySchool => "sunday-school",
            Volunteer => "volunteer",
            Store => "store",
            Admin => "admin",
            SuperAdmin => "super-admin",
        }
    }

    pub const fn title(&self) -> &'static str {
        use PortalId::*;
        match self {
            Youth => "Youth Ministry",
            Esther => "Esther Women's Ministry",
            Men => "Men's Fellowship",
            Worship => "Worship Team",
            Hospitality => "Hospitality",
            Prayer => "Prayer Ministry",
            Media => "Media Team",
            Evangelism => "Evangelism",
            Usher => "Ushering",
            Finance => "Finance",
            Children => "Children's Ministry",
            Members => "Members",
            SundaySchool => "Sunday School",
            Volunteer => "Volunteers",
            Store => "Church Store",
            Admin => "Administration",
            SuperAdmin => "Super Admin",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.slug() == slug)
    }
}

impl FromStr for PortalId {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s).ok_or_else(|| GateError::UnknownPortal(s.to_string()))
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
