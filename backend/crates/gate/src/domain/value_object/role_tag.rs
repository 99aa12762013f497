use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of role tags stored in a user's role record.
///
/// Each user holds exactly one tag. The snake_case code is the persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    // Global overrides
    Admin,
    SuperAdmin,

    YouthLeader,
    YouthMember,
    EstherLeader,
    EstherMember,
    MenLeader,
    MenMember,
    WorshipLeader,
    WorshipMember,
    HospitalityLeader,
    HospitalityMember,
    PrayerLeader,
    PrayerMember,
    MediaLeader,
    MediaMember,
    EvangelismLeader,
    EvangelismMember,
    UsherLeader,
    UsherMember,
    FinanceOfficer,
    Treasurer,
    ChildrenLeader,
    ChildrenTeacher,
    Member,
    SundaySchoolSuperintendent,
    SundaySchoolTeacher,
    SundaySchoolStudent,
    Volunteer,
    StoreManager,
    StoreStaff,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized role tag: {0:?}")]
pub struct UnknownRoleTag(pub String);

impl RoleTag {
    pub const ALL: [RoleTag; 31] = {
        use RoleTag::*;
        [
            Admin,
            SuperAdmin,
            YouthLeader,
            YouthMember,
            EstherLeader,
            EstherMember,
            MenLeader,
            MenMember,
            WorshipLeader,
            WorshipMember,
            HospitalityLeader,
            HospitalityMember,
            PrayerLeader,
            PrayerMember,
            MediaLeader,
            MediaMember,
            EvangelismLeader,
            EvangelismMember,
            UsherLeader,
            UsherMember,
            FinanceOfficer,
            Treasurer,
            ChildrenLeader,
            ChildrenTeacher,
            Member,
            SundaySchoolSuperintendent,
            SundaySchoolTeacher,
            SundaySchoolStudent,
            Volunteer,
            StoreManager,
            StoreStaff,
        ]
    };

    /// Tags that conventionally open every portal
    pub const GLOBAL_OVERRIDES: [RoleTag; 2] = [RoleTag::Admin, RoleTag::SuperAdmin];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use RoleTag::*;
        match self {
            Admin => "admin",
            SuperAdmin => "super_admin",
            YouthLeader => "youth_leader",
            YouthMember => "youth_member",
            EstherLeader => "esther_leader",
            EstherMember => "esther_member",
            MenLeader => "men_leader",
            MenMember => "men_member",
            WorshipLeader => "worship_leader",
            WorshipMember => "worship_member",
            HospitalityLeader => "hospitality_leader",
            HospitalityMember => "hospitality_member",
            PrayerLeader => "prayer_leader",
            PrayerMember => "prayer_member",
            MediaLeader => "media_leader",
            MediaMember => "media_member",
            EvangelismLeader => "evangelism_leader",
            EvangelismMember => "evangelism_member",
            UsherLeader => "usher_leader",
            UsherMember => "usher_member",
            FinanceOfficer => "finance_officer",
            Treasurer => "treasurer",
            ChildrenLeader => "children_leader",
            ChildrenTeacher => "children_teacher",
            Member => "member",
            SundaySchoolSuperintendent => "sunday_school_superintendent",
            SundaySchoolTeacher => "sunday_school_teacher",
            SundaySchoolStudent => "sunday_school_student",
            Volunteer => "volunteer",
            StoreManager => "store_manager",
            StoreStaff => "store_staff",
        }
    }

    #[inline]
    pub const fn is_global_override(&self) -> bool {
        matches!(self, RoleTag::Admin | RoleTag::SuperAdmin)
    }

    /// Parse a stored code. Role records come from an external store, so an
    /// unknown code is an ordinary error rather than a programming bug.
    pub fn from_code(code: &str) -> Result<Self, UnknownRoleTag> {
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.code() == code)
            .ok_or_else(|| UnknownRoleTag(code.to_string()))
    }
}

impl FromStr for RoleTag {
    type Err = UnknownRoleTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
