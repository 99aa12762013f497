//! Role Record Entity
//!
//! The `users/{uid}` document as the role directory returns it. The role is
//! kept as the raw stored string: a record may lack the field entirely or
//! carry a code this build does not know.

use serde::{Deserialize, Serialize};

use crate::domain::entity::guard_state::DenyReason;
use crate::domain::value_object::role_tag::RoleTag;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl RoleRecord {
    pub fn with_role(role: RoleTag) -> Self {
        Self {
            role: Some(role.code().to_string()),
        }
    }

    /// A record that exists but has no `role` field
    pub fn without_role() -> Self {
        Self { role: None }
    }

    /// Classify the stored role; anything but a known tag is a deny reason
    pub fn role_tag(&self) -> Result<RoleTag, DenyReason> {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => Err(DenyReason::MissingRoleField),
            Some(code) => {
                RoleTag::from_code(code).map_err(|e| DenyReason::UnrecognizedRole(e.0))
            }
        }
    }
}
