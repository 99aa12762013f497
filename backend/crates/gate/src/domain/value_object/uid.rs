use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// Opaque user identifier issued by the identity provider.
///
/// Also the key of the user's role record. The gate never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    pub fn new(raw: impl Into<String>) -> GateResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() || raw.len() > 128 {
            return Err(GateError::InvalidUid(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Uid {
    type Error = GateError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}
