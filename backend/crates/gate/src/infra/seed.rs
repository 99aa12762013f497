//! Seed File
//!
//! JSON list of accounts loaded into the in-memory providers at startup:
//!
//! ```json
//! [
//!   { "email": "ruth@church.org", "password": "...", "uid": "ruth", "record": { "role": "esther_member" } },
//!   { "email": "new@church.org",  "password": "...", "uid": "new" }
//! ]
//! ```
//!
//! An account without `record` has no role record; `"record": {}` is a
//! record without a role.

use std::path::Path;

use serde::Deserialize;

use crate::domain::entity::role_record::RoleRecord;
use crate::domain::value_object::uid::Uid;
use crate::error::{GateError, GateResult};
use crate::infra::memory::{InMemoryIdentityProvider, InMemoryRoleDirectory};

#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
    pub uid: Uid,
    #[serde(default)]
    pub record: Option<RoleRecord>,
}

pub fn parse_seed(json: &str) -> GateResult<Vec<SeedAccount>> {
    serde_json::from_str(json).map_err(|e| GateError::InvalidConfig(format!("seed file: {e}")))
}

pub fn load_seed_file(path: &Path) -> GateResult<Vec<SeedAccount>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| GateError::InvalidConfig(format!("seed file {}: {e}", path.display())))?;
    parse_seed(&json)
}

/// Register every account and write its role record. Unknown role codes
/// are kept as stored; the guard denies them.
pub fn apply_seed(
    accounts: Vec<SeedAccount>,
    provider: &InMemoryIdentityProvider,
    directory: &InMemoryRoleDirectory,
) -> GateResult<usize> {
    let count = accounts.len();

    for account in accounts {
        provider.add_account(&account.email, &account.password, account.uid.clone())?;

        if let Some(record) = account.record {
            if let Err(reason) = record.role_tag() {
                tracing::warn!(uid = %account.uid, reason = %reason, "Seeded record will be denied");
            }
            directory.insert(account.uid, record);
        }
    }

    tracing::info!(accounts = count, "Seed accounts loaded");
    Ok(count)
}
