//! PostgreSQL Role Directory

use sqlx::PgPool;

use crate::domain::entity::role_record::RoleRecord;
use crate::domain::repository::RoleDirectory;
use crate::domain::value_object::uid::Uid;
use crate::error::{GateError, GateResult};

/// Role records stored in the `users` table
#[derive(Clone)]
pub struct PgRoleDirectory {
    pool: PgPool,
}

impl PgRoleDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RoleDirectory for PgRoleDirectory {
    async fn lookup(&self, uid: &Uid) -> GateResult<Option<RoleRecord>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT role FROM users WHERE uid = $1")
                .bind(uid.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| GateError::RoleLookup(e.to_string()))?;

        Ok(row.map(|(role,)| RoleRecord { role }))
    }
}
