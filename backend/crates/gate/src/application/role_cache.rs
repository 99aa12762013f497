//! Role Cache
//!
//! Optional cache of role records keyed by uid, shared by all guards of
//! the process. Entries expire after a TTL and are dropped when the uid
//! signs out. Only found records are cached: a missing record or a failed
//! lookup is asked again next time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::entity::role_record::RoleRecord;
use crate::domain::repository::RoleDirectory;
use crate::domain::value_object::uid::Uid;
use crate::error::GateResult;

#[derive(Debug)]
pub struct RoleCache {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<Uid, (Instant, RoleRecord)>>,
}

impl RoleCache {
    /// `None` disables caching
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    pub fn get(&self, uid: &Uid) -> Option<RoleRecord> {
        let ttl = self.ttl?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        match entries.get(uid) {
            Some((stored, record)) if stored.elapsed() < ttl => Some(record.clone()),
            Some(_) => {
                entries.remove(uid);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, uid: Uid, record: RoleRecord) {
        if self.ttl.is_none() {
            return;
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uid, (Instant::now(), record));
    }

    pub fn invalidate(&self, uid: &Uid) {
        let removed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uid);
        if removed.is_some() {
            tracing::debug!(uid = %uid, "Role cache entry invalidated");
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Role directory that consults a [`RoleCache`] before the wrapped directory
#[derive(Debug)]
pub struct CachedRoleDirectory<D> {
    inner: Arc<D>,
    cache: Arc<RoleCache>,
}

impl<D> CachedRoleDirectory<D> {
    pub fn new(inner: Arc<D>, cache: Arc<RoleCache>) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &Arc<D> {
        &self.inner
    }

    pub fn cache(&self) -> &Arc<RoleCache> {
        &self.cache
    }
}

impl<D> RoleDirectory for CachedRoleDirectory<D>
where
    D: RoleDirectory + Send + Sync,
{
    async fn lookup(&self, uid: &Uid) -> GateResult<Option<RoleRecord>> {
        if let Some(record) = self.cache.get(uid) {
            tracing::debug!(uid = %uid, "Role cache hit");
            return Ok(Some(record));
        }

        let record = self.inner.lookup(uid).await?;
        if let Some(record) = &record {
            self.cache.insert(uid.clone(), record.clone());
        }
        Ok(record)
    }
}
