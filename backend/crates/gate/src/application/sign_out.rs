//! Sign Out Use Case
//!
//! Marks the browser session signed out and drops the signed-out user's
//! cached role.

use std::sync::Arc;

use crate::application::check_session::decode_session_token;
use crate::application::config::GateConfig;
use crate::application::role_cache::RoleCache;
use crate::domain::repository::IdentityProvider;
use crate::domain::value_object::uid::Uid;
use crate::error::GateResult;

/// Sign out use case
pub struct SignOutUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
    cache: Arc<RoleCache>,
    config: Arc<GateConfig>,
}

impl<P> SignOutUseCase<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>, cache: Arc<RoleCache>, config: Arc<GateConfig>) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    /// Sign out the session named by `session_cookie`.
    ///
    /// Returns the uid that was signed in, if any.
    pub async fn execute(&self, session_cookie: &str) -> GateResult<Option<Uid>> {
        let token = decode_session_token(&self.config, session_cookie)?;
        let uid = self.provider.sign_out(token).await?;

        if let Some(uid) = &uid {
            self.cache.invalidate(uid);
            tracing::info!(uid = %uid, session = %token, "User signed out");
        }

        Ok(uid)
    }
}
