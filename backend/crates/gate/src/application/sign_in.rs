//! Sign In Use Case
//!
//! Authenticates against the identity provider and opens a fresh browser
//! session. A session the browser already carried is ended, never
//! promoted. Admission is not decided here: the portal's guard does that
//! on the next request.

use std::sync::Arc;

use crate::application::check_session::{decode_session_token, encode_session_token};
use crate::application::config::GateConfig;
use crate::application::role_cache::RoleCache;
use crate::domain::repository::IdentityProvider;
use crate::domain::value_object::uid::Uid;
use crate::error::{GateError, GateResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
    /// Raw session cookie, when the browser already has one
    pub session_cookie: Option<String>,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    /// Signed session token for the cookie
    pub session_cookie: String,
    pub uid: Uid,
}

/// Sign in use case
pub struct SignInUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
    cache: Arc<RoleCache>,
    config: Arc<GateConfig>,
}

impl<P> SignInUseCase<P>
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

    pub async fn execute(&self, input: SignInInput) -> GateResult<SignInOutput> {
        let email = input.email.trim();
        if email.is_empty() || input.password.is_empty() {
            return Err(GateError::InvalidCredentials);
        }

        let signed_in = self
            .provider
            .sign_in(email, &input.password, self.config.session_ttl)
            .await?;

        tracing::info!(uid = %signed_in.uid, session = %signed_in.token, "User signed in");

        // A planted or leftover cookie must not outlive this sign-in
        let previous = input
            .session_cookie
            .as_deref()
            .and_then(|raw| decode_session_token(&self.config, raw).ok())
            .filter(|token| *token != signed_in.token);
        if let Some(previous) = previous {
            match self.provider.sign_out(previous).await {
                Ok(Some(uid)) => {
                    self.cache.invalidate(&uid);
                    tracing::info!(uid = %uid, session = %previous, "Previous session ended");
                }
                Ok(None) => {}
                Err(e) => e.log(),
            }
        }

        Ok(SignInOutput {
            session_cookie: encode_session_token(&self.config, &signed_in.token),
            uid: signed_in.uid,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::entity::{role_record::RoleRecord, session::SessionEvent};
    use crate::domain::value_object::role_tag::RoleTag;
    use crate::infra::memory::InMemoryIdentityProvider;

    const PASSWORD: &str = "correct horse battery";

    fn uid(s: &str) -> Uid {
        Uid::new(s).unwrap()
    }

    fn setup() -> (Arc<InMemoryIdentityProvider>, Arc<RoleCache>, SignInUseCase<InMemoryIdentityProvider>) {
        let provider = Arc::new(InMemoryIdentityProvider::new(None));
        provider.add_account("a@church.org", PASSWORD, uid("a")).unwrap();
        provider.add_account("b@church.org", PASSWORD, uid("b")).unwrap();

        let cache = Arc::new(RoleCache::new(Some(Duration::from_secs(60))));
        let config = Arc::new(GateConfig::with_random_secret());
        let use_case = SignInUseCase::new(provider.clone(), cache.clone(), config);
        (provider, cache, use_case)
    }

    fn input(email: &str, session_cookie: Option<String>) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            session_cookie,
        }
    }

    #[tokio::test]
    async fn test_carried_session_is_ended_not_reused() {
        let (provider, cache, use_case) = setup();

        let first = use_case.execute(input("a@church.org", None)).await.unwrap();
        cache.insert(uid("a"), RoleRecord::with_role(RoleTag::Member));

        let second = use_case
            .execute(input("b@church.org", Some(first.session_cookie.clone())))
            .await
            .unwrap();
        assert_ne!(second.session_cookie, first.session_cookie);
        assert_eq!(second.uid, uid("b"));

        let old = decode_session_token(&use_case.config, &first.session_cookie).unwrap();
        let mut sub = provider.subscribe(Some(old));
        assert_eq!(sub.next().await, Some(SessionEvent::SignedOut));

        assert!(cache.get(&uid("a")).is_none());
        assert_eq!(provider.session_count(), 1);
    }

    #[tokio::test]
    async fn test_garbage_cookie_is_ignored() {
        let (provider, _cache, use_case) = setup();
        let output = use_case
            .execute(input("a@church.org", Some("forged".to_string())))
            .await
            .unwrap();
        assert_eq!(output.uid, uid("a"));
        assert_eq!(provider.session_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_email_rejected() {
        let (provider, _cache, use_case) = setup();
        let err = use_case.execute(input("  ", None)).await.unwrap_err();
        assert!(matches!(err, GateError::InvalidCredentials));
        assert_eq!(provider.session_count(), 0);
    }
}
