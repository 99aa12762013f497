//! Application Configuration
//!
//! Configuration for the gate application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Gate application configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Session cookie lifetime (12 hours)
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Upper bound on one role lookup; expiry denies
    pub role_lookup_timeout: Duration,
    /// Role cache entry lifetime. `None` disables the cache, so every guard
    /// mount performs its own lookup.
    pub role_cache_ttl: Option<Duration>,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Public site home; target of the `Home` denied redirect
    pub home_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "portal_session".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(12 * 3600), // 12 hours
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            role_lookup_timeout: Duration::from_secs(10),
            role_cache_ttl: None,
            password_pepper: None,
            home_path: "/".to_string(),
        }
    }
}

impl GateConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Cookie attributes for the session cookie.
    ///
    /// Path is `/` so one session covers every portal.
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs()),
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.role_lookup_timeout, Duration::from_secs(10));
        assert!(config.role_cache_ttl.is_none());
        assert!(config.cookie_secure);
        assert_eq!(config.home_path, "/");
    }

    #[test]
    fn test_development_is_insecure_with_secret() {
        let config = GateConfig::development();
        assert!(!config.cookie_secure);
        assert_ne!(config.session_secret, [0u8; 32]);
    }

    #[test]
    fn test_cookie_covers_all_portals() {
        let cookie = GateConfig::default().cookie();
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.max_age_secs, Some(12 * 3600));
        assert!(cookie.build_set_cookie("v").contains("HttpOnly"));
    }
}
