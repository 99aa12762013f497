//! Check Session Use Case
//!
//! Maps the session cookie to the browser session it names. The cookie
//! carries the session token plus an HMAC over it, so a forged or stale
//! cookie maps to no session at all and is observed as signed out.

use axum::http::HeaderMap;
use kernel::id::SessionToken;
use uuid::Uuid;

use crate::application::config::GateConfig;
use crate::error::{GateError, GateResult};

/// Sign a session token for the cookie
pub fn encode_session_token(config: &GateConfig, token: &SessionToken) -> String {
    platform::crypto::sign_id(&config.session_secret, token.as_bytes())
}

/// Verify a cookie value and recover the session token
pub fn decode_session_token(config: &GateConfig, raw: &str) -> GateResult<SessionToken> {
    let bytes = platform::crypto::verify_signed_id(&config.session_secret, raw)
        .ok_or(GateError::SessionInvalid)?;
    Ok(SessionToken::from_uuid(Uuid::from_bytes(bytes)))
}

/// Session token from the request's session cookie, if present and valid
pub fn session_from_headers(config: &GateConfig, headers: &HeaderMap) -> Option<SessionToken> {
    let raw = platform::cookie::extract_cookie(headers, &config.session_cookie_name)?;
    match decode_session_token(config, &raw) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring session cookie");
            None
        }
    }
}
