//! Cookie Management Infrastructure
//!
//! Building `Set-Cookie` values and reading cookies back from requests.

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie attributes shared by the set and clear variants
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<u64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    /// Build Set-Cookie header value (always HttpOnly)
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, value),
            "HttpOnly".to_string(),
            format!("Path={}", self.path),
        ];

        if let Some(max_age) = self.max_age_secs {
            parts.push(format!("Max-Age={}", max_age));
        }
        self.push_common(&mut parts);

        parts.join("; ")
    }

    /// Build Set-Cookie header that expires the cookie immediately
    pub fn build_delete_cookie(&self) -> String {
        let mut parts = vec![
            format!("{}=", self.name),
            "HttpOnly".to_string(),
            format!("Path={}", self.path),
            "Max-Age=0".to_string(),
            "Expires=Thu, 01 Jan 1970 00:00:00 GMT".to_string(),
        ];
        self.push_common(&mut parts);

        parts.join("; ")
    }

    fn push_common(&self, parts: &mut Vec<String>) {
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.push(format!("SameSite={}", self.same_site.as_str()));
    }
}

/// Extract a cookie value from headers
///
/// Looks at every `Cookie` header, since HTTP/2 clients may split them.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

/// Convert a built cookie string into a header value
pub fn to_header_value(cookie: &str) -> HeaderValue {
    HeaderValue::from_str(cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}
