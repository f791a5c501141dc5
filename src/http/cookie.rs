//! Cookie header codec.
//!
//! Parsing strips surrounding quotes and percent-decodes values; serializing
//! writes the value as given. The asymmetry is part of the wire contract.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes appended to a `Set-Cookie` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub http_only: bool,
    /// Lifetime in seconds.
    pub max_age: Option<u64>,
    pub path: Option<String>,
    pub secure: bool,
    pub same_site: Option<SameSite>,
    pub partitioned: bool,
}

/// Parse a `Cookie` request header into name/value pairs.
///
/// Names are case-sensitive and later duplicates win. Pairs without `=`,
/// values with bytes outside the cookie octet set, and values that do not
/// percent-decode to UTF-8 are dropped.
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };

        let mut value = value.trim();
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            value = &value[1..value.len() - 1];
        }

        if !value.bytes().all(is_cookie_byte) {
            continue;
        }

        if let Ok(decoded) = percent_decode_str(value).decode_utf8() {
            cookies.insert(name.to_string(), decoded.into_owned());
        }
    }

    cookies
}

/// Build a `Set-Cookie` header value. `value` is written verbatim.
pub fn serialize_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut cookie = format!("{name}={value}");

    if let Some(max_age) = options.max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if let Some(domain) = &options.domain {
        cookie.push_str(&format!("; Domain={domain}"));
    }
    if let Some(path) = &options.path {
        cookie.push_str(&format!("; Path={path}"));
    }
    if let Some(expires) = &options.expires {
        cookie.push_str(&format!(
            "; Expires={}",
            expires.format("%a, %d %b %Y %H:%M:%S GMT")
        ));
    }
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    if let Some(same_site) = options.same_site {
        cookie.push_str(&format!("; SameSite={}", same_site.as_str()));
    }
    if options.partitioned {
        cookie.push_str("; Partitioned");
    }

    cookie
}

// Space plus the RFC 6265 cookie-octet range.
fn is_cookie_byte(b: u8) -> bool {
    matches!(b, b' ' | b'!' | b'#'..=b':' | b'<'..=b'[' | b']'..=b'~')
}
