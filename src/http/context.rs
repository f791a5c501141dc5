//! Per-request context threaded through the dispatch chain.
//!
//! # Responsibilities
//! - Own the inbound request for the duration of one dispatch
//! - Hold captured path parameters once a route matched
//! - Accumulate outgoing headers that every response helper attaches
//! - Carry caller-supplied extension state of type `T`
//!
//! # Design Decisions
//! - One context per request, never shared; no locking
//! - Extension state is a typed value reachable through `Deref`, not a property bag
//! - Outgoing headers live here, not in a process-wide map

use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Method, Request, Uri};

use crate::error::Result;
use crate::http::cookie::{parse_cookies, serialize_cookie, CookieOptions};

/// Mutable state for a single request.
pub struct Context<T> {
    request: Request<Body>,
    parameters: HashMap<String, String>,
    headers: HeaderMap,
    ext: T,
}

impl<T> Context<T> {
    /// Create a context with no parameters and an empty outgoing header set.
    pub fn new(request: Request<Body>, ext: T) -> Self {
        Self {
            request,
            parameters: HashMap::new(),
            headers: HeaderMap::new(),
            ext,
        }
    }

    pub fn request(&self) -> &Request<Body> {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request<Body> {
        &mut self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    /// Take the request body, leaving an empty one behind.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(self.request.body_mut())
    }

    // --- Parameters ---

    /// Parameters captured by the matched route. Empty before matching.
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub(crate) fn set_parameters(&mut self, parameters: HashMap<String, String>) {
        self.parameters = parameters;
    }

    // --- Extension state ---

    pub fn ext(&self) -> &T {
        &self.ext
    }

    pub fn ext_mut(&mut self) -> &mut T {
        &mut self.ext
    }

    pub fn into_ext(self) -> T {
        self.ext
    }

    // --- Outgoing headers ---

    /// Headers attached to whatever response this request produces.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replace any existing value of `name`.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn set_headers<'h, I>(&mut self, headers: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'h str, &'h str)>,
    {
        for (name, value) in headers {
            self.set_header(name, value)?;
        }
        Ok(())
    }

    /// Append a value, keeping existing ones.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.append(name, value);
        Ok(())
    }

    pub fn add_headers<'h, I>(&mut self, headers: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'h str, &'h str)>,
    {
        for (name, value) in headers {
            self.add_header(name, value)?;
        }
        Ok(())
    }

    // --- Inbound request data ---

    /// First value of an inbound header, if it is valid UTF-8.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }

    /// Inbound headers keyed by lowercase name. Non-UTF-8 values are skipped.
    pub fn request_headers(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for (name, value) in self.request.headers() {
            if let Ok(value) = value.to_str() {
                out.insert(name.as_str().to_string(), value.to_string());
            }
        }
        out
    }

    /// Query string parameters. For repeated keys the last value wins.
    pub fn query(&self) -> HashMap<String, String> {
        self.query_all().into_iter().collect()
    }

    /// Query string parameters in order, duplicates kept.
    pub fn query_all(&self) -> Vec<(String, String)> {
        let Some(query) = self.request.uri().query() else {
            return Vec::new();
        };
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    // --- Cookies ---

    /// Cookies sent by the client, across every `Cookie` field.
    pub fn cookies(&self) -> HashMap<String, String> {
        let fields: Vec<&str> = self
            .request
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        parse_cookies(&fields.join("; "))
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies().remove(name)
    }

    /// Append a `Set-Cookie` header.
    pub fn set_cookie(&mut self, name: &str, value: &str, options: &CookieOptions) -> Result<()> {
        let cookie = serialize_cookie(name, value, options);
        self.add_header(header::SET_COOKIE.as_str(), &cookie)
    }

    /// Expire a cookie on the client.
    pub fn delete_cookie(&mut self, name: &str, options: &CookieOptions) -> Result<()> {
        let options = CookieOptions {
            max_age: Some(0),
            ..options.clone()
        };
        self.set_cookie(name, "", &options)
    }
}

impl<T> Deref for Context<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.ext
    }
}

impl<T> DerefMut for Context<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.ext
    }
}
