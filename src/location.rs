//! Locations and canonical URL keys.
//!
//! Two locations are "the same" when their `(pathname, search, hash)` triple
//! matches, regardless of scheme or host. Every comparison in the navigation
//! layer goes through [`UrlKey`].

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

const RESOLVE_BASE: &str = "http://localhost";

/// Canonical `pathname + search + hash` string used for equality checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UrlKey(String);

impl UrlKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved location in the single-page app.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Always starts with `/`.
    pub pathname: String,
    /// Empty, or starts with `?`.
    pub search: String,
    /// Empty, or starts with `#`.
    pub hash: String,
}

impl Location {
    pub fn root() -> Self {
        Self {
            pathname: "/".to_string(),
            search: String::new(),
            hash: String::new(),
        }
    }

    /// Parse a path or absolute URL, resolving relative input against `/`.
    pub fn parse(input: &str) -> Self {
        Self::root().resolve(input)
    }

    /// Resolve `target` the way a browser resolves a link href.
    ///
    /// - empty target: the current location
    /// - `http(s)://host/...`: host is dropped, the rest is kept
    /// - `/path`, `path`, `../path`, `?query`, `#hash`: resolved against `self`
    /// - any other scheme (`about:blank`, `javascript:`, `mailto:`): the current
    ///   location, since it never changes the in-app route
    ///
    /// Input that cannot be parsed falls back to being treated as a path.
    pub fn resolve(&self, target: &str) -> Location {
        let target = target.trim();
        if target.is_empty() {
            return self.clone();
        }

        if is_absolute_http(target) {
            return match Url::parse(target) {
                Ok(url) => Self::from_url(&url),
                Err(_) => Self::from_raw(strip_origin(target)),
            };
        }

        let base = Url::parse(RESOLVE_BASE).and_then(|root| root.join(self.key().as_str()));
        match base.and_then(|base| base.join(target)) {
            Ok(url) if is_http_scheme(url.scheme()) => Self::from_url(&url),
            Ok(_) => self.clone(),
            Err(_) => Self::from_raw(target),
        }
    }

    pub fn key(&self) -> UrlKey {
        UrlKey(format!("{}{}{}", self.pathname, self.search, self.hash))
    }

    /// Fragment identifier without the leading `#`, if any.
    pub fn anchor(&self) -> Option<&str> {
        self.hash.strip_prefix('#').filter(|id| !id.is_empty())
    }

    pub fn is_same_page(&self, other: &Location) -> bool {
        self.pathname == other.pathname
    }

    fn from_url(url: &Url) -> Self {
        Self {
            pathname: url.path().to_string(),
            search: url
                .query()
                .filter(|q| !q.is_empty())
                .map(|q| format!("?{}", q))
                .unwrap_or_default(),
            hash: url
                .fragment()
                .filter(|f| !f.is_empty())
                .map(|f| format!("#{}", f))
                .unwrap_or_default(),
        }
    }

    fn from_raw(raw: &str) -> Self {
        let (rest, hash) = match raw.find('#') {
            Some(idx) => (&raw[..idx], &raw[idx..]),
            None => (raw, ""),
        };
        let (path, search) = match rest.find('?') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let pathname = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Self {
            pathname,
            search: if search == "?" { String::new() } else { search.to_string() },
            hash: if hash == "#" { String::new() } else { hash.to_string() },
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pathname, self.search, self.hash)
    }
}

fn is_absolute_http(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

fn is_http_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

fn strip_origin(target: &str) -> &str {
    let after_scheme = target.splitn(2, "://").nth(1).unwrap_or(target);
    match after_scheme.find('/') {
        Some(idx) => &after_scheme[idx..],
        None => "/",
    }
}
