//! Per-request parameter bag.
//!
//! # Responsibilities
//! - Derive the structural fields (`absPath`, `reqPath`, `reqDir`, ...) from
//!   the request path and the configured root
//! - Copy inbound headers and query parameters into an extension map
//! - Serve lookups by name for match conditions and templates
//!
//! # Design Decisions
//! - Structural fields are a fixed record; they can never be shadowed
//! - Header/query keys equal to a structural name are refused on insert
//! - Built once per request, read-only afterwards

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue};
use percent_encoding::percent_decode_str;

use crate::routing::path;

/// Names of the structural fields, as seen by conditions and templates.
pub const RESERVED_KEYS: [&str; 9] = [
    "absPath", "reqPath", "reqDir", "absDir", "fileName", "basename", "suffix", "reqUrl",
    "reqQuery",
];

/// The request data the parameter bag is built from.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    /// Percent-decoded URL path, without the query.
    pub path: String,
    /// Raw request target (`path?query`).
    pub url: String,
    pub headers: HeaderMap,
}

impl RequestInfo {
    /// Build from a raw request target such as `/p?tag=a&tag=b`.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let raw_path = url.split_once('?').map_or(url.as_str(), |(p, _)| p);
        let path = percent_decode_str(raw_path).decode_utf8_lossy().into_owned();
        Self {
            path,
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Build from the head of an inbound HTTP request.
    pub fn from_parts(parts: &Parts) -> Self {
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        Self {
            headers: parts.headers.clone(),
            ..Self::new(url)
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Raw query string, if the target carries one.
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, q)| q)
    }
}

/// Named values describing one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBag {
    abs_path: PathBuf,
    abs_dir: PathBuf,
    req_path: String,
    req_dir: String,
    file_name: String,
    basename: String,
    suffix: String,
    req_url: String,
    req_query: String,
    extensions: BTreeMap<String, String>,
}

impl ParamBag {
    /// Build the bag for `request` served from `root`.
    pub fn build(root: &Path, request: &RequestInfo) -> Self {
        let abs_path = path::resolve_request(root, &request.path);
        let abs_dir = abs_path.parent().unwrap_or(&abs_path).to_path_buf();
        let file_name = path::basename(&request.path).to_string();
        let (basename, suffix) = path::split_suffix(&file_name);

        let mut bag = Self {
            abs_dir,
            req_dir: path::dirname(&request.path).to_string(),
            basename: basename.to_string(),
            suffix: suffix.to_string(),
            req_path: request.path.clone(),
            req_url: request.url.clone(),
            req_query: request.query().unwrap_or_default().to_string(),
            file_name,
            abs_path,
            extensions: BTreeMap::new(),
        };

        for name in request.headers.keys() {
            let value = request
                .headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            bag.insert_extension(name.as_str(), value);
        }

        if let Some(query) = request.query() {
            bag.insert_query(query);
        }

        bag
    }

    /// Query keys seen once become `query_<key>`; repeated keys become
    /// `query_<key>[<i>]` in encounter order.
    fn insert_query(&mut self, query: &str) {
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (key, _) in &pairs {
            *counts.entry(key.as_str()).or_default() += 1;
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut entries = Vec::with_capacity(pairs.len());
        for (key, value) in &pairs {
            if counts[key.as_str()] == 1 {
                entries.push((format!("query_{key}"), value.clone()));
            } else {
                let index = seen.entry(key.as_str()).or_default();
                entries.push((format!("query_{key}[{index}]"), value.clone()));
                *index += 1;
            }
        }

        for (key, value) in entries {
            self.insert_extension(&key, value);
        }
    }

    /// Insert a header/query-derived entry. Returns `false` and leaves the
    /// bag untouched when `key` names a structural field.
    pub(crate) fn insert_extension(&mut self, key: &str, value: String) -> bool {
        if RESERVED_KEYS.contains(&key) {
            tracing::debug!(key, "Ignoring parameter shadowing a reserved key");
            return false;
        }
        self.extensions.insert(key.to_string(), value);
        true
    }

    /// Look up a parameter by name. Structural fields win over extensions.
    pub fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        let value = match key {
            "absPath" => return Some(self.abs_path.to_string_lossy()),
            "absDir" => return Some(self.abs_dir.to_string_lossy()),
            "reqPath" => &self.req_path,
            "reqDir" => &self.req_dir,
            "fileName" => &self.file_name,
            "basename" => &self.basename,
            "suffix" => &self.suffix,
            "reqUrl" => &self.req_url,
            "reqQuery" => &self.req_query,
            other => self.extensions.get(other)?,
        };
        Some(Cow::Borrowed(value.as_str()))
    }

    pub fn abs_path(&self) -> &Path {
        &self.abs_path
    }

    pub fn abs_dir(&self) -> &Path {
        &self.abs_dir
    }

    pub fn req_path(&self) -> &str {
        &self.req_path
    }

    pub fn req_dir(&self) -> &str {
        &self.req_dir
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn req_url(&self) -> &str {
        &self.req_url
    }

    pub fn req_query(&self) -> &str {
        &self.req_query
    }

    /// Header- and query-derived entries, ordered by key.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extensions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
impl ParamBag {
    /// Bag holding only the given extension entries.
    pub(crate) fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut bag = Self::default();
        for (key, value) in pairs {
            bag.insert_extension(key, value.to_string());
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(url: &str) -> ParamBag {
        ParamBag::build(Path::new("/site"), &RequestInfo::new(url))
    }

    #[test]
    fn test_structural_fields() {
        let bag = bag("/img/logo.png");
        assert_eq!(bag.abs_path(), Path::new("/site/img/logo.png"));
        assert_eq!(bag.abs_dir(), Path::new("/site/img"));
        assert_eq!(bag.req_path(), "/img/logo.png");
        assert_eq!(bag.req_dir(), "/img");
        assert_eq!(bag.file_name(), "logo.png");
        assert_eq!(bag.basename(), "logo");
        assert_eq!(bag.suffix(), "png");
        assert_eq!(bag.req_url(), "/img/logo.png");
        assert_eq!(bag.req_query(), "");
        assert_eq!(bag.get("absPath").as_deref(), Some("/site/img/logo.png"));
    }

    #[test]
    fn test_dotfile_has_no_suffix() {
        let bag = bag("/.env");
        assert_eq!(bag.basename(), ".env");
        assert_eq!(bag.suffix(), "");
    }

    #[test]
    fn test_path_is_percent_decoded() {
        let bag = bag("/my%20file.txt?x=1");
        assert_eq!(bag.req_path(), "/my file.txt");
        assert_eq!(bag.req_url(), "/my%20file.txt?x=1");
        assert_eq!(bag.abs_path(), Path::new("/site/my file.txt"));
    }

    #[test]
    fn test_query_parameters() {
        let bag = bag("/p?tag=a&tag=b&lang=en&q=hello+world");
        assert_eq!(bag.req_query(), "tag=a&tag=b&lang=en&q=hello+world");
        assert_eq!(bag.get("query_tag[0]").as_deref(), Some("a"));
        assert_eq!(bag.get("query_tag[1]").as_deref(), Some("b"));
        assert_eq!(bag.get("query_tag"), None);
        assert_eq!(bag.get("query_lang").as_deref(), Some("en"));
        assert_eq!(bag.get("query_q").as_deref(), Some("hello world"));
    }

    #[test]
    fn test_headers_are_copied() {
        let request = RequestInfo::new("/")
            .with_header(HeaderName::from_static("accept-language"), HeaderValue::from_static("en"))
            .with_header(HeaderName::from_static("x-tag"), HeaderValue::from_static("a"))
            .with_header(HeaderName::from_static("x-tag"), HeaderValue::from_static("b"));
        let bag = ParamBag::build(Path::new("/site"), &request);
        assert_eq!(bag.get("accept-language").as_deref(), Some("en"));
        assert_eq!(bag.get("x-tag").as_deref(), Some("a, b"));
    }

    #[test]
    fn test_headers_cannot_shadow_structural_fields() {
        let request = RequestInfo::new("/real.html")
            .with_header(HeaderName::from_static("suffix"), HeaderValue::from_static("evil"))
            .with_header(HeaderName::from_static("basename"), HeaderValue::from_static("evil"));
        let bag = ParamBag::build(Path::new("/site"), &request);
        assert_eq!(bag.get("suffix").as_deref(), Some("html"));
        assert_eq!(bag.get("basename").as_deref(), Some("real"));
        assert_eq!(bag.extensions().count(), 0);

        let mut bag = ParamBag::default();
        assert!(!bag.insert_extension("absPath", "/etc/passwd".into()));
        assert_eq!(bag.get("absPath").as_deref(), Some(""));
    }

    #[test]
    fn test_query_overrides_header_of_same_name() {
        let request = RequestInfo::new("/?v=query")
            .with_header(HeaderName::from_static("query_v"), HeaderValue::from_static("header"));
        let bag = ParamBag::build(Path::new("/site"), &request);
        assert_eq!(bag.get("query_v").as_deref(), Some("query"));
    }
}
