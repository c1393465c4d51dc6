//! Route parameters and query strings
//!
//! [`RouteParams`] holds the values captured by `:param` and `*` segments of a
//! matched chain. [`QueryParams`] is the parsed form of a location's search
//! string. Route params are kept sorted; query pairs keep the order they
//! were written in so an href renders back unchanged.

use std::collections::BTreeMap;

/// Route parameters extracted from path segments
///
/// # Example
///
/// ```
/// use navigator_core::RouteParams;
///
/// // Route pattern: /posts/:postId
/// // Matched path:  /posts/5
/// let mut params = RouteParams::new();
/// params.insert("postId", "5");
///
/// assert_eq!(params.get("postId"), Some("5"));
/// assert_eq!(params.get_as::<u32>("postId"), Some(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: BTreeMap<String, String>,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert a parameter, replacing any previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Copy every parameter of `other` into `self`; `other` wins on conflicts
    pub fn extend(&mut self, other: &RouteParams) {
        for (key, value) in &other.params {
            self.params.insert(key.clone(), value.clone());
        }
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// Iterate over all parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.params.iter()
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from a location's search string
///
/// Supports multiple values for the same key. Pairs keep insertion order.
///
/// # Example
///
/// ```
/// use navigator_core::QueryParams;
///
/// let query = QueryParams::parse("?page=1&tag=rust&tag=router");
///
/// assert_eq!(query.get("page"), Some("1"));
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get_all("tag"), ["rust", "router"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create new empty query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a search string, with or without the leading `?`
    ///
    /// A bare key (`?debug`) is recorded with an empty value.
    pub fn parse(search: &str) -> Self {
        let mut query = Self::new();

        for pair in search.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            query.insert(decode_query_component(key), decode_query_component(value));
        }

        query
    }

    /// Get first value for a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Get all values for a parameter, in order; empty when absent
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Get the first value parsed as type T
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Append a value for a key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Render as a search string without the leading `?`
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<String> = self
            .pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    encode_uri_component(key),
                    encode_uri_component(value)
                )
            })
            .collect();

        pairs.join("&")
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Get number of key/value pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// Percent-encode every byte outside the unreserved set
pub(crate) fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Decode a query key or value: `+` is a space, then `%XX` escapes
pub(crate) fn decode_query_component(s: &str) -> String {
    decode_uri_component(&s.replace('+', " "))
}

/// Decode `%XX` escapes; malformed escapes are kept verbatim
pub(crate) fn decode_uri_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.insert("id", "123");

        assert_eq!(params.get("id"), Some("123"));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_route_params_get_as() {
        let params = RouteParams::new().with("id", "123").with("active", "true");

        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_route_params_extend_overrides() {
        let mut parent = RouteParams::new().with("org", "acme").with("id", "1");
        let child = RouteParams::new().with("id", "2");

        parent.extend(&child);
        assert_eq!(parent.get("org"), Some("acme"));
        assert_eq!(parent.get("id"), Some("2"));
        assert_eq!(parent.len(), 2);
    }

    #[test]
    fn test_route_params_equality_ignores_insertion_order() {
        let a: RouteParams = [("a", "1"), ("b", "2")].into_iter().collect();
        let b: RouteParams = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_query_params_parse() {
        let query = QueryParams::parse("?page=1&sort=name&debug");

        assert_eq!(query.get("page"), Some("1"));
        assert_eq!(query.get("sort"), Some("name"));
        assert_eq!(query.get("debug"), Some(""));
        assert_eq!(query.get("missing"), None);
    }

    #[test]
    fn test_query_params_multiple_values() {
        let query = QueryParams::parse("tag=rust&tag=router&tag=ui");

        assert_eq!(query.get_all("tag"), ["rust", "router", "ui"]);
        assert_eq!(query.get("tag"), Some("rust"));
        assert!(query.get_all("missing").is_empty());
    }

    #[test]
    fn test_query_string_keeps_order_and_encodes() {
        let query = QueryParams::new().with("q", "hello world").with("a", "1");
        assert_eq!(query.to_query_string(), "q=hello%20world&a=1");

        let parsed = QueryParams::parse("z=1&a=2&z=3");
        assert_eq!(parsed.to_query_string(), "z=1&a=2&z=3");
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_uri_decoding() {
        assert_eq!(decode_uri_component("hello%20world"), "hello world");
        assert_eq!(decode_uri_component("c++"), "c++");
        assert_eq!(decode_uri_component("caf%C3%A9"), "café");
        assert_eq!(decode_uri_component("100%"), "100%");
    }

    #[test]
    fn test_query_decoding_treats_plus_as_space() {
        assert_eq!(decode_query_component("hello+world"), "hello world");
        assert_eq!(decode_query_component("c%2B%2B"), "c++");

        let query = QueryParams::parse("?q=rust+router");
        assert_eq!(query.get("q"), Some("rust router"));
    }

    #[test]
    fn test_uri_encoding_multibyte() {
        assert_eq!(encode_uri_component("café"), "caf%C3%A9");
        assert!(encode_uri_component("a@b").contains("%40"));
    }

    #[test]
    fn test_empty_query_string() {
        assert!(QueryParams::parse("").is_empty());
        assert!(QueryParams::parse("?").is_empty());
    }
}
