//! Route parameters and query strings
//!
//! [`RouteParams`] holds the values captured by `:name` segments, in the order
//! the pattern declares them. [`QueryParams`] is the flat view of a location's
//! query string (`?page=1&sort=price_asc`).
//!
//! Both keep insertion order so that links built from them are stable.

use url::form_urlencoded;

/// Route parameters extracted from path segments
///
/// # Example
///
/// ```
/// use storefront_router::RouteParams;
///
/// // Route pattern: /product/:id
/// // Matched path: /product/42
/// let mut params = RouteParams::new();
/// params.insert("id", "42");
///
/// assert_eq!(params.get("id"), Some("42"));
/// assert_eq!(params.get_as::<u32>("id"), Some(42));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: Vec<(String, String)>,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Insert a parameter, replacing any previous value for the same name
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// Parameter names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over all parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
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
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Flat query-string map
///
/// Parsing follows `application/x-www-form-urlencoded` rules: `&`-separated
/// pairs, split on the first `=`, `+` and `%XX` decoded. A key that appears
/// more than once keeps its first position and its last value.
///
/// # Example
///
/// ```
/// use storefront_router::QueryParams;
///
/// let query = QueryParams::parse("page=2&sort=price_asc");
///
/// assert_eq!(query.get("sort"), Some("price_asc"));
/// assert_eq!(query.get_as::<u32>("page"), Some(2));
/// assert_eq!(query.to_query_string(), "page=2&sort=price_asc");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<(String, String)>,
}

impl QueryParams {
    /// Create new empty query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without its leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| !key.is_empty())
            .collect()
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get a value parsed as type T
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Set a value, keeping the key's position if it already exists
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.params.iter().position(|(k, _)| k == key)?;
        Some(self.params.remove(index).1)
    }

    /// Merge a partial update into this map
    ///
    /// `Some(non-empty)` sets the key; `None` or `Some("")` deletes it.
    pub fn merge<I, K, V>(&mut self, patch: I)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in patch {
            let key = key.into();
            match value.map(Into::into) {
                Some(value) if !value.is_empty() => self.set(key, value),
                _ => {
                    self.remove(&key);
                }
            }
        }
    }

    /// Check if key exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to a query string (no leading `?`)
    ///
    /// Entries with an empty value are dropped.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter().filter(|(_, v)| !v.is_empty()))
            .finish()
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of keys
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// Percent-encode a path parameter value
///
/// Leaves ASCII alphanumerics and `-_.!~*'()` unescaped; everything else,
/// `/` included, is escaped byte by byte.
pub(crate) fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Percent-decode a captured path parameter
///
/// `+` is kept literally. Malformed escapes are kept as written, and a result
/// that is not valid UTF-8 yields the raw input unchanged.
pub(crate) fn decode_uri_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    char::from(byte)
        .to_digit(16)
        .and_then(|digit| u8::try_from(digit).ok())
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
        let params: RouteParams = [("id", "123"), ("active", "true")].into_iter().collect();

        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_route_params_keep_order() {
        let params: RouteParams = [("category", "shoes"), ("id", "7")].into_iter().collect();
        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, vec!["category", "id"]);
    }

    #[test]
    fn test_query_params_basic() {
        let query = QueryParams::parse("?page=1&sort=name&filter=active");

        assert_eq!(query.get("page"), Some("1"));
        assert_eq!(query.get("sort"), Some("name"));
        assert_eq!(query.get("filter"), Some("active"));
        assert_eq!(query.get("missing"), None);
    }

    #[test]
    fn test_query_params_decoding() {
        let query = QueryParams::parse("q=red+shoes&brand=A%26B&empty=");
        assert_eq!(query.get("q"), Some("red shoes"));
        assert_eq!(query.get("brand"), Some("A&B"));
        assert_eq!(query.get("empty"), Some(""));
    }

    #[test]
    fn test_query_params_last_duplicate_wins() {
        let query = QueryParams::parse("sort=a&page=1&sort=b");
        assert_eq!(query.get("sort"), Some("b"));
        assert_eq!(query.to_query_string(), "sort=b&page=1");
    }

    #[test]
    fn test_query_params_merge() {
        let mut query = QueryParams::parse("page=2&sort=price_asc");
        query.merge([("page", None), ("sort", Some("price_desc")), ("q", Some("hat"))]);
        assert_eq!(query.to_query_string(), "sort=price_desc&q=hat");

        query.merge([("q", Some(""))]);
        assert_eq!(query.to_query_string(), "sort=price_desc");
    }

    #[test]
    fn test_to_query_string_drops_empty_values() {
        let query: QueryParams = [("a", "1"), ("b", ""), ("c", "x y")].into_iter().collect();
        assert_eq!(query.to_query_string(), "a=1&c=x+y");
    }

    #[test]
    fn test_query_round_trip() {
        let query: QueryParams = [("sort", "price_asc"), ("q", "blue & green"), ("p", "ü")]
            .into_iter()
            .collect();
        assert_eq!(QueryParams::parse(&query.to_query_string()), query);
    }

    #[test]
    fn test_empty_query_string() {
        assert!(QueryParams::parse("").is_empty());
        assert!(QueryParams::parse("?").is_empty());
    }

    #[test]
    fn test_uri_encoding() {
        assert_eq!(encode_uri_component("hello world"), "hello%20world");
        assert_eq!(encode_uri_component("a/b"), "a%2Fb");
        assert_eq!(encode_uri_component("café"), "caf%C3%A9");
    }

    #[test]
    fn test_uri_decoding() {
        assert_eq!(decode_uri_component("hello%20world"), "hello world");
        assert_eq!(decode_uri_component("caf%C3%A9"), "café");
        assert_eq!(decode_uri_component("a+b"), "a+b");
        assert_eq!(decode_uri_component("100%"), "100%");
        assert_eq!(decode_uri_component("%zz"), "%zz");
        assert_eq!(decode_uri_component("%FF"), "%FF");
    }
}
