//! Render-pass state handoff
//!
//! A server render dehydrates each store into a [`HydrationBlob`], embeds the
//! blob in the page, and the next render pass (usually the client) seeds its
//! stores from it instead of re-fetching. The wire shape is
//!
//! ```json
//! { "version": 1, "stores": { "products": { ... }, "cart": { ... } } }
//! ```
//!
//! Blobs with a different `version` are rejected as a whole.

use crate::error::HydrationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current blob format version.
pub const HYDRATION_VERSION: u32 = 1;

/// Store states keyed by store name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationBlob {
    version: u32,
    stores: Map<String, Value>,
}

impl HydrationBlob {
    /// Empty blob at the current version
    pub fn new() -> Self {
        Self {
            version: HYDRATION_VERSION,
            stores: Map::new(),
        }
    }

    /// Decode a blob, rejecting other versions
    pub fn from_json(json: &str) -> Result<Self, HydrationError> {
        let blob: Self = serde_json::from_str(json)?;
        if blob.version != HYDRATION_VERSION {
            return Err(HydrationError::UnsupportedVersion {
                found: blob.version,
                expected: HYDRATION_VERSION,
            });
        }
        Ok(blob)
    }

    /// Record a store's state under `name`, replacing any previous entry
    pub fn insert<S: Serialize>(&mut self, name: &str, state: &S) -> Result<(), HydrationError> {
        self.stores
            .insert(name.to_string(), serde_json::to_value(state)?);
        Ok(())
    }

    /// Decode the state stored under `name`
    ///
    /// `None` when the blob has no such entry.
    pub fn get<S: DeserializeOwned>(&self, name: &str) -> Option<Result<S, HydrationError>> {
        self.stores
            .get(name)
            .map(|value| S::deserialize(value).map_err(HydrationError::from))
    }

    /// Whether a state is stored under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Stored names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    /// Format version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Plain JSON encoding
    pub fn to_json(&self) -> Result<String, HydrationError> {
        Ok(serde_json::to_string(self)?)
    }

    /// JSON safe to place inside an HTML `<script>` element
    ///
    /// `<`, `>`, `&` and the JS line separators are written as `\uXXXX`
    /// escapes, which only ever occur inside JSON strings, so the output is
    /// still valid JSON with the same value.
    pub fn to_script_json(&self) -> Result<String, HydrationError> {
        let json = self.to_json()?;
        let mut out = String::with_capacity(json.len());
        for c in json.chars() {
            match c {
                '<' => out.push_str("\\u003c"),
                '>' => out.push_str("\\u003e"),
                '&' => out.push_str("\\u0026"),
                '\u{2028}' => out.push_str("\\u2028"),
                '\u{2029}' => out.push_str("\\u2029"),
                _ => out.push(c),
            }
        }
        Ok(out)
    }
}

impl Default for HydrationBlob {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Cart {
        items: Vec<u32>,
    }

    #[test]
    fn test_insert_and_get() {
        let mut blob = HydrationBlob::new();
        blob.insert("cart", &Cart { items: vec![1, 2] }).unwrap();

        assert!(blob.contains("cart"));
        let cart: Cart = blob.get("cart").unwrap().unwrap();
        assert_eq!(cart.items, vec![1, 2]);
        assert!(blob.get::<Cart>("products").is_none());
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let mut blob = HydrationBlob::new();
        blob.insert("cart", &json!({ "items": "nope" })).unwrap();
        assert!(matches!(
            blob.get::<Cart>("cart"),
            Some(Err(HydrationError::Json(_)))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut blob = HydrationBlob::new();
        blob.insert("cart", &Cart { items: vec![3] }).unwrap();

        let decoded = HydrationBlob::from_json(&blob.to_json().unwrap()).unwrap();
        assert_eq!(decoded, blob);
        assert_eq!(decoded.version(), HYDRATION_VERSION);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let result = HydrationBlob::from_json(r#"{ "version": 2, "stores": {} }"#);
        assert!(matches!(
            result,
            Err(HydrationError::UnsupportedVersion { found: 2, expected: 1 })
        ));
    }

    #[test]
    fn test_missing_version_rejected() {
        let result = HydrationBlob::from_json(r#"{ "stores": {} }"#);
        assert!(matches!(result, Err(HydrationError::Json(_))));
    }

    #[test]
    fn test_script_safe_output() {
        let mut blob = HydrationBlob::new();
        blob.insert("note", &"</script><b>&").unwrap();

        let script = blob.to_script_json().unwrap();
        assert!(!script.contains('<'));
        assert!(!script.contains('>'));
        assert!(!script.contains('&'));

        let decoded = HydrationBlob::from_json(&script).unwrap();
        let note: String = decoded.get("note").unwrap().unwrap();
        assert_eq!(note, "</script><b>&");
    }
}
