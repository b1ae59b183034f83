//! The nested mapping behind the store.
//!
//! `StoreData` is the serializable root type: a three-level mapping
//! `document URI → element id → attribute name → value`. All fields are
//! plain data, so it serializes exactly as the nested JSON object found in
//! the backing file:
//!
//! ```json
//! {
//!   "chrome://browser/content/browser.xhtml": {
//!     "main-window": { "width": "1904", "height": "1612" }
//!   }
//! }
//! ```
//!
//! `IndexMap` keeps iteration (and therefore serialization) order
//! deterministic: insertion order, preserved across a round-trip.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use xulstore_core::StoreError;

type AttrMap = IndexMap<String, String>;
type ElementMap = IndexMap<String, AttrMap>;
type DocumentMap = IndexMap<String, ElementMap>;

/// Nested document → element → attribute → value mapping.
///
/// Purely structural: key validation and value capping are the store's
/// responsibility. Empty inner maps never survive a removal. Pruning is
/// eager, so serializations contain no hollow documents or elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreData {
    docs: DocumentMap,
}

impl StoreData {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a mapping from the backing file's JSON.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json)
            .map_err(|e| StoreError::load_failure(format!("invalid JSON: {e}")))
    }

    /// Serialize the mapping for the backing file.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self)
            .map_err(|e| StoreError::write_failure(format!("serialization failed: {e}")))
    }

    /// Look up a stored value.
    pub fn get(&self, doc_uri: &str, id: &str, attr: &str) -> Option<&str> {
        self.docs
            .get(doc_uri)
            .and_then(|ids| ids.get(id))
            .and_then(|attrs| attrs.get(attr))
            .map(String::as_str)
    }

    /// Whether a value is stored under the given path.
    pub fn has(&self, doc_uri: &str, id: &str, attr: &str) -> bool {
        self.get(doc_uri, id, attr).is_some()
    }

    /// Store a value, creating intermediate levels as needed.
    ///
    /// Returns `false` when the identical value is already present (the
    /// mapping is untouched), `true` when something changed.
    pub fn set(&mut self, doc_uri: &str, id: &str, attr: &str, value: &str) -> bool {
        let attrs = self
            .docs
            .entry(doc_uri.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();

        if attrs.get(attr).is_some_and(|old| old == value) {
            return false;
        }

        attrs.insert(attr.to_string(), value.to_string());
        true
    }

    /// Remove a value, pruning emptied parents.
    ///
    /// Returns `true` when a value was actually removed.
    pub fn remove(&mut self, doc_uri: &str, id: &str, attr: &str) -> bool {
        let Some(ids) = self.docs.get_mut(doc_uri) else {
            return false;
        };
        let Some(attrs) = ids.get_mut(id) else {
            return false;
        };
        if attrs.shift_remove(attr).is_none() {
            return false;
        }

        if attrs.is_empty() {
            ids.shift_remove(id);
            if ids.is_empty() {
                self.docs.shift_remove(doc_uri);
            }
        }
        true
    }

    /// Remove a document's entire subtree.
    ///
    /// Returns `true` when the document was present.
    pub fn remove_document(&mut self, doc_uri: &str) -> bool {
        self.docs.shift_remove(doc_uri).is_some()
    }

    /// Snapshot of the element ids stored for a document.
    pub fn ids(&self, doc_uri: &str) -> Vec<String> {
        self.docs
            .get(doc_uri)
            .map(|ids| ids.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the attribute names stored for an element.
    pub fn attrs(&self, doc_uri: &str, id: &str) -> Vec<String> {
        self.docs
            .get(doc_uri)
            .and_then(|ids| ids.get(id))
            .map(|attrs| attrs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the known document URIs.
    pub fn documents(&self) -> Vec<String> {
        self.docs.keys().cloned().collect()
    }

    /// Whether no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of documents.
    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    /// Number of elements across all documents.
    pub fn element_count(&self) -> usize {
        self.docs.values().map(IndexMap::len).sum()
    }

    /// Number of attributes across all elements.
    pub fn attribute_count(&self) -> usize {
        self.docs
            .values()
            .flat_map(IndexMap::values)
            .map(IndexMap::len)
            .sum()
    }
}
