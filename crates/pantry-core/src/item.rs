//! Inventory item types and the search filter
//!
//! The item name is the document id: there is no separate identity, and
//! renaming an item means delete + recreate. Names are case-sensitive as
//! stored; capitalization happens only at display time.

use serde::{Deserialize, Serialize};

/// Document form of an item, as held by the document store
///
/// The document id (the item name) is not part of the document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDocument {
    /// Item quantity; `>= 1` for any persisted document. A document whose
    /// quantity would drop to 0 is deleted instead of written.
    pub quantity: u32,

    /// URL of the stored photo, if one was ever attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ItemDocument {
    /// Create a fresh document for a newly added item
    pub fn new(quantity: u32, image_url: Option<String>) -> Self {
        Self {
            quantity,
            image_url,
        }
    }
}

/// Merge-write payload for a document
///
/// Fields left `None` are preserved by the store; only the named fields are
/// written. This mirrors the merge semantics of document databases and is
/// the only write shape the engine uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl DocumentPatch {
    /// Patch that only adjusts the quantity
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            image_url: None,
        }
    }

    /// Attach an image URL to the patch, if one is present
    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    /// Apply this patch to a document, merge-write style
    pub fn apply_to(&self, doc: &mut ItemDocument) {
        if let Some(quantity) = self.quantity {
            doc.quantity = quantity;
        }
        if let Some(ref url) = self.image_url {
            doc.image_url = Some(url.clone());
        }
    }

    /// Materialize a new document from this patch alone (create path)
    pub fn into_document(self) -> ItemDocument {
        ItemDocument {
            quantity: self.quantity.unwrap_or(0),
            image_url: self.image_url,
        }
    }
}

/// A materialized inventory row: document plus its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Item name, the unique key in the store
    pub name: String,

    /// Current quantity
    pub quantity: u32,

    /// URL of the stored photo, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl InventoryItem {
    /// Build an inventory row from a document and its id
    pub fn from_document(name: impl Into<String>, doc: ItemDocument) -> Self {
        Self {
            name: name.into(),
            quantity: doc.quantity,
            image_url: doc.image_url,
        }
    }

    /// Display form of the name: first character upper-cased
    ///
    /// Display-only normalization. The stored name is never changed.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// Filter items by case-insensitive substring match on the name
///
/// Pure function: no side effects, deterministic. An empty query returns the
/// full sequence unchanged in relative order.
pub fn filter_items<'a>(items: &'a [InventoryItem], query: &str) -> Vec<&'a InventoryItem> {
    if query.is_empty() {
        return items.iter().collect();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect()
}
