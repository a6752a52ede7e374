//! Catalog entries maintained by the ingestion process.

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A subscribable series.
///
/// Owned by an external ingestion process; this service only reads it.
///
/// # Examples
///
/// ```
/// use animebot_core::CatalogItemBuilder;
///
/// let item = CatalogItemBuilder::default()
///     .id(42)
///     .external_id("20")
///     .primary_name("Наруто")
///     .alternate_name("Naruto")
///     .build()
///     .unwrap();
///
/// assert!(item.matches_name("Naruto"));
/// assert!(item.contains_text("naru"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct CatalogItem {
    /// Internal identifier
    pub id: i64,
    /// Identifier in the upstream catalog
    pub external_id: String,
    /// Localized name
    pub primary_name: String,
    /// Original or romanized name
    pub alternate_name: String,
    /// Poster reference
    #[builder(default)]
    pub image_ref: Option<String>,
    /// When the next episode airs, if known
    #[builder(default)]
    pub next_release_at: Option<DateTime<Utc>>,
    /// Whether subscribers were told about the latest release
    #[builder(default)]
    pub notified: bool,
}

impl CatalogItem {
    /// Exact match against either name. An empty name never matches.
    pub fn matches_name(&self, name: &str) -> bool {
        !name.is_empty() && (self.primary_name == name || self.alternate_name == name)
    }

    /// Case-insensitive substring match against either name.
    pub fn contains_text(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.primary_name.to_lowercase().contains(&needle)
            || self.alternate_name.to_lowercase().contains(&needle)
    }
}

/// A catalog item annotated with the requesting user's membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedItem {
    /// The item
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Whether the requesting user is subscribed
    pub subscribed: bool,
}
