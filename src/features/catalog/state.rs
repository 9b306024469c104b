//! Catalog state: category derivation and multi-predicate filtering.
//!
//! Everything here is a pure projection over an entry slice. Recomputation
//! and caching live in [`super::session::CatalogSession`].

use std::collections::BTreeSet;

use crate::features::entries::models::Entry;
use crate::shared::constants::ALL;

/// One filter dimension: either unrestricted or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Parse a raw filter value. `"all"` and the empty string mean unrestricted.
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == ALL {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Only(value) => value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// The three user-controlled filter inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CatalogFilter {
    /// Raw search text; matched as typed, never trimmed
    pub search_term: String,
    pub category: Selection,
    pub featured: Selection,
}

impl CatalogFilter {
    pub fn new(search_term: impl Into<String>, category: Selection, featured: Selection) -> Self {
        Self {
            search_term: search_term.into(),
            category,
            featured,
        }
    }

    /// True when the filter admits every entry
    pub fn is_unrestricted(&self) -> bool {
        self.search_term.is_empty() && self.category.is_all() && self.featured.is_all()
    }

    fn matches_category(&self, entry: &Entry) -> bool {
        match &self.category {
            Selection::All => true,
            Selection::Only(category) => entry.category == *category,
        }
    }

    fn matches_featured(&self, entry: &Entry) -> bool {
        match &self.featured {
            Selection::All => true,
            Selection::Only(label) => entry.is_featured_in(label),
        }
    }
}

fn matches_search(entry: &Entry, needle: &str) -> bool {
    needle.is_empty()
        || entry.name.to_lowercase().contains(needle)
        || entry.description.to_lowercase().contains(needle)
}

/// Distinct non-empty categories in byte order, with `"all"` first.
///
/// A category literally named `"all"` is folded into the sentinel.
pub fn derive_categories(entries: &[Entry]) -> Vec<String> {
    let distinct: BTreeSet<&str> = entries
        .iter()
        .map(|entry| entry.category.as_str())
        .filter(|category| !category.is_empty() && *category != ALL)
        .collect();

    std::iter::once(ALL)
        .chain(distinct)
        .map(String::from)
        .collect()
}

/// Entries passing every predicate of `filter`, in input order.
pub fn filter_entries(entries: &[Entry], filter: &CatalogFilter) -> Vec<Entry> {
    if filter.is_unrestricted() {
        return entries.to_vec();
    }

    let needle = filter.search_term.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            filter.matches_category(entry)
                && filter.matches_featured(entry)
                && matches_search(entry, &needle)
        })
        .cloned()
        .collect()
}
