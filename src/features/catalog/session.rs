use std::sync::Arc;

use super::memo::Memo;
use super::state::{derive_categories, filter_entries, CatalogFilter, Selection};
use crate::features::entries::models::Entry;

/// Decoded entries of one store snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub version: u64,
    pub entries: Arc<Vec<Entry>>,
}

impl CatalogSnapshot {
    pub fn new(version: u64, entries: Vec<Entry>) -> Self {
        Self {
            version,
            entries: Arc::new(entries),
        }
    }
}

/// One viewer's catalog state: the latest snapshot plus that viewer's filter.
///
/// `categories()` and `visible_entries()` are recomputed only when the
/// snapshot version or a filter value changed since the last call.
pub struct CatalogSession {
    snapshot: Arc<CatalogSnapshot>,
    filter: CatalogFilter,
    categories: Memo<u64, Arc<Vec<String>>>,
    visible: Memo<(u64, CatalogFilter), Arc<Vec<Entry>>>,
}

impl CatalogSession {
    pub fn new(snapshot: Arc<CatalogSnapshot>) -> Self {
        Self {
            snapshot,
            filter: CatalogFilter::default(),
            categories: Memo::new(),
            visible: Memo::new(),
        }
    }

    pub fn with_filter(mut self, filter: CatalogFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
    }

    pub fn set_category(&mut self, category: &str) {
        self.filter.category = Selection::parse(category);
    }

    pub fn set_featured(&mut self, featured: &str) {
        self.filter.featured = Selection::parse(featured);
    }

    /// Swap in a newly delivered snapshot. Older versions are ignored.
    pub fn replace_snapshot(&mut self, snapshot: Arc<CatalogSnapshot>) {
        if snapshot.version >= self.snapshot.version {
            self.snapshot = snapshot;
        }
    }

    pub fn categories(&self) -> Arc<Vec<String>> {
        let entries = &self.snapshot.entries;
        self.categories
            .get_or_compute(self.snapshot.version, || {
                Arc::new(derive_categories(entries))
            })
    }

    pub fn visible_entries(&self) -> Arc<Vec<Entry>> {
        let entries = &self.snapshot.entries;
        let filter = &self.filter;
        self.visible
            .get_or_compute((self.snapshot.version, filter.clone()), || {
                Arc::new(filter_entries(entries, filter))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, category: &str, featured: &[&str]) -> Entry {
        Entry {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{} description", name),
            category: category.to_string(),
            tags: vec![],
            link: format!("https://{}.dev", id),
            image_url: None,
            details: None,
            featured: featured.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn snapshot(version: u64, entries: Vec<Entry>) -> Arc<CatalogSnapshot> {
        Arc::new(CatalogSnapshot::new(version, entries))
    }

    fn visible_ids(session: &CatalogSession) -> Vec<String> {
        session
            .visible_entries()
            .iter()
            .map(|e| e.id.clone())
            .collect()
    }

    #[test]
    fn test_setters_recompute_visible_entries() {
        let mut session = CatalogSession::new(snapshot(
            1,
            vec![
                entry("a", "Hoppscotch", "API Tools", &["Hot"]),
                entry("b", "Postman Clone", "API Tools", &[]),
                entry("c", "Ripgrep", "CLI", &["Latest"]),
            ],
        ));

        assert_eq!(visible_ids(&session), vec!["a", "b", "c"]);

        session.set_category("API Tools");
        assert_eq!(visible_ids(&session), vec!["a", "b"]);

        session.set_featured("Hot");
        assert_eq!(visible_ids(&session), vec!["a"]);

        session.set_featured("all");
        session.set_search_term("postman");
        assert_eq!(visible_ids(&session), vec!["b"]);

        session.set_category("all");
        session.set_search_term("");
        assert_eq!(visible_ids(&session), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unchanged_inputs_reuse_result() {
        let session = CatalogSession::new(snapshot(1, vec![entry("a", "A", "CLI", &[])]));

        let first = session.visible_entries();
        let second = session.visible_entries();
        assert!(Arc::ptr_eq(&first, &second));

        let categories = session.categories();
        assert!(Arc::ptr_eq(&categories, &session.categories()));
    }

    #[test]
    fn test_new_snapshot_recomputes() {
        let mut session = CatalogSession::new(snapshot(1, vec![entry("a", "A", "CLI", &[])]));
        session.set_category("Databases");
        assert!(session.visible_entries().is_empty());
        assert_eq!(*session.categories(), vec!["all", "CLI"]);

        session.replace_snapshot(snapshot(
            2,
            vec![
                entry("b", "Postgres", "Databases", &[]),
                entry("a", "A", "CLI", &[]),
            ],
        ));

        assert_eq!(session.version(), 2);
        assert_eq!(visible_ids(&session), vec!["b"]);
        assert_eq!(*session.categories(), vec!["all", "CLI", "Databases"]);
    }

    #[test]
    fn test_stale_snapshot_is_ignored() {
        let mut session = CatalogSession::new(snapshot(5, vec![entry("a", "A", "CLI", &[])]));
        session.replace_snapshot(snapshot(3, vec![]));
        assert_eq!(session.version(), 5);
        assert_eq!(visible_ids(&session), vec!["a"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let session = CatalogSession::new(Arc::new(CatalogSnapshot::default()));
        assert_eq!(*session.categories(), vec!["all"]);
        assert!(session.visible_entries().is_empty());
    }
}
