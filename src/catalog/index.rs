use std::collections::HashSet;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::metadata::ComicMetadata;

/// One catalog entry per comic directory. The directory name is the title
/// and the lookup key, compared verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleRecord {
    pub title: String,
    /// Absolute path of the title directory.
    pub path: String,
    /// Chosen cover image, as a file name inside the title directory.
    pub cover: Option<String>,
    pub metadata: ComicMetadata,
}

/// A page of records plus the catalog-wide total, for paginated listings.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub records: Vec<TitleRecord>,
    pub total: usize,
}

/// The in-memory catalog: an ordered snapshot of every title, in directory
/// scan order. Rebuilt wholesale from a scan and swapped in one step, so a
/// reader always sees either the previous snapshot or the new one, never a
/// mix of the two.
///
/// Lookups are linear scans; fine at personal-library scale.
#[derive(Default)]
pub struct CatalogIndex {
    records: RwLock<Vec<TitleRecord>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection in a single swap.
    pub fn rebuild(&self, records: Vec<TitleRecord>) {
        if let Ok(mut guard) = self.records.write() {
            *guard = records;
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record, in scan order. Cloned, so callers cannot disturb the
    /// snapshot and a concurrent rebuild cannot disturb the caller.
    pub fn all(&self) -> Vec<TitleRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn find_by_title(&self, title: &str) -> Option<TitleRecord> {
        self.records
            .read()
            .ok()?
            .iter()
            .find(|record| record.title == title)
            .cloned()
    }

    /// 1-indexed pagination. A page past the end is an empty page with the
    /// correct total, never an error.
    pub fn page(&self, page: usize, page_size: usize) -> Page {
        let records = match self.records.read() {
            Ok(guard) => guard,
            Err(_) => {
                return Page {
                    records: Vec::new(),
                    total: 0,
                }
            }
        };

        let total = records.len();
        let start = page.saturating_sub(1).saturating_mul(page_size);
        let slice = if start >= total {
            &[][..]
        } else {
            let end = start.saturating_add(page_size).min(total);
            &records[start..end]
        };

        Page {
            records: slice.to_vec(),
            total,
        }
    }

    /// Distinct tag strings across all records. Unordered.
    pub fn unique_tags(&self) -> Vec<String> {
        let mut tags = HashSet::new();
        if let Ok(records) = self.records.read() {
            for record in records.iter() {
                for tag in &record.metadata.tags {
                    tags.insert(tag.clone());
                }
            }
        }
        tags.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, tags: &[&str]) -> TitleRecord {
        TitleRecord {
            title: title.to_string(),
            path: format!("/library/{}", title),
            cover: None,
            metadata: ComicMetadata {
                author: None,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                description: None,
            },
        }
    }

    #[test]
    fn test_rebuild_replaces_everything() {
        let index = CatalogIndex::new();
        index.rebuild(vec![record("a", &[]), record("b", &[])]);
        assert_eq!(index.len(), 2);

        index.rebuild(vec![record("c", &[])]);
        let all = index.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "c");
        assert!(index.find_by_title("a").is_none());
    }

    #[test]
    fn test_find_by_title_is_exact() {
        let index = CatalogIndex::new();
        index.rebuild(vec![record("My Title", &[])]);
        assert!(index.find_by_title("My Title").is_some());
        assert!(index.find_by_title("my title").is_none());
        assert!(index.find_by_title("My Title ").is_none());
    }

    #[test]
    fn test_page_slices_in_scan_order() {
        let index = CatalogIndex::new();
        index.rebuild(vec![record("a", &[]), record("b", &[]), record("c", &[])]);

        let page = index.page(2, 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title, "c");
    }

    #[test]
    fn test_page_past_the_end_is_empty_with_total() {
        let index = CatalogIndex::new();
        index.rebuild(vec![record("a", &[]), record("b", &[])]);

        let page = index.page(5, 10);
        assert!(page.records.is_empty());
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_unique_tags_deduplicates_across_records() {
        let index = CatalogIndex::new();
        index.rebuild(vec![
            record("a", &["x", "y"]),
            record("b", &["x"]),
            record("c", &["x", "z"]),
        ]);

        let mut tags = index.unique_tags();
        tags.sort();
        assert_eq!(tags, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_record_wire_shape() {
        let mut rec = record("My Title", &["a", "b"]);
        rec.cover = Some("00000001.jpg".to_string());

        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "title": "My Title",
                "path": "/library/My Title",
                "cover": "00000001.jpg",
                "metadata": { "author": null, "tags": ["a", "b"], "description": null }
            })
        );
    }
}
