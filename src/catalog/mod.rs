pub mod index;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rayon::prelude::*;
use serde::Serialize;

use crate::atomic_write_file;
use crate::cover;
use crate::error::CatalogError;
use crate::metadata::{ComicMetadata, ReadmeParser};

pub use index::{CatalogIndex, Page, TitleRecord};

/// File name used when a tag update needs a metadata document and the title
/// has none.
const DEFAULT_README_NAME: &str = "readme.md";

/// Extensions accepted for a metadata document, matched case-insensitively.
const README_EXTENSIONS: &[&str] = &["txt", "md"];

/// Everything the reader view needs for one title: the page images in
/// reading order plus the parsed metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ComicDetail {
    pub title: String,
    pub pages: Vec<String>,
    pub metadata: ComicMetadata,
}

/// Owns the catalog built from a comic library root (one subdirectory per
/// title) and the workflows that mutate it.
///
/// The catalog is never patched in place: every mutation persists to disk
/// first and then rebuilds the whole index from a fresh scan, so the index
/// always mirrors disk truth.
pub struct ComicLibrary {
    root: PathBuf,
    index: CatalogIndex,
    /// Serializes rebuilds so two refreshes never interleave their swaps.
    scan_lock: Mutex<()>,
    /// Serializes tag updates (file write followed by a full rebuild).
    update_lock: Mutex<()>,
}

impl ComicLibrary {
    /// A library rooted at `root`, with an empty catalog. Call [`refresh`]
    /// to run the first scan.
    ///
    /// [`refresh`]: ComicLibrary::refresh
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: CatalogIndex::new(),
            scan_lock: Mutex::new(()),
            update_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// Full scan of the library root, replacing the catalog in one swap.
    ///
    /// Safe to call repeatedly; the first call after construction is the
    /// initialization. A failure inside a single title degrades that title
    /// to no cover and empty metadata and is logged, never aborting the
    /// scan. An unreadable root logs an error and leaves the catalog empty.
    pub fn refresh(&self) {
        let _guard = match self.scan_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let titles = self.list_title_dirs();
        let records: Vec<TitleRecord> = titles
            .par_iter()
            .map(|title| self.scan_title(title))
            .collect();

        self.index.rebuild(records);
        log::info!("catalog refreshed with {} titles", self.index.len());
    }

    pub fn count(&self) -> usize {
        self.index.len()
    }

    pub fn all(&self) -> Vec<TitleRecord> {
        self.index.all()
    }

    pub fn list_page(&self, page: usize, page_size: usize) -> Page {
        self.index.page(page, page_size)
    }

    pub fn get_by_title(&self, title: &str) -> Result<TitleRecord, CatalogError> {
        self.index
            .find_by_title(title)
            .ok_or_else(|| CatalogError::not_found(title))
    }

    pub fn unique_tags(&self) -> Vec<String> {
        self.index.unique_tags()
    }

    /// Reader view for one title: image files of the directory, filtered by
    /// extension and sorted lexicographically, plus the cached metadata.
    pub fn detail(&self, title: &str) -> Result<ComicDetail, CatalogError> {
        let record = self.get_by_title(title)?;
        let dir = Path::new(&record.path);

        let mut pages: Vec<String> = list_file_names(dir)
            .unwrap_or_else(|err| {
                log::warn!("cannot list pages of {:?}: {}", dir, err);
                Vec::new()
            })
            .into_iter()
            .filter(|name| cover::is_image(name))
            .collect();
        pages.sort();

        Ok(ComicDetail {
            title: record.title,
            pages,
            metadata: record.metadata,
        })
    }

    /// Replace the tag set in one title's metadata document, then rebuild
    /// the whole catalog from disk.
    ///
    /// The document is located by name (first `readme*.txt`/`readme*.md`,
    /// any case); a title without one gets `readme.md`. Only the tags line
    /// changes; the rest of the document is preserved byte for byte. The
    /// write is atomic (temp file, then rename), so a crash never leaves a
    /// half-written document. Fails with [`CatalogError::NotFound`] for an
    /// unknown title without touching the file system, and with
    /// [`CatalogError::UpdateFailed`] on any I/O error, leaving the catalog
    /// unchanged until the next successful refresh.
    pub fn update_tags(&self, title: &str, tags: &[String]) -> Result<(), CatalogError> {
        let _guard = match self.update_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let record = self.get_by_title(title)?;
        log::info!("updating tags for '{}': [{}]", title, tags.join(", "));

        let dir = PathBuf::from(&record.path);
        let update_err = |path: &Path, source: io::Error| CatalogError::UpdateFailed {
            title: title.to_string(),
            path: path.to_path_buf(),
            source,
        };

        let readme_path = match find_readme_file(&dir).map_err(|e| update_err(&dir, e))? {
            Some(path) => path,
            None => {
                log::debug!("no readme in {:?}, will create {}", dir, DEFAULT_README_NAME);
                dir.join(DEFAULT_README_NAME)
            }
        };

        // A document that does not exist yet reads as empty; the write below
        // creates it.
        let content = match fs::read_to_string(&readme_path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(update_err(&readme_path, err)),
        };

        let rewritten = ReadmeParser::rewrite_tags(&content, tags);
        atomic_write_file(&readme_path, rewritten.as_bytes())
            .map_err(|e| update_err(&readme_path, e))?;
        log::debug!("wrote metadata document {:?}", readme_path);

        // Disk is the source of truth; no partial in-memory patch.
        self.refresh();
        Ok(())
    }

    /// Immediate subdirectories of the root, in listing order, skipping
    /// hidden entries.
    fn list_title_dirs(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                log::error!("cannot read library root {:?}: {}", self.root, err);
                return Vec::new();
            }
        };

        let mut titles = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            if entry.path().is_dir() {
                titles.push(name);
            }
        }
        titles
    }

    /// Build the record for one title. Runs in parallel across titles; any
    /// I/O failure degrades this record instead of failing the scan.
    fn scan_title(&self, title: &str) -> TitleRecord {
        let dir = self.root.join(title);

        let files = list_file_names(&dir).unwrap_or_else(|err| {
            log::warn!("cannot list title directory {:?}: {}", dir, err);
            Vec::new()
        });

        let cover = cover::resolve_cover(&files);
        let metadata = read_metadata(&dir, &files);

        TitleRecord {
            title: title.to_string(),
            path: dir.to_string_lossy().to_string(),
            cover,
            metadata,
        }
    }
}

/// Names of the regular files in `dir`, in listing order.
fn list_file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    Ok(names)
}

fn is_readme_name(name: &str) -> bool {
    // `get` rather than a slice: byte 6 may not be a char boundary.
    let has_readme_stem = name
        .get(..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("readme"))
        .unwrap_or(false);
    has_readme_stem
        && Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                README_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            })
            .unwrap_or(false)
}

/// First metadata document in `dir`, by listing order, or `None`.
fn find_readme_file(dir: &Path) -> io::Result<Option<PathBuf>> {
    let names = list_file_names(dir)?;
    Ok(names
        .into_iter()
        .find(|name| is_readme_name(name))
        .map(|name| dir.join(name)))
}

/// Parse the title's metadata document, if it has one. An unreadable
/// document logs a warning and degrades to empty metadata.
fn read_metadata(dir: &Path, files: &[String]) -> ComicMetadata {
    let Some(name) = files.iter().find(|name| is_readme_name(name)) else {
        return ComicMetadata::default();
    };

    match fs::read_to_string(dir.join(name)) {
        Ok(content) => ReadmeParser::parse(&content),
        Err(err) => {
            log::warn!("unreadable metadata document in {:?}: {}", dir, err);
            ComicMetadata::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_readme_name() {
        assert!(is_readme_name("readme.md"));
        assert!(is_readme_name("README.TXT"));
        assert!(is_readme_name("Readme_v2.txt"));
        assert!(!is_readme_name("read.md"));
        assert!(!is_readme_name("readme.pdf"));
        assert!(!is_readme_name("readme"));
        assert!(!is_readme_name("my_readme.md"));
    }
}
