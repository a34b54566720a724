//! Comic library catalog.
//!
//! Scans a directory tree of comics (one subdirectory per title, holding
//! page images and an optional readme document) into an in-memory catalog,
//! and keeps that catalog consistent with tag edits by rewriting the readme
//! and rebuilding the catalog from disk.

pub mod catalog;
pub mod cover;
pub mod error;
pub mod metadata;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub use catalog::{CatalogIndex, ComicDetail, ComicLibrary, Page, TitleRecord};
pub use error::CatalogError;
pub use metadata::{ComicMetadata, ReadmeParser};

/// Atomic file write: write to a temp file in the same directory, then
/// rename over the target. `fs::File::create` on the target directly would
/// truncate it first, so a crash mid-write could leave a half-written
/// document behind.
pub(crate) fn atomic_write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let temp_path = path.with_file_name(format!("{}.shelf-tmp", file_name));

    let mut file = fs::File::create(&temp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
}
