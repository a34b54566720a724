use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that cross the catalog boundary.
///
/// Per-title scan failures are deliberately not represented here: a title
/// whose directory or readme cannot be read stays in the catalog with an
/// absent cover and empty metadata, and the failure is only logged.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested title has no record in the catalog.
    #[error("title not found in catalog: {title}")]
    NotFound { title: String },

    /// Reading or writing a title's metadata document failed during a tag
    /// update. The document is left as it was (writes go through a temp
    /// file and rename) and the catalog is unchanged until the next refresh.
    #[error("failed to update metadata for '{title}' ({path:?}): {source}")]
    UpdateFailed {
        title: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    pub(crate) fn not_found(title: &str) -> Self {
        CatalogError::NotFound {
            title: title.to_string(),
        }
    }
}
