use serde::{Deserialize, Serialize};

/// Structured fields extracted from a title's readme document.
///
/// Every field is optional in the document; a readme with no recognized
/// labels (or no readme at all) parses to the default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicMetadata {
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: Option<String>,
}
