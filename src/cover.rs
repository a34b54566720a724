//! Cover selection for a title directory.

use std::path::Path;

/// Image extensions the catalog recognizes, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Canonical first-page file name; preferred as the cover when present.
pub const FIRST_PAGE_NAME: &str = "00000001.jpg";

pub fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Pick a cover from a directory listing: the canonical first page if one
/// exists (any case), otherwise the first image in listing order, otherwise
/// nothing. Pure function; an unreadable directory upstream shows up here as
/// an empty listing and yields `None`.
pub fn resolve_cover(names: &[String]) -> Option<String> {
    let mut first_image = None;
    for name in names.iter().filter(|name| is_image(name)) {
        if name.eq_ignore_ascii_case(FIRST_PAGE_NAME) {
            return Some(name.clone());
        }
        if first_image.is_none() {
            first_image = Some(name.clone());
        }
    }
    first_image
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_prefers_first_page_regardless_of_listing_order() {
        let listing = names(&["00000003.jpg", "00000002.jpg", "00000001.jpg"]);
        assert_eq!(resolve_cover(&listing).as_deref(), Some("00000001.jpg"));
    }

    #[test]
    fn test_first_page_match_is_case_insensitive() {
        let listing = names(&["zzz.png", "00000001.JPG"]);
        assert_eq!(resolve_cover(&listing).as_deref(), Some("00000001.JPG"));
    }

    #[test]
    fn test_falls_back_to_first_image_in_listing_order() {
        let listing = names(&["readme.md", "b.PNG", "a.jpg"]);
        assert_eq!(resolve_cover(&listing).as_deref(), Some("b.PNG"));
    }

    #[test]
    fn test_ignores_non_image_files() {
        let listing = names(&["readme.txt", "notes.pdf", "cover.jpeg"]);
        assert_eq!(resolve_cover(&listing), None);
    }

    #[test]
    fn test_empty_listing_has_no_cover() {
        assert_eq!(resolve_cover(&[]), None);
    }
}
