pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;

pub use types::ComicMetadata;

/// Label tokens of the readme grammar. Kept as data so a library using a
/// different localization only needs new tokens, not new code.
pub const AUTHOR_LABEL: &str = "作者：";
pub const TAGS_LABEL: &str = "标签：";
pub const DESCRIPTION_LABEL: &str = "简介：";

/// Separator between tags on the tags line. The first tag is unprefixed.
pub const TAG_SEPARATOR: char = '#';

static AUTHOR_LINE: Lazy<Regex> = Lazy::new(|| label_line(AUTHOR_LABEL));
static TAGS_LINE: Lazy<Regex> = Lazy::new(|| label_line(TAGS_LABEL));

/// A line that begins with `label`; the capture is the rest of the line.
fn label_line(label: &str) -> Regex {
    Regex::new(&format!(r"(?m)^{}([^\r\n]+)", regex::escape(label)))
        .expect("label pattern is valid")
}

pub struct ReadmeParser;

impl ReadmeParser {
    /// Extract author, tags and description from a readme document.
    ///
    /// Each field is independent and optional; unrecognized content is
    /// ignored. Never fails: free text without labels parses to empty
    /// metadata.
    pub fn parse(content: &str) -> ComicMetadata {
        let author = AUTHOR_LINE
            .captures(content)
            .map(|caps| caps[1].trim().to_string());

        let tags = TAGS_LINE
            .captures(content)
            .map(|caps| Self::split_tags(&caps[1]))
            .unwrap_or_default();

        let description = Self::description_span(content)
            .map(|(start, end)| content[start..end].trim().to_string());

        ComicMetadata {
            author,
            tags,
            description,
        }
    }

    /// Rewrite only the tags line of `content`, leaving every other byte of
    /// the document as it was.
    ///
    /// With a non-empty tag set, an existing tags line is replaced in place;
    /// otherwise the new line goes right after the description text if there
    /// is one (before whatever follows it, including an author line), or at
    /// the end of the document. With an empty tag set, the tags line is
    /// removed together with its line terminator.
    pub fn rewrite_tags(content: &str, tags: &[String]) -> String {
        if tags.is_empty() {
            return Self::remove_tags_line(content);
        }

        let line = Self::tags_line(tags);

        if let Some(found) = TAGS_LINE.find(content) {
            let mut out = String::with_capacity(content.len() + line.len());
            out.push_str(&content[..found.start()]);
            out.push_str(&line);
            out.push_str(&content[found.end()..]);
            return out;
        }

        if let Some(at) = Self::description_end(content) {
            let mut out = String::with_capacity(content.len() + line.len() + 1);
            out.push_str(&content[..at]);
            out.push('\n');
            out.push_str(&line);
            out.push_str(&content[at..]);
            out
        } else {
            format!("{}\n{}", content, line)
        }
    }

    /// Split the remainder of a tags line into individual tags: pieces are
    /// trimmed, empty pieces discarded, order preserved.
    fn split_tags(raw: &str) -> Vec<String> {
        raw.split(TAG_SEPARATOR)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect()
    }

    fn tags_line(tags: &[String]) -> String {
        let mut line = String::from(TAGS_LABEL);
        for (i, tag) in tags.iter().enumerate() {
            if i > 0 {
                line.push(TAG_SEPARATOR);
            }
            line.push_str(tag);
        }
        line
    }

    /// Byte span of the description text: everything after the label up to
    /// the next author or tags label, or end of document. Not trimmed.
    fn description_span(content: &str) -> Option<(usize, usize)> {
        let start = content.find(DESCRIPTION_LABEL)? + DESCRIPTION_LABEL.len();
        let rest = &content[start..];
        let len = [AUTHOR_LABEL, TAGS_LABEL]
            .iter()
            .filter_map(|label| rest.find(label))
            .min()
            .unwrap_or(rest.len());
        Some((start, start + len))
    }

    /// Insertion point for a new tags line: directly after the last
    /// non-whitespace byte of the description block.
    fn description_end(content: &str) -> Option<usize> {
        let (start, end) = Self::description_span(content)?;
        Some(start + content[start..end].trim_end().len())
    }

    fn remove_tags_line(content: &str) -> String {
        let Some(found) = TAGS_LINE.find(content) else {
            return content.to_string();
        };

        // The line terminator goes with the line.
        let mut end = found.end();
        if content[end..].starts_with("\r\n") {
            end += 2;
        } else if content[end..].starts_with('\n') {
            end += 1;
        }

        let mut out = String::with_capacity(content.len());
        out.push_str(&content[..found.start()]);
        out.push_str(&content[end..]);
        out.trim_end().to_string()
    }
}
