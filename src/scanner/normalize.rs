//! Text normalization.
//!
//! Every span reported downstream indexes into the output of
//! [`normalize_text`], never into the raw input.

use std::sync::OnceLock;

use regex::Regex;

static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// HTML entities decoded after tag removal. `&amp;` goes last so that
/// "&amp;lt;" decodes to the literal "&lt;" and not to "<".
const HTML_ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Strip markup, decode common entities, collapse whitespace runs, trim.
pub fn normalize_text(raw: &str) -> String {
    let stripped = tag_regex().replace_all(raw, " ");

    // Runs after tag stripping: an encoded "&lt;b&gt;" is article text and
    // stays as a literal "<b>", it is never treated as markup.
    let mut decoded = stripped.into_owned();
    for (entity, replacement) in HTML_ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Basic statistics over the raw and normalized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    /// Raw input length in chars
    pub original_length: usize,
    /// Normalized text length in chars
    pub normalized_length: usize,
    /// Whitespace-delimited words in the normalized text
    pub word_count: usize,
}

impl TextStats {
    pub fn compute(raw: &str, normalized: &str) -> Self {
        Self {
            original_length: raw.chars().count(),
            normalized_length: normalized.chars().count(),
            word_count: normalized.split_whitespace().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_collapses_whitespace() {
        let text = "<p>أعلن   <b>أحمد علي</b></p>\n\n<p>عن مشروع</p>";
        assert_eq!(normalize_text(text), "أعلن أحمد علي عن مشروع");
    }

    #[test]
    fn test_nbsp_becomes_space() {
        assert_eq!(normalize_text("NEOM&nbsp;&nbsp;city"), "NEOM city");
    }

    #[test]
    fn test_decodes_common_entities() {
        assert_eq!(normalize_text("AT&amp;T &quot;deal&quot;"), "AT&T \"deal\"");
        assert_eq!(normalize_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_encoded_markup_stays_literal_text() {
        assert_eq!(normalize_text("use &lt;b&gt; for <b>bold</b>"), "use <b> for bold");
    }

    #[test]
    fn test_adjacent_blocks_do_not_fuse_words() {
        assert_eq!(normalize_text("<p>first</p><p>second</p>"), "first second");
    }

    #[test]
    fn test_markup_only_normalizes_to_empty() {
        assert_eq!(normalize_text("  <br/> <div></div> "), "");
    }

    #[test]
    fn test_text_stats() {
        let raw = "<p>نيوم  مشروع</p>";
        let normalized = normalize_text(raw);
        let stats = TextStats::compute(raw, &normalized);
        assert_eq!(stats.original_length, raw.chars().count());
        assert_eq!(stats.normalized_length, 10);
        assert_eq!(stats.word_count, 2);
    }
}
