//! Word-character classification for match boundary checks

use crate::config::BoundaryConfig;
use crate::scanner::language::is_arabic_char;

#[derive(Debug, Clone, Default)]
pub struct WordClassifier {
    config: BoundaryConfig,
}

impl WordClassifier {
    pub fn new(config: BoundaryConfig) -> Self {
        Self { config }
    }

    pub fn is_word_char(&self, c: char) -> bool {
        if is_arabic_char(c) || c.is_ascii_alphanumeric() {
            return true;
        }
        if self.config.arabic_supplement && ('\u{0750}'..='\u{077F}').contains(&c) {
            return true;
        }
        if self.config.arabic_presentation_forms
            && (('\u{FB50}'..='\u{FDFF}').contains(&c) || ('\u{FE70}'..='\u{FEFF}').contains(&c))
        {
            return true;
        }
        self.config.unicode_letters && c.is_alphanumeric()
    }

    /// True if `[start, end)` sits on word boundaries in `chars`
    pub fn at_boundaries(&self, chars: &[char], start: usize, end: usize) -> bool {
        let before_ok = start == 0 || !self.is_word_char(chars[start - 1]);
        let after_ok = end >= chars.len() || !self.is_word_char(chars[end]);
        before_ok && after_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_baseline_word_chars() {
        let classifier = WordClassifier::default();
        assert!(classifier.is_word_char('ع'));
        assert!(classifier.is_word_char('a'));
        assert!(classifier.is_word_char('Z'));
        assert!(classifier.is_word_char('7'));
        assert!(!classifier.is_word_char(' '));
        assert!(!classifier.is_word_char('-'));
        assert!(!classifier.is_word_char('é'));
        assert!(!classifier.is_word_char('\u{FE8D}'));
    }

    #[test]
    fn test_optional_classes() {
        let classifier = WordClassifier::new(BoundaryConfig {
            arabic_supplement: true,
            arabic_presentation_forms: true,
            unicode_letters: false,
        });
        assert!(classifier.is_word_char('\u{0750}'));
        assert!(classifier.is_word_char('\u{FE8D}'));
        assert!(!classifier.is_word_char('é'));

        let unicode = WordClassifier::new(BoundaryConfig {
            unicode_letters: true,
            ..BoundaryConfig::default()
        });
        assert!(unicode.is_word_char('é'));
    }

    #[test]
    fn test_boundaries_inside_word_rejected() {
        let classifier = WordClassifier::default();
        let text = chars("السلام عليكم");
        // "علي" at 7..10 is followed by 'ك'
        assert!(!classifier.at_boundaries(&text, 7, 10));
        assert!(classifier.at_boundaries(&text, 7, 12));
    }

    #[test]
    fn test_boundaries_at_text_edges() {
        let classifier = WordClassifier::default();
        let text = chars("علي");
        assert!(classifier.at_boundaries(&text, 0, 3));
    }

    #[test]
    fn test_punctuation_is_a_boundary() {
        let classifier = WordClassifier::default();
        let text = chars("(NEOM), city");
        assert!(classifier.at_boundaries(&text, 1, 5));
    }
}
