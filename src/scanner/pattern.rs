//! Pattern compilation: catalog item → ordered surface strings.
//!
//! Order matters only at a tie: when two patterns of the same item match
//! at the same position, the earlier compiled pattern is the one reported.

use serde::{Deserialize, Serialize};

use crate::catalog::{Entity, Term};

/// Where a compiled pattern came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    Canonical,
    Localized,
    Alias,
    TermName,
    Synonym,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub text: String,
    pub source: PatternSource,
    /// Language tag for localized names
    pub lang: Option<String>,
    char_len: usize,
}

impl Pattern {
    fn new(text: &str, source: PatternSource, lang: Option<&str>) -> Self {
        let text = text.trim().to_string();
        let char_len = text.chars().count();
        Self {
            text,
            source,
            lang: lang.map(str::to_string),
            char_len,
        }
    }

    /// Length in chars
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Case-folded form used for scanning
    pub fn folded(&self) -> String {
        fold_str(&self.text)
    }
}

/// Single-char lowercase mapping. Chars whose lowercase form is not exactly
/// one char are kept as-is so folded text stays index-aligned.
pub fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

pub fn fold_str(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Collects patterns, dropping short ones and case-insensitive duplicates
struct PatternSet {
    min_chars: usize,
    patterns: Vec<Pattern>,
    seen: Vec<String>,
}

impl PatternSet {
    fn new(min_chars: usize) -> Self {
        Self {
            min_chars,
            patterns: Vec::new(),
            seen: Vec::new(),
        }
    }

    fn push(&mut self, text: &str, source: PatternSource, lang: Option<&str>) {
        let pattern = Pattern::new(text, source, lang);
        if pattern.char_len < self.min_chars {
            return;
        }
        let folded = pattern.folded();
        if self.seen.contains(&folded) {
            return;
        }
        self.seen.push(folded);
        self.patterns.push(pattern);
    }
}

/// Canonical name, then localized names, then aliases
pub fn compile_entity_patterns(entity: &Entity, min_chars: usize) -> Vec<Pattern> {
    let mut set = PatternSet::new(min_chars);
    set.push(&entity.name, PatternSource::Canonical, None);
    for localized in &entity.localized_names {
        set.push(&localized.name, PatternSource::Localized, Some(&localized.lang));
    }
    for alias in &entity.aliases {
        set.push(alias, PatternSource::Alias, None);
    }
    set.patterns
}

/// Term itself, then its synonyms
pub fn compile_term_patterns(term: &Term, min_chars: usize) -> Vec<Pattern> {
    let mut set = PatternSet::new(min_chars);
    set.push(&term.term, PatternSource::TermName, None);
    for synonym in &term.synonyms {
        set.push(synonym, PatternSource::Synonym, None);
    }
    set.patterns
}
