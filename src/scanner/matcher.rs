//! LinkMatcher: Catalog Mention Detection
//!
//! Finds every occurrence of every compiled pattern with one Aho-Corasick
//! pass (overlapping semantics, so overlapping hits of the same pattern are
//! all seen), then resolves them in a single sequential merge:
//!
//! 1. candidates ordered by (catalog item, pattern, start)
//! 2. rejected unless both ends sit on word boundaries
//! 3. rejected if they share any index with an already accepted span
//!
//! Items are visited in importance order, so the more important item wins
//! any contested span. The automaton pass is order-free; only the merge
//! decides what is accepted.

use std::collections::{BTreeMap, HashMap};

use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Entity, EntityType, Term};
use crate::config::LinkerConfig;
use crate::error::{LinkError, LinkResult};
use crate::scanner::boundary::WordClassifier;
use crate::scanner::pattern::{
    compile_entity_patterns, compile_term_patterns, fold_char, Pattern, PatternSource,
};
use crate::scanner::score::{entity_confidence, rank_entity_matches, rank_term_matches};

// =============================================================================
// Types
// =============================================================================

/// Suggested presentation for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum LinkSuggestion {
    InlineLink { url: String },
    Tooltip { content: String },
    Modal { content: String },
    External { url: String },
}

/// An accepted entity occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMatch {
    pub entity_id: String,
    /// Canonical name
    pub entity_name: String,
    /// Localized name for the effective language, else canonical
    pub display_name: String,
    pub entity_type: EntityType,
    pub importance: f64,
    pub matched_text: String,
    pub pattern_source: PatternSource,
    /// Char offset into the normalized text (inclusive)
    pub start: usize,
    /// Char offset into the normalized text (exclusive)
    pub end: usize,
    pub confidence: f64,
    pub link: LinkSuggestion,
    /// Set only when the personalization stage ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalized_score: Option<f64>,
}

/// An accepted glossary-term occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermMatch {
    pub term_id: String,
    pub term: String,
    pub matched_text: String,
    pub pattern_source: PatternSource,
    pub start: usize,
    pub end: usize,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub link: LinkSuggestion,
}

// =============================================================================
// Scan text
// =============================================================================

/// Normalized text prepared for scanning: original chars plus an
/// index-aligned case-folded copy.
#[derive(Debug, Clone)]
pub struct ScanText {
    chars: Vec<char>,
    folded: String,
    /// Byte offset in `folded` → char offset
    byte_to_char: Vec<usize>,
}

impl ScanText {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let folded: String = chars.iter().copied().map(fold_char).collect();

        let mut byte_to_char = vec![0; folded.len() + 1];
        for (char_idx, (byte_idx, _)) in folded.char_indices().enumerate() {
            byte_to_char[byte_idx] = char_idx;
        }
        byte_to_char[folded.len()] = chars.len();

        Self {
            chars,
            folded,
            byte_to_char,
        }
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

// =============================================================================
// Candidate resolution
// =============================================================================

/// A raw pattern hit, before boundary and overlap checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    item: usize,
    pattern: usize,
    start: usize,
    end: usize,
}

/// Accepted spans keyed by start. Accepted spans never overlap, so both
/// starts and ends are increasing in key order.
#[derive(Debug, Default)]
struct SpanSet {
    spans: BTreeMap<usize, usize>,
}

impl SpanSet {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        // Only the last span starting before `end` can reach past `start`
        self.spans
            .range(..end)
            .next_back()
            .is_some_and(|(_, &span_end)| span_end > start)
    }

    fn insert(&mut self, start: usize, end: usize) {
        self.spans.insert(start, end);
    }
}

/// Every hit of every pattern, ordered for the sequential merge
fn find_candidates(text: &ScanText, patterns: &[Vec<Pattern>]) -> LinkResult<Vec<Candidate>> {
    // Identical folded strings share one automaton pattern
    let mut unique: Vec<String> = Vec::new();
    let mut owners: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (item, item_patterns) in patterns.iter().enumerate() {
        for (pattern_idx, pattern) in item_patterns.iter().enumerate() {
            let folded = pattern.folded();
            let slot = match index.get(&folded) {
                Some(&slot) => slot,
                None => {
                    let slot = unique.len();
                    index.insert(folded.clone(), slot);
                    unique.push(folded);
                    owners.push(Vec::new());
                    slot
                }
            };
            owners[slot].push((item, pattern_idx));
        }
    }

    if unique.is_empty() || text.is_empty() {
        return Ok(Vec::new());
    }

    let automaton = AhoCorasick::builder()
        .match_kind(MatchKind::Standard)
        .build(&unique)
        .map_err(|e| LinkError::Automaton(e.to_string()))?;

    let mut candidates = Vec::new();
    for hit in automaton.find_overlapping_iter(&text.folded) {
        let start = text.byte_to_char[hit.start()];
        let end = text.byte_to_char[hit.end()];
        for &(item, pattern) in &owners[hit.pattern().as_usize()] {
            candidates.push(Candidate {
                item,
                pattern,
                start,
                end,
            });
        }
    }

    candidates.sort_unstable();
    Ok(candidates)
}

/// Sequential merge: boundary check, then first-accepted-wins overlap check
fn resolve(text: &ScanText, candidates: Vec<Candidate>, classifier: &WordClassifier) -> Vec<Candidate> {
    let mut spans = SpanSet::default();
    let mut accepted = Vec::new();

    for candidate in candidates {
        if candidate.start >= candidate.end {
            continue;
        }
        if !classifier.at_boundaries(text.chars(), candidate.start, candidate.end) {
            continue;
        }
        if spans.overlaps(candidate.start, candidate.end) {
            continue;
        }
        spans.insert(candidate.start, candidate.end);
        accepted.push(candidate);
    }

    accepted
}

// =============================================================================
// LinkMatcher
// =============================================================================

/// Entity and term matcher. Stateless between scans.
#[derive(Debug, Clone)]
pub struct LinkMatcher {
    config: LinkerConfig,
    classifier: WordClassifier,
}

impl Default for LinkMatcher {
    fn default() -> Self {
        Self::new(LinkerConfig::default())
    }
}

impl LinkMatcher {
    pub fn new(config: LinkerConfig) -> Self {
        let classifier = WordClassifier::new(config.boundary.clone());
        Self { config, classifier }
    }

    /// Number of patterns the entities compile to
    pub fn entity_pattern_count(&self, entities: &[Entity]) -> usize {
        entities
            .iter()
            .map(|e| compile_entity_patterns(e, self.config.min_pattern_chars).len())
            .sum()
    }

    pub fn term_pattern_count(&self, terms: &[Term]) -> usize {
        terms
            .iter()
            .map(|t| compile_term_patterns(t, self.config.min_pattern_chars).len())
            .sum()
    }

    /// Entity pass. Items are visited by importance descending (stable, so
    /// equal importance keeps catalog order). Result is ranked by
    /// importance, then confidence.
    pub fn scan_entities(
        &self,
        text: &ScanText,
        entities: &[Entity],
        display_lang: &str,
    ) -> LinkResult<Vec<EntityMatch>> {
        let mut order: Vec<&Entity> = entities.iter().collect();
        order.sort_by(|a, b| b.importance().total_cmp(&a.importance()));

        let patterns: Vec<Vec<Pattern>> = order
            .iter()
            .map(|e| compile_entity_patterns(e, self.config.min_pattern_chars))
            .collect();

        let candidates = find_candidates(text, &patterns)?;
        let candidate_count = candidates.len();
        let accepted = resolve(text, candidates, &self.classifier);
        debug!(
            candidates = candidate_count,
            accepted = accepted.len(),
            "entity pass resolved"
        );

        let mut matches: Vec<EntityMatch> = accepted
            .into_iter()
            .map(|c| {
                let entity = order[c.item];
                let pattern = &patterns[c.item][c.pattern];
                EntityMatch {
                    entity_id: entity.id.clone(),
                    entity_name: entity.name.clone(),
                    display_name: entity.display_name(display_lang).to_string(),
                    entity_type: entity.entity_type,
                    importance: entity.importance(),
                    matched_text: text.slice(c.start, c.end),
                    pattern_source: pattern.source,
                    start: c.start,
                    end: c.end,
                    confidence: entity_confidence(entity, pattern, &self.config.scoring),
                    link: self.entity_link(entity),
                    personalized_score: None,
                }
            })
            .collect();

        rank_entity_matches(&mut matches);
        Ok(matches)
    }

    /// Term pass. Items are visited in catalog order; result is ordered by
    /// span start.
    pub fn scan_terms(&self, text: &ScanText, terms: &[Term]) -> LinkResult<Vec<TermMatch>> {
        let patterns: Vec<Vec<Pattern>> = terms
            .iter()
            .map(|t| compile_term_patterns(t, self.config.min_pattern_chars))
            .collect();

        let candidates = find_candidates(text, &patterns)?;
        let candidate_count = candidates.len();
        let accepted = resolve(text, candidates, &self.classifier);
        debug!(
            candidates = candidate_count,
            accepted = accepted.len(),
            "term pass resolved"
        );

        let mut matches: Vec<TermMatch> = accepted
            .into_iter()
            .map(|c| {
                let term = &terms[c.item];
                TermMatch {
                    term_id: term.id.clone(),
                    term: term.term.clone(),
                    matched_text: text.slice(c.start, c.end),
                    pattern_source: patterns[c.item][c.pattern].source,
                    start: c.start,
                    end: c.end,
                    definition: term.definition.clone(),
                    difficulty: term.difficulty.clone(),
                    category: term.category.clone(),
                    link: LinkSuggestion::Tooltip {
                        content: term.definition.clone(),
                    },
                }
            })
            .collect();

        rank_term_matches(&mut matches);
        Ok(matches)
    }

    fn entity_link(&self, entity: &Entity) -> LinkSuggestion {
        if entity.entity_type == EntityType::Term {
            return LinkSuggestion::Tooltip {
                content: entity
                    .description
                    .clone()
                    .unwrap_or_else(|| entity.name.clone()),
            };
        }
        match entity.official_website.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => LinkSuggestion::External {
                url: url.to_string(),
            },
            _ => {
                let slug = if entity.slug.is_empty() { &entity.id } else { &entity.slug };
                LinkSuggestion::InlineLink {
                    url: self.config.entity_url(slug),
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
