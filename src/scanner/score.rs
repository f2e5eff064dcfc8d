//! Confidence scoring and result ordering

use crate::catalog::Entity;
use crate::config::ScoringConfig;
use crate::scanner::matcher::{EntityMatch, TermMatch};
use crate::scanner::pattern::{Pattern, PatternSource};

/// Confidence of an accepted entity match, clamped to [0, 1].
///
/// base + long-pattern bonus + importance bonus + exact-name bonus
pub fn entity_confidence(entity: &Entity, pattern: &Pattern, scoring: &ScoringConfig) -> f64 {
    let mut confidence = scoring.base;

    if pattern.char_len() > scoring.long_pattern_chars {
        confidence += scoring.long_pattern_bonus;
    }
    if entity.importance() >= scoring.importance_threshold {
        confidence += scoring.importance_bonus;
    }
    if is_exact_name(entity, pattern, &scoring.exact_name_lang) {
        confidence += scoring.exact_name_bonus;
    }

    confidence.clamp(0.0, 1.0)
}

/// Pattern is the canonical name or the localized name in `lang`, not an alias
fn is_exact_name(entity: &Entity, pattern: &Pattern, lang: &str) -> bool {
    match pattern.source {
        PatternSource::Alias => false,
        _ => {
            pattern.text == entity.name.trim()
                || entity
                    .localized(lang)
                    .is_some_and(|name| pattern.text == name.trim())
        }
    }
}

/// Importance descending, then confidence descending. Stable: equal keys
/// keep acceptance order.
pub fn rank_entity_matches(matches: &mut [EntityMatch]) {
    matches.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });
}

/// Span start ascending
pub fn rank_term_matches(matches: &mut [TermMatch]) {
    matches.sort_by_key(|m| m.start);
}
