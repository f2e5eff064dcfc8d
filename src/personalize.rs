//! Personalization: rerank entity matches by a reader's interaction history.
//!
//! Skipped entirely (no field touched, order unchanged) when no profile is
//! available.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::InterestProfileSource;
use crate::scanner::EntityMatch;

/// Interaction count per entity id
pub type InterestProfile = HashMap<String, u32>;

/// Personalization metadata attached to a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationInfo {
    pub caller_id: String,
    /// False when the profile source was missing or failed
    pub applied: bool,
    pub profile_entries: usize,
    /// Matches whose score was raised by at least one interaction
    pub boosted_matches: usize,
}

/// Fetch a reader's profile for the matched entities. Failures are logged
/// and reported as `None`.
pub async fn load_profile(
    source: &dyn InterestProfileSource,
    caller_id: &str,
    matches: &[EntityMatch],
) -> Option<InterestProfile> {
    let ids: BTreeSet<String> = matches.iter().map(|m| m.entity_id.clone()).collect();
    if ids.is_empty() {
        return Some(InterestProfile::new());
    }

    match source.interaction_counts(caller_id, &ids).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!(caller_id, error = %e, "interest profile unavailable, skipping personalization");
            None
        }
    }
}

/// Set `personalized_score = confidence + weight × interactions` on every
/// match and re-sort by it, descending. The score is not clamped. Returns
/// the number of boosted matches.
pub fn personalize(matches: &mut [EntityMatch], profile: &InterestProfile, weight: f64) -> usize {
    let mut boosted = 0;

    for m in matches.iter_mut() {
        let interactions = profile.get(&m.entity_id).copied().unwrap_or(0);
        if interactions > 0 {
            boosted += 1;
        }
        m.personalized_score = Some(m.confidence + weight * f64::from(interactions));
    }

    matches.sort_by(|a, b| {
        let a_score = a.personalized_score.unwrap_or(a.confidence);
        let b_score = b.personalized_score.unwrap_or(b.confidence);
        b_score.total_cmp(&a_score)
    });

    boosted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityType;
    use crate::error::{Collaborator, LinkError, LinkResult};
    use crate::scanner::{LinkSuggestion, PatternSource};
    use async_trait::async_trait;
    use futures::executor::block_on;

    fn entity_match(id: &str, importance: f64, confidence: f64) -> EntityMatch {
        EntityMatch {
            entity_id: id.to_string(),
            entity_name: id.to_string(),
            display_name: id.to_string(),
            entity_type: EntityType::Person,
            importance,
            matched_text: id.to_string(),
            pattern_source: PatternSource::Canonical,
            start: 0,
            end: id.chars().count(),
            confidence,
            link: LinkSuggestion::InlineLink { url: format!("/entities/{id}") },
            personalized_score: None,
        }
    }

    #[test]
    fn test_interactions_reorder_matches() {
        let mut matches = vec![
            entity_match("a", 9.0, 0.9),
            entity_match("b", 5.0, 0.7),
        ];
        let profile: InterestProfile = [("b".to_string(), 3)].into_iter().collect();

        let boosted = personalize(&mut matches, &profile, 0.1);

        assert_eq!(boosted, 1);
        assert_eq!(matches[0].entity_id, "b");
        assert!((matches[0].personalized_score.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(matches[1].personalized_score, Some(0.9));
    }

    #[test]
    fn test_score_is_not_clamped() {
        let mut matches = vec![entity_match("a", 9.0, 0.9)];
        let profile: InterestProfile = [("a".to_string(), 20)].into_iter().collect();
        personalize(&mut matches, &profile, 0.1);
        assert!(matches[0].personalized_score.unwrap() > 2.8);
    }

    #[test]
    fn test_empty_profile_sorts_by_confidence() {
        let mut matches = vec![
            entity_match("a", 9.0, 0.8),
            entity_match("b", 5.0, 0.8),
            entity_match("c", 3.0, 0.9),
        ];
        personalize(&mut matches, &InterestProfile::new(), 0.1);
        let ids: Vec<&str> = matches.iter().map(|m| m.entity_id.as_str()).collect();
        // Strictly by score: c first, then a and b in their prior order
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    struct FailingSource;

    #[async_trait]
    impl InterestProfileSource for FailingSource {
        async fn interaction_counts(
            &self,
            _caller_id: &str,
            _entity_ids: &BTreeSet<String>,
        ) -> LinkResult<InterestProfile> {
            Err(LinkError::unavailable(Collaborator::InterestProfile, "timeout"))
        }
    }

    #[test]
    fn test_failed_source_yields_none() {
        let matches = vec![entity_match("a", 9.0, 0.9)];
        assert!(block_on(load_profile(&FailingSource, "reader", &matches)).is_none());
    }

    #[test]
    fn test_no_matches_skips_source() {
        let profile = block_on(load_profile(&FailingSource, "reader", &[]));
        assert_eq!(profile, Some(InterestProfile::new()));
    }
}
