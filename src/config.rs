//! Configuration types and defaults for the linking engine

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::EntityType;
use crate::error::{LinkError, LinkResult};

// =============================================================================
// Scoring
// =============================================================================

/// Confidence scoring parameters for entity matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Starting confidence of every accepted match. Default: 0.7
    pub base: f64,
    /// Patterns longer than this many chars get `long_pattern_bonus`. Default: 10
    pub long_pattern_chars: usize,
    /// Default: 0.2
    pub long_pattern_bonus: f64,
    /// Entities at or above this importance get `importance_bonus`. Default: 8.0
    pub importance_threshold: f64,
    /// Default: 0.1
    pub importance_bonus: f64,
    /// Bonus when the matched pattern is the canonical or Arabic name. Default: 0.1
    pub exact_name_bonus: f64,
    /// Language tag whose localized name counts for `exact_name_bonus`. Default: "ar"
    pub exact_name_lang: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 0.7,
            long_pattern_chars: 10,
            long_pattern_bonus: 0.2,
            importance_threshold: 8.0,
            importance_bonus: 0.1,
            exact_name_bonus: 0.1,
            exact_name_lang: "ar".to_string(),
        }
    }
}

// =============================================================================
// Word boundaries
// =============================================================================

/// Extra character classes counted as word characters by the boundary check.
///
/// The baseline classes (Arabic block U+0600–U+06FF, ASCII letters, ASCII
/// digits) are always on. Everything here defaults to off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Arabic Supplement block U+0750–U+077F
    pub arabic_supplement: bool,
    /// Arabic Presentation Forms A and B (U+FB50–U+FDFF, U+FE70–U+FEFF)
    pub arabic_presentation_forms: bool,
    /// Any Unicode alphabetic or numeric character
    pub unicode_letters: bool,
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Patterns shorter than this (in chars) are discarded. Default: 3
    pub min_pattern_chars: usize,
    /// Arabic char ratio above which text is tagged RTL. Default: 0.3
    pub rtl_ratio_threshold: f64,
    /// Default: "ar"
    pub rtl_language: String,
    /// Default: "en"
    pub fallback_language: String,
    /// Entity match cap when the request sets none. Default: 10
    pub default_max_suggestions: usize,
    /// Graph nodes at or above this importance are central. Default: 8.0
    pub central_importance: f64,
    /// Personalized score gain per interaction. Default: 0.1
    pub personalization_weight: f64,
    /// Internal entity page prefix, joined with the slug. Default: "/entities/"
    pub entity_url_prefix: String,
    pub scoring: ScoringConfig,
    pub boundary: BoundaryConfig,
    /// Graph node color overrides by entity type
    pub node_colors: HashMap<EntityType, String>,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            min_pattern_chars: 3,
            rtl_ratio_threshold: 0.3,
            rtl_language: "ar".to_string(),
            fallback_language: "en".to_string(),
            default_max_suggestions: 10,
            central_importance: 8.0,
            personalization_weight: 0.1,
            entity_url_prefix: "/entities/".to_string(),
            scoring: ScoringConfig::default(),
            boundary: BoundaryConfig::default(),
            node_colors: HashMap::new(),
        }
    }
}

impl LinkerConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> LinkResult<Self> {
        serde_json::from_str(json).map_err(|e| LinkError::Config(e.to_string()))
    }

    /// Display color for a graph node of `entity_type`
    pub fn node_color(&self, entity_type: EntityType) -> &str {
        if let Some(color) = self.node_colors.get(&entity_type) {
            return color;
        }
        match entity_type {
            EntityType::Person => "#3B82F6",
            EntityType::Organization => "#10B981",
            EntityType::Location => "#F59E0B",
            EntityType::Project => "#8B5CF6",
            EntityType::Event => "#EF4444",
            EntityType::Term => "#6B7280",
            EntityType::Company => "#14B8A6",
            EntityType::Government => "#1E3A8A",
            EntityType::Other => "#9CA3AF",
        }
    }

    /// Internal page URL for an entity slug
    pub fn entity_url(&self, slug: &str) -> String {
        format!("{}{}", self.entity_url_prefix, slug)
    }
}
