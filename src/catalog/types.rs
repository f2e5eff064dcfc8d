//! Catalog data model: entities, glossary terms, relationships.
//!
//! These are owned by the external catalog store. The engine only reads
//! them for the duration of one analysis and reports counter increments
//! back through a [`MutationSink`](super::MutationSink).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound of the importance scale
pub const MAX_IMPORTANCE: f64 = 10.0;

// =============================================================================
// Entity
// =============================================================================

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Project,
    Event,
    /// Glossary-like entity, presented as a tooltip rather than a link
    Term,
    Company,
    Government,
    #[serde(other)]
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "person",
            EntityType::Organization => "organization",
            EntityType::Location => "location",
            EntityType::Project => "project",
            EntityType::Event => "event",
            EntityType::Term => "term",
            EntityType::Company => "company",
            EntityType::Government => "government",
            EntityType::Other => "other",
        }
    }
}

/// A language-tagged name variant ("ar" → "نيوم")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub lang: String,
    pub name: String,
}

impl LocalizedName {
    pub fn new(lang: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            name: name.into(),
        }
    }
}

/// A recognized named thing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    /// Canonical name
    pub name: String,
    /// Ordered, language-tagged name variants
    #[serde(default)]
    pub localized_names: Vec<LocalizedName>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub entity_type: EntityType,
    #[serde(default, deserialize_with = "deserialize_importance")]
    importance: f64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub official_website: Option<String>,
    #[serde(default)]
    pub wikipedia_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    mention_count: u64,
    #[serde(default)]
    last_mentioned_at: Option<DateTime<Utc>>,
}

fn clamp_importance(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_IMPORTANCE)
}

fn deserialize_importance<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_importance(raw))
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_type: EntityType,
        importance: f64,
    ) -> Self {
        let id = id.into();
        Self {
            slug: id.clone(),
            id,
            name: name.into(),
            localized_names: Vec::new(),
            aliases: Vec::new(),
            entity_type,
            importance: clamp_importance(importance),
            official_website: None,
            wikipedia_url: None,
            description: None,
            mention_count: 0,
            last_mentioned_at: None,
        }
    }

    /// Builder: add a localized name variant
    pub fn with_localized(mut self, lang: impl Into<String>, name: impl Into<String>) -> Self {
        self.localized_names.push(LocalizedName::new(lang, name));
        self
    }

    /// Builder: add an alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_website(mut self, url: impl Into<String>) -> Self {
        self.official_website = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Importance score, always within [0, 10]
    pub fn importance(&self) -> f64 {
        self.importance
    }

    pub fn set_importance(&mut self, importance: f64) {
        self.importance = clamp_importance(importance);
    }

    pub fn mention_count(&self) -> u64 {
        self.mention_count
    }

    pub fn last_mentioned_at(&self) -> Option<DateTime<Utc>> {
        self.last_mentioned_at
    }

    /// Apply one mention. The counter never decreases and the timestamp
    /// only moves forward, so replayed events are harmless to ordering.
    pub fn record_mention(&mut self, at: DateTime<Utc>) {
        self.mention_count = self.mention_count.saturating_add(1);
        if self.last_mentioned_at.map_or(true, |prev| at > prev) {
            self.last_mentioned_at = Some(at);
        }
    }

    /// First localized name tagged with `lang`
    pub fn localized(&self, lang: &str) -> Option<&str> {
        self.localized_names
            .iter()
            .find(|n| n.lang.eq_ignore_ascii_case(lang))
            .map(|n| n.name.as_str())
    }

    /// Name to show for a reader of `lang`, falling back to the canonical name
    pub fn display_name(&self, lang: &str) -> &str {
        self.localized(lang).unwrap_or(&self.name)
    }
}

// =============================================================================
// Term
// =============================================================================

/// A glossary definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    usage_count: u64,
}

impl Term {
    pub fn new(id: impl Into<String>, term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            definition: definition.into(),
            synonyms: Vec::new(),
            difficulty: None,
            category: None,
            usage_count: 0,
        }
    }

    pub fn with_synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.push(synonym.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    pub fn record_usage(&mut self) {
        self.usage_count = self.usage_count.saturating_add(1);
    }
}

// =============================================================================
// Relationship & AI suggestions
// =============================================================================

/// Edge between two catalog entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    /// Relationship label: "ceo_of", "located_in", ...
    pub label: String,
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default)]
    pub bidirectional: bool,
}

fn default_strength() -> f64 {
    1.0
}

impl Relationship {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        label: impl Into<String>,
        strength: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            label: label.into(),
            strength,
            bidirectional: false,
        }
    }

    pub fn involves(&self, entity_id: &str) -> bool {
        self.source_id == entity_id || self.target_id == entity_id
    }
}

/// Entity suggested by the AI augmentation collaborator. Purely additive
/// metadata: never merged into the lexical match lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSuggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub importance: f64,
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_importance_is_clamped() {
        assert_eq!(Entity::new("e1", "x", EntityType::Person, 14.0).importance(), 10.0);
        assert_eq!(Entity::new("e2", "x", EntityType::Person, -3.0).importance(), 0.0);
        assert_eq!(Entity::new("e3", "x", EntityType::Person, f64::NAN).importance(), 0.0);

        let mut entity = Entity::new("e4", "x", EntityType::Person, 5.0);
        entity.set_importance(11.5);
        assert_eq!(entity.importance(), 10.0);
    }

    #[test]
    fn test_importance_clamped_on_deserialize() {
        let entity: Entity = serde_json::from_str(
            r#"{"id":"e1","name":"نيوم","entity_type":"project","importance":42}"#,
        )
        .unwrap();
        assert_eq!(entity.importance(), 10.0);
        assert!(entity.aliases.is_empty());
    }

    #[test]
    fn test_unknown_entity_type_maps_to_other() {
        let entity: Entity = serde_json::from_str(
            r#"{"id":"e1","name":"Thing","entity_type":"spaceship","importance":1}"#,
        )
        .unwrap();
        assert_eq!(entity.entity_type, EntityType::Other);
    }

    #[test]
    fn test_mention_counter_is_monotonic() {
        let mut entity = Entity::new("e1", "نيوم", EntityType::Project, 9.0);
        let later = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

        entity.record_mention(later);
        entity.record_mention(earlier);

        assert_eq!(entity.mention_count(), 2);
        assert_eq!(entity.last_mentioned_at(), Some(later));
    }

    #[test]
    fn test_display_name_prefers_localized() {
        let entity = Entity::new("e1", "NEOM", EntityType::Project, 9.0)
            .with_localized("ar", "نيوم");
        assert_eq!(entity.display_name("ar"), "نيوم");
        assert_eq!(entity.display_name("AR"), "نيوم");
        assert_eq!(entity.display_name("en"), "NEOM");
    }
}
