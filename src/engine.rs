//! LinkingEngine: Unified Linking Pipeline
//!
//! Single `analyze()` call runs every stage:
//! 1. Normalize text, classify language
//! 2. Load the catalog snapshot (entities + terms, concurrently)
//! 3. Entity pass and term pass over the same normalized text
//! 4. AI augmentation, interest profile and relationship graph, concurrently
//! 5. Personalization rerank, cap, mutation effects, response assembly
//!
//! Only empty input is rejected. Every collaborator failure degrades its own
//! section to empty/omitted and is logged.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{
    AiAugmentation, AiSuggestion, CatalogStore, InMemoryCatalog, InterestProfileSource,
    MutationEvent, MutationSink, RelationshipFeed,
};
use crate::config::LinkerConfig;
use crate::error::{LinkError, LinkResult};
use crate::graph::{fetch_graph, KnowledgeGraph};
use crate::personalize::{load_profile, personalize, InterestProfile, PersonalizationInfo};
use crate::scanner::{
    detect_language, normalize_text, EntityMatch, LanguageInfo, LinkMatcher, ScanText, TermMatch,
    TextStats,
};

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkRequest {
    pub text: String,
    pub caller_id: Option<String>,
    /// Language hint; overrides the detected language for display names
    pub language: Option<String>,
    pub enable_ai: bool,
    pub enable_personalization: bool,
    pub include_graph: bool,
    /// Entity match cap; the engine default applies when unset
    pub max_suggestions: Option<usize>,
}

impl Default for LinkRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            caller_id: None,
            language: None,
            enable_ai: false,
            enable_personalization: false,
            include_graph: true,
            max_suggestions: None,
        }
    }
}

impl LinkRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_caller(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = Some(caller_id.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_ai(mut self) -> Self {
        self.enable_ai = true;
        self
    }

    pub fn with_personalization(mut self) -> Self {
        self.enable_personalization = true;
        self
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = Some(max);
        self
    }

    pub fn without_graph(mut self) -> Self {
        self.include_graph = false;
        self
    }
}

/// Timing per pipeline phase, in microseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimings {
    pub total_us: u64,
    pub normalize_us: u64,
    pub catalog_us: u64,
    pub entity_scan_us: u64,
    pub term_scan_us: u64,
    /// AI, interest profile and graph, run concurrently
    pub enrichment_us: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub entity_matches: Vec<EntityMatch>,
    pub term_matches: Vec<TermMatch>,
    pub total_matches: usize,
    pub processing_duration_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_suggestions: Option<Vec<AiSuggestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<KnowledgeGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization_info: Option<PersonalizationInfo>,
    pub language: LanguageInfo,
    pub text_stats: TextStats,
    pub timings: PhaseTimings,
}

// =============================================================================
// LinkingEngine
// =============================================================================

/// Stateless between requests; safe to share across concurrent analyses.
pub struct LinkingEngine {
    config: LinkerConfig,
    matcher: LinkMatcher,
    catalog: Arc<dyn CatalogStore>,
    mutations: Arc<dyn MutationSink>,
    relationships: Option<Arc<dyn RelationshipFeed>>,
    interests: Option<Arc<dyn InterestProfileSource>>,
    augmentation: Option<Arc<dyn AiAugmentation>>,
}

impl LinkingEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, mutations: Arc<dyn MutationSink>) -> Self {
        let config = LinkerConfig::default();
        Self {
            matcher: LinkMatcher::new(config.clone()),
            config,
            catalog,
            mutations,
            relationships: None,
            interests: None,
            augmentation: None,
        }
    }

    /// Engine over an in-memory snapshot that is also the relationship feed
    /// and the mutation sink
    pub fn in_memory(catalog: Arc<InMemoryCatalog>) -> Self {
        Self::new(catalog.clone(), catalog.clone()).with_relationship_feed(catalog)
    }

    pub fn with_config(mut self, config: LinkerConfig) -> Self {
        self.matcher = LinkMatcher::new(config.clone());
        self.config = config;
        self
    }

    pub fn with_relationship_feed(mut self, feed: Arc<dyn RelationshipFeed>) -> Self {
        self.relationships = Some(feed);
        self
    }

    pub fn with_interest_source(mut self, source: Arc<dyn InterestProfileSource>) -> Self {
        self.interests = Some(source);
        self
    }

    pub fn with_augmentation(mut self, augmentation: Arc<dyn AiAugmentation>) -> Self {
        self.augmentation = Some(augmentation);
        self
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    pub fn matcher(&self) -> &LinkMatcher {
        &self.matcher
    }

    /// Run the full pipeline for one request
    pub async fn analyze(&self, request: &LinkRequest) -> LinkResult<LinkResponse> {
        let overall_start = instant::Instant::now();
        let mut timings = PhaseTimings::default();

        // Phase 1: normalization + language
        let phase_start = instant::Instant::now();
        let normalized = normalize_text(&request.text);
        if normalized.is_empty() {
            return Err(LinkError::EmptyText);
        }
        let language = detect_language(&normalized, request.language.as_deref(), &self.config);
        let text_stats = TextStats::compute(&request.text, &normalized);
        timings.normalize_us = phase_start.elapsed().as_micros() as u64;

        // Phase 2: catalog snapshot
        let phase_start = instant::Instant::now();
        let (entities, terms) = futures::join!(
            self.catalog.list_active_entities(),
            self.catalog.list_active_terms()
        );
        let entities = entities.unwrap_or_else(|e| {
            warn!(error = %e, "entity catalog unavailable, skipping entity pass");
            Vec::new()
        });
        let terms = terms.unwrap_or_else(|e| {
            warn!(error = %e, "term catalog unavailable, skipping term pass");
            Vec::new()
        });
        timings.catalog_us = phase_start.elapsed().as_micros() as u64;

        // Phase 3: independent entity and term passes
        let scan_text = ScanText::new(&normalized);

        let phase_start = instant::Instant::now();
        let mut entity_matches = self
            .matcher
            .scan_entities(&scan_text, &entities, &language.effective)
            .unwrap_or_else(|e| {
                warn!(error = %e, "entity scan failed");
                Vec::new()
            });
        timings.entity_scan_us = phase_start.elapsed().as_micros() as u64;

        let phase_start = instant::Instant::now();
        let term_matches = self
            .matcher
            .scan_terms(&scan_text, &terms)
            .unwrap_or_else(|e| {
                warn!(error = %e, "term scan failed");
                Vec::new()
            });
        timings.term_scan_us = phase_start.elapsed().as_micros() as u64;

        debug!(
            entities = entities.len(),
            terms = terms.len(),
            entity_matches = entity_matches.len(),
            term_matches = term_matches.len(),
            "scan complete"
        );

        // Phase 4: mutually independent reads, all settled before assembly
        let phase_start = instant::Instant::now();
        let caller_id = request
            .caller_id
            .as_deref()
            .filter(|_| request.enable_personalization);

        let (ai_suggestions, profile, knowledge_graph) = futures::join!(
            self.suggest(request, &normalized, &language.effective),
            self.profile(caller_id, &entity_matches),
            self.graph(request, &entity_matches),
        );
        timings.enrichment_us = phase_start.elapsed().as_micros() as u64;

        // Phase 5: personalization, cap, side effects
        let personalization_info = caller_id.map(|caller_id| match profile {
            Some(profile) => {
                let boosted = personalize(
                    &mut entity_matches,
                    &profile,
                    self.config.personalization_weight,
                );
                PersonalizationInfo {
                    caller_id: caller_id.to_string(),
                    applied: true,
                    profile_entries: profile.len(),
                    boosted_matches: boosted,
                }
            }
            None => PersonalizationInfo {
                caller_id: caller_id.to_string(),
                applied: false,
                profile_entries: 0,
                boosted_matches: 0,
            },
        });

        let cap = request
            .max_suggestions
            .unwrap_or(self.config.default_max_suggestions);
        entity_matches.truncate(cap);

        self.record_mutations(&entity_matches, &term_matches);

        timings.total_us = overall_start.elapsed().as_micros() as u64;
        let total_matches = entity_matches.len() + term_matches.len();
        info!(
            entity_matches = entity_matches.len(),
            term_matches = term_matches.len(),
            language = %language.effective,
            total_us = timings.total_us,
            "analysis complete"
        );

        Ok(LinkResponse {
            entity_matches,
            term_matches,
            total_matches,
            processing_duration_ms: overall_start.elapsed().as_secs_f64() * 1000.0,
            ai_suggestions,
            knowledge_graph,
            personalization_info,
            language,
            text_stats,
            timings,
        })
    }

    async fn suggest(
        &self,
        request: &LinkRequest,
        text: &str,
        language: &str,
    ) -> Option<Vec<AiSuggestion>> {
        if !request.enable_ai {
            return None;
        }
        let augmentation = self.augmentation.as_ref()?;
        match augmentation.suggest_entities(text, language).await {
            Ok(suggestions) => Some(suggestions),
            Err(e) => {
                warn!(error = %e, "ai augmentation failed, omitting suggestions");
                None
            }
        }
    }

    async fn profile(
        &self,
        caller_id: Option<&str>,
        matches: &[EntityMatch],
    ) -> Option<InterestProfile> {
        let caller_id = caller_id?;
        let Some(source) = self.interests.as_ref() else {
            debug!(caller_id, "no interest profile source configured");
            return None;
        };
        load_profile(source.as_ref(), caller_id, matches).await
    }

    async fn graph(&self, request: &LinkRequest, matches: &[EntityMatch]) -> Option<KnowledgeGraph> {
        if !request.include_graph {
            return None;
        }
        Some(fetch_graph(self.relationships.as_deref(), matches, &self.config).await)
    }

    /// One increment per kept match, so a cap of N moves exactly N entity
    /// counters (fewer only when fewer matches were found)
    fn record_mutations(&self, entity_matches: &[EntityMatch], term_matches: &[TermMatch]) {
        let at = Utc::now();

        for m in entity_matches {
            self.mutations.record(MutationEvent::EntityMention {
                id: m.entity_id.clone(),
                at,
            });
        }
        for m in term_matches {
            self.mutations.record(MutationEvent::TermUsage {
                id: m.term_id.clone(),
                at,
            });
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
