//! In-memory catalog snapshot.
//!
//! Backs the WASM facade (hydrated from JS) and the test suite. Counter
//! increments are applied in place, so it doubles as its own
//! [`MutationSink`].

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::traits::{
    CatalogStore, InterestProfileSource, MutationEvent, MutationSink, RelationshipFeed,
};
use super::types::{Entity, Relationship, Term};
use crate::error::{Collaborator, LinkError, LinkResult};

#[derive(Default)]
pub struct InMemoryCatalog {
    entities: RwLock<Vec<Entity>>,
    terms: RwLock<Vec<Term>>,
    relationships: RwLock<Vec<Relationship>>,
}

impl InMemoryCatalog {
    pub fn new(entities: Vec<Entity>, terms: Vec<Term>, relationships: Vec<Relationship>) -> Self {
        let catalog = Self::default();
        catalog.hydrate_entities(entities);
        catalog.hydrate_terms(terms);
        catalog.hydrate_relationships(relationships);
        catalog
    }

    /// Replace all entities, keeping them ordered by importance descending
    pub fn hydrate_entities(&self, mut entities: Vec<Entity>) {
        entities.sort_by(|a, b| b.importance().total_cmp(&a.importance()));
        *self.entities.write() = entities;
    }

    pub fn hydrate_terms(&self, terms: Vec<Term>) {
        *self.terms.write() = terms;
    }

    pub fn hydrate_relationships(&self, relationships: Vec<Relationship>) {
        *self.relationships.write() = relationships;
    }

    pub fn entity(&self, id: &str) -> Option<Entity> {
        self.entities.read().iter().find(|e| e.id == id).cloned()
    }

    pub fn term(&self, id: &str) -> Option<Term> {
        self.terms.read().iter().find(|t| t.id == id).cloned()
    }

    /// Clone of the current entity list, importance descending
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.read().clone()
    }

    pub fn terms(&self) -> Vec<Term> {
        self.terms.read().clone()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.read().len()
    }

    fn bump_entity(&self, id: &str, at: DateTime<Utc>) -> bool {
        let mut entities = self.entities.write();
        match entities.iter_mut().find(|e| e.id == id) {
            Some(entity) => {
                entity.record_mention(at);
                true
            }
            None => false,
        }
    }

    fn bump_term(&self, id: &str) -> bool {
        let mut terms = self.terms.write();
        match terms.iter_mut().find(|t| t.id == id) {
            Some(term) => {
                term.record_usage();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_active_entities(&self) -> LinkResult<Vec<Entity>> {
        Ok(self.entities.read().clone())
    }

    async fn list_active_terms(&self) -> LinkResult<Vec<Term>> {
        Ok(self.terms.read().clone())
    }

    async fn increment_entity_mention(&self, entity_id: &str, at: DateTime<Utc>) -> LinkResult<()> {
        if self.bump_entity(entity_id, at) {
            Ok(())
        } else {
            Err(LinkError::unavailable(
                Collaborator::CatalogStore,
                format!("unknown entity {entity_id}"),
            ))
        }
    }

    async fn increment_term_usage(&self, term_id: &str, _at: DateTime<Utc>) -> LinkResult<()> {
        if self.bump_term(term_id) {
            Ok(())
        } else {
            Err(LinkError::unavailable(
                Collaborator::CatalogStore,
                format!("unknown term {term_id}"),
            ))
        }
    }
}

#[async_trait]
impl RelationshipFeed for InMemoryCatalog {
    async fn relationships_involving(
        &self,
        entity_ids: &BTreeSet<String>,
    ) -> LinkResult<Vec<Relationship>> {
        Ok(self
            .relationships
            .read()
            .iter()
            .filter(|r| entity_ids.contains(&r.source_id) || entity_ids.contains(&r.target_id))
            .cloned()
            .collect())
    }
}

impl MutationSink for InMemoryCatalog {
    fn record(&self, event: MutationEvent) {
        match event {
            MutationEvent::EntityMention { id, at } => {
                self.bump_entity(&id, at);
            }
            MutationEvent::TermUsage { id, .. } => {
                self.bump_term(&id);
            }
        }
    }
}

/// Fixed per-reader interaction counts
#[derive(Debug, Clone, Default)]
pub struct StaticInterestProfiles {
    profiles: HashMap<String, HashMap<String, u32>>,
}

impl StaticInterestProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interaction(mut self, caller_id: &str, entity_id: &str, count: u32) -> Self {
        self.profiles
            .entry(caller_id.to_string())
            .or_default()
            .insert(entity_id.to_string(), count);
        self
    }
}

#[async_trait]
impl InterestProfileSource for StaticInterestProfiles {
    async fn interaction_counts(
        &self,
        caller_id: &str,
        entity_ids: &BTreeSet<String>,
    ) -> LinkResult<HashMap<String, u32>> {
        Ok(self
            .profiles
            .get(caller_id)
            .map(|profile| {
                profile
                    .iter()
                    .filter(|(id, _)| entity_ids.contains(*id))
                    .map(|(id, count)| (id.clone(), *count))
                    .collect()
            })
            .unwrap_or_default())
    }
}
