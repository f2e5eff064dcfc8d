//! Collaborator seams consumed by the engine.
//!
//! Every read collaborator may fail; the engine treats a failure as an empty
//! contribution for that stage. Mutation reporting goes through
//! [`MutationSink`], which must never block the caller.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{AiSuggestion, Entity, Relationship, Term};
use crate::error::LinkResult;

/// Read/write access to the persistent catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Active entities, ordered by importance descending
    async fn list_active_entities(&self) -> LinkResult<Vec<Entity>>;

    async fn list_active_terms(&self) -> LinkResult<Vec<Term>>;

    async fn increment_entity_mention(&self, entity_id: &str, at: DateTime<Utc>) -> LinkResult<()>;

    async fn increment_term_usage(&self, term_id: &str, at: DateTime<Utc>) -> LinkResult<()>;
}

#[async_trait]
pub trait RelationshipFeed: Send + Sync {
    /// Relationships with at least one endpoint in `entity_ids`
    async fn relationships_involving(
        &self,
        entity_ids: &BTreeSet<String>,
    ) -> LinkResult<Vec<Relationship>>;
}

#[async_trait]
pub trait InterestProfileSource: Send + Sync {
    /// Interaction count per entity id for one reader
    async fn interaction_counts(
        &self,
        caller_id: &str,
        entity_ids: &BTreeSet<String>,
    ) -> LinkResult<HashMap<String, u32>>;
}

#[async_trait]
pub trait AiAugmentation: Send + Sync {
    async fn suggest_entities(&self, text: &str, language: &str) -> LinkResult<Vec<AiSuggestion>>;
}

/// One counter increment to be applied to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationEvent {
    EntityMention { id: String, at: DateTime<Utc> },
    TermUsage { id: String, at: DateTime<Utc> },
}

impl MutationEvent {
    pub fn id(&self) -> &str {
        match self {
            MutationEvent::EntityMention { id, .. } | MutationEvent::TermUsage { id, .. } => id,
        }
    }
}

/// Fire-and-forget receiver of mutation events.
///
/// Implementations must return promptly: `record` is called on the response
/// path and its latency must never hold the response back.
pub trait MutationSink: Send + Sync {
    fn record(&self, event: MutationEvent);
}
