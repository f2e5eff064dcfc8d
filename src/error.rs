//! Error taxonomy for the linking pipeline.
//!
//! Only [`LinkError::EmptyText`] ever reaches the caller of
//! `LinkingEngine::analyze`. Collaborator and automaton failures are absorbed
//! by the stage that hit them and logged.

use std::fmt;

use thiserror::Error;

/// The external collaborators the engine reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    CatalogStore,
    RelationshipFeed,
    InterestProfile,
    AiAugmentation,
}

impl Collaborator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collaborator::CatalogStore => "catalog store",
            Collaborator::RelationshipFeed => "relationship feed",
            Collaborator::InterestProfile => "interest profile source",
            Collaborator::AiAugmentation => "ai augmentation",
        }
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum LinkError {
    /// Input text is empty, whitespace-only, or markup-only
    #[error("text is empty after normalization")]
    EmptyText,

    #[error("{collaborator} unavailable: {message}")]
    Unavailable {
        collaborator: Collaborator,
        message: String,
    },

    #[error("failed to build pattern automaton: {0}")]
    Automaton(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LinkError {
    /// Shorthand for collaborator implementations reporting a failure
    pub fn unavailable(collaborator: Collaborator, message: impl Into<String>) -> Self {
        LinkError::Unavailable {
            collaborator,
            message: message.into(),
        }
    }
}

pub type LinkResult<T> = std::result::Result<T, LinkError>;
