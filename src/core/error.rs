use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::EntityKind;

/// Setup errors; fatal, raised while building the vocabulary or site registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("No entity namespace configured for entity kind: {0}")]
    MissingEntityNamespace(EntityKind),

    #[error("Invalid base URI for {name}: {uri} ({reason})")]
    InvalidBaseUri {
        name: String,
        uri: String,
        reason: String,
    },

    #[error("Invalid page property configuration for {0}")]
    InvalidPageProperty(String),

    #[error("Unknown producer flag: {0}")]
    UnknownFlag(String),

    #[error("Invalid site definition {site}: {reason}")]
    InvalidSite { site: String, reason: String },
}

/// Per-entity and per-snak export failures; caught by the builder and reported
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),

    #[error("Cannot build URI for {id}: {reason}")]
    EntityUri { id: String, reason: String },

    #[error("Unsupported datatype {datatype} for property {property}")]
    UnsupportedDatatype { property: String, datatype: String },

    #[error("Invalid value for property {property}: {reason}")]
    InvalidValue { property: String, reason: String },

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Something the export skipped, kept for callers judging a partial export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    /// Entity id or node the failure belongs to
    pub subject: String,
    pub reason: String,
}

impl SkippedItem {
    pub fn new(subject: impl Into<String>, error: &ExportError) -> Self {
        Self {
            subject: subject.into(),
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.reason)
    }
}
