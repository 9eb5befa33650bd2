use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::core::error::ExportError;

/// Kind of entity an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    Property,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Item, EntityKind::Property];

    pub fn letter(self) -> char {
        match self {
            EntityKind::Item => 'Q',
            EntityKind::Property => 'P',
        }
    }

    /// Local name of the ontology class identifying this kind
    pub fn class_name(self) -> &'static str {
        match self {
            EntityKind::Item => "Item",
            EntityKind::Property => "Property",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Item => "item",
            EntityKind::Property => "property",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:([a-z0-9_-]+):)?([QqPp])([1-9][0-9]*)$").expect("entity id pattern is valid")
    })
}

/// Entity identifier such as `Q42`, `P31` or `commons:Q7` for a foreign repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    repository: Option<String>,
    kind: EntityKind,
    local: String,
}

impl EntityId {
    pub fn parse(serialization: &str) -> Result<Self, ExportError> {
        let caps = id_pattern()
            .captures(serialization.trim())
            .ok_or_else(|| ExportError::InvalidEntityId(serialization.to_string()))?;

        let kind = match &caps[2] {
            "Q" | "q" => EntityKind::Item,
            _ => EntityKind::Property,
        };

        Ok(Self {
            repository: caps.get(1).map(|m| m.as_str().to_string()),
            kind,
            local: format!("{}{}", kind.letter(), &caps[3]),
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Foreign repository name, `None` for the local repository
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Identifier without the repository prefix, e.g. `Q42`
    pub fn local_part(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repository {
            Some(repo) => write!(f, "{}:{}", repo, self.local),
            None => f.write_str(&self.local),
        }
    }
}

impl FromStr for EntityId {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = ExportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_ids() {
        let item = EntityId::parse("Q42").unwrap();
        assert_eq!(item.kind(), EntityKind::Item);
        assert_eq!(item.local_part(), "Q42");
        assert!(item.repository().is_none());

        let property = EntityId::parse("p31").unwrap();
        assert_eq!(property.kind(), EntityKind::Property);
        assert_eq!(property.to_string(), "P31");
    }

    #[test]
    fn test_parse_foreign_id() {
        let id = EntityId::parse("commons:Q7").unwrap();
        assert_eq!(id.repository(), Some("commons"));
        assert_eq!(id.local_part(), "Q7");
        assert_eq!(id.to_string(), "commons:Q7");
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for bad in ["", "Q", "Q0", "Q01", "X5", "Q5x", ":Q5"] {
            assert!(EntityId::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_serde_as_string() {
        let id: EntityId = serde_json::from_str("\"Q5\"").unwrap();
        assert_eq!(id, EntityId::parse("Q5").unwrap());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Q5\"");
        assert!(serde_json::from_str::<EntityId>("\"nope\"").is_err());
    }
}
