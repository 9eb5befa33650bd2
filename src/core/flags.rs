use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

use super::error::ConfigurationError;

/// One independently toggleable output facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProducerFlag {
    TruthyStatements,
    AllStatements,
    Terms,
    Qualifiers,
    References,
    Sitelinks,
    Properties,
    FullValues,
    VersionInfo,
    ResolvedEntities,
    PageProps,
}

impl ProducerFlag {
    pub const ALL: [ProducerFlag; 11] = [
        ProducerFlag::TruthyStatements,
        ProducerFlag::AllStatements,
        ProducerFlag::Terms,
        ProducerFlag::Qualifiers,
        ProducerFlag::References,
        ProducerFlag::Sitelinks,
        ProducerFlag::Properties,
        ProducerFlag::FullValues,
        ProducerFlag::VersionInfo,
        ProducerFlag::ResolvedEntities,
        ProducerFlag::PageProps,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn name(self) -> &'static str {
        match self {
            ProducerFlag::TruthyStatements => "truthy-statements",
            ProducerFlag::AllStatements => "all-statements",
            ProducerFlag::Terms => "terms",
            ProducerFlag::Qualifiers => "qualifiers",
            ProducerFlag::References => "references",
            ProducerFlag::Sitelinks => "sitelinks",
            ProducerFlag::Properties => "properties",
            ProducerFlag::FullValues => "full-values",
            ProducerFlag::VersionInfo => "version-info",
            ProducerFlag::ResolvedEntities => "resolved-entities",
            ProducerFlag::PageProps => "page-props",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ProducerFlag::TruthyStatements => "best-rank main values as direct triples",
            ProducerFlag::AllStatements => "statement nodes with rank and main value",
            ProducerFlag::Terms => "labels, descriptions and aliases",
            ProducerFlag::Qualifiers => "qualifiers on statement nodes",
            ProducerFlag::References => "reference nodes linked from statements",
            ProducerFlag::Sitelinks => "linked pages of items",
            ProducerFlag::Properties => "property type and predicate declarations",
            ProducerFlag::FullValues => "structured value nodes for complex values",
            ProducerFlag::VersionInfo => "revision info and dump header",
            ProducerFlag::ResolvedEntities => "stubs for entities referenced by values",
            ProducerFlag::PageProps => "configured page properties",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|f| f.name() == normalized)
    }
}

/// Immutable set of producer flags governing which facets are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProducerPolicy(u16);

impl ProducerPolicy {
    pub const NONE: ProducerPolicy = ProducerPolicy(0);

    pub fn all() -> Self {
        Self::from_flags(ProducerFlag::ALL)
    }

    pub fn from_flags(flags: impl IntoIterator<Item = ProducerFlag>) -> Self {
        Self(flags.into_iter().fold(0, |bits, f| bits | f.bit()))
    }

    /// Parse flag names such as `["truthy-statements", "sitelinks"]`; `all` selects every flag
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ConfigurationError> {
        let mut policy = Self::NONE;
        for name in names {
            let name = name.as_ref();
            if name.trim().eq_ignore_ascii_case("all") {
                policy = Self::all();
                continue;
            }
            let flag = ProducerFlag::from_name(name)
                .ok_or_else(|| ConfigurationError::UnknownFlag(name.to_string()))?;
            policy = policy | flag;
        }
        Ok(policy)
    }

    pub fn contains(self, flag: ProducerFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn with(self, flag: ProducerFlag) -> Self {
        Self(self.0 | flag.bit())
    }

    pub fn without(self, flag: ProducerFlag) -> Self {
        Self(self.0 & !flag.bit())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn flags(self) -> impl Iterator<Item = ProducerFlag> {
        ProducerFlag::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl BitOr<ProducerFlag> for ProducerPolicy {
    type Output = ProducerPolicy;

    fn bitor(self, rhs: ProducerFlag) -> Self::Output {
        self.with(rhs)
    }
}

impl BitOr for ProducerFlag {
    type Output = ProducerPolicy;

    fn bitor(self, rhs: ProducerFlag) -> Self::Output {
        ProducerPolicy::from_flags([self, rhs])
    }
}

impl From<ProducerFlag> for ProducerPolicy {
    fn from(flag: ProducerFlag) -> Self {
        Self::from_flags([flag])
    }
}

impl fmt::Display for ProducerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::all() {
            return f.write_str("all");
        }
        let names: Vec<&str> = self.flags().map(ProducerFlag::name).collect();
        f.write_str(&names.join(","))
    }
}
