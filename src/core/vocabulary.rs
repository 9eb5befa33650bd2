//! RDF vocabulary: namespace prefixes and URI construction for entities,
//! predicates and content-addressed nodes.

use indexmap::IndexMap;
use std::collections::HashMap;

use super::error::{ConfigurationError, ExportError, ExportResult};
use crate::config::{PagePropertyRule, VocabularyConfig};
use crate::model::{EntityId, EntityKind};

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod rdfs {
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
}

pub mod owl {
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";
    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
    pub const CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    pub const ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
    pub const IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";
    pub const OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
    pub const DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
}

pub mod skos {
    pub const NS: &str = "http://www.w3.org/2004/02/skos/core#";
    pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
    pub const ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
}

pub mod schema {
    pub const NS: &str = "http://schema.org/";
    pub const NAME: &str = "http://schema.org/name";
    pub const DESCRIPTION: &str = "http://schema.org/description";
    pub const ARTICLE: &str = "http://schema.org/Article";
    pub const ABOUT: &str = "http://schema.org/about";
    pub const IN_LANGUAGE: &str = "http://schema.org/inLanguage";
    pub const IS_PART_OF: &str = "http://schema.org/isPartOf";
    pub const DATASET: &str = "http://schema.org/Dataset";
    pub const VERSION: &str = "http://schema.org/version";
    pub const DATE_MODIFIED: &str = "http://schema.org/dateModified";
    pub const SOFTWARE_VERSION: &str = "http://schema.org/softwareVersion";
}

pub mod prov {
    pub const NS: &str = "http://www.w3.org/ns/prov#";
    pub const WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";
}

pub mod geo {
    pub const NS: &str = "http://www.opengis.net/ont/geosparql#";
    pub const WKT_LITERAL: &str = "http://www.opengis.net/ont/geosparql#wktLiteral";
}

pub mod cc {
    pub const NS: &str = "http://creativecommons.org/ns#";
    pub const LICENSE: &str = "http://creativecommons.org/ns#license";
}

/// Ontology terms of the entity model
pub mod wikibase {
    pub const NS: &str = "http://wikiba.se/ontology#";
    pub const ONTOLOGY_DOCUMENT: &str = "http://wikiba.se/ontology-1.0.owl";
    pub const DUMP: &str = "http://wikiba.se/ontology#Dump";
    pub const STATEMENT: &str = "http://wikiba.se/ontology#Statement";
    pub const REFERENCE: &str = "http://wikiba.se/ontology#Reference";
    pub const BEST_RANK: &str = "http://wikiba.se/ontology#BestRank";
    pub const RANK: &str = "http://wikiba.se/ontology#rank";
    pub const BADGE: &str = "http://wikiba.se/ontology#badge";
    pub const WIKI_GROUP: &str = "http://wikiba.se/ontology#wikiGroup";
    pub const PROPERTY_TYPE: &str = "http://wikiba.se/ontology#propertyType";

    pub fn term(local: &str) -> String {
        format!("{}{}", NS, local)
    }
}

/// Per-property predicate families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyNamespace {
    Direct,
    Claim,
    Statement,
    StatementValue,
    Qualifier,
    QualifierValue,
    Reference,
    ReferenceValue,
    NoValue,
}

impl PropertyNamespace {
    pub const ALL: [PropertyNamespace; 9] = [
        PropertyNamespace::Direct,
        PropertyNamespace::Claim,
        PropertyNamespace::Statement,
        PropertyNamespace::StatementValue,
        PropertyNamespace::Qualifier,
        PropertyNamespace::QualifierValue,
        PropertyNamespace::Reference,
        PropertyNamespace::ReferenceValue,
        PropertyNamespace::NoValue,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            PropertyNamespace::Direct => "wdt",
            PropertyNamespace::Claim => "p",
            PropertyNamespace::Statement => "ps",
            PropertyNamespace::StatementValue => "psv",
            PropertyNamespace::Qualifier => "pq",
            PropertyNamespace::QualifierValue => "pqv",
            PropertyNamespace::Reference => "pr",
            PropertyNamespace::ReferenceValue => "prv",
            PropertyNamespace::NoValue => "wdno",
        }
    }

    fn path(self) -> &'static str {
        match self {
            PropertyNamespace::Direct => "prop/direct/",
            PropertyNamespace::Claim => "prop/",
            PropertyNamespace::Statement => "prop/statement/",
            PropertyNamespace::StatementValue => "prop/statement/value/",
            PropertyNamespace::Qualifier => "prop/qualifier/",
            PropertyNamespace::QualifierValue => "prop/qualifier/value/",
            PropertyNamespace::Reference => "prop/reference/",
            PropertyNamespace::ReferenceValue => "prop/reference/value/",
            PropertyNamespace::NoValue => "prop/novalue/",
        }
    }

    /// Ontology predicate linking a property entity to this family
    pub fn declaration(self) -> &'static str {
        match self {
            PropertyNamespace::Direct => "directClaim",
            PropertyNamespace::Claim => "claim",
            PropertyNamespace::Statement => "statementProperty",
            PropertyNamespace::StatementValue => "statementValue",
            PropertyNamespace::Qualifier => "qualifier",
            PropertyNamespace::QualifierValue => "qualifierValue",
            PropertyNamespace::Reference => "reference",
            PropertyNamespace::ReferenceValue => "referenceValue",
            PropertyNamespace::NoValue => "novalue",
        }
    }
}

#[derive(Debug, Clone)]
struct RepositoryNamespaces {
    entity: String,
    properties: HashMap<PropertyNamespace, String>,
}

impl RepositoryNamespaces {
    fn new(concept_base: &str) -> Self {
        let properties = PropertyNamespace::ALL
            .into_iter()
            .map(|ns| (ns, format!("{}{}", concept_base, ns.path())))
            .collect();

        Self {
            entity: format!("{}entity/", concept_base),
            properties,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    local: RepositoryNamespaces,
    kind_bases: HashMap<EntityKind, String>,
    foreign: HashMap<String, RepositoryNamespaces>,
    statement_ns: String,
    value_ns: String,
    reference_ns: String,
    genid_ns: String,
    data_ns: String,
    unitless_unit: Option<String>,
    page_props: IndexMap<String, PagePropertyRule>,
    prefixes: IndexMap<String, String>,
}

impl Vocabulary {
    pub fn new(config: &VocabularyConfig) -> Result<Self, ConfigurationError> {
        let concept_base = normalize_base("concept_base", &config.concept_base)?;
        let data_ns = normalize_base("data_base", &config.data_base)?;
        let local = RepositoryNamespaces::new(&concept_base);

        // an empty table means every kind lives under the entity namespace
        let mut kind_bases = HashMap::new();
        for kind in EntityKind::ALL {
            let base = if config.entity_kinds.is_empty() {
                local.entity.clone()
            } else {
                let uri = config
                    .entity_kinds
                    .get(&kind)
                    .ok_or(ConfigurationError::MissingEntityNamespace(kind))?;
                normalize_base(&format!("entity_kinds.{}", kind), uri)?
            };
            kind_bases.insert(kind, base);
        }

        let mut foreign = HashMap::new();
        for (name, uri) in &config.repositories {
            let base = normalize_base(&format!("repositories.{}", name), uri)?;
            foreign.insert(name.clone(), RepositoryNamespaces::new(&base));
        }

        if let Some(unit) = &config.unitless_unit {
            url::Url::parse(unit).map_err(|e| ConfigurationError::InvalidBaseUri {
                name: "unitless_unit".to_string(),
                uri: unit.clone(),
                reason: e.to_string(),
            })?;
        }

        for (name, rule) in &config.page_props {
            if name.trim().is_empty() || rule.predicate.trim().is_empty() {
                return Err(ConfigurationError::InvalidPageProperty(name.clone()));
            }
        }

        let mut vocabulary = Self {
            statement_ns: format!("{}entity/statement/", concept_base),
            value_ns: format!("{}value/", concept_base),
            reference_ns: format!("{}reference/", concept_base),
            genid_ns: format!("{}.well-known/genid/", concept_base),
            data_ns,
            local,
            kind_bases,
            foreign,
            unitless_unit: config.unitless_unit.clone(),
            page_props: config.page_props.clone(),
            prefixes: IndexMap::new(),
        };
        vocabulary.prefixes = vocabulary.build_prefixes(config);

        Ok(vocabulary)
    }

    fn build_prefixes(&self, config: &VocabularyConfig) -> IndexMap<String, String> {
        let mut prefixes: IndexMap<String, String> = [
            ("rdf", rdf::NS),
            ("rdfs", rdfs::NS),
            ("xsd", xsd::NS),
            ("owl", owl::NS),
            ("skos", skos::NS),
            ("schema", schema::NS),
            ("prov", prov::NS),
            ("geo", geo::NS),
            ("cc", cc::NS),
            ("wikibase", wikibase::NS),
        ]
        .into_iter()
        .map(|(p, iri)| (p.to_string(), iri.to_string()))
        .collect();

        prefixes.insert("wdata".to_string(), self.data_ns.clone());
        prefixes.insert("wd".to_string(), self.local.entity.clone());
        prefixes.insert("wds".to_string(), self.statement_ns.clone());
        prefixes.insert("wdref".to_string(), self.reference_ns.clone());
        prefixes.insert("wdv".to_string(), self.value_ns.clone());
        Self::insert_property_prefixes(&mut prefixes, "", &self.local);

        for name in config.repositories.keys() {
            if let Some(repo) = self.foreign.get(name) {
                prefixes.insert(format!("{}wd", name), repo.entity.clone());
                Self::insert_property_prefixes(&mut prefixes, name, repo);
            }
        }

        prefixes
    }

    fn insert_property_prefixes(
        prefixes: &mut IndexMap<String, String>,
        repo_prefix: &str,
        repo: &RepositoryNamespaces,
    ) {
        for ns in PropertyNamespace::ALL {
            if let Some(iri) = repo.properties.get(&ns) {
                prefixes.insert(format!("{}{}", repo_prefix, ns.prefix()), iri.clone());
            }
        }
    }

    fn repository(&self, id: &EntityId) -> ExportResult<&RepositoryNamespaces> {
        match id.repository() {
            None => Ok(&self.local),
            Some(name) => self.foreign.get(name).ok_or_else(|| ExportError::EntityUri {
                id: id.to_string(),
                reason: format!("unknown repository '{}'", name),
            }),
        }
    }

    pub fn entity_uri(&self, id: &EntityId) -> ExportResult<String> {
        let base = match id.repository() {
            None => self.kind_bases.get(&id.kind()).ok_or_else(|| ExportError::EntityUri {
                id: id.to_string(),
                reason: format!("no namespace for entity kind {}", id.kind()),
            })?,
            Some(_) => &self.repository(id)?.entity,
        };
        Ok(format!("{}{}", base, id.local_part()))
    }

    /// Reverse of `entity_uri` for IRIs inside a configured entity namespace
    pub fn entity_id_for_uri(&self, uri: &str) -> Option<EntityId> {
        for base in self.kind_bases.values() {
            if let Some(local) = uri.strip_prefix(base.as_str()) {
                if let Ok(id) = EntityId::parse(local) {
                    return Some(id);
                }
            }
        }
        for (name, repo) in &self.foreign {
            if let Some(local) = uri.strip_prefix(repo.entity.as_str()) {
                if let Ok(id) = EntityId::parse(&format!("{}:{}", name, local)) {
                    return Some(id);
                }
            }
        }
        None
    }

    pub fn property_uri(&self, ns: PropertyNamespace, property: &EntityId) -> ExportResult<String> {
        if property.kind() != EntityKind::Property {
            return Err(ExportError::EntityUri {
                id: property.to_string(),
                reason: "not a property id".to_string(),
            });
        }
        let repo = self.repository(property)?;
        let base = repo.properties.get(&ns).ok_or_else(|| ExportError::EntityUri {
            id: property.to_string(),
            reason: format!("no {} namespace", ns.prefix()),
        })?;
        Ok(format!("{}{}", base, property.local_part()))
    }

    pub fn statement_uri(&self, node_name: &str) -> String {
        format!("{}{}", self.statement_ns, node_name)
    }

    pub fn value_uri(&self, hash: &str) -> String {
        format!("{}{}", self.value_ns, hash)
    }

    pub fn reference_uri(&self, hash: &str) -> String {
        format!("{}{}", self.reference_ns, hash)
    }

    pub fn genid_uri(&self, hash: &str) -> String {
        format!("{}{}", self.genid_ns, hash)
    }

    /// URI of the entity's data document, subject of revision and page property triples
    pub fn data_uri(&self, id: &EntityId) -> ExportResult<String> {
        if let Some(name) = id.repository() {
            return Err(ExportError::EntityUri {
                id: id.to_string(),
                reason: format!("no data namespace for foreign repository '{}'", name),
            });
        }
        Ok(format!("{}{}", self.data_ns, id.local_part()))
    }

    pub fn unitless_unit(&self) -> Option<&str> {
        self.unitless_unit.as_deref()
    }

    pub fn prefixes(&self) -> &IndexMap<String, String> {
        &self.prefixes
    }

    pub fn page_property_config(&self) -> &IndexMap<String, PagePropertyRule> {
        &self.page_props
    }
}

fn normalize_base(name: &str, uri: &str) -> Result<String, ConfigurationError> {
    let uri = uri.trim();
    let invalid = |reason: String| ConfigurationError::InvalidBaseUri {
        name: name.to_string(),
        uri: uri.to_string(),
        reason,
    };

    if uri.is_empty() {
        return Err(invalid("missing".to_string()));
    }
    let parsed = url::Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    if parsed.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URI".to_string()));
    }

    if uri.ends_with('/') || uri.ends_with('#') {
        Ok(uri.to_string())
    } else {
        Ok(format!("{}/", uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PagePropType;

    fn id(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    fn config() -> VocabularyConfig {
        VocabularyConfig {
            concept_base: "http://www.wikidata.org".to_string(),
            data_base: "https://www.wikidata.org/wiki/Special:EntityData/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_entity_and_property_uris() {
        let vocab = Vocabulary::new(&config()).unwrap();

        assert_eq!(vocab.entity_uri(&id("Q42")).unwrap(), "http://www.wikidata.org/entity/Q42");
        assert_eq!(
            vocab.property_uri(PropertyNamespace::Direct, &id("P31")).unwrap(),
            "http://www.wikidata.org/prop/direct/P31"
        );
        assert_eq!(
            vocab.property_uri(PropertyNamespace::QualifierValue, &id("P31")).unwrap(),
            "http://www.wikidata.org/prop/qualifier/value/P31"
        );
        assert!(vocab.property_uri(PropertyNamespace::Claim, &id("Q31")).is_err());
        assert_eq!(
            vocab.data_uri(&id("Q42")).unwrap(),
            "https://www.wikidata.org/wiki/Special:EntityData/Q42"
        );
    }

    #[test]
    fn test_foreign_repository() {
        let mut cfg = config();
        cfg.repositories.insert("commons".to_string(), "http://commons.example.org/".to_string());
        let vocab = Vocabulary::new(&cfg).unwrap();

        assert_eq!(
            vocab.entity_uri(&id("commons:Q7")).unwrap(),
            "http://commons.example.org/entity/Q7"
        );
        assert_eq!(
            vocab.property_uri(PropertyNamespace::Direct, &id("commons:P2")).unwrap(),
            "http://commons.example.org/prop/direct/P2"
        );
        assert_eq!(vocab.prefixes()["commonswdt"], "http://commons.example.org/prop/direct/");

        let err = vocab.entity_uri(&id("other:Q7")).unwrap_err();
        assert!(matches!(err, ExportError::EntityUri { .. }));
    }

    #[test]
    fn test_entity_id_for_uri() {
        let vocab = Vocabulary::new(&config()).unwrap();
        assert_eq!(
            vocab.entity_id_for_uri("http://www.wikidata.org/entity/Q11573"),
            Some(id("Q11573"))
        );
        assert_eq!(vocab.entity_id_for_uri("http://example.org/entity/Q1"), None);
    }

    #[test]
    fn test_missing_entity_kind_namespace_fails() {
        let mut cfg = config();
        cfg.entity_kinds
            .insert(EntityKind::Item, "http://www.wikidata.org/entity/".to_string());

        assert_eq!(
            Vocabulary::new(&cfg).unwrap_err(),
            ConfigurationError::MissingEntityNamespace(EntityKind::Property)
        );
    }

    #[test]
    fn test_invalid_base_uri_fails() {
        let mut cfg = config();
        cfg.concept_base = "not a uri".to_string();
        assert!(matches!(
            Vocabulary::new(&cfg),
            Err(ConfigurationError::InvalidBaseUri { .. })
        ));

        let mut cfg = config();
        cfg.data_base = String::new();
        assert!(Vocabulary::new(&cfg).is_err());
    }

    #[test]
    fn test_invalid_page_property_fails() {
        let mut cfg = config();
        cfg.page_props.insert(
            "wb-sitelinks".to_string(),
            PagePropertyRule {
                predicate: " ".to_string(),
                value_type: PagePropType::Integer,
            },
        );
        assert_eq!(
            Vocabulary::new(&cfg).unwrap_err(),
            ConfigurationError::InvalidPageProperty("wb-sitelinks".to_string())
        );
    }

    #[test]
    fn test_prefixes_are_stable() {
        let vocab = Vocabulary::new(&config()).unwrap();
        let names: Vec<&str> = vocab.prefixes().keys().map(String::as_str).take(3).collect();
        assert_eq!(names, vec!["rdf", "rdfs", "xsd"]);
        assert_eq!(vocab.prefixes()["wd"], "http://www.wikidata.org/entity/");
        assert_eq!(vocab.prefixes()["wdno"], "http://www.wikidata.org/prop/novalue/");
    }
}
