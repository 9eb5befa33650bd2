//! Collaborators consumed by the exporter: entity lookup, site registry and
//! page properties, with in-memory implementations.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::core::error::{ConfigurationError, ExportError, ExportResult};
use crate::model::{EntityDocument, EntityId};

/// Characters escaped in page titles; `/`, `:` and friends stay readable
const TITLE_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

pub fn encode_title(title: &str) -> String {
    utf8_percent_encode(&title.trim().replace(' ', "_"), TITLE_ENCODE).to_string()
}

pub trait EntityLookup {
    /// Fails with `ExportError::NotFound` for unknown or deleted ids
    fn get(&self, id: &EntityId) -> ExportResult<EntityDocument>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryEntityLookup {
    entities: HashMap<EntityId, EntityDocument>,
}

impl InMemoryEntityLookup {
    pub fn new(documents: impl IntoIterator<Item = EntityDocument>) -> Self {
        Self {
            entities: documents.into_iter().map(|doc| (doc.id.clone(), doc)).collect(),
        }
    }

    pub fn insert(&mut self, document: EntityDocument) {
        self.entities.insert(document.id.clone(), document);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityLookup for InMemoryEntityLookup {
    fn get(&self, id: &EntityId) -> ExportResult<EntityDocument> {
        self.entities
            .get(id)
            .cloned()
            .ok_or_else(|| ExportError::NotFound(id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub global_id: String,
    pub group: String,
    pub language: String,
    page_url: String,
    root_url: String,
}

impl Site {
    pub fn new(config: &SiteConfig) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidSite {
            site: config.global_id.clone(),
            reason,
        };

        if !config.page_url.contains("$1") {
            return Err(invalid("page_url has no $1 placeholder".to_string()));
        }
        if config.language.trim().is_empty() {
            return Err(invalid("missing language".to_string()));
        }

        let parsed = url::Url::parse(&config.page_url.replace("$1", ""))
            .map_err(|e| invalid(e.to_string()))?;
        let root = parsed.join("/").map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            global_id: config.global_id.clone(),
            group: config.group.clone(),
            language: config.language.clone(),
            page_url: config.page_url.clone(),
            root_url: root.to_string(),
        })
    }

    pub fn page_url_for(&self, title: &str) -> String {
        self.page_url.replace("$1", &encode_title(title))
    }

    /// Root of the site, e.g. `https://en.wikipedia.org/`
    pub fn root_url(&self) -> &str {
        &self.root_url
    }
}

pub trait SiteLookup: Send + Sync {
    fn site(&self, global_id: &str) -> Option<&Site>;
}

#[derive(Debug, Default, Clone)]
pub struct SiteRegistry {
    sites: HashMap<String, Site>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(sites: &[SiteConfig]) -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        for config in sites {
            registry.add(Site::new(config)?);
        }
        Ok(registry)
    }

    pub fn add(&mut self, site: Site) {
        self.sites.insert(site.global_id.clone(), site);
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl SiteLookup for SiteRegistry {
    fn site(&self, global_id: &str) -> Option<&Site> {
        self.sites.get(global_id)
    }
}

/// Page properties keyed by entity, then property name
pub type PagePropsMap = HashMap<EntityId, HashMap<String, serde_json::Value>>;

pub trait PagePropsProvider {
    fn get_properties(&self, entities: &[EntityId], names: &[String]) -> ExportResult<PagePropsMap>;
}

#[derive(Debug, Default, Clone)]
pub struct StaticPageProps {
    props: PagePropsMap,
}

impl StaticPageProps {
    pub fn new(props: PagePropsMap) -> Self {
        Self { props }
    }

    /// Parse `{"Q1": {"wb-claims": 3}, ...}`
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(content)?))
    }
}

impl PagePropsProvider for StaticPageProps {
    fn get_properties(&self, entities: &[EntityId], names: &[String]) -> ExportResult<PagePropsMap> {
        let mut result = HashMap::new();
        for id in entities {
            if let Some(props) = self.props.get(id) {
                let selected: HashMap<String, serde_json::Value> = props
                    .iter()
                    .filter(|(name, _)| names.contains(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                if !selected.is_empty() {
                    result.insert(id.clone(), selected);
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enwiki() -> SiteConfig {
        SiteConfig {
            global_id: "enwiki".to_string(),
            group: "wikipedia".to_string(),
            language: "en".to_string(),
            page_url: "https://en.wikipedia.org/wiki/$1".to_string(),
        }
    }

    #[test]
    fn test_site_urls() {
        let site = Site::new(&enwiki()).unwrap();
        assert_eq!(site.root_url(), "https://en.wikipedia.org/");
        assert_eq!(site.page_url_for("Douglas Adams"), "https://en.wikipedia.org/wiki/Douglas_Adams");
        assert_eq!(site.page_url_for("AC/DC?"), "https://en.wikipedia.org/wiki/AC/DC%3F");
        assert_eq!(site.page_url_for("Zürich"), "https://en.wikipedia.org/wiki/Z%C3%BCrich");
    }

    #[test]
    fn test_invalid_site() {
        let mut config = enwiki();
        config.page_url = "https://en.wikipedia.org/wiki/".to_string();
        assert!(matches!(Site::new(&config), Err(ConfigurationError::InvalidSite { .. })));
    }

    #[test]
    fn test_entity_lookup_not_found() {
        let lookup = InMemoryEntityLookup::new(vec![EntityDocument::new(EntityId::parse("Q1").unwrap())]);
        assert!(lookup.get(&EntityId::parse("Q1").unwrap()).is_ok());
        assert_eq!(
            lookup.get(&EntityId::parse("Q2").unwrap()),
            Err(ExportError::NotFound("Q2".to_string()))
        );
    }

    #[test]
    fn test_static_page_props_filters_names() {
        let props = StaticPageProps::from_json(r#"{"Q1": {"wb-claims": 3, "other": "x"}}"#).unwrap();
        let q1 = EntityId::parse("Q1").unwrap();
        let result = props
            .get_properties(&[q1.clone()], &["wb-claims".to_string()])
            .unwrap();
        assert_eq!(result[&q1].len(), 1);
        assert_eq!(result[&q1]["wb-claims"], serde_json::json!(3));
    }
}
