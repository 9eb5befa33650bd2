use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::{ProducerPolicy, Vocabulary};
use crate::lookup::SiteRegistry;
use crate::model::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub dump: DumpSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Base of the concept URIs, e.g. `http://www.wikidata.org/`
    pub concept_base: String,
    /// Base of the entity data documents
    pub data_base: String,
    /// Entity namespace per kind; when empty every kind uses `<concept_base>entity/`
    #[serde(default)]
    pub entity_kinds: IndexMap<EntityKind, String>,
    /// Foreign repository name → concept base
    #[serde(default)]
    pub repositories: IndexMap<String, String>,
    /// Unit IRI emitted for dimensionless quantities (unit `"1"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unitless_unit: Option<String>,
    #[serde(default)]
    pub page_props: IndexMap<String, PagePropertyRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePropertyRule {
    /// Ontology local name (e.g. `sitelinks`) or an absolute IRI
    pub predicate: String,
    #[serde(rename = "type")]
    pub value_type: PagePropType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagePropType {
    Integer,
    Float,
    String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub global_id: String,
    pub group: String,
    pub language: String,
    /// Page URL with a `$1` placeholder for the encoded title
    pub page_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Turtle,
    NTriples,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpSettings {
    #[serde(default = "default_software_version")]
    pub software_version: String,
    #[serde(default = "default_license")]
    pub license: String,
}

impl Default for DumpSettings {
    fn default() -> Self {
        Self {
            software_version: default_software_version(),
            license: default_license(),
        }
    }
}

fn default_flags() -> Vec<String> { vec!["all".to_string()] }
fn default_software_version() -> String { "1.0.0".to_string() }
fn default_license() -> String { "http://creativecommons.org/publicdomain/zero/1.0/".to_string() }

impl Configuration {
    /// Load configuration from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        Vocabulary::new(&self.vocabulary).context("Invalid vocabulary configuration")?;
        self.policy().context("Invalid producer flags")?;

        let site_id = Regex::new(r"^[a-z0-9_]+$")?;
        for site in &self.sites {
            if !site_id.is_match(&site.global_id) {
                anyhow::bail!("Invalid site global id: {}", site.global_id);
            }
        }
        SiteRegistry::from_config(&self.sites).context("Invalid site configuration")?;

        if url::Url::parse(&self.dump.license).is_err() {
            anyhow::bail!("Dump license is not a URI: {}", self.dump.license);
        }

        Ok(())
    }

    pub fn policy(&self) -> Result<ProducerPolicy, crate::core::ConfigurationError> {
        ProducerPolicy::from_names(&self.flags)
    }

    /// Create an example configuration
    pub fn example() -> Self {
        let mut page_props = IndexMap::new();
        page_props.insert(
            "wb-claims".to_string(),
            PagePropertyRule { predicate: "statements".to_string(), value_type: PagePropType::Integer },
        );
        page_props.insert(
            "wb-sitelinks".to_string(),
            PagePropertyRule { predicate: "sitelinks".to_string(), value_type: PagePropType::Integer },
        );

        Configuration {
            name: "Example entity export".to_string(),
            description: "Full RDF export of a knowledge-base repository".to_string(),
            version: "1.0".to_string(),
            vocabulary: VocabularyConfig {
                concept_base: "http://www.wikidata.org/".to_string(),
                data_base: "https://www.wikidata.org/wiki/Special:EntityData/".to_string(),
                entity_kinds: IndexMap::new(),
                repositories: IndexMap::new(),
                unitless_unit: Some("http://www.wikidata.org/entity/Q199".to_string()),
                page_props,
            },
            sites: vec![
                SiteConfig {
                    global_id: "enwiki".to_string(),
                    group: "wikipedia".to_string(),
                    language: "en".to_string(),
                    page_url: "https://en.wikipedia.org/wiki/$1".to_string(),
                },
                SiteConfig {
                    global_id: "dewiki".to_string(),
                    group: "wikipedia".to_string(),
                    language: "de".to_string(),
                    page_url: "https://de.wikipedia.org/wiki/$1".to_string(),
                },
            ],
            flags: default_flags(),
            output_format: OutputFormat::Turtle,
            dump: DumpSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_example_is_valid() {
        let config = Configuration::example();
        config.validate().unwrap();
        assert_eq!(config.policy().unwrap(), ProducerPolicy::all());
    }

    #[test]
    fn test_from_yaml_file() {
        let yaml = serde_yaml::to_string(&Configuration::example()).unwrap();
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Configuration::from_file(file.path()).unwrap();
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.vocabulary.page_props["wb-claims"].value_type, PagePropType::Integer);
    }

    #[test]
    fn test_from_json_file_with_defaults() {
        let json = r#"{
            "name": "minimal", "version": "1",
            "vocabulary": {"concept_base": "http://example.org/", "data_base": "http://example.org/data/"}
        }"#;
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Configuration::from_file(file.path()).unwrap();
        assert_eq!(config.flags, vec!["all"]);
        assert!(matches!(config.output_format, OutputFormat::Turtle));
        assert_eq!(config.dump.software_version, "1.0.0");
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_flag_and_site() {
        let mut config = Configuration::example();
        config.flags = vec!["quantum".to_string()];
        assert!(config.validate().is_err());

        let mut config = Configuration::example();
        config.sites[0].global_id = "En Wiki".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = Configuration::from_file("/nonexistent/config.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
