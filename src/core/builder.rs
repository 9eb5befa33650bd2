use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::builders::{default_builders, BuildContext, EntityTypeBuilder};
use crate::config::{Configuration, DumpSettings, PagePropType};
use crate::core::dedupe::DedupeBag;
use crate::core::error::{ConfigurationError, ExportError, ExportResult, SkippedItem};
use crate::core::flags::{ProducerFlag, ProducerPolicy};
use crate::core::vocabulary::{cc, owl, rdf, schema, wikibase, xsd, Vocabulary};
use crate::handlers::ValueHandlerRegistry;
use crate::lookup::{EntityLookup, PagePropsProvider, SiteLookup, SiteRegistry};
use crate::model::{EntityDocument, EntityId, EntityKind};
use crate::sink::{RdfObject, RdfTriple, TripleCollector, TripleSink};

/// How far an entity has been written in the current document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmissionState {
    /// Referenced by a value, not described yet
    NotSeen,
    Stub,
    Full,
}

/// Summary of one export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub started_at: DateTime<Utc>,
    pub entities: usize,
    pub stubs: usize,
    pub redirects: usize,
    pub triples: usize,
    #[serde(default)]
    pub skipped: Vec<SkippedItem>,
}

impl Default for ExportReport {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            entities: 0,
            stubs: 0,
            redirects: 0,
            triples: 0,
            skipped: Vec::new(),
        }
    }
}

/// Collaborators every emission borrows; fixed for the builder's lifetime
struct Environment {
    vocabulary: Arc<Vocabulary>,
    policy: ProducerPolicy,
    dedupe: Arc<dyn DedupeBag>,
    sites: Arc<dyn SiteLookup>,
    handlers: ValueHandlerRegistry,
    builders: HashMap<EntityKind, Box<dyn EntityTypeBuilder>>,
}

impl Environment {
    fn context<'a>(&'a self, sink: &'a mut dyn TripleSink) -> BuildContext<'a> {
        BuildContext {
            vocabulary: self.vocabulary.as_ref(),
            handlers: &self.handlers,
            sites: self.sites.as_ref(),
            dedupe: self.dedupe.as_ref(),
            policy: self.policy,
            sink,
            mentioned: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Writes entities, stubs, redirects and metadata as RDF under a producer policy.
///
/// One builder tracks which entities it has described. The dedupe bag may be
/// shared with other builders exporting disjoint entity sets, so that shared
/// value and reference nodes are written only once across all of them.
pub struct RdfBuilder {
    env: Environment,
    page_props: Option<Box<dyn PagePropsProvider>>,
    dump: DumpSettings,
    states: IndexMap<EntityId, EmissionState>,
    output: TripleCollector,
    report: ExportReport,
    drained: usize,
    started: bool,
}

impl RdfBuilder {
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        policy: ProducerPolicy,
        dedupe: Arc<dyn DedupeBag>,
        sites: Arc<dyn SiteLookup>,
    ) -> Self {
        Self {
            env: Environment {
                vocabulary,
                policy,
                dedupe,
                sites,
                handlers: ValueHandlerRegistry::new(),
                builders: default_builders(),
            },
            page_props: None,
            dump: DumpSettings::default(),
            states: IndexMap::new(),
            output: TripleCollector::new(),
            report: ExportReport::default(),
            drained: 0,
            started: false,
        }
    }

    /// Builder for a validated configuration's vocabulary, sites, flags and dump settings
    pub fn from_config(config: &Configuration, dedupe: Arc<dyn DedupeBag>) -> Result<Self, ConfigurationError> {
        let vocabulary = Arc::new(Vocabulary::new(&config.vocabulary)?);
        let sites = Arc::new(SiteRegistry::from_config(&config.sites)?);
        Ok(Self::new(vocabulary, config.policy()?, dedupe, sites).with_dump_settings(config.dump.clone()))
    }

    pub fn with_dump_settings(mut self, dump: DumpSettings) -> Self {
        self.dump = dump;
        self
    }

    pub fn with_handlers(mut self, handlers: ValueHandlerRegistry) -> Self {
        self.env.handlers = handlers;
        self
    }

    pub fn policy(&self) -> ProducerPolicy {
        self.env.policy
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.env.vocabulary
    }

    /// Begin a new document: output, entity state and report are reset and
    /// the namespace prefixes are declared. The dedupe bag is left alone, so
    /// value, reference and site nodes already written are only linked to.
    /// A self-contained document needs a builder with a fresh bag.
    pub fn start_document(&mut self) {
        self.output.clear();
        self.states.clear();
        self.report = ExportReport::default();
        self.drained = 0;
        for (prefix, iri) in self.env.vocabulary.prefixes() {
            self.output.prefix(prefix, iri);
        }
        self.started = true;
    }

    fn ensure_started(&mut self) {
        if !self.started {
            self.start_document();
        }
    }

    pub fn entity_state(&self, id: &EntityId) -> EmissionState {
        self.states.get(id).copied().unwrap_or(EmissionState::NotSeen)
    }

    /// Entities referenced so far but neither stubbed nor fully written, in first-mention order
    pub fn mentioned_entities(&self) -> Vec<EntityId> {
        self.states
            .iter()
            .filter(|(_, state)| **state == EmissionState::NotSeen)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn entity_iri(&self, entity: &EntityDocument) -> ExportResult<String> {
        if entity.kind != entity.id.kind() {
            return Err(ExportError::EntityUri {
                id: entity.id.to_string(),
                reason: format!("document type {} does not match id", entity.kind),
            });
        }
        self.env.vocabulary.entity_uri(&entity.id)
    }

    fn record_skip(&mut self, subject: impl Into<String>, error: &ExportError) {
        let item = SkippedItem::new(subject, error);
        warn!("Skipping {}", item);
        self.report.skipped.push(item);
    }

    fn absorb(&mut self, mentioned: Vec<EntityId>, skipped: Vec<SkippedItem>) {
        for id in mentioned {
            self.states.entry(id).or_insert(EmissionState::NotSeen);
        }
        self.report.skipped.extend(skipped);
    }

    /// Write the full description of an entity. An entity already written in
    /// full is ignored; one already stubbed gets everything but the stub triples.
    pub fn add_entity(&mut self, entity: &EntityDocument) {
        self.ensure_started();

        let state = self.entity_state(&entity.id);
        if state == EmissionState::Full {
            debug!("Entity {} already exported", entity.id);
            return;
        }

        let iri = match self.entity_iri(entity) {
            Ok(iri) => iri,
            Err(e) => return self.record_skip(entity.id.to_string(), &e),
        };

        let Some(builder) = self.env.builders.get(&entity.kind) else {
            let error = ExportError::EntityUri {
                id: entity.id.to_string(),
                reason: format!("no builder for entity kind {}", entity.kind),
            };
            return self.record_skip(entity.id.to_string(), &error);
        };

        let mut ctx = self.env.context(&mut self.output);
        builder.add_entity(entity, &iri, &mut ctx, state == EmissionState::Stub);
        let BuildContext { mentioned, skipped, .. } = ctx;

        self.absorb(mentioned, skipped);
        self.states.insert(entity.id.clone(), EmissionState::Full);
        self.report.entities += 1;
        debug!("Exported entity {}", entity.id);

        if self.env.policy.contains(ProducerFlag::PageProps) {
            self.add_entity_page_props(std::slice::from_ref(&entity.id));
        }
    }

    /// Write the minimal description of an entity unless it is already stubbed or written
    pub fn add_entity_stub(&mut self, entity: &EntityDocument) {
        self.ensure_started();

        if self.entity_state(&entity.id) != EmissionState::NotSeen {
            return;
        }

        let iri = match self.entity_iri(entity) {
            Ok(iri) => iri,
            Err(e) => return self.record_skip(entity.id.to_string(), &e),
        };

        let Some(builder) = self.env.builders.get(&entity.kind) else {
            let error = ExportError::EntityUri {
                id: entity.id.to_string(),
                reason: format!("no builder for entity kind {}", entity.kind),
            };
            return self.record_skip(entity.id.to_string(), &error);
        };

        let mut ctx = self.env.context(&mut self.output);
        builder.add_stub(entity, &iri, &mut ctx);
        let BuildContext { mentioned, skipped, .. } = ctx;

        self.absorb(mentioned, skipped);
        self.states.insert(entity.id.clone(), EmissionState::Stub);
        self.report.stubs += 1;
        debug!("Stubbed entity {}", entity.id);
    }

    /// `from owl:sameAs to`, written whatever the policy
    pub fn add_entity_redirect(&mut self, from: &EntityId, to: &EntityId) {
        self.ensure_started();

        let iris = self
            .env
            .vocabulary
            .entity_uri(from)
            .and_then(|f| Ok((f, self.env.vocabulary.entity_uri(to)?)));
        match iris {
            Ok((from_iri, to_iri)) => {
                self.output.emit(RdfTriple::link(from_iri, owl::SAME_AS, to_iri));
                self.report.redirects += 1;
            }
            Err(e) => self.record_skip(from.to_string(), &e),
        }
    }

    /// Revision and modification time of the entity's data document
    pub fn add_entity_revision_info(&mut self, id: &EntityId, revision: u64, timestamp: DateTime<Utc>) {
        if !self.env.policy.contains(ProducerFlag::VersionInfo) {
            return;
        }
        self.ensure_started();

        let iris = self
            .env
            .vocabulary
            .data_uri(id)
            .and_then(|d| Ok((d, self.env.vocabulary.entity_uri(id)?)));
        let (data_iri, entity_iri) = match iris {
            Ok(iris) => iris,
            Err(e) => return self.record_skip(id.to_string(), &e),
        };

        self.output.emit(RdfTriple::link(&data_iri, rdf::TYPE, schema::DATASET));
        self.output.emit(RdfTriple::link(&data_iri, schema::ABOUT, entity_iri));
        self.output.emit(RdfTriple::new(
            &data_iri,
            schema::VERSION,
            RdfObject::typed(revision.to_string(), xsd::INTEGER),
        ));
        self.output.emit(RdfTriple::new(
            &data_iri,
            schema::DATE_MODIFIED,
            RdfObject::typed(timestamp.to_rfc3339_opts(SecondsFormat::Secs, true), xsd::DATE_TIME),
        ));
    }

    /// Dataset description of a whole dump, `timestamp` in seconds since the epoch
    pub fn add_dump_header(&mut self, timestamp: i64) {
        if !self.env.policy.contains(ProducerFlag::VersionInfo) {
            return;
        }
        self.ensure_started();

        let Some(modified) = Utc.timestamp_opt(timestamp, 0).single() else {
            let error = ExportError::InvalidValue {
                property: "dateModified".to_string(),
                reason: format!("timestamp {} out of range", timestamp),
            };
            return self.record_skip(wikibase::DUMP, &error);
        };

        let dump = wikibase::DUMP;
        self.output.emit(RdfTriple::link(dump, rdf::TYPE, schema::DATASET));
        self.output.emit(RdfTriple::link(dump, rdf::TYPE, owl::ONTOLOGY));
        self.output.emit(RdfTriple::link(dump, cc::LICENSE, self.dump.license.as_str()));
        self.output.emit(RdfTriple::new(
            dump,
            schema::SOFTWARE_VERSION,
            RdfObject::plain(self.dump.software_version.as_str()),
        ));
        self.output.emit(RdfTriple::new(
            dump,
            schema::DATE_MODIFIED,
            RdfObject::typed(modified.to_rfc3339_opts(SecondsFormat::Secs, true), xsd::DATE_TIME),
        ));
        self.output.emit(RdfTriple::link(dump, owl::IMPORTS, wikibase::ONTOLOGY_DOCUMENT));
    }

    /// Stub every entity referenced by a value but not described yet.
    ///
    /// Ids the lookup cannot provide stay unresolved and are reported.
    pub fn resolve_mentioned_entities(&mut self, lookup: &dyn EntityLookup) {
        if !self.env.policy.contains(ProducerFlag::ResolvedEntities) {
            return;
        }

        let pending = self.mentioned_entities();
        debug!("Resolving {} mentioned entities", pending.len());
        for id in pending {
            match lookup.get(&id) {
                Ok(entity) if entity.id == id => self.add_entity_stub(&entity),
                Ok(entity) => {
                    let error = ExportError::Lookup(format!("lookup of {} returned {}", id, entity.id));
                    self.record_skip(id.to_string(), &error);
                }
                Err(e) => self.record_skip(id.to_string(), &e),
            }
        }
    }

    pub fn set_page_props(&mut self, provider: Box<dyn PagePropsProvider>) {
        self.page_props = Some(provider);
    }

    /// One triple per configured page property the provider knows for each entity
    pub fn add_entity_page_props(&mut self, ids: &[EntityId]) {
        if !self.env.policy.contains(ProducerFlag::PageProps) {
            return;
        }
        let vocabulary = Arc::clone(&self.env.vocabulary);
        let config = vocabulary.page_property_config();
        if config.is_empty() || self.page_props.is_none() {
            return;
        }
        self.ensure_started();

        let names: Vec<String> = config.keys().cloned().collect();
        let fetched = match &self.page_props {
            Some(provider) => provider.get_properties(ids, &names),
            None => return,
        };
        let props = match fetched {
            Ok(props) => props,
            Err(e) => {
                for id in ids {
                    self.record_skip(id.to_string(), &e);
                }
                return;
            }
        };

        for id in ids {
            let Some(values) = props.get(id) else {
                continue;
            };
            let subject = match vocabulary.data_uri(id) {
                Ok(iri) => iri,
                Err(e) => {
                    self.record_skip(id.to_string(), &e);
                    continue;
                }
            };

            for (name, rule) in config {
                let Some(value) = values.get(name) else {
                    continue;
                };
                match coerce_page_prop(value, rule.value_type) {
                    Some(object) => self.output.emit(RdfTriple::new(&subject, page_prop_predicate(&rule.predicate), object)),
                    None => {
                        let error = ExportError::InvalidValue {
                            property: name.clone(),
                            reason: format!("cannot read {} as {:?}", value, rule.value_type),
                        };
                        self.record_skip(id.to_string(), &error);
                    }
                }
            }
        }
    }

    /// Namespace prefixes declared by `start_document`
    pub fn prefixes(&self) -> &IndexMap<String, String> {
        self.output.prefixes()
    }

    /// Take the triples written since the last call
    pub fn get_rdf(&mut self) -> Vec<RdfTriple> {
        self.ensure_started();
        let triples = self.output.drain();
        self.drained += triples.len();
        triples
    }

    pub fn report(&self) -> ExportReport {
        ExportReport {
            triples: self.drained + self.output.len(),
            ..self.report.clone()
        }
    }

    pub fn log_summary(&self) {
        let report = self.report();
        info!(
            "Exported {} entities, {} stubs, {} redirects as {} triples ({} skipped)",
            report.entities,
            report.stubs,
            report.redirects,
            report.triples,
            report.skipped.len()
        );
    }
}

fn page_prop_predicate(predicate: &str) -> String {
    if predicate.contains("://") {
        predicate.to_string()
    } else {
        wikibase::term(predicate)
    }
}

fn coerce_page_prop(value: &serde_json::Value, value_type: PagePropType) -> Option<RdfObject> {
    use serde_json::Value;

    match value_type {
        PagePropType::Integer => {
            let int = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }?;
            Some(RdfObject::typed(int.to_string(), xsd::INTEGER))
        }
        PagePropType::Float => {
            let float = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|f| f.is_finite())?;
            Some(RdfObject::typed(float.to_string(), xsd::DOUBLE))
        }
        PagePropType::String => match value {
            Value::String(s) => Some(RdfObject::plain(s.as_str())),
            Value::Number(n) => Some(RdfObject::plain(n.to_string())),
            Value::Bool(b) => Some(RdfObject::plain(b.to_string())),
            _ => None,
        },
    }
}
