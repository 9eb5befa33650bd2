//! Entity-kind specific triple builders and the helpers they share.

pub mod item;
pub mod property;
pub mod sitelinks;
pub mod snak;
pub mod statements;
pub mod terms;

use std::collections::HashMap;
use tracing::warn;

use crate::core::dedupe::DedupeBag;
use crate::core::error::{ExportError, SkippedItem};
use crate::core::flags::{ProducerFlag, ProducerPolicy};
use crate::core::vocabulary::{rdf, wikibase};
use crate::core::Vocabulary;
use crate::handlers::ValueHandlerRegistry;
use crate::lookup::SiteLookup;
use crate::model::{EntityDocument, EntityId, EntityKind};
use crate::sink::{RdfObject, RdfTriple, TripleSink};

pub use item::ItemRdfBuilder;
pub use property::PropertyRdfBuilder;
pub use snak::SnakRole;

/// Everything one entity emission needs, borrowed from the orchestrator
pub struct BuildContext<'a> {
    pub vocabulary: &'a Vocabulary,
    pub handlers: &'a ValueHandlerRegistry,
    pub sites: &'a dyn SiteLookup,
    pub dedupe: &'a dyn DedupeBag,
    pub policy: ProducerPolicy,
    pub sink: &'a mut dyn TripleSink,
    /// Entities referenced by emitted values, in order of reference
    pub mentioned: Vec<EntityId>,
    pub skipped: Vec<SkippedItem>,
}

impl<'a> BuildContext<'a> {
    pub fn has(&self, flag: ProducerFlag) -> bool {
        self.policy.contains(flag)
    }

    pub fn emit(&mut self, subject: &str, predicate: &str, object: RdfObject) {
        self.sink.emit(RdfTriple::new(subject, predicate, object));
    }

    pub fn link(&mut self, subject: &str, predicate: &str, object: &str) {
        self.sink.emit(RdfTriple::link(subject, predicate, object));
    }

    pub fn skip(&mut self, subject: impl Into<String>, error: &ExportError) {
        let item = SkippedItem::new(subject, error);
        warn!("Skipping {}", item);
        self.skipped.push(item);
    }
}

/// Conversion of one entity kind into triples
pub trait EntityTypeBuilder: Send + Sync {
    /// Full description of the entity. When `stubbed` is set the stub
    /// triples are already in the output and are not repeated.
    fn add_entity(&self, entity: &EntityDocument, entity_iri: &str, ctx: &mut BuildContext<'_>, stubbed: bool);

    /// Minimal description for an entity only referenced as a value
    fn add_stub(&self, entity: &EntityDocument, entity_iri: &str, ctx: &mut BuildContext<'_>);
}

pub fn add_identity(ctx: &mut BuildContext<'_>, entity_iri: &str, kind: EntityKind) {
    ctx.link(entity_iri, rdf::TYPE, &wikibase::term(kind.class_name()));
}

/// Entity kind → builder
pub fn default_builders() -> HashMap<EntityKind, Box<dyn EntityTypeBuilder>> {
    let mut builders: HashMap<EntityKind, Box<dyn EntityTypeBuilder>> = HashMap::new();
    builders.insert(EntityKind::Item, Box::new(ItemRdfBuilder));
    builders.insert(EntityKind::Property, Box::new(PropertyRdfBuilder));
    builders
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::config::Configuration;
    use crate::core::dedupe::HashDedupeBag;
    use crate::lookup::SiteRegistry;
    use crate::sink::TripleCollector;

    /// Owns the collaborators a `BuildContext` borrows
    pub struct Fixture {
        pub vocabulary: Vocabulary,
        pub handlers: ValueHandlerRegistry,
        pub sites: SiteRegistry,
        pub dedupe: HashDedupeBag,
        pub output: TripleCollector,
    }

    impl Fixture {
        pub fn new() -> Self {
            let config = Configuration::example();
            Self {
                vocabulary: Vocabulary::new(&config.vocabulary).unwrap(),
                handlers: ValueHandlerRegistry::new(),
                sites: SiteRegistry::from_config(&config.sites).unwrap(),
                dedupe: HashDedupeBag::new(),
                output: TripleCollector::new(),
            }
        }

        pub fn context(&mut self, policy: ProducerPolicy) -> BuildContext<'_> {
            BuildContext {
                vocabulary: &self.vocabulary,
                handlers: &self.handlers,
                sites: &self.sites,
                dedupe: &self.dedupe,
                policy,
                sink: &mut self.output,
                mentioned: Vec::new(),
                skipped: Vec::new(),
            }
        }

        pub fn ntriples(&self) -> Vec<String> {
            self.output.triples().iter().map(RdfTriple::to_ntriple).collect()
        }
    }
}
