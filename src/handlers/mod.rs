pub mod globe;
pub mod literal;
pub mod quantity;
pub mod time;

use std::collections::HashMap;
use thiserror::Error;

use crate::core::error::ExportError;
use crate::core::Vocabulary;
use crate::model::{DataValue, EntityId};
use crate::sink::RdfObject;

pub use globe::GlobeCoordinateHandler;
pub use literal::{CommonsHandler, EntityIdHandler, MonolingualTextHandler, StringHandler, UrlHandler};
pub use quantity::QuantityHandler;
pub use time::TimeHandler;

#[derive(Error, Debug)]
pub enum ValueError {
    #[error("expected {expected} value, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{0}")]
    Malformed(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type ValueResult<T> = Result<T, ValueError>;

/// Precision-preserving representation of a value, emitted once per dedupe scope
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    /// Class IRI of the node, e.g. `wikibase:QuantityValue`
    pub class: String,
    pub properties: Vec<(String, RdfObject)>,
    /// Entities referenced only from inside the node, such as a quantity unit
    pub mentioned: Vec<EntityId>,
}

impl ValueNode {
    pub fn new(class_local_name: &str) -> Self {
        Self {
            class: crate::core::vocabulary::wikibase::term(class_local_name),
            properties: Vec::new(),
            mentioned: Vec::new(),
        }
    }

    pub fn with(mut self, predicate_local_name: &str, object: RdfObject) -> Self {
        self.properties
            .push((crate::core::vocabulary::wikibase::term(predicate_local_name), object));
        self
    }

    pub fn mentioning(mut self, id: EntityId) -> Self {
        self.mentioned.push(id);
        self
    }
}

/// Conversion of one datatype's values into RDF
pub trait ValueHandler: Send + Sync {
    /// The single object used by direct, statement, qualifier and reference triples
    fn simple_value(&self, value: &DataValue, vocabulary: &Vocabulary) -> ValueResult<RdfObject>;

    /// Full value node; `None` for datatypes without one
    fn value_node(&self, _value: &DataValue, _vocabulary: &Vocabulary) -> ValueResult<Option<ValueNode>> {
        Ok(None)
    }

    /// Entities referenced by the simple value
    fn mentioned_entities(&self, _value: &DataValue, _vocabulary: &Vocabulary) -> Vec<EntityId> {
        Vec::new()
    }

    /// Whether simple values are IRIs rather than literals
    fn is_object_valued(&self) -> bool {
        false
    }
}

pub(crate) fn mismatch(expected: &'static str, value: &DataValue) -> ValueError {
    ValueError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

/// Datatype tag → handler
pub struct ValueHandlerRegistry {
    handlers: HashMap<String, Box<dyn ValueHandler>>,
}

impl ValueHandlerRegistry {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn new() -> Self {
        let mut registry = Self::empty();

        // Register default handlers
        registry.register("string", Box::new(StringHandler));
        registry.register("external-id", Box::new(StringHandler));
        registry.register("math", Box::new(StringHandler));
        registry.register("url", Box::new(UrlHandler));
        registry.register("commonsMedia", Box::new(CommonsHandler::media()));
        registry.register("geo-shape", Box::new(CommonsHandler::data()));
        registry.register("tabular-data", Box::new(CommonsHandler::data()));
        registry.register("monolingualtext", Box::new(MonolingualTextHandler));
        registry.register("wikibase-item", Box::new(EntityIdHandler));
        registry.register("wikibase-property", Box::new(EntityIdHandler));
        registry.register("quantity", Box::new(QuantityHandler));
        registry.register("time", Box::new(TimeHandler));
        registry.register("globe-coordinate", Box::new(GlobeCoordinateHandler));

        registry
    }

    pub fn register(&mut self, datatype: &str, handler: Box<dyn ValueHandler>) {
        self.handlers.insert(datatype.to_string(), handler);
    }

    pub fn get(&self, datatype: &str) -> Option<&dyn ValueHandler> {
        self.handlers.get(datatype).map(|h| h.as_ref())
    }

    pub fn datatypes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ValueHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
