pub mod builders;
pub mod config;
pub mod core;
pub mod handlers;
pub mod lookup;
pub mod model;
pub mod sink;
pub mod utils;

pub use config::Configuration;
pub use core::{ExportReport, ProducerFlag, ProducerPolicy, RdfBuilder, Vocabulary};
pub use model::{EntityDocument, EntityId};
pub use sink::RdfTriple;
pub use utils::RdfSerializer;
