pub mod builder;
pub mod dedupe;
pub mod error;
pub mod flags;
pub mod vocabulary;

pub use builder::{EmissionState, ExportReport, RdfBuilder};
pub use dedupe::{DedupeBag, HashDedupeBag, NullDedupeBag};
pub use error::{ConfigurationError, ExportError, ExportResult, SkippedItem};
pub use flags::{ProducerFlag, ProducerPolicy};
pub use vocabulary::{PropertyNamespace, Vocabulary};
