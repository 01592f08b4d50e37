pub mod format;
pub mod query;
pub mod structure;

pub use format::{ResultFormat, TableDialect};
pub use query::{ClassificationStatus, Entity, Fetched, QueryResult, TaxonomyRank};
pub use structure::{JobId, StructureRecord};
