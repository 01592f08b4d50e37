pub mod entity_fields;
pub mod job_ctx;
pub mod merge_flow;

pub use entity_fields::{extract_field, extract_fields, synthesize_taxonomy};
pub use job_ctx::JobCtx;
pub use merge_flow::MergeFlow;
