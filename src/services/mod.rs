pub mod path_guard;
pub mod query_submitter;
pub mod result_poller;

pub use path_guard::derive_nonclashing_path;
pub use query_submitter::QuerySubmitter;
pub use result_poller::ResultPoller;
