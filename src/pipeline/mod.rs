// Review pipeline: paged retrieval, processing, and CSV export

pub mod csv_out;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod window;

pub use pipeline::{log_summary, AppOutcome, AppRunResult, ReviewPipeline, RunSummary};
pub use window::DateWindow;
