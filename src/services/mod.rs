pub mod batch;
pub mod orchestration;
pub mod persistence;

pub use batch::{BatchOptions, BatchProcessor, BatchReport, BatchStatistics};
pub use orchestration::OrchestrationService;
pub use persistence::PersistenceService;
