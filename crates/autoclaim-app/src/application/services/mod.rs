pub mod batch_runner;
pub mod orchestrator;

pub use batch_runner::{BatchConfig, BatchRunner, BatchSummary, GroupStats};
pub use orchestrator::{AccountCheckinResult, AdapterSet, CheckinOrchestrator, PurgeSet};
