pub mod batch;
pub mod pool;

pub use batch::{analyze_log, analyze_logs, BatchEntry, LogSummary};
pub use pool::WorkerPool;
