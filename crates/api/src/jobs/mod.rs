//! Background job scheduler and job implementations.

mod auto_matching;
mod pool_metrics;
mod scheduler;

pub use auto_matching::AutoMatchingJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
