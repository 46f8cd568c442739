pub mod job;
pub mod pool;

pub use job::{CollectionResult, Job};
pub use pool::{Collection, Collector};
