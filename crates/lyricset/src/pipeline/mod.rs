pub mod config;
pub mod runner;

pub use config::PipelineConfig;
pub use runner::Pipeline;
