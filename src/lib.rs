pub mod audit;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod plan;
pub mod providers;
pub mod report;
pub mod repository;
pub mod service;
pub mod storage;

pub use config::{CrawlConfig, JsRenderingMode, PipelineOptions};
pub use domain::models::{AuditOutput, CheckResult, PipelineReport, PipelineStatus, Severity};
pub use domain::page::{CrawlArtifact, PageRecord};
pub use error::{AppError, Result};
pub use service::pipeline::SeoPipeline;

/// Install a tracing subscriber honoring `RUST_LOG`, for binaries and
/// tests that embed the pipeline.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
