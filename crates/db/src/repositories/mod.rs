//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod alert_repo;
pub mod dimension_repo;
pub mod metric_repo;
pub mod project_repo;
pub mod report_repo;
pub mod threshold_repo;

pub use alert_repo::AlertRepo;
pub use dimension_repo::DimensionRepo;
pub use metric_repo::MetricRepo;
pub use project_repo::ProjectRepo;
pub use report_repo::ReportRepo;
pub use threshold_repo::ThresholdRepo;
