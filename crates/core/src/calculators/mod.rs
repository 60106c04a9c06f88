//! Lead-generation calculators offered alongside the estimator.

pub mod health_check;
pub mod roi;
pub mod timeline;

pub use health_check::{score_answers, HealthReport, HealthVerdict, QUESTIONS};
pub use roi::{RoiCalculator, RoiInputs, RoiProjection, DEFAULT_CONVERSION_UPLIFT};
pub use timeline::{build_timeline, weeks_for_project, ProjectTimeline, TimelinePhase};
