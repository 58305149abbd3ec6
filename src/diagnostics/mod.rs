//! Serializable diagnostics returned by the detector and written by the demo
//! tool: stage timings, per-stage counters and the not-found reason.

pub mod report;
pub mod timing;

pub use report::{DetectionReport, NotFoundReason, StageCounts, WorkingImage};
pub use timing::{StageTiming, TimingBreakdown};
