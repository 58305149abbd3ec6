use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Timing entry describing a single stage of the detector or one of the
/// helper routines executed by the demo tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for one detector run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }

    /// Run `stage`, record its wall time under `label` and pass its result
    /// through.
    pub fn measure<T>(&mut self, label: &str, stage: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = stage();
        self.push(label, start.elapsed().as_secs_f64() * 1000.0);
        out
    }

    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_records_stage() {
        let mut timings = TimingBreakdown::default();
        let v = timings.measure("bounds", || 42);
        assert_eq!(v, 42);
        assert_eq!(timings.stages.len(), 1);
        assert!(timings.stage_ms("bounds").is_some());
        assert!(timings.stage_ms("trace").is_none());
    }
}
