//! Sequential preset runner.
//!
//! Runs each preset of a batch through a [`Detector`], one call at a time,
//! in input order. A failing call becomes an error record; the batch always
//! yields one record per preset. While a run is active the runner's
//! running flag is set and a second run is refused.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::config::DetectorConfig;
use crate::detector::Detector;
use crate::error::RunError;
use crate::format::{format_outcome, ResultLabel};
use crate::point_cloud::PointCloud;
use crate::preset::{BatchKind, Preset, PresetBatch, PresetPlan};
use crate::result::SurfaceResult;

/// Outcome of one preset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SummaryRecord {
    /// 1-based position within the batch.
    pub trial: usize,
    pub preset: Preset,
    /// Wall-clock duration of the detection call.
    pub elapsed_ms: f64,
    pub label: ResultLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SurfaceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryRecord {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BatchReport {
    pub kind: BatchKind,
    pub records: Vec<SummaryRecord>,
}

impl BatchReport {
    pub fn found_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.result.as_ref().is_some_and(SurfaceResult::is_found))
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_error()).count()
    }
}

/// Records of a whole plan, batches in plan order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
    pub total_ms: f64,
}

impl RunReport {
    pub fn records(&self) -> impl Iterator<Item = &SummaryRecord> {
        self.batches.iter().flat_map(|b| b.records.iter())
    }
}

/// Drives preset batches through a detector.
pub struct PresetRunner<'a> {
    detector: &'a Detector,
    running: AtomicBool,
}

/// Clears the running flag on drop, including during unwinding.
struct RunningGuard<'f>(&'f AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<'a> PresetRunner<'a> {
    pub fn new(detector: &'a Detector) -> Self {
        Self {
            detector,
            running: AtomicBool::new(false),
        }
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn start(&self) -> Result<RunningGuard<'_>, RunError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RunError::AlreadyRunning)?;
        Ok(RunningGuard(&self.running))
    }

    /// Run one batch with the detector's default configuration as base.
    pub fn run_batch(
        &self,
        cloud: &PointCloud,
        batch: &PresetBatch,
    ) -> Result<BatchReport, RunError> {
        let _guard = self.start()?;
        Ok(self.execute_batch(cloud, batch, self.detector.config()))
    }

    /// Run every batch of a plan in order.
    pub fn run_plan(&self, cloud: &PointCloud, plan: &PresetPlan) -> Result<RunReport, RunError> {
        self.run_plan_with(cloud, plan, self.detector.config())
    }

    /// Run every batch of a plan on top of an explicit base configuration.
    pub fn run_plan_with(
        &self,
        cloud: &PointCloud,
        plan: &PresetPlan,
        base: &DetectorConfig,
    ) -> Result<RunReport, RunError> {
        let _guard = self.start()?;
        let t0 = Instant::now();
        let batches = plan
            .batches
            .iter()
            .map(|batch| self.execute_batch(cloud, batch, base))
            .collect();
        let total_ms = t0.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            "plan finished: {} presets in {:.2} ms",
            plan.preset_count(),
            total_ms
        );
        Ok(RunReport { batches, total_ms })
    }

    fn execute_batch(
        &self,
        cloud: &PointCloud,
        batch: &PresetBatch,
        base: &DetectorConfig,
    ) -> BatchReport {
        let batch_config = base.with_conversions(batch.kind.conversions());
        tracing::info!(
            "{}: {} presets, conversions={}",
            batch.kind.title(),
            batch.len(),
            batch_config.conversions
        );

        let records = batch
            .presets
            .iter()
            .enumerate()
            .map(|(i, preset)| self.run_preset(cloud, i + 1, preset, &batch_config))
            .collect();
        BatchReport {
            kind: batch.kind,
            records,
        }
    }

    fn run_preset(
        &self,
        cloud: &PointCloud,
        trial: usize,
        preset: &Preset,
        batch_config: &DetectorConfig,
    ) -> SummaryRecord {
        let config = batch_config.with_target(preset.feature);

        let t0 = Instant::now();
        let outcome = self.detector.detect_with(cloud, preset.seed_index, &config);
        let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

        let label = format_outcome(&outcome, elapsed_ms);
        match &outcome {
            Ok(_) => tracing::info!("{trial}. {preset}: {}", label.text),
            Err(err) => tracing::warn!("{trial}. {preset}: detection failed: {err}"),
        }

        let (result, error) = match outcome {
            Ok(result) => (Some(result), None),
            Err(err) => (None, Some(err.to_string())),
        };
        SummaryRecord {
            trial,
            preset: *preset,
            elapsed_ms,
            label,
            result,
            error,
        }
    }
}
