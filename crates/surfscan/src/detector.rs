//! Detection capability boundary.
//!
//! [`SurfaceDetector`] is the backend seam: given a cloud, a seed index and
//! an explicit [`DetectorConfig`], fit one primitive around the seed.
//! [`Detector`] wraps a backend, validates call arguments and lets at most
//! one call reach the backend at a time.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::DetectorConfig;
use crate::error::DetectError;
use crate::point_cloud::PointCloud;
use crate::result::SurfaceResult;

/// Backend able to fit a primitive around a seed point.
///
/// Implementations need not be reentrant; [`Detector`] serializes calls.
pub trait SurfaceDetector: Send + Sync {
    fn detect(
        &self,
        cloud: &PointCloud,
        seed_index: usize,
        config: &DetectorConfig,
    ) -> Result<SurfaceResult, DetectError>;
}

impl<D: SurfaceDetector + ?Sized> SurfaceDetector for Arc<D> {
    fn detect(
        &self,
        cloud: &PointCloud,
        seed_index: usize,
        config: &DetectorConfig,
    ) -> Result<SurfaceResult, DetectError> {
        (**self).detect(cloud, seed_index, config)
    }
}

impl<D: SurfaceDetector + ?Sized> SurfaceDetector for Box<D> {
    fn detect(
        &self,
        cloud: &PointCloud,
        seed_index: usize,
        config: &DetectorConfig,
    ) -> Result<SurfaceResult, DetectError> {
        (**self).detect(cloud, seed_index, config)
    }
}

/// Primary detection interface.
///
/// Holds a backend and a default configuration. Create once, detect many
/// times.
///
/// # Examples
///
/// ```
/// use surfscan::{Detector, FeatureType, PointCloud, ScriptedDetector, SurfaceResult};
///
/// let cloud = PointCloud::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]).unwrap();
/// let detector = Detector::new(ScriptedDetector::new());
/// let cfg = detector.config().with_target(FeatureType::Sphere);
/// let result = detector.detect_with(&cloud, 1, &cfg).unwrap();
/// assert_eq!(result, SurfaceResult::NotFound);
/// ```
pub struct Detector {
    backend: Box<dyn SurfaceDetector>,
    config: DetectorConfig,
    gate: Mutex<()>,
}

impl Detector {
    /// Create a detector with the default configuration.
    pub fn new(backend: impl SurfaceDetector + 'static) -> Self {
        Self::with_config(backend, DetectorConfig::default())
    }

    /// Create with full config control.
    pub fn with_config(backend: impl SurfaceDetector + 'static, config: DetectorConfig) -> Self {
        Self {
            backend: Box::new(backend),
            config,
            gate: Mutex::new(()),
        }
    }

    /// Access the default configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Mutable access to the default configuration.
    pub fn config_mut(&mut self) -> &mut DetectorConfig {
        &mut self.config
    }

    /// Detect with the default configuration.
    pub fn detect(
        &self,
        cloud: &PointCloud,
        seed_index: usize,
    ) -> Result<SurfaceResult, DetectError> {
        self.detect_with(cloud, seed_index, &self.config)
    }

    /// Detect with an explicit configuration, waiting for any outstanding
    /// call to finish first.
    pub fn detect_with(
        &self,
        cloud: &PointCloud,
        seed_index: usize,
        config: &DetectorConfig,
    ) -> Result<SurfaceResult, DetectError> {
        check_arguments(cloud, seed_index, config)?;
        let _guard = self.gate.lock();
        self.dispatch(cloud, seed_index, config)
    }

    /// Like [`detect_with`](Self::detect_with) but fails with
    /// [`DetectError::Busy`] instead of waiting.
    pub fn try_detect_with(
        &self,
        cloud: &PointCloud,
        seed_index: usize,
        config: &DetectorConfig,
    ) -> Result<SurfaceResult, DetectError> {
        check_arguments(cloud, seed_index, config)?;
        let Some(_guard) = self.gate.try_lock() else {
            tracing::warn!("detection requested while another call is in flight");
            return Err(DetectError::Busy);
        };
        self.dispatch(cloud, seed_index, config)
    }

    /// Whether a call currently holds the backend.
    pub fn is_busy(&self) -> bool {
        self.gate.is_locked()
    }

    fn dispatch(
        &self,
        cloud: &PointCloud,
        seed_index: usize,
        config: &DetectorConfig,
    ) -> Result<SurfaceResult, DetectError> {
        tracing::debug!(
            "detect feature={} seed={} points={} conversions={}",
            config.target_feature,
            seed_index,
            cloud.len(),
            config.conversions
        );
        self.backend.detect(cloud, seed_index, config)
    }
}

fn check_arguments(
    cloud: &PointCloud,
    seed_index: usize,
    config: &DetectorConfig,
) -> Result<(), DetectError> {
    config.validate()?;
    if cloud.is_empty() {
        return Err(DetectError::invalid_argument("point cloud is empty"));
    }
    if !cloud.contains_index(seed_index) {
        return Err(DetectError::invalid_argument(format!(
            "seed index {seed_index} out of range for {} points",
            cloud.len()
        )));
    }
    Ok(())
}
