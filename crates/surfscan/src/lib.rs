//! surfscan — seeded surface detection driver for 3D point clouds.
//!
//! A detection call asks a backend to grow one geometric primitive (plane,
//! sphere, cylinder, cone or torus) around a seed point of a cloud. The
//! crate provides the layers around that call:
//!
//! 1. **Config** – target feature, search levels and smart conversions.
//! 2. **Detector** – argument checks and the one-call-in-flight gate in
//!    front of any [`SurfaceDetector`] backend.
//! 3. **Scripted** – a replay backend driven by a JSON response table.
//! 4. **Runner** – sequential execution of preset batches with timing.
//! 5. **Format** – one-line labels and detailed descriptions of results.
//!
//! # Public API
//! - [`Detector`] and [`DetectorConfig`] as primary entry points
//! - [`PointCloud`] and the result structures in [`shapes`]
//! - [`PresetRunner`] with [`PresetPlan`] for batch runs
//!
//! The surface fitting itself lives behind [`SurfaceDetector`].

mod config;
mod detector;
mod error;
mod feature;
mod format;
mod point_cloud;
mod preset;
mod result;
mod runner;
mod scripted;
pub mod shapes;

#[cfg(test)]
mod test_utils;

pub use config::{DetectorConfig, SearchLevel};
pub use detector::{Detector, SurfaceDetector};
pub use error::{DetectError, PointCloudError, RunError};
pub use feature::{Conversion, ConversionOptions, FeatureType};
pub use format::{
    cm, describe_result, describe_trial, format_error, format_outcome, format_result, Icon,
    ResultLabel,
};
pub use point_cloud::PointCloud;
pub use preset::{
    BatchKind, Preset, PresetBatch, PresetPlan, DEMO_CONE_SEED, DEMO_CYLINDER_SEED,
    DEMO_SPHERE_SEED, DEMO_TORUS_SEED,
};
pub use result::{Found, SurfaceResult};
pub use runner::{BatchReport, PresetRunner, RunReport, SummaryRecord};
pub use scripted::{DetectCall, ScriptedDetector, ScriptedFailure, ScriptedResponse};
