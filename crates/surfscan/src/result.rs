//! Outcome of a single detection call.

use std::fmt;

use crate::feature::FeatureType;
use crate::shapes::{Cone, Cylinder, Plane, Sphere, Torus};

/// A fitted shape together with its fit quality.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Found<S> {
    pub shape: S,
    /// RMS distance (metres) between the inliers and the fitted surface.
    pub rms_error: f32,
    /// Per-point inlier flags over the input cloud. May be empty when the
    /// backend does not report them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inliers: Vec<bool>,
}

impl<S> Found<S> {
    pub fn new(shape: S, rms_error: f32) -> Self {
        Self {
            shape,
            rms_error,
            inliers: Vec::new(),
        }
    }

    pub fn with_inliers(mut self, inliers: Vec<bool>) -> Self {
        self.inliers = inliers;
        self
    }
}

/// Tagged result of a detection call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceResult {
    Plane(Found<Plane>),
    Sphere(Found<Sphere>),
    Cylinder(Found<Cylinder>),
    Cone(Found<Cone>),
    Torus(Found<Torus>),
    /// No surface of the requested kind around the seed.
    NotFound,
}

impl SurfaceResult {
    /// Feature type of the fitted shape; `None` when nothing was found.
    pub fn feature_type(&self) -> Option<FeatureType> {
        match self {
            Self::Plane(_) => Some(FeatureType::Plane),
            Self::Sphere(_) => Some(FeatureType::Sphere),
            Self::Cylinder(_) => Some(FeatureType::Cylinder),
            Self::Cone(_) => Some(FeatureType::Cone),
            Self::Torus(_) => Some(FeatureType::Torus),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    pub fn rms_error(&self) -> Option<f32> {
        match self {
            Self::Plane(f) => Some(f.rms_error),
            Self::Sphere(f) => Some(f.rms_error),
            Self::Cylinder(f) => Some(f.rms_error),
            Self::Cone(f) => Some(f.rms_error),
            Self::Torus(f) => Some(f.rms_error),
            Self::NotFound => None,
        }
    }

    fn inliers(&self) -> &[bool] {
        match self {
            Self::Plane(f) => &f.inliers,
            Self::Sphere(f) => &f.inliers,
            Self::Cylinder(f) => &f.inliers,
            Self::Cone(f) => &f.inliers,
            Self::Torus(f) => &f.inliers,
            Self::NotFound => &[],
        }
    }

    /// Number of points flagged as inliers.
    pub fn inlier_count(&self) -> usize {
        self.inliers().iter().filter(|&&b| b).count()
    }
}

impl From<Found<Plane>> for SurfaceResult {
    fn from(f: Found<Plane>) -> Self {
        Self::Plane(f)
    }
}

impl From<Found<Sphere>> for SurfaceResult {
    fn from(f: Found<Sphere>) -> Self {
        Self::Sphere(f)
    }
}

impl From<Found<Cylinder>> for SurfaceResult {
    fn from(f: Found<Cylinder>) -> Self {
        Self::Cylinder(f)
    }
}

impl From<Found<Cone>> for SurfaceResult {
    fn from(f: Found<Cone>) -> Self {
        Self::Cone(f)
    }
}

impl From<Found<Torus>> for SurfaceResult {
    fn from(f: Found<Torus>) -> Self {
        Self::Torus(f)
    }
}

/// Detailed multi-line block: `Plane (rms error: ...)` followed by the
/// shape fields.
impl fmt::Display for SurfaceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plane(r) => write!(f, "Plane (rms error: {:.6})\n{}", r.rms_error, r.shape),
            Self::Sphere(r) => write!(f, "Sphere (rms error: {:.6})\n{}", r.rms_error, r.shape),
            Self::Cylinder(r) => {
                write!(f, "Cylinder (rms error: {:.6})\n{}", r.rms_error, r.shape)
            }
            Self::Cone(r) => write!(f, "Cone (rms error: {:.6})\n{}", r.rms_error, r.shape),
            Self::Torus(r) => write!(f, "Torus (rms error: {:.6})\n{}", r.rms_error, r.shape),
            Self::NotFound => f.write_str("Not found."),
        }
    }
}
