//! Shared fixtures for unit tests: synthetic clouds and one result per
//! shape variant.

use nalgebra::{Point3, Vector3};
use rand::prelude::*;

use crate::point_cloud::PointCloud;
use crate::result::{Found, SurfaceResult};
use crate::shapes::{Cone, Cylinder, Plane, Sphere, Torus};

/// `n` points spaced 1 cm apart along +x.
pub(crate) fn line_cloud(n: usize) -> PointCloud {
    let points = (0..n).map(|i| Point3::new(i as f32 * 0.01, 0.0, 0.0)).collect();
    PointCloud::new(points).expect("finite points")
}

/// Jittered planar patch with `n` points; large enough for the demo seeds
/// when `n > 7811`.
pub(crate) fn noisy_patch_cloud(n: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let points = (0..n)
        .map(|_| {
            Point3::new(
                rng.gen_range(-1.0f32..1.0),
                rng.gen_range(-0.005f32..0.005),
                rng.gen_range(-1.0f32..1.0),
            )
        })
        .collect();
    PointCloud::new(points).expect("finite points")
}

pub(crate) fn plane_result(width: f32, height: f32, rms: f32) -> SurfaceResult {
    Found::new(
        Plane {
            lower_left: Point3::new(0.0, 0.0, 0.0),
            lower_right: Point3::new(width, 0.0, 0.0),
            upper_right: Point3::new(width, height, 0.0),
            upper_left: Point3::new(0.0, height, 0.0),
        },
        rms,
    )
    .into()
}

pub(crate) fn sphere_result(radius: f32, rms: f32) -> SurfaceResult {
    Found::new(
        Sphere {
            center: Point3::new(0.0, 0.5, 0.0),
            radius,
        },
        rms,
    )
    .into()
}

pub(crate) fn cylinder_result(radius: f32, height: f32, rms: f32) -> SurfaceResult {
    Found::new(
        Cylinder {
            bottom: Point3::origin(),
            top: Point3::new(0.0, height, 0.0),
            radius,
        },
        rms,
    )
    .into()
}

pub(crate) fn cone_result(top_radius: f32, bottom_radius: f32, height: f32, rms: f32) -> SurfaceResult {
    Found::new(
        Cone {
            bottom: Point3::origin(),
            top: Point3::new(0.0, height, 0.0),
            bottom_radius,
            top_radius,
        },
        rms,
    )
    .into()
}

pub(crate) fn torus_result(mean_radius: f32, tube_radius: f32, rms: f32) -> SurfaceResult {
    Found::new(
        Torus {
            center: Point3::origin(),
            axis: Vector3::y(),
            mean_radius,
            tube_radius,
        },
        rms,
    )
    .into()
}
