//! Fitted primitive parameters.
//!
//! Shapes carry positions in metres. `Display` prints the detailed
//! multi-line block (without the RMS header, which lives on the result).

use nalgebra::{Point3, Vector3};
use std::fmt;

/// Bounded planar patch given by its four corners.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Plane {
    pub lower_left: Point3<f32>,
    pub lower_right: Point3<f32>,
    pub upper_right: Point3<f32>,
    pub upper_left: Point3<f32>,
}

impl Plane {
    /// Length of the lower edge.
    pub fn width(&self) -> f32 {
        (self.lower_right - self.lower_left).norm()
    }

    /// Length of the left edge.
    pub fn height(&self) -> f32 {
        (self.upper_left - self.lower_left).norm()
    }

    pub fn center(&self) -> Point3<f32> {
        let sum = self.lower_left.coords
            + self.lower_right.coords
            + self.upper_right.coords
            + self.upper_left.coords;
        Point3::from(sum * 0.25)
    }

    /// Unit normal following the right-hand rule over LL→LR→UL.
    pub fn normal(&self) -> Option<Vector3<f32>> {
        (self.lower_right - self.lower_left)
            .cross(&(self.upper_left - self.lower_left))
            .try_normalize(f32::EPSILON)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

/// Finite cylinder between two cap centers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cylinder {
    pub bottom: Point3<f32>,
    pub top: Point3<f32>,
    pub radius: f32,
}

impl Cylinder {
    pub fn height(&self) -> f32 {
        (self.top - self.bottom).norm()
    }

    /// Unit axis from bottom to top, `None` for a degenerate cylinder.
    pub fn axis(&self) -> Option<Vector3<f32>> {
        (self.top - self.bottom).try_normalize(f32::EPSILON)
    }
}

/// Truncated cone between two cap centers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cone {
    pub bottom: Point3<f32>,
    pub top: Point3<f32>,
    pub bottom_radius: f32,
    pub top_radius: f32,
}

impl Cone {
    pub fn height(&self) -> f32 {
        (self.top - self.bottom).norm()
    }

    pub fn axis(&self) -> Option<Vector3<f32>> {
        (self.top - self.bottom).try_normalize(f32::EPSILON)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Torus {
    pub center: Point3<f32>,
    /// Axis of revolution.
    pub axis: Vector3<f32>,
    /// Distance from the center to the tube center line.
    pub mean_radius: f32,
    pub tube_radius: f32,
}

pub(crate) struct Vec3Fmt<'a>(pub &'a [f32]);

impl fmt::Display for Vec3Fmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}, {:.6}]", self.0[0], self.0[1], self.0[2])
    }
}

fn p(point: &Point3<f32>) -> Vec3Fmt<'_> {
    Vec3Fmt(point.coords.as_slice())
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    Lower Left: {}", p(&self.lower_left))?;
        writeln!(f, "    Lower Right: {}", p(&self.lower_right))?;
        writeln!(f, "    Upper Right: {}", p(&self.upper_right))?;
        write!(f, "    Upper Left: {}", p(&self.upper_left))
    }
}

impl fmt::Display for Sphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    Center: {}", p(&self.center))?;
        write!(f, "    Radius: {:.6}", self.radius)
    }
}

impl fmt::Display for Cylinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    Bottom Center: {}", p(&self.bottom))?;
        writeln!(f, "    Top Center: {}", p(&self.top))?;
        write!(f, "    Radius: {:.6}", self.radius)
    }
}

impl fmt::Display for Cone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    Bottom Center: {}", p(&self.bottom))?;
        writeln!(f, "    Top Center: {}", p(&self.top))?;
        writeln!(f, "    Bottom Radius: {:.6}", self.bottom_radius)?;
        write!(f, "    Top Radius: {:.6}", self.top_radius)
    }
}

impl fmt::Display for Torus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    Center: {}", p(&self.center))?;
        writeln!(f, "    Axis: {}", Vec3Fmt(self.axis.as_slice()))?;
        writeln!(f, "    Mean Radius: {:.6}", self.mean_radius)?;
        write!(f, "    Tube Radius: {:.6}", self.tube_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_plane() -> Plane {
        Plane {
            lower_left: Point3::new(0.0, 0.0, 0.0),
            lower_right: Point3::new(0.4, 0.0, 0.0),
            upper_right: Point3::new(0.4, 0.3, 0.0),
            upper_left: Point3::new(0.0, 0.3, 0.0),
        }
    }

    #[test]
    fn plane_extent_and_normal() {
        let plane = unit_plane();
        assert_abs_diff_eq!(plane.width(), 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(plane.height(), 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(plane.center().x, 0.2, epsilon = 1e-6);
        let n = plane.normal().expect("normal");
        assert_abs_diff_eq!(n.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn cylinder_and_cone_heights() {
        let cyl = Cylinder {
            bottom: Point3::new(0.0, 0.0, 0.0),
            top: Point3::new(0.0, 0.0, 0.5),
            radius: 0.1,
        };
        assert_abs_diff_eq!(cyl.height(), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(cyl.axis().unwrap().z, 1.0, epsilon = 1e-6);

        let cone = Cone {
            bottom: Point3::new(1.0, 0.0, 0.0),
            top: Point3::new(1.0, 0.3, 0.4),
            bottom_radius: 0.2,
            top_radius: 0.1,
        };
        assert_abs_diff_eq!(cone.height(), 0.5, epsilon = 1e-6);

        let flat = Cylinder { top: cyl.bottom, ..cyl };
        assert!(flat.axis().is_none());
    }

    #[test]
    fn detailed_display_lists_fields() {
        let text = unit_plane().to_string();
        assert!(text.contains("Lower Left: [0.000000, 0.000000, 0.000000]"));
        assert!(text.contains("Upper Left: [0.000000, 0.300000, 0.000000]"));

        let torus = Torus {
            center: Point3::origin(),
            axis: Vector3::y(),
            mean_radius: 0.3,
            tube_radius: 0.05,
        };
        let text = torus.to_string();
        assert!(text.contains("Axis: [0.000000, 1.000000, 0.000000]"));
        assert!(text.contains("Tube Radius: 0.050000"));
    }
}
