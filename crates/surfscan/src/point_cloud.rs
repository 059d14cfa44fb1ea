//! Immutable point cloud input.
//!
//! Clouds are loaded once per session and shared read-only by every
//! detection call. Supported on-disk formats:
//! - `.xyz` / `.txt` / `.csv`: one point per line, whitespace or comma
//!   separated, at least three numeric columns (extra columns ignored),
//!   `#` comments and blank lines skipped.
//! - `.json`: an array of `[x, y, z]` triples.

use nalgebra::Point3;
use std::path::Path;

use crate::error::PointCloudError;

/// Ordered, fixed-length sequence of 3D points (metres).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PointCloud {
    points: Vec<Point3<f32>>,
}

impl PointCloud {
    /// Wrap points, rejecting non-finite coordinates.
    pub fn new(points: Vec<Point3<f32>>) -> Result<Self, PointCloudError> {
        if let Some(index) = points
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(PointCloudError::NonFinite { index });
        }
        Ok(Self { points })
    }

    /// Build from an interleaved `[x0, y0, z0, x1, ...]` buffer.
    pub fn from_flat(coords: &[f32]) -> Result<Self, PointCloudError> {
        if coords.len() % 3 != 0 {
            return Err(PointCloudError::RaggedBuffer(coords.len()));
        }
        let points = coords
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        Self::new(points)
    }

    /// Load a cloud from disk, choosing the parser by file extension.
    pub fn from_file(path: &Path) -> Result<Self, PointCloudError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let parse: fn(&str) -> Result<Self, PointCloudError> = match ext.as_str() {
            "xyz" | "txt" | "csv" => Self::parse_xyz,
            "json" => Self::parse_json,
            _ => return Err(PointCloudError::UnsupportedFormat(ext)),
        };
        let data = std::fs::read_to_string(path)?;
        let cloud = parse(&data)?;
        tracing::debug!("loaded {} points from {}", cloud.len(), path.display());
        Ok(cloud)
    }

    /// Parse the text `.xyz` format.
    pub fn parse_xyz(data: &str) -> Result<Self, PointCloudError> {
        let mut points = Vec::new();
        for (idx, raw) in data.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut coords = [0.0f32; 3];
            let mut fields = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty());
            for (axis, slot) in coords.iter_mut().enumerate() {
                let field = fields.next().ok_or_else(|| PointCloudError::Parse {
                    line: idx + 1,
                    reason: format!("expected 3 coordinates, found {axis}"),
                })?;
                *slot = field.parse().map_err(|e| PointCloudError::Parse {
                    line: idx + 1,
                    reason: format!("bad coordinate '{field}': {e}"),
                })?;
            }
            points.push(Point3::from(coords));
        }
        Self::new(points)
    }

    /// Parse a JSON array of `[x, y, z]` triples.
    pub fn parse_json(data: &str) -> Result<Self, PointCloudError> {
        let raw: Vec<[f32; 3]> = serde_json::from_str(data)?;
        Self::new(raw.into_iter().map(Point3::from).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point3<f32>> {
        self.points.get(index)
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.points.len()
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    /// Interleaved `[x0, y0, z0, ...]` copy of the coordinates.
    pub fn to_flat(&self) -> Vec<f32> {
        self.points
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn from_flat_groups_triples() {
        let cloud = PointCloud::from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.get(1), Some(&Point3::new(3.0, 4.0, 5.0)));
        assert!(cloud.contains_index(1));
        assert!(!cloud.contains_index(2));
    }

    #[test]
    fn from_flat_rejects_ragged_buffer() {
        let err = PointCloud::from_flat(&[0.0, 1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, PointCloudError::RaggedBuffer(4)));
    }

    #[test]
    fn rejects_non_finite_points() {
        let err = PointCloud::from_flat(&[0.0, 0.0, 0.0, f32::NAN, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, PointCloudError::NonFinite { index: 1 }));
    }

    #[test]
    fn parse_xyz_skips_comments_and_extra_columns() {
        let data = "# header\n\n0.1 0.2 0.3\n1,2,3,255,0,0\n  4\t5\t6 # trailing\n";
        let cloud = PointCloud::parse_xyz(data).unwrap();
        assert_eq!(cloud.len(), 3);
        let p = cloud.get(0).unwrap();
        assert_abs_diff_eq!(p.y, 0.2, epsilon = 1e-6);
        assert_eq!(cloud.get(2), Some(&Point3::new(4.0, 5.0, 6.0)));
    }

    #[test]
    fn parse_xyz_reports_line_of_bad_row() {
        let err = PointCloud::parse_xyz("0 0 0\n1 2\n").unwrap_err();
        match err {
            PointCloudError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        let err = PointCloud::parse_xyz("0 zero 0\n").unwrap_err();
        assert!(err.to_string().contains("bad coordinate 'zero'"));
    }

    #[test]
    fn parse_json_reads_triples() {
        let cloud = PointCloud::parse_json("[[0,0,0],[1.5,2,3]]").unwrap();
        assert_eq!(cloud.to_flat(), vec![0.0, 0.0, 0.0, 1.5, 2.0, 3.0]);
    }

    #[test]
    fn from_file_rejects_unknown_extension() {
        let dir = std::env::temp_dir().join("surfscan-pc-ext-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cloud.ply");
        std::fs::write(&path, "ply\n").unwrap();
        let err = PointCloud::from_file(&path).unwrap_err();
        assert!(matches!(err, PointCloudError::UnsupportedFormat(ref e) if e == "ply"));
    }

    #[test]
    fn from_file_checks_extension_before_reading() {
        let path = std::env::temp_dir().join("surfscan-missing-cloud.ply");
        let _ = std::fs::remove_file(&path);
        let err = PointCloud::from_file(&path).unwrap_err();
        assert!(matches!(err, PointCloudError::UnsupportedFormat(ref e) if e == "ply"));

        let missing_xyz = std::env::temp_dir().join("surfscan-missing-cloud.xyz");
        let _ = std::fs::remove_file(&missing_xyz);
        assert!(matches!(
            PointCloud::from_file(&missing_xyz),
            Err(PointCloudError::Io(_))
        ));
    }
}
