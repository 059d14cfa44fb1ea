//! Preset plans: which feature to search for at which seed point.
//!
//! Plan JSON follows the `surfscan.presets.v1` schema:
//!
//! ```json
//! {
//!   "schema": "surfscan.presets.v1",
//!   "batches": [
//!     { "kind": "normal", "presets": [ { "feature": "sphere", "seed_index": 7811 } ] },
//!     { "kind": "smart",  "presets": [ { "feature": "torus",  "seed_index": 7811 } ] }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::Path;

use crate::feature::{ConversionOptions, FeatureType};

const PRESETS_SCHEMA_V1: &str = "surfscan.presets.v1";

/// Seed index of the sphere in the demo cloud.
pub const DEMO_SPHERE_SEED: usize = 7811;
/// Seed index of the cylinder in the demo cloud.
pub const DEMO_CYLINDER_SEED: usize = 3437;
/// Seed index of the cone in the demo cloud.
pub const DEMO_CONE_SEED: usize = 6637;
/// Seed index of the torus in the demo cloud.
pub const DEMO_TORUS_SEED: usize = 7384;

/// Target feature plus the seed point where the search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    pub feature: FeatureType,
    pub seed_index: usize,
}

impl Preset {
    pub const fn new(feature: FeatureType, seed_index: usize) -> Self {
        Self {
            feature,
            seed_index,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.feature, self.seed_index)
    }
}

/// Conversion policy applied to a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    /// No smart conversions.
    Normal,
    /// Cone→cylinder, torus→cylinder and torus→sphere enabled.
    Smart,
}

impl BatchKind {
    pub fn conversions(self) -> ConversionOptions {
        match self {
            Self::Normal => ConversionOptions::none(),
            Self::Smart => ConversionOptions::smart(),
        }
    }

    /// Section heading used in text reports.
    pub fn title(self) -> &'static str {
        match self {
            Self::Normal => "Normal Presets",
            Self::Smart => "Smart Conversion Presets",
        }
    }
}

/// Ordered presets sharing one conversion policy.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetBatch {
    pub kind: BatchKind,
    pub presets: Vec<Preset>,
}

impl PresetBatch {
    pub fn new(kind: BatchKind, presets: Vec<Preset>) -> Self {
        Self { kind, presets }
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Ordered list of batches run one after another.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetPlan {
    pub batches: Vec<PresetBatch>,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PresetPlanDocV1 {
    schema: String,
    batches: Vec<PresetBatch>,
}

impl PresetPlan {
    /// The demo plan: each primitive at its seed, then the smart-conversion
    /// cases.
    pub fn demo() -> Self {
        use FeatureType::*;
        Self {
            batches: vec![
                PresetBatch::new(
                    BatchKind::Normal,
                    vec![
                        Preset::new(Sphere, DEMO_SPHERE_SEED),
                        Preset::new(Cylinder, DEMO_CYLINDER_SEED),
                        Preset::new(Cone, DEMO_CONE_SEED),
                        Preset::new(Torus, DEMO_TORUS_SEED),
                    ],
                ),
                PresetBatch::new(
                    BatchKind::Smart,
                    vec![
                        Preset::new(Cone, DEMO_CYLINDER_SEED),
                        Preset::new(Torus, DEMO_SPHERE_SEED),
                        Preset::new(Torus, DEMO_CYLINDER_SEED),
                    ],
                ),
            ],
        }
    }

    /// Total number of presets across batches.
    pub fn preset_count(&self) -> usize {
        self.batches.iter().map(PresetBatch::len).sum()
    }

    /// Largest seed index referenced by the plan.
    pub fn max_seed_index(&self) -> Option<usize> {
        self.batches
            .iter()
            .flat_map(|b| b.presets.iter())
            .map(|p| p.seed_index)
            .max()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let doc: PresetPlanDocV1 = serde_json::from_str(data)?;
        Self::from_doc(doc).map_err(Into::into)
    }

    /// Serialize as a `surfscan.presets.v1` document.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&PresetPlanDocV1 {
            schema: PRESETS_SCHEMA_V1.to_string(),
            batches: self.batches.clone(),
        })
    }

    fn from_doc(doc: PresetPlanDocV1) -> Result<Self, String> {
        if doc.schema != PRESETS_SCHEMA_V1 {
            return Err(format!(
                "unsupported presets schema '{}' (expected '{}')",
                doc.schema, PRESETS_SCHEMA_V1
            ));
        }
        if doc.batches.is_empty() {
            return Err("preset plan has no batches".to_string());
        }
        if let Some(i) = doc.batches.iter().position(PresetBatch::is_empty) {
            return Err(format!("batches[{i}] has no presets"));
        }
        Ok(Self {
            batches: doc.batches,
        })
    }
}

impl Default for PresetPlan {
    fn default() -> Self {
        Self::demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_plan_lists() {
        let plan = PresetPlan::demo();
        assert_eq!(plan.batches.len(), 2);
        assert_eq!(plan.batches[0].kind, BatchKind::Normal);
        assert_eq!(plan.batches[0].len(), 4);
        assert_eq!(plan.batches[1].kind, BatchKind::Smart);
        assert_eq!(
            plan.batches[1].presets,
            [
                Preset::new(FeatureType::Cone, 3437),
                Preset::new(FeatureType::Torus, 7811),
                Preset::new(FeatureType::Torus, 3437),
            ]
        );
        assert_eq!(plan.preset_count(), 7);
        assert_eq!(plan.max_seed_index(), Some(7811));
    }

    #[test]
    fn batch_kind_conversions() {
        assert!(BatchKind::Normal.conversions().is_empty());
        assert_eq!(BatchKind::Smart.conversions(), ConversionOptions::smart());
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let plan = PresetPlan::demo();
        let json = plan.to_json_pretty().unwrap();
        assert!(json.contains("surfscan.presets.v1"));
        let back = PresetPlan::from_json_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn rejects_invalid_plans() {
        let err = PresetPlan::from_json_str(r#"{"schema":"x","batches":[]}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported presets schema"));

        let err = PresetPlan::from_json_str(r#"{"schema":"surfscan.presets.v1","batches":[]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("no batches"));

        let raw = r#"{"schema":"surfscan.presets.v1","batches":[
            {"kind":"normal","presets":[{"feature":"plane","seed_index":1}]},
            {"kind":"smart","presets":[]}]}"#;
        let err = PresetPlan::from_json_str(raw).unwrap_err();
        assert!(err.to_string().contains("batches[1] has no presets"));

        let unknown = r#"{"schema":"surfscan.presets.v1","batches":[
            {"kind":"normal","presets":[{"feature":"plane","seed_index":1,"radius":2}]}]}"#;
        assert!(PresetPlan::from_json_str(unknown).is_err());
    }
}
