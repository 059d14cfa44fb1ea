//! Replay backend returning canned responses.
//!
//! Responses are keyed by `(target feature, seed index)`. A response may
//! carry an alternative `smart` result, returned instead of the plain one
//! when the call enables the conversion rule leading from the requested
//! feature to the smart result's kind. Unknown keys get the fallback
//! response (`NotFound` unless configured).
//!
//! Responses JSON follows the `surfscan.responses.v1` schema:
//!
//! ```json
//! {
//!   "schema": "surfscan.responses.v1",
//!   "latency_ms": 5,
//!   "responses": [
//!     { "feature": "cone", "seed_index": 3437,
//!       "result": { "kind": "not_found" },
//!       "smart": { "kind": "cylinder", "shape": { "bottom": [0,0,0], "top": [0,0.3,0], "radius": 0.05 }, "rms_error": 0.001 } },
//!     { "feature": "torus", "seed_index": 12,
//!       "error": { "kind": "invalid_operation", "reason": "no normals" } }
//!   ]
//! }
//! ```

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::config::DetectorConfig;
use crate::detector::SurfaceDetector;
use crate::error::DetectError;
use crate::feature::{ConversionOptions, FeatureType};
use crate::point_cloud::PointCloud;
use crate::result::SurfaceResult;

const RESPONSES_SCHEMA_V1: &str = "surfscan.responses.v1";

/// Serializable mirror of [`DetectError`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedFailure {
    MemoryAllocation,
    InvalidArgument { reason: String },
    InvalidOperation { reason: String },
    Other { message: String },
}

impl From<&ScriptedFailure> for DetectError {
    fn from(f: &ScriptedFailure) -> Self {
        match f {
            ScriptedFailure::MemoryAllocation => DetectError::MemoryAllocation,
            ScriptedFailure::InvalidArgument { reason } => {
                DetectError::InvalidArgument(reason.clone())
            }
            ScriptedFailure::InvalidOperation { reason } => {
                DetectError::InvalidOperation(reason.clone())
            }
            ScriptedFailure::Other { message } => DetectError::Other(message.clone()),
        }
    }
}

/// Canned outcome for one `(feature, seed)` key.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedResponse {
    pub outcome: Result<SurfaceResult, DetectError>,
    /// Result returned instead of `outcome` when the matching conversion
    /// rule is enabled.
    pub smart: Option<SurfaceResult>,
}

impl ScriptedResponse {
    pub fn found(result: SurfaceResult) -> Self {
        Self {
            outcome: Ok(result),
            smart: None,
        }
    }

    pub fn fail(error: DetectError) -> Self {
        Self {
            outcome: Err(error),
            smart: None,
        }
    }

    pub fn with_smart(mut self, smart: SurfaceResult) -> Self {
        self.smart = Some(smart);
        self
    }

    /// Outcome under the given conversion set when searching for `feature`.
    pub fn resolve(
        &self,
        feature: FeatureType,
        conversions: &ConversionOptions,
    ) -> Result<SurfaceResult, DetectError> {
        if let (Ok(_), Some(smart)) = (&self.outcome, &self.smart) {
            if let Some(kind) = smart.feature_type() {
                if conversions.allows(feature, kind) {
                    return Ok(smart.clone());
                }
            }
        }
        self.outcome.clone()
    }
}

impl Default for ScriptedResponse {
    fn default() -> Self {
        Self::found(SurfaceResult::NotFound)
    }
}

/// One observed call, recorded for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectCall {
    pub feature: FeatureType,
    pub seed_index: usize,
    pub conversions: ConversionOptions,
}

/// Backend replaying canned responses.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    responses: BTreeMap<(FeatureType, usize), ScriptedResponse>,
    fallback: ScriptedResponse,
    latency: Duration,
    calls: Mutex<Vec<DetectCall>>,
}

impl ScriptedDetector {
    /// Empty script: every call returns `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the response for `(feature, seed_index)`.
    pub fn respond(
        mut self,
        feature: FeatureType,
        seed_index: usize,
        response: ScriptedResponse,
    ) -> Self {
        self.responses.insert((feature, seed_index), response);
        self
    }

    /// Response used for keys without an explicit entry.
    pub fn with_fallback(mut self, response: ScriptedResponse) -> Self {
        self.fallback = response;
        self
    }

    /// Sleep this long inside every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Scripted entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (FeatureType, usize, &ScriptedResponse)> + '_ {
        self.responses
            .iter()
            .map(|(&(feature, seed), response)| (feature, seed, response))
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Calls observed so far, in order.
    pub fn calls(&self) -> Vec<DetectCall> {
        self.calls.lock().clone()
    }

    /// Load a `surfscan.responses.v1` file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let doc: ResponsesDocV1 = serde_json::from_str(data)?;
        Self::from_doc(doc).map_err(Into::into)
    }

    fn from_doc(doc: ResponsesDocV1) -> Result<Self, String> {
        if doc.schema != RESPONSES_SCHEMA_V1 {
            return Err(format!(
                "unsupported responses schema '{}' (expected '{}')",
                doc.schema, RESPONSES_SCHEMA_V1
            ));
        }

        let mut detector = Self::new().with_latency(Duration::from_millis(doc.latency_ms));
        if let Some(fallback) = doc.fallback {
            detector = detector.with_fallback(fallback.into_response("fallback")?);
        }
        for (i, entry) in doc.responses.into_iter().enumerate() {
            let (key, body) = entry.into_parts();
            let response = body.into_response(&format!("responses[{i}]"))?;
            if detector.responses.insert(key, response).is_some() {
                return Err(format!(
                    "responses[{i}]: duplicate entry for {} at seed {}",
                    key.0, key.1
                ));
            }
        }
        Ok(detector)
    }
}

impl SurfaceDetector for ScriptedDetector {
    fn detect(
        &self,
        _cloud: &PointCloud,
        seed_index: usize,
        config: &DetectorConfig,
    ) -> Result<SurfaceResult, DetectError> {
        let feature = config.target_feature;
        self.calls.lock().push(DetectCall {
            feature,
            seed_index,
            conversions: config.conversions.clone(),
        });
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        self.responses
            .get(&(feature, seed_index))
            .unwrap_or(&self.fallback)
            .resolve(feature, &config.conversions)
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ResponsesDocV1 {
    schema: String,
    #[serde(default)]
    latency_ms: u64,
    #[serde(default)]
    fallback: Option<ResponseBody>,
    #[serde(default)]
    responses: Vec<ResponseEntry>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ResponseEntry {
    feature: FeatureType,
    seed_index: usize,
    #[serde(default)]
    result: Option<SurfaceResult>,
    #[serde(default)]
    error: Option<ScriptedFailure>,
    #[serde(default)]
    smart: Option<SurfaceResult>,
}

impl ResponseEntry {
    fn into_parts(self) -> ((FeatureType, usize), ResponseBody) {
        let body = ResponseBody {
            result: self.result,
            error: self.error,
            smart: self.smart,
        };
        ((self.feature, self.seed_index), body)
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ResponseBody {
    #[serde(default)]
    result: Option<SurfaceResult>,
    #[serde(default)]
    error: Option<ScriptedFailure>,
    #[serde(default)]
    smart: Option<SurfaceResult>,
}

impl ResponseBody {
    fn into_response(self, context: &str) -> Result<ScriptedResponse, String> {
        let outcome = match (self.result, self.error) {
            (Some(result), None) => Ok(result),
            (None, Some(error)) => Err(DetectError::from(&error)),
            (Some(_), Some(_)) => {
                return Err(format!("{context}: 'result' and 'error' are exclusive"))
            }
            (None, None) => return Err(format!("{context}: needs 'result' or 'error'")),
        };
        if outcome.is_err() && self.smart.is_some() {
            return Err(format!("{context}: 'smart' requires a 'result'"));
        }
        Ok(ScriptedResponse {
            outcome,
            smart: self.smart,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{cone_result, cylinder_result, line_cloud};

    fn cfg(feature: FeatureType, conversions: ConversionOptions) -> DetectorConfig {
        DetectorConfig::default()
            .with_target(feature)
            .with_conversions(conversions)
    }

    #[test]
    fn unknown_key_returns_fallback() {
        let det = ScriptedDetector::new();
        let cloud = line_cloud(4);
        let res = det.detect(&cloud, 2, &cfg(FeatureType::Plane, ConversionOptions::none()));
        assert_eq!(res, Ok(SurfaceResult::NotFound));

        let det = ScriptedDetector::new()
            .with_fallback(ScriptedResponse::fail(DetectError::MemoryAllocation));
        let res = det.detect(&cloud, 2, &cfg(FeatureType::Plane, ConversionOptions::none()));
        assert_eq!(res, Err(DetectError::MemoryAllocation));
    }

    #[test]
    fn smart_result_requires_matching_rule() {
        let det = ScriptedDetector::new().respond(
            FeatureType::Cone,
            1,
            ScriptedResponse::found(cone_result(0.05, 0.051, 0.3, 0.001))
                .with_smart(cylinder_result(0.05, 0.3, 0.001)),
        );
        let cloud = line_cloud(4);

        let plain = det
            .detect(&cloud, 1, &cfg(FeatureType::Cone, ConversionOptions::none()))
            .unwrap();
        assert_eq!(plain.feature_type(), Some(FeatureType::Cone));

        let smart = det
            .detect(&cloud, 1, &cfg(FeatureType::Cone, ConversionOptions::smart()))
            .unwrap();
        assert_eq!(smart.feature_type(), Some(FeatureType::Cylinder));

        let mut only_torus = ConversionOptions::none();
        only_torus.insert(crate::feature::Conversion::TorusToSphere);
        let other_rule = det
            .detect(&cloud, 1, &cfg(FeatureType::Cone, only_torus))
            .unwrap();
        assert_eq!(other_rule.feature_type(), Some(FeatureType::Cone));
    }

    #[test]
    fn records_calls_in_order() {
        let det = ScriptedDetector::new();
        let cloud = line_cloud(4);
        det.detect(&cloud, 0, &cfg(FeatureType::Sphere, ConversionOptions::none()))
            .unwrap();
        det.detect(&cloud, 3, &cfg(FeatureType::Torus, ConversionOptions::smart()))
            .unwrap();
        let calls = det.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].feature, FeatureType::Sphere);
        assert!(calls[0].conversions.is_empty());
        assert_eq!(calls[1].seed_index, 3);
        assert_eq!(calls[1].conversions, ConversionOptions::smart());
    }

    #[test]
    fn loads_json_responses() {
        let raw = r#"{
            "schema": "surfscan.responses.v1",
            "responses": [
                { "feature": "sphere", "seed_index": 7811,
                  "result": { "kind": "sphere", "shape": { "center": [0, 0, 0], "radius": 0.2 }, "rms_error": 0.002 } },
                { "feature": "torus", "seed_index": 7811,
                  "result": { "kind": "not_found" },
                  "smart": { "kind": "sphere", "shape": { "center": [0, 0, 0], "radius": 0.2 }, "rms_error": 0.002 } },
                { "feature": "cone", "seed_index": 5,
                  "error": { "kind": "invalid_argument", "reason": "seed radius too small" } }
            ]
        }"#;
        let det = ScriptedDetector::from_json_str(raw).unwrap();
        assert_eq!(det.len(), 3);
        let keys: Vec<_> = det.entries().map(|(f, s, _)| (f, s)).collect();
        assert_eq!(
            keys,
            [
                (FeatureType::Sphere, 7811),
                (FeatureType::Cone, 5),
                (FeatureType::Torus, 7811)
            ]
        );

        let cloud = line_cloud(8);
        let err = det
            .detect(&cloud, 5, &cfg(FeatureType::Cone, ConversionOptions::none()))
            .unwrap_err();
        assert_eq!(
            err,
            DetectError::InvalidArgument("seed radius too small".to_string())
        );

        let smart = det
            .detect(&cloud, 7811, &cfg(FeatureType::Torus, ConversionOptions::smart()))
            .unwrap();
        match smart {
            SurfaceResult::Sphere(found) => assert_eq!(found.shape.radius, 0.2),
            other => panic!("expected converted sphere, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_schema_and_ambiguous_entries() {
        let err = ScriptedDetector::from_json_str(r#"{"schema":"surfscan.responses.v0"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported responses schema"));

        let both = r#"{"schema":"surfscan.responses.v1","responses":[
            {"feature":"plane","seed_index":0,"result":{"kind":"not_found"},
             "error":{"kind":"memory_allocation"}}]}"#;
        let err = ScriptedDetector::from_json_str(both).unwrap_err();
        assert!(err.to_string().contains("exclusive"));

        let dup = r#"{"schema":"surfscan.responses.v1","responses":[
            {"feature":"plane","seed_index":0,"result":{"kind":"not_found"}},
            {"feature":"plane","seed_index":0,"result":{"kind":"not_found"}}]}"#;
        let err = ScriptedDetector::from_json_str(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate entry for plane at seed 0"));
    }

    #[test]
    fn rejects_misspelled_entry_fields() {
        let typo = r#"{"schema":"surfscan.responses.v1","responses":[
            {"feature":"torus","seed_index":3,"result":{"kind":"not_found"},
             "smrt":{"kind":"not_found"}}]}"#;
        let err = ScriptedDetector::from_json_str(typo).unwrap_err();
        assert!(err.to_string().contains("smrt"));

        let fallback_typo = r#"{"schema":"surfscan.responses.v1",
            "fallback":{"reslt":{"kind":"not_found"}}}"#;
        assert!(ScriptedDetector::from_json_str(fallback_typo).is_err());
    }
}
