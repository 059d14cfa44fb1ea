//! Human-readable summaries of detection outcomes.
//!
//! [`format_result`] and [`format_error`] produce the one-line labels shown
//! per preset; distances are converted from metres to centimetres with two
//! decimals. [`describe_result`] and [`describe_trial`] produce the detailed
//! multi-line blocks used by verbose reports.

use std::fmt;

use crate::error::DetectError;
use crate::result::SurfaceResult;
use crate::runner::SummaryRecord;

/// Icon shown next to a label (SF-symbol style names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Square,
    Basketball,
    Cylinder,
    Cone,
    Torus,
    XMark,
    Warning,
}

impl Icon {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Basketball => "basketball",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Torus => "torus",
            Self::XMark => "xmark",
            Self::Warning => "exclamationmark.triangle",
        }
    }
}

/// Display-ready summary: text plus icon.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResultLabel {
    pub text: String,
    pub icon: Icon,
}

impl ResultLabel {
    pub fn new(text: impl Into<String>, icon: Icon) -> Self {
        Self {
            text: text.into(),
            icon,
        }
    }
}

impl fmt::Display for ResultLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.icon.symbol(), self.text)
    }
}

/// Metres as centimetres with two decimals, e.g. `12.34 cm`.
pub fn cm(metres: f32) -> String {
    format!("{:.2} cm", metres * 100.0)
}

/// Label for a detection result that took `elapsed_ms`.
pub fn format_result(result: &SurfaceResult, elapsed_ms: f64) -> ResultLabel {
    let dt = format!("{elapsed_ms:.2} ms");
    match result {
        SurfaceResult::Plane(r) => ResultLabel::new(
            format!(
                "Plane(w: {}, h: {}, rms: {}, {dt})",
                cm(r.shape.width()),
                cm(r.shape.height()),
                cm(r.rms_error)
            ),
            Icon::Square,
        ),
        SurfaceResult::Sphere(r) => ResultLabel::new(
            format!(
                "Sphere(r: {}, rms: {}, {dt})",
                cm(r.shape.radius),
                cm(r.rms_error)
            ),
            Icon::Basketball,
        ),
        SurfaceResult::Cylinder(r) => ResultLabel::new(
            format!(
                "Cylinder(r: {}, h: {}, rms: {}, {dt})",
                cm(r.shape.radius),
                cm(r.shape.height()),
                cm(r.rms_error)
            ),
            Icon::Cylinder,
        ),
        SurfaceResult::Cone(r) => ResultLabel::new(
            format!(
                "Cone(tr: {}, br: {}, h: {}, rms: {}, {dt})",
                cm(r.shape.top_radius),
                cm(r.shape.bottom_radius),
                cm(r.shape.height()),
                cm(r.rms_error)
            ),
            Icon::Cone,
        ),
        SurfaceResult::Torus(r) => ResultLabel::new(
            format!(
                "Torus(r1: {}, r2: {}, rms: {}, {dt})",
                cm(r.shape.mean_radius),
                cm(r.shape.tube_radius),
                cm(r.rms_error)
            ),
            Icon::Torus,
        ),
        SurfaceResult::NotFound => ResultLabel::new("None", Icon::XMark),
    }
}

/// Label for a failed detection call.
pub fn format_error(error: &DetectError) -> ResultLabel {
    let text = match error {
        DetectError::MemoryAllocation => "memory allocation failed".to_string(),
        DetectError::InvalidArgument(reason) => format!("invalid argument: {reason}"),
        DetectError::InvalidOperation(reason) => format!("invalid operation: {reason}"),
        DetectError::Busy => "detector busy".to_string(),
        DetectError::Other(_) => "unknown error".to_string(),
    };
    ResultLabel::new(text, Icon::Warning)
}

/// Label for either outcome of a call.
pub fn format_outcome(outcome: &Result<SurfaceResult, DetectError>, elapsed_ms: f64) -> ResultLabel {
    match outcome {
        Ok(result) => format_result(result, elapsed_ms),
        Err(err) => format_error(err),
    }
}

/// Detailed block: `Found a sphere as a result:` followed by the shape.
pub fn describe_result(result: &SurfaceResult) -> String {
    match result.feature_type() {
        Some(kind) => format!("Found a {kind} as a result:\n{result}"),
        None => result.to_string(),
    }
}

/// Trial-numbered block for one summary record.
pub fn describe_trial(record: &SummaryRecord) -> String {
    let header = format!(
        "{}. searched for a {}\naround the point of which index is {}.",
        record.trial, record.preset.feature, record.preset.seed_index
    );
    let body = match (&record.result, &record.error) {
        (Some(result), _) => describe_result(result),
        (None, Some(err)) => format!("Couldn't run detection due to the following error:\n{err}"),
        (None, None) => "Not found.".to_string(),
    };
    format!("{header}\n{body}")
}
