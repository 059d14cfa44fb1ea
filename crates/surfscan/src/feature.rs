//! Feature types and smart-conversion rules.

use std::collections::BTreeSet;
use std::fmt;

/// Geometric primitive a detection call searches for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    /// Let the detector pick the best-fitting primitive.
    Any,
    Plane,
    Sphere,
    Cylinder,
    Cone,
    Torus,
}

impl FeatureType {
    /// All feature types, in declaration order.
    pub const ALL: [FeatureType; 6] = [
        Self::Any,
        Self::Plane,
        Self::Sphere,
        Self::Cylinder,
        Self::Cone,
        Self::Torus,
    ];

    /// Lower-case name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Plane => "plane",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Cone => "cone",
            Self::Torus => "torus",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reclassification of a fitted shape into a degenerate, simpler one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    /// A cone with negligible taper is reported as a cylinder.
    ConeToCylinder,
    /// A torus with negligible mean radius along the axis is reported as a cylinder.
    TorusToCylinder,
    /// A torus with a vanishing mean radius is reported as a sphere.
    TorusToSphere,
}

impl Conversion {
    pub const ALL: [Conversion; 3] = [
        Self::ConeToCylinder,
        Self::TorusToCylinder,
        Self::TorusToSphere,
    ];

    /// Conversion rule that turns a `from` search into a `to` result, if any.
    pub fn between(from: FeatureType, to: FeatureType) -> Option<Self> {
        match (from, to) {
            (FeatureType::Cone, FeatureType::Cylinder) => Some(Self::ConeToCylinder),
            (FeatureType::Torus, FeatureType::Cylinder) => Some(Self::TorusToCylinder),
            (FeatureType::Torus, FeatureType::Sphere) => Some(Self::TorusToSphere),
            _ => None,
        }
    }

    /// Feature type the rule converts from.
    pub fn source(self) -> FeatureType {
        match self {
            Self::ConeToCylinder => FeatureType::Cone,
            Self::TorusToCylinder | Self::TorusToSphere => FeatureType::Torus,
        }
    }

    /// Feature type the rule converts into.
    pub fn target(self) -> FeatureType {
        match self {
            Self::ConeToCylinder | Self::TorusToCylinder => FeatureType::Cylinder,
            Self::TorusToSphere => FeatureType::Sphere,
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source(), self.target())
    }
}

/// Set of enabled smart-conversion rules.
///
/// Empty for a plain search; [`ConversionOptions::smart`] enables every rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ConversionOptions(BTreeSet<Conversion>);

impl ConversionOptions {
    /// No conversions enabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Cone→cylinder, torus→cylinder and torus→sphere enabled.
    pub fn smart() -> Self {
        Conversion::ALL.into_iter().collect()
    }

    pub fn contains(&self, conversion: Conversion) -> bool {
        self.0.contains(&conversion)
    }

    /// Enable a rule. Returns `false` if it was already enabled.
    pub fn insert(&mut self, conversion: Conversion) -> bool {
        self.0.insert(conversion)
    }

    pub fn remove(&mut self, conversion: Conversion) -> bool {
        self.0.remove(&conversion)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Conversion> + '_ {
        self.0.iter().copied()
    }

    /// Whether a `from` search may be reported as a `to` result.
    pub fn allows(&self, from: FeatureType, to: FeatureType) -> bool {
        Conversion::between(from, to).is_some_and(|c| self.contains(c))
    }
}

impl FromIterator<Conversion> for ConversionOptions {
    fn from_iter<I: IntoIterator<Item = Conversion>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("[]");
        }
        f.write_str("[")?;
        for (i, c) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("]")
    }
}
