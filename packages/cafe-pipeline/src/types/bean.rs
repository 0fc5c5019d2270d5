//! Bean and sensory score types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Roasting degree of a bean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoastLevel {
    Light,
    Medium,
    Heavy,
}

impl RoastLevel {
    pub fn code(self) -> &'static str {
        match self {
            RoastLevel::Light => "LIGHT",
            RoastLevel::Medium => "MEDIUM",
            RoastLevel::Heavy => "HEAVY",
        }
    }

    /// Lenient parse: anything unrecognised is `None`, which the
    /// estimator treats as medium.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for RoastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RoastLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LIGHT" => Ok(RoastLevel::Light),
            "MEDIUM" => Ok(RoastLevel::Medium),
            "HEAVY" => Ok(RoastLevel::Heavy),
            other => Err(format!("unknown roast level: {}", other)),
        }
    }
}

/// Integer flavor code from the flavor-wheel taxonomy.
pub type FlavorId = u32;

/// A roasted bean as seen by the estimator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bean {
    pub id: u32,
    pub roast_level: Option<RoastLevel>,
    pub flavor_tags: BTreeSet<FlavorId>,
}

impl Bean {
    pub fn new(id: u32, roast_level: Option<RoastLevel>) -> Self {
        Self {
            id,
            roast_level,
            flavor_tags: BTreeSet::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = FlavorId>) -> Self {
        self.flavor_tags.extend(tags);
        self
    }
}

/// Externally sourced cupping scores for one bean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceScore {
    pub bean_id: u32,
    pub acidity: f64,
    pub body: f64,
    pub aroma: f64,
    pub flavor: f64,
    pub aftertaste: f64,
    pub rating: f64,
}

/// Final per-bean sensory attributes, each expected in [1, 10].
///
/// Stored as `i64` so that out-of-range source values survive the
/// transform and can be reported by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensoryScore {
    pub bean_id: u32,
    pub acidity: i64,
    pub body: i64,
    pub sweetness: i64,
    pub bitterness: i64,
    pub aroma: i64,
    pub flavor: i64,
    pub aftertaste: i64,
    pub total_score: i64,
    pub roast_level: RoastLevel,
    pub flavor_tags: Vec<FlavorId>,
}

impl SensoryScore {
    /// Column names paired with values, in export order.
    pub fn attributes(&self) -> [(&'static str, i64); 8] {
        [
            ("acidity", self.acidity),
            ("body", self.body),
            ("sweetness", self.sweetness),
            ("bitterness", self.bitterness),
            ("aroma", self.aroma),
            ("flavor", self.flavor),
            ("aftertaste", self.aftertaste),
            ("total_score", self.total_score),
        ]
    }
}
