//! Canonical shapes for objects shown on the monitoring map.
//!
//! Everything here is a plain value type. Objects are rebuilt on every data
//! load and never mutated in place; stages hand out new values instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pipeline::processing::priority;

/// Technical condition category: 1 (excellent) through 5 (critical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TechnicalCondition(u8);

impl TechnicalCondition {
    pub const BEST: TechnicalCondition = TechnicalCondition(1);
    /// Applied whenever the source carries no usable condition
    pub const DEFAULT: TechnicalCondition = TechnicalCondition(3);
    pub const WORST: TechnicalCondition = TechnicalCondition(5);

    pub fn new(value: u8) -> Option<Self> {
        (Self::BEST.0..=Self::WORST.0)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn band(self) -> ConditionBand {
        match self.0 {
            1 | 2 => ConditionBand::Good,
            3 => ConditionBand::Medium,
            _ => ConditionBand::Bad,
        }
    }

    /// All categories, best first
    pub fn all() -> impl Iterator<Item = TechnicalCondition> {
        (Self::BEST.0..=Self::WORST.0).map(TechnicalCondition)
    }
}

impl Default for TechnicalCondition {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for TechnicalCondition {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("technical condition {} is outside 1..=5", value))
    }
}

impl From<TechnicalCondition> for u8 {
    fn from(condition: TechnicalCondition) -> Self {
        condition.0
    }
}

impl fmt::Display for TechnicalCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse grouping of technical conditions used by dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionBand {
    /// Categories 1 and 2
    Good,
    /// Category 3
    Medium,
    /// Categories 4 and 5
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Returns `None` for non-finite values or values outside the WGS84 ranges.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

/// Which backend collection an object belongs to; also the map layer it is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    WaterBody,
    Facility,
    CriticalZone,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 3] = [
        ObjectKind::WaterBody,
        ObjectKind::Facility,
        ObjectKind::CriticalZone,
    ];

    /// Kinds that carry a technical passport. Regional and priority analytics
    /// cover only these.
    pub const PASSPORTED: [ObjectKind; 2] = [ObjectKind::WaterBody, ObjectKind::Facility];

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::WaterBody => "waterBody",
            ObjectKind::Facility => "facility",
            ObjectKind::CriticalZone => "criticalZone",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "waterBody" | "water_body" | "waterbody" => Ok(ObjectKind::WaterBody),
            "facility" => Ok(ObjectKind::Facility),
            "criticalZone" | "critical_zone" | "criticalzone" => Ok(ObjectKind::CriticalZone),
            other => Err(format!("unknown object kind '{}'", other)),
        }
    }
}

/// Alert level of a critical river zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneLevel {
    Critical,
    Warning,
}

impl ZoneLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "critical" => Some(ZoneLevel::Critical),
            "warning" => Some(ZoneLevel::Warning),
            _ => None,
        }
    }

    /// Condition synthesized for zones, which have no technical passport
    pub fn condition(self) -> TechnicalCondition {
        match self {
            ZoneLevel::Critical => TechnicalCondition::WORST,
            ZoneLevel::Warning => TechnicalCondition(4),
        }
    }
}

/// Kind-specific attributes, passed through from the source unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ObjectDetails {
    #[serde(rename_all = "camelCase")]
    WaterBody {
        resource_type: Option<String>,
        water_type: Option<String>,
        has_fauna: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    Facility { facility_type: Option<String> },
    #[serde(rename_all = "camelCase")]
    CriticalZone {
        /// `None` when the source level was not recognized
        level: Option<ZoneLevel>,
        description: Option<String>,
    },
}

impl ObjectDetails {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectDetails::WaterBody { .. } => ObjectKind::WaterBody,
            ObjectDetails::Facility { .. } => ObjectKind::Facility,
            ObjectDetails::CriticalZone { .. } => ObjectKind::CriticalZone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
}

impl PriorityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityLevel::High => "high",
            PriorityLevel::Medium => "medium",
            PriorityLevel::Low => "low",
        }
    }
}

impl FromStr for PriorityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(PriorityLevel::High),
            "medium" => Ok(PriorityLevel::Medium),
            "low" => Ok(PriorityLevel::Low),
            other => Err(format!("unknown priority level '{}'", other)),
        }
    }
}

/// Inspection priority derived from condition and passport age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Priority {
    pub score: u32,
    pub level: PriorityLevel,
    pub passport_age: u32,
    pub needs_inspection: bool,
}

/// A water body, hydro facility or critical zone ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapObject {
    pub id: String,
    pub name: String,
    pub region: Option<String>,
    pub coordinates: Coordinates,
    pub technical_condition: TechnicalCondition,
    pub passport_year: Option<i32>,
    pub passport_date: Option<NaiveDate>,
    /// Whole years since the passport was issued, 0 when unknown
    pub passport_age: u32,
    /// Attached by the classifier; `None` straight out of the normalizer
    pub priority: Option<Priority>,
    #[serde(flatten)]
    pub details: ObjectDetails,
}

impl MapObject {
    pub fn kind(&self) -> ObjectKind {
        self.details.kind()
    }

    pub fn band(&self) -> ConditionBand {
        self.technical_condition.band()
    }

    /// The attached priority, or the one the classifier would attach.
    pub fn effective_priority(&self) -> Priority {
        self.priority.unwrap_or_else(|| {
            priority::compute_priority(self.technical_condition, self.passport_age)
        })
    }
}
