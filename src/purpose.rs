//! Mission purposes and the attribute requirements they imply.
//!
//! [`PurposeCatalog`] is built once at startup (from the built-in table or a
//! JSON file) and shared read-only by every selection run.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Attribute;

/// Minimum requirement on one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Requirement {
    /// Attribute value must be at least this.
    Minimum(f64),
    /// Exact `"Yes"` / `"No"` match.
    Flag(String),
    /// Text must contain "capable", e.g. `"Night capable"`.
    Capability(String),
    /// Informational text that the purpose filter does not enforce,
    /// such as `"-10°C to 40°C"` or `"IP43"`.
    Descriptive(String),
}

impl Requirement {
    /// Classifies a textual requirement.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text == "Yes" || text == "No" {
            Requirement::Flag(text.to_string())
        } else if text.to_lowercase().contains("capable") {
            Requirement::Capability(text.to_string())
        } else {
            Requirement::Descriptive(text.to_string())
        }
    }

    /// Folds a later purpose's requirement into this one: numeric minimums
    /// keep the larger value, anything else keeps the first seen.
    fn merge(&mut self, other: &Requirement) {
        if let (Requirement::Minimum(current), Requirement::Minimum(next)) = (&mut *self, other) {
            *current = current.max(*next);
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Minimum(v) => write!(f, ">= {v}"),
            Requirement::Flag(s) => write!(f, "= {s}"),
            Requirement::Capability(s) => write!(f, "~ {s}"),
            Requirement::Descriptive(s) => write!(f, "({s})"),
        }
    }
}

/// A named purpose and its requirements, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct PurposeProfile {
    pub name: String,
    pub requirements: Vec<(Attribute, Requirement)>,
}

/// Requirements of several purposes combined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedRequirement {
    requirements: Vec<(Attribute, Requirement)>,
}

impl AggregatedRequirement {
    pub fn get(&self, attribute: Attribute) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|(a, _)| *a == attribute)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &Requirement)> {
        self.requirements.iter().map(|(a, r)| (*a, r))
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    fn add(&mut self, attribute: Attribute, requirement: &Requirement) {
        match self.requirements.iter_mut().find(|(a, _)| *a == attribute) {
            Some((_, existing)) => existing.merge(requirement),
            None => self.requirements.push((attribute, requirement.clone())),
        }
    }
}

/// Purpose name → requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct PurposeCatalog {
    profiles: Vec<PurposeProfile>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRequirement {
    Number(f64),
    Text(String),
}

impl PurposeCatalog {
    pub fn new(profiles: Vec<PurposeProfile>) -> Self {
        Self { profiles }
    }

    /// The standard port-operations purposes.
    pub fn builtin() -> Self {
        use Attribute::*;
        use Requirement::Minimum;

        let text = Requirement::from_text;
        let profile = |name: &str, requirements: Vec<(Attribute, Requirement)>| PurposeProfile {
            name: name.to_string(),
            requirements,
        };

        Self::new(vec![
            profile(
                "Reconnaissance",
                vec![
                    (CameraResolution, Minimum(20.0)),
                    (RealTimeStreaming, text("Yes")),
                    (FlightRadius, Minimum(15.0)),
                    (BatteryLife, Minimum(30.0)),
                    (WindResistance, Minimum(10.0)),
                ],
            ),
            profile(
                "Port Security",
                vec![
                    (NightVision, text("Yes")),
                    (WindResistance, Minimum(12.0)),
                    (BatteryLife, Minimum(40.0)),
                    (RealTimeStreaming, text("Yes")),
                    (CameraResolution, Minimum(12.0)),
                ],
            ),
            profile(
                "Ship Inspection",
                vec![
                    (CameraResolution, Minimum(20.0)),
                    (PayloadCapacity, Minimum(0.5)),
                    (BatteryLife, Minimum(25.0)),
                    (IpRating, text("IP43")),
                    (DayNightOperation, text("Night capable")),
                ],
            ),
            profile(
                "Environmental Monitoring",
                vec![
                    (ThermalCameraResolution, Minimum(0.08)),
                    (FlightRadius, Minimum(20.0)),
                    (BatteryLife, Minimum(45.0)),
                    (TemperatureResistance, text("-10°C to 40°C")),
                ],
            ),
            profile(
                "Search & Rescue",
                vec![
                    (ThermalCameraResolution, Minimum(0.08)),
                    (RealTimeStreaming, text("Yes")),
                    (NightVision, text("Yes")),
                    (FlightRadius, Minimum(10.0)),
                    (BatteryLife, Minimum(35.0)),
                ],
            ),
            profile(
                "Cargo & Logistics Monitoring",
                vec![
                    (PayloadCapacity, Minimum(2.0)),
                    (BatteryLife, Minimum(50.0)),
                    (CameraResolution, Minimum(14.0)),
                    (RealTimeStreaming, text("Yes")),
                ],
            ),
            profile(
                "Harbor Traffic Management",
                vec![
                    (FlightRadius, Minimum(10.0)),
                    (RealTimeStreaming, text("Yes")),
                    (WindResistance, Minimum(10.0)),
                    (BatteryLife, Minimum(40.0)),
                ],
            ),
            profile(
                "Emergency Response & Fire Detection",
                vec![
                    (ThermalCameraResolution, Minimum(0.16)),
                    (BatteryLife, Minimum(60.0)),
                    (NightVision, text("Yes")),
                    (TemperatureResistance, text("-10°C to 50°C")),
                ],
            ),
            profile(
                "Infrastructure & Structural Inspection",
                vec![
                    (CameraResolution, Minimum(20.0)),
                    (BatteryLife, Minimum(45.0)),
                    (PayloadCapacity, Minimum(1.0)),
                    (WindResistance, Minimum(12.0)),
                ],
            ),
            profile(
                "Agricultural",
                vec![
                    (PayloadCapacity, Minimum(10.0)),
                    (BatteryLife, Minimum(25.0)),
                    (WindResistance, Minimum(8.0)),
                    (TemperatureResistance, text("-10°C to 40°C")),
                ],
            ),
        ])
    }

    /// Loads profiles from a JSON file shaped like
    ///
    /// ```json
    /// {
    ///   "Port Security": {
    ///     "Wind Resistance (m/s)": 12,
    ///     "Real-Time Data Streaming": "Yes"
    ///   }
    /// }
    /// ```
    ///
    /// Profiles are ordered by name. An unknown column header is an error, as
    /// is a number for a text column or text for a numeric one.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read purpose file '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid purpose file '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, HashMap<String, RawRequirement>> = serde_json::from_str(content)?;

        let mut profiles = Vec::with_capacity(raw.len());
        for (name, entries) in raw {
            let mut requirements = Vec::with_capacity(entries.len());
            for (header, value) in entries {
                let Some(attribute) = Attribute::from_header(&header) else {
                    bail!("purpose '{name}' names unknown attribute '{header}'");
                };
                let requirement = match value {
                    RawRequirement::Number(v) if attribute.is_numeric() => Requirement::Minimum(v),
                    RawRequirement::Text(t) if !attribute.is_numeric() => Requirement::from_text(&t),
                    RawRequirement::Number(v) => {
                        bail!("purpose '{name}' gives number {v} for text attribute '{attribute}'")
                    }
                    RawRequirement::Text(t) => {
                        bail!("purpose '{name}' gives text '{t}' for numeric attribute '{attribute}'")
                    }
                };
                requirements.push((attribute, requirement));
            }
            requirements.sort_by_key(|(a, _)| *a);
            profiles.push(PurposeProfile { name, requirements });
        }
        profiles.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self::new(profiles))
    }

    /// Serializes the profiles in the shape [`PurposeCatalog::load`] reads.
    pub fn to_json(&self) -> Result<String> {
        let document: BTreeMap<&str, BTreeMap<&str, &Requirement>> = self
            .profiles
            .iter()
            .map(|p| {
                let requirements = p.requirements.iter().map(|(a, r)| (a.header(), r)).collect();
                (p.name.as_str(), requirements)
            })
            .collect();
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn get(&self, name: &str) -> Option<&PurposeProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn profiles(&self) -> &[PurposeProfile] {
        &self.profiles
    }

    /// Combines the requirements of the named purposes in selection order.
    /// Unknown names contribute nothing.
    pub fn aggregate<S: AsRef<str>>(&self, purposes: &[S]) -> AggregatedRequirement {
        let mut aggregated = AggregatedRequirement::default();
        for purpose in purposes {
            let Some(profile) = self.get(purpose.as_ref()) else {
                warn!(purpose = purpose.as_ref(), "Unknown purpose ignored");
                continue;
            };
            for (attribute, requirement) in &profile.requirements {
                aggregated.add(*attribute, requirement);
            }
        }
        aggregated
    }
}

impl Default for PurposeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
