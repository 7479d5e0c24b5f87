use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValveError};

/// Disease stage of the valve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Healthy,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// All severities, ordered from healthy to severe.
    pub const ALL: [Severity; 4] = [
        Severity::Healthy,
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Healthy => "healthy",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    fn slot(&self) -> usize {
        match self {
            Severity::Healthy => 0,
            Severity::Mild => 1,
            Severity::Moderate => 2,
            Severity::Severe => 3,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Severity {
    type Err = ValveError;

    fn from_str(s: &str) -> Result<Self> {
        Severity::ALL
            .iter()
            .find(|sev| sev.label() == s)
            .copied()
            .ok_or_else(|| ValveError::UnknownSeverity(s.to_string()))
    }
}

/// Material and geometry parameters for one disease stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityProfile {
    pub severity: Severity,
    /// Baseline spring constant (dynes/cm)
    pub spring_stiffness: f64,
    /// Bending resistance coefficient
    pub beam_rigidity: f64,
    /// Scales the nominal leaflet length, in (0, 1]
    pub leaflet_length_factor: f64,
    /// Scales how far the leaflet curves inward, in (0, 1]
    pub mobility_factor: f64,
}

impl SeverityProfile {
    /// Checks every parameter against its domain
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ValveError::InvalidGeometry(format!(
                    "{} profile has non-positive {name} {value}",
                    self.severity
                )))
            }
        };
        let fraction = |name: &str, value: f64| -> Result<()> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ValveError::InvalidGeometry(format!(
                    "{} profile has {name} {value} outside (0, 1]",
                    self.severity
                )))
            }
        };

        positive("spring_stiffness", self.spring_stiffness)?;
        positive("beam_rigidity", self.beam_rigidity)?;
        fraction("leaflet_length_factor", self.leaflet_length_factor)?;
        fraction("mobility_factor", self.mobility_factor)?;
        Ok(())
    }
}

/// Immutable lookup table from severity to profile.
///
/// The table is an ordinary value: build the standard one with
/// [`SeverityTable::standard`] or swap rows with [`SeverityTable::with_profile`]
/// to run the generator against custom material parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityTable {
    profiles: [SeverityProfile; 4],
}

impl SeverityTable {
    pub fn standard() -> SeverityTable {
        SeverityTable {
            profiles: [
                SeverityProfile {
                    severity: Severity::Healthy,
                    spring_stiffness: 5.0e2,
                    beam_rigidity: 1.0e-2,
                    leaflet_length_factor: 1.0,
                    mobility_factor: 1.0,
                },
                SeverityProfile {
                    severity: Severity::Mild,
                    spring_stiffness: 8.0e2,
                    beam_rigidity: 2.0e-2,
                    leaflet_length_factor: 0.95,
                    mobility_factor: 0.9,
                },
                SeverityProfile {
                    severity: Severity::Moderate,
                    spring_stiffness: 1.5e3,
                    beam_rigidity: 5.0e-2,
                    leaflet_length_factor: 0.85,
                    mobility_factor: 0.7,
                },
                SeverityProfile {
                    severity: Severity::Severe,
                    spring_stiffness: 3.0e3,
                    beam_rigidity: 1.0e-1,
                    leaflet_length_factor: 0.7,
                    mobility_factor: 0.4,
                },
            ],
        }
    }

    /// Returns a copy of the table with one row replaced
    pub fn with_profile(&self, profile: SeverityProfile) -> Result<SeverityTable> {
        profile.validate()?;
        let mut profiles = self.profiles;
        profiles[profile.severity.slot()] = profile;
        Ok(SeverityTable { profiles })
    }

    pub fn get(&self, severity: Severity) -> &SeverityProfile {
        &self.profiles[severity.slot()]
    }

    /// Looks up a profile by its label
    ///
    /// # Arguments
    /// * `label` - One of `healthy`, `mild`, `moderate` or `severe`
    pub fn lookup(&self, label: &str) -> Result<&SeverityProfile> {
        let severity: Severity = label.parse()?;
        Ok(self.get(severity))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeverityProfile> {
        self.profiles.iter()
    }
}

impl Default for SeverityTable {
    fn default() -> Self {
        SeverityTable::standard()
    }
}
