use json::JsonValue;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Result, ValveError},
    profiles::{Severity, SeverityProfile, SeverityTable},
};

/// How the nominal arc width of a leaflet enters the curve formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArcMode {
    /// Arc width is computed but placement depends on the base angle only
    #[default]
    Ignore,
    /// Angular deflection is scaled by the arc fraction
    Confine,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub points_per_leaflet: usize,
    /// Radius of the attachment ring (cm)
    pub annulus_radius: f64,
    /// Nominal leaflet length before the severity factor (cm)
    pub leaflet_length: f64,
    pub arc_mode: ArcMode,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            points_per_leaflet: 32,
            annulus_radius: 1.0,
            leaflet_length: 1.2,
            arc_mode: ArcMode::Ignore,
        }
    }
}

impl GeneratorConfig {
    pub fn with_resolution(points_per_leaflet: usize) -> GeneratorConfig {
        GeneratorConfig {
            points_per_leaflet,
            ..GeneratorConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.points_per_leaflet < 2 {
            return Err(ValveError::InvalidResolution(self.points_per_leaflet));
        }
        check_dimensions(self.annulus_radius, self.leaflet_length)
    }
}

/// Rejects a non-positive or non-finite annulus radius or leaflet length
pub(crate) fn check_dimensions(annulus_radius: f64, leaflet_length: f64) -> Result<()> {
    if !(annulus_radius.is_finite() && annulus_radius > 0.0) {
        return Err(ValveError::InvalidGeometry(format!(
            "annulus radius must be positive, got {annulus_radius}"
        )));
    }
    if !(leaflet_length.is_finite() && leaflet_length > 0.0) {
        return Err(ValveError::InvalidGeometry(format!(
            "leaflet length must be positive, got {leaflet_length}"
        )));
    }
    Ok(())
}

/// Settings loaded from an input file
#[derive(Debug, Clone, PartialEq)]
pub struct InputSettings {
    pub config: GeneratorConfig,
    pub table: SeverityTable,
}

impl Default for InputSettings {
    fn default() -> Self {
        InputSettings {
            config: GeneratorConfig::default(),
            table: SeverityTable::standard(),
        }
    }
}

/// Reads an optional f64 field, failing on anything that is present but not numeric
fn optional_f64(value: &JsonValue, context: &str, key: &str) -> Result<Option<f64>> {
    if !value.has_key(key) {
        return Ok(None);
    }
    match value[key].as_f64() {
        Some(v) => Ok(Some(v)),
        None => Err(ValveError::Input(format!(
            "Bad value for {key} in {context}: {}",
            value[key].dump()
        ))),
    }
}

fn parse_geometry(input_json: &JsonValue, mut config: GeneratorConfig) -> Result<GeneratorConfig> {
    let geometry = &input_json["geometry"];
    if geometry.is_null() {
        return Ok(config);
    }
    if !geometry.is_object() {
        return Err(ValveError::Input(
            "geometry section must be an object".to_owned(),
        ));
    }

    if let Some(r) = optional_f64(geometry, "geometry", "annulus_radius")? {
        config.annulus_radius = r;
    }
    if let Some(l) = optional_f64(geometry, "geometry", "leaflet_length")? {
        config.leaflet_length = l;
    }
    if geometry.has_key("points_per_leaflet") {
        config.points_per_leaflet = match geometry["points_per_leaflet"].as_usize() {
            Some(n) => n,
            None => {
                return Err(ValveError::Input(format!(
                    "Bad value for points_per_leaflet in geometry: {}",
                    geometry["points_per_leaflet"].dump()
                )))
            }
        };
    }
    if geometry.has_key("confine_arc") {
        config.arc_mode = match geometry["confine_arc"].as_bool() {
            Some(true) => ArcMode::Confine,
            Some(false) => ArcMode::Ignore,
            None => {
                return Err(ValveError::Input(
                    "Bad value for confine_arc in geometry, expected a boolean".to_owned(),
                ))
            }
        };
    }

    Ok(config)
}

fn parse_profiles(input_json: &JsonValue, mut table: SeverityTable) -> Result<SeverityTable> {
    let profiles = &input_json["profiles"];
    if profiles.is_null() {
        return Ok(table);
    }
    if !profiles.is_object() {
        return Err(ValveError::Input(
            "profiles section must be an object".to_owned(),
        ));
    }

    for (label, entry) in profiles.entries() {
        let severity: Severity = label.parse()?;
        if !entry.is_object() {
            return Err(ValveError::Input(format!(
                "profile {label} must be an object, got {}",
                entry.dump()
            )));
        }
        let base = *table.get(severity);
        let context = format!("profile {label}");

        let profile = SeverityProfile {
            severity,
            spring_stiffness: optional_f64(entry, &context, "spring_stiffness")?
                .unwrap_or(base.spring_stiffness),
            beam_rigidity: optional_f64(entry, &context, "beam_rigidity")?
                .unwrap_or(base.beam_rigidity),
            leaflet_length_factor: optional_f64(entry, &context, "leaflet_length_factor")?
                .unwrap_or(base.leaflet_length_factor),
            mobility_factor: optional_f64(entry, &context, "mobility")?
                .unwrap_or(base.mobility_factor),
        };
        table = table.with_profile(profile)?;
    }

    Ok(table)
}

/// Parses input settings from a json string
pub fn parse_input(contents: &str) -> Result<InputSettings> {
    let input_json = match json::parse(contents) {
        Ok(j) => j,
        Err(err) => return Err(ValveError::Input(format!("Error in input file json: {err}"))),
    };

    if !input_json.is_object() {
        return Err(ValveError::Input(
            "Input json must be an object".to_owned(),
        ));
    }

    let defaults = InputSettings::default();
    let config = parse_geometry(&input_json, defaults.config)?;
    let table = parse_profiles(&input_json, defaults.table)?;

    Ok(InputSettings { config, table })
}

/// Loads input settings from a json file
///
/// # Arguments
/// * `input_file` - Path to the json input file
pub fn load_input_file(input_file: &str) -> Result<InputSettings> {
    let contents =
        std::fs::read_to_string(input_file).map_err(|err| ValveError::io(input_file, err))?;
    let settings = parse_input(&contents)?;
    info!(file = input_file, "loaded generator settings");
    Ok(settings)
}
