use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::*;

/// Standard sea-level air density (kg/m³)
pub const STANDARD_AIR_DENSITY: f64 = 1.225;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("Invalid setting `{field}`: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// Design wind and the aerodynamic constants applied to every sail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindSettings {
    pub speed_knots: f64,
    /// Unit-tagged design wind, folded into `speed_knots` on load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<VelocityValue>,
    pub lift_coefficient: f64,
    pub air_density_kg_m3: f64,
}

impl Default for WindSettings {
    fn default() -> Self {
        Self {
            speed_knots: 30.0,
            speed: None,
            lift_coefficient: 1.0,
            air_density_kg_m3: STANDARD_AIR_DENSITY,
        }
    }
}

impl WindSettings {
    /// Replace `speed_knots` with the unit-tagged speed, if one was given.
    pub fn resolve_speed(&mut self) -> Result<(), UnitError> {
        if let Some(tagged) = self.speed.take() {
            self.speed_knots = tagged.to_velocity()?.get::<knot>();
        }
        Ok(())
    }

    pub fn speed(&self) -> WindSpeed {
        Velocity::new::<knot>(self.speed_knots)
    }

    pub fn air_density(&self) -> MassDensity {
        MassDensity::new::<kilogram_per_cubic_meter>(self.air_density_kg_m3)
    }
}

/// Multipliers applied on top of the raw aerodynamic and geometric figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyFactors {
    /// Static halyard load factor
    pub halyard_load: f64,

    /// Gust and snatch loading on top of the static load
    pub dynamic_load: f64,

    /// Multiplier on raw rope length before rounding
    pub length: f64,
}

impl Default for SafetyFactors {
    fn default() -> Self {
        Self {
            halyard_load: 1.25,
            dynamic_load: 1.5,
            length: 1.0,
        }
    }
}

impl SafetyFactors {
    /// Combined factor applied to a resolved halyard force.
    pub fn load_multiplier(&self) -> f64 {
        self.halyard_load * self.dynamic_load
    }
}

/// Engine-wide inputs that are not per-yacht geometry.
///
/// ```toml
/// [wind]
/// speed_knots = 30.0
/// # or: speed = { value = 15.4, unit = "m/s" }
///
/// [safety_factors]
/// halyard_load = 1.25
/// dynamic_load = 1.5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub wind: WindSettings,
    pub safety_factors: SafetyFactors,
}

impl EngineSettings {
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = toml::from_str(source)?;
        settings.wind.resolve_speed()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn with_wind_speed(mut self, speed: Velocity) -> Self {
        self.wind.speed_knots = speed.get::<knot>();
        self.wind.speed = None;
        self
    }

    pub fn with_wind_speed_value(self, speed: &VelocityValue) -> Result<Self, UnitError> {
        Ok(self.with_wind_speed(speed.to_velocity()?))
    }

    pub fn with_safety_factors(mut self, safety_factors: SafetyFactors) -> Self {
        self.safety_factors = safety_factors;
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let non_negative = [("wind.speed_knots", self.wind.speed_knots)];
        let positive = [
            ("wind.lift_coefficient", self.wind.lift_coefficient),
            ("wind.air_density_kg_m3", self.wind.air_density_kg_m3),
            ("safety_factors.halyard_load", self.safety_factors.halyard_load),
            ("safety_factors.dynamic_load", self.safety_factors.dynamic_load),
            ("safety_factors.length", self.safety_factors.length),
        ];

        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidValue { field, value });
            }
        }
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}
