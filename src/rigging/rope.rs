use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capacity::*;
use crate::config::*;
use crate::rigging::halyards::HalyardType;
use crate::rigging::sheets::{GuyType, SheetType};
use crate::rigging::termination::Termination;
use crate::sails::*;
use crate::types::*;

/// Default margin added to halyard and guy runs (m)
pub const DEFAULT_LENGTH_SAFETY_MARGIN_M: f64 = 1.0;

/// Override keys every rope kind accepts
pub const ROPE_ACCEPTED_KEYS: &[&str] = &[
    "colour",
    "construction",
    "diameter",
    "led_aft",
    "length_safety_margin",
    "upper_termination",
    "lower_termination",
];

/// Which side of the boat a paired sheet or guy runs on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Side {
    Port,
    Starboard,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Port, Side::Starboard];

    pub fn name(&self) -> &'static str {
        match self {
            Side::Port => "Port",
            Side::Starboard => "Starboard",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every rope kind the engine can size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RopeType {
    /// Hoists a sail; sized against the worst sail it serves
    Halyard(HalyardType),

    /// Trims a sail; paired port and starboard
    Sheet(SheetType, Option<Side>),

    /// Controls the spinnaker pole; paired port and starboard
    Guy(GuyType, Option<Side>),
}

impl RopeType {
    /// Type name without the side suffix.
    pub fn base_name(&self) -> &'static str {
        match self {
            RopeType::Halyard(h) => h.name(),
            RopeType::Sheet(s, _) => s.name(),
            RopeType::Guy(g, _) => g.name(),
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            RopeType::Halyard(_) => None,
            RopeType::Sheet(_, side) | RopeType::Guy(_, side) => *side,
        }
    }

    /// Same rope on a given side. Halyards have no side and are returned unchanged.
    pub fn with_side(self, side: Option<Side>) -> RopeType {
        match self {
            RopeType::Halyard(_) => self,
            RopeType::Sheet(s, _) => RopeType::Sheet(s, side),
            RopeType::Guy(g, _) => RopeType::Guy(g, side),
        }
    }

    /// Whether this rope is spawned once per side.
    pub fn is_paired(&self) -> bool {
        !matches!(self, RopeType::Halyard(_))
    }

    pub fn defaults(&self) -> RopeDefaults {
        match self {
            RopeType::Halyard(h) => h.defaults(),
            RopeType::Sheet(s, _) => s.defaults(),
            RopeType::Guy(g, _) => g.defaults(),
        }
    }
}

impl fmt::Display for RopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side() {
            Some(side) => write!(f, "{}_{}", self.base_name(), side),
            None => f.write_str(self.base_name()),
        }
    }
}

/// Class-level defaults for one rope kind
#[derive(Debug, Clone, PartialEq)]
pub struct RopeDefaults {
    pub colour: &'static str,
    pub construction: RopeConstructionType,
    pub upper_termination: Termination,
    pub lower_termination: Termination,
}

/// Rope overrides after validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RopeConfig {
    pub colour: Option<String>,
    pub construction: Option<RopeConstructionType>,
    pub diameter: Option<DiameterMm>,
    pub led_aft: Option<Length>,
    pub length_safety_margin: Option<Length>,
    pub upper_termination: Option<Termination>,
    pub lower_termination: Option<Termination>,
}

impl RopeConfig {
    pub fn from_overrides(overrides: &ConfigOverrides) -> Result<Self, InvalidOverrideValue> {
        let reader = OverrideReader::new(overrides, ROPE_ACCEPTED_KEYS);
        for (key, _) in reader.unknown_keys() {
            warn!("Ignoring unknown rope override `{}`", key);
        }

        Ok(Self {
            colour: reader.string("colour")?,
            construction: reader.parsed("construction", "a rope construction such as \"Braid/Braid\"")?,
            diameter: reader.diameter("diameter")?,
            led_aft: reader.length("led_aft")?,
            length_safety_margin: reader.length("length_safety_margin")?,
            upper_termination: reader.structured("upper_termination", "a termination")?,
            lower_termination: reader.structured("lower_termination", "a termination")?,
        })
    }
}

/// Defaults with overrides applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRopeConfig {
    pub colour: String,
    pub construction: RopeConstructionType,
    /// Only set when overridden; halyards are otherwise sized from load
    pub diameter: Option<DiameterMm>,
    pub led_aft: Length,
    pub length_safety_margin: Length,
    pub upper_termination: Termination,
    pub lower_termination: Termination,
}

/// Lay overrides over class defaults. Every supplied value wins.
pub fn merge(defaults: &RopeDefaults, config: &RopeConfig) -> ResolvedRopeConfig {
    ResolvedRopeConfig {
        colour: config
            .colour
            .clone()
            .unwrap_or_else(|| defaults.colour.to_string()),
        construction: config.construction.unwrap_or(defaults.construction),
        diameter: config.diameter,
        led_aft: config.led_aft.unwrap_or_else(|| from_coord(0.0)),
        length_safety_margin: config
            .length_safety_margin
            .unwrap_or_else(|| from_coord(DEFAULT_LENGTH_SAFETY_MARGIN_M)),
        upper_termination: config
            .upper_termination
            .clone()
            .unwrap_or_else(|| defaults.upper_termination.clone()),
        lower_termination: config
            .lower_termination
            .clone()
            .unwrap_or_else(|| defaults.lower_termination.clone()),
    }
}

/// Everything a rope needs to size itself against one yacht.
#[derive(Debug, Clone, Copy)]
pub struct SizingContext<'a> {
    pub rig: &'a RigGeometry,
    pub boat_length: Option<Length>,
    pub sails: &'a SailWardrobe,
    pub settings: &'a EngineSettings,
    pub strength_table: &'a StrengthTable,
}

impl SizingContext<'_> {
    /// Apply the length safety factor and round up to the half meter.
    pub fn finish_length(&self, raw: Length) -> RopeLength {
        round_up_half_meter(raw * self.settings.safety_factors.length)
    }

    /// Breaking strength of an overridden diameter, which must be stocked in
    /// the rope's construction.
    pub fn override_strength(
        &self,
        rope: RopeType,
        construction: RopeConstructionType,
        diameter: DiameterMm,
    ) -> Result<Mass, RopeError> {
        self.strength_table
            .stocked_strength(construction, diameter)
            .map_err(|source| RopeError::NoSuitableDiameter { rope, source })
    }
}

fn sail_names(sails: &[SailType]) -> String {
    sails
        .iter()
        .map(SailType::name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RopeError {
    #[error("{rope} is missing rig data: {fields}")]
    MissingRigData {
        rope: RopeType,
        fields: MissingDimensions,
    },

    #[error("{rope} has invalid rig data: {source}")]
    InvalidRigData {
        rope: RopeType,
        #[source]
        source: InvalidDimension,
    },

    #[error("{halyard} has no sail on the yacht to size against (serves {})", sail_names(.sails))]
    NoValidSail {
        halyard: HalyardType,
        sails: Vec<SailType>,
    },

    #[error("{halyard} cannot be sized because {sail} failed: {source}")]
    SailFailed {
        halyard: HalyardType,
        sail: SailType,
        #[source]
        source: SailError,
    },

    #[error("{rope}: {source}")]
    NoSuitableDiameter {
        rope: RopeType,
        #[source]
        source: StrengthError,
    },

    #[error(transparent)]
    InvalidOverride(#[from] InvalidOverrideValue),
}

impl RopeError {
    pub(crate) fn rig_data(rope: RopeType, error: RigDataError) -> Self {
        match error {
            RigDataError::Missing(fields) => RopeError::MissingRigData { rope, fields },
            RigDataError::Invalid(source) => RopeError::InvalidRigData { rope, source },
        }
    }
}

/// A sized rope ready to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Rope {
    pub rope_type: RopeType,
    /// Carries the diameter; see [`Rope::diameter`]
    pub construction: RopeConstruction,
    pub length: Length,
    pub colour: String,
    pub upper_termination: Termination,
    pub lower_termination: Termination,
    pub led_aft: Length,
    /// Halyards only
    pub required_working_load: Option<Mass>,
}

impl Rope {
    pub(crate) fn from_resolved(
        rope_type: RopeType,
        config: ResolvedRopeConfig,
        diameter: Option<DiameterMm>,
        length: Length,
        required_working_load: Option<Mass>,
    ) -> Self {
        Self {
            rope_type,
            construction: RopeConstruction::new(config.construction, diameter),
            length,
            colour: config.colour,
            upper_termination: config.upper_termination,
            lower_termination: config.lower_termination,
            led_aft: config.led_aft,
            required_working_load,
        }
    }

    pub fn name(&self) -> String {
        self.rope_type.to_string()
    }

    pub fn side(&self) -> Option<Side> {
        self.rope_type.side()
    }

    pub fn diameter(&self) -> Option<DiameterMm> {
        self.construction.diameter
    }

    pub fn set_diameter(&mut self, diameter: Option<DiameterMm>) {
        self.construction.diameter = diameter;
    }

    pub fn construction_type(&self) -> RopeConstructionType {
        self.construction.construction_type
    }

    /// One-line description for schedules and logs.
    pub fn summary(&self) -> String {
        let diameter = self
            .diameter()
            .map(|d| format!("{} mm", d))
            .unwrap_or_else(|| "unsized".to_string());

        let mut s = format!(
            "{}: {} {}, {}, {}, upper {}, lower {}",
            self.name(),
            self.construction_type(),
            diameter,
            DisplayLength(self.length),
            self.colour,
            self.upper_termination,
            self.lower_termination,
        );
        if let Some(load) = self.required_working_load {
            s.push_str(&format!(", WL {}", DisplayMass(load)));
        }
        s
    }
}
