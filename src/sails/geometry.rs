use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::*;

/// A named rig measurement.
///
/// The base measurements are I, J, P and E. Every per-sail dimension falls
/// back to one of them when it has not been measured separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RigDimension {
    /// Forestay height
    I,
    /// Foretriangle base
    J,
    /// Mainsail luff
    P,
    /// Mainsail foot
    E,
    GenoaI,
    GenoaJ,
    MainP,
    MainE,
    JibI,
    JibJ,
    SpinI,
    SpinJ,
    CodeZeroI,
    CodeZeroJ,
    StaysailI,
    StaysailJ,
    TrisailI,
    TrisailJ,
}

impl RigDimension {
    pub const ALL: [RigDimension; 18] = [
        RigDimension::I,
        RigDimension::J,
        RigDimension::P,
        RigDimension::E,
        RigDimension::GenoaI,
        RigDimension::GenoaJ,
        RigDimension::MainP,
        RigDimension::MainE,
        RigDimension::JibI,
        RigDimension::JibJ,
        RigDimension::SpinI,
        RigDimension::SpinJ,
        RigDimension::CodeZeroI,
        RigDimension::CodeZeroJ,
        RigDimension::StaysailI,
        RigDimension::StaysailJ,
        RigDimension::TrisailI,
        RigDimension::TrisailJ,
    ];

    /// Field name as it appears in stored rig records.
    pub fn field_name(&self) -> &'static str {
        match self {
            RigDimension::I => "i",
            RigDimension::J => "j",
            RigDimension::P => "p",
            RigDimension::E => "e",
            RigDimension::GenoaI => "genoa_i",
            RigDimension::GenoaJ => "genoa_j",
            RigDimension::MainP => "main_p",
            RigDimension::MainE => "main_e",
            RigDimension::JibI => "jib_i",
            RigDimension::JibJ => "jib_j",
            RigDimension::SpinI => "spin_i",
            RigDimension::SpinJ => "spin_j",
            RigDimension::CodeZeroI => "codezero_i",
            RigDimension::CodeZeroJ => "codezero_j",
            RigDimension::StaysailI => "staysail_i",
            RigDimension::StaysailJ => "staysail_j",
            RigDimension::TrisailI => "trisail_i",
            RigDimension::TrisailJ => "trisail_j",
        }
    }

    pub fn from_field_name(name: &str) -> Option<RigDimension> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|d| d.field_name() == name)
    }

    /// Base measurement this dimension defaults to, `None` for I/J/P/E.
    pub fn base(&self) -> Option<RigDimension> {
        match self {
            RigDimension::I | RigDimension::J | RigDimension::P | RigDimension::E => None,
            RigDimension::GenoaI
            | RigDimension::JibI
            | RigDimension::SpinI
            | RigDimension::CodeZeroI
            | RigDimension::StaysailI
            | RigDimension::TrisailI => Some(RigDimension::I),
            RigDimension::GenoaJ
            | RigDimension::JibJ
            | RigDimension::SpinJ
            | RigDimension::CodeZeroJ
            | RigDimension::StaysailJ
            | RigDimension::TrisailJ => Some(RigDimension::J),
            RigDimension::MainP => Some(RigDimension::P),
            RigDimension::MainE => Some(RigDimension::E),
        }
    }
}

impl fmt::Display for RigDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Rig dimensions that could not be resolved, by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDimensions(pub Vec<&'static str>);

impl fmt::Display for MissingDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// A rig measurement that is not a finite, positive length.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} must be a positive length, got {value} m")]
pub struct InvalidDimension {
    pub field: &'static str,
    /// Offending value in meters
    pub value: f64,
}

/// Accept `value` as a measurement of `field` only if it is finite and above zero.
pub fn positive_length(field: &'static str, value: Length) -> Result<Length, InvalidDimension> {
    let meters = to_coord(value);
    if meters.is_finite() && meters > 0.0 {
        Ok(value)
    } else {
        Err(InvalidDimension {
            field,
            value: meters,
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RigDataError {
    #[error("missing rig data: {0}")]
    Missing(MissingDimensions),

    #[error(transparent)]
    Invalid(#[from] InvalidDimension),
}

#[derive(Debug, thiserror::Error)]
pub enum RigRecordError {
    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Invalid(#[from] InvalidDimension),
}

/// Per-yacht rig measurements.
///
/// Only explicitly measured values are stored. Reads go through
/// [`RigGeometry::resolve`], which applies the per-sail fallback to I/J/P/E.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RigGeometry {
    #[serde(default)]
    measured: BTreeMap<String, Length>,
}

impl RigGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base I/J/P/E in one go.
    pub fn from_base(i: Length, j: Length, p: Length, e: Length) -> Self {
        Self::new()
            .with(RigDimension::I, i)
            .with(RigDimension::J, j)
            .with(RigDimension::P, p)
            .with(RigDimension::E, e)
    }

    pub fn with(mut self, dimension: RigDimension, value: Length) -> Self {
        self.set(dimension, Some(value));
        self
    }

    pub fn set(&mut self, dimension: RigDimension, value: Option<Length>) {
        let key = dimension.field_name().to_string();
        match value {
            Some(v) => {
                self.measured.insert(key, v);
            }
            None => {
                self.measured.remove(&key);
            }
        }
    }

    /// The value measured for exactly this dimension, with no fallback.
    pub fn measured(&self, dimension: RigDimension) -> Option<Length> {
        self.measured.get(dimension.field_name()).copied()
    }

    /// Measured value, or the base measurement it defaults to.
    pub fn resolve(&self, dimension: RigDimension) -> Option<Length> {
        self.measured(dimension)
            .or_else(|| dimension.base().and_then(|base| self.measured(base)))
    }

    /// Resolve several dimensions at once, naming every one that is missing.
    ///
    /// A resolved value that is not a positive length fails straight away.
    pub fn require<const N: usize>(
        &self,
        dimensions: [RigDimension; N],
    ) -> Result<[Length; N], RigDataError> {
        let mut values = [from_coord(0.0); N];
        let mut missing = Vec::new();

        for (slot, dimension) in values.iter_mut().zip(dimensions) {
            match self.resolve(dimension) {
                Some(v) => *slot = positive_length(dimension.field_name(), v)?,
                None => missing.push(dimension.field_name()),
            }
        }

        if missing.is_empty() {
            Ok(values)
        } else {
            Err(RigDataError::Missing(MissingDimensions(missing)))
        }
    }

    /// Check every measured value, in field-name order.
    pub fn validate(&self) -> Result<(), InvalidDimension> {
        for dimension in RigDimension::ALL {
            if let Some(value) = self.measured(dimension) {
                positive_length(dimension.field_name(), value)?;
            }
        }
        Ok(())
    }

    /// Build from a record of unit-tagged values keyed by field name.
    /// Unrecognised keys are skipped.
    pub fn from_record(record: &BTreeMap<String, LengthValue>) -> Result<Self, RigRecordError> {
        let mut rig = Self::new();
        for (key, value) in record {
            match RigDimension::from_field_name(key) {
                Some(dimension) => {
                    let length = positive_length(dimension.field_name(), value.to_length()?)?;
                    rig.set(dimension, Some(length));
                }
                None => warn!("Ignoring unknown rig dimension `{}`", key),
            }
        }
        Ok(rig)
    }

    /// Build from a unit-less legacy record, where values over 100 are
    /// millimeters and the rest meters.
    pub fn from_legacy_values(record: &BTreeMap<String, f64>) -> Result<Self, InvalidDimension> {
        let mut rig = Self::new();
        for (key, &raw) in record {
            match RigDimension::from_field_name(key) {
                Some(dimension) => {
                    let length = positive_length(dimension.field_name(), legacy_length(raw))?;
                    rig.set(dimension, Some(length));
                }
                None => warn!("Ignoring unknown rig dimension `{}`", key),
            }
        }
        Ok(rig)
    }
}
