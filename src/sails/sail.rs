use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::*;
use crate::physics::aerodynamic_force;
use crate::sails::geometry::*;
use crate::types::*;

/// Sail variants a yacht's wardrobe can hold
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SailType {
    Mainsail,
    Jib,
    /// Overlapping headsail; foot scaled by overlap percentage
    Genoa,
    Staysail,
    CodeZero,
    SymSpinnaker,
    AsymSpinnaker,
    /// Storm trysail set on the mast track
    Trisail,
}

impl SailType {
    pub const ALL: [SailType; 8] = [
        SailType::Mainsail,
        SailType::Jib,
        SailType::Genoa,
        SailType::Staysail,
        SailType::CodeZero,
        SailType::SymSpinnaker,
        SailType::AsymSpinnaker,
        SailType::Trisail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SailType::Mainsail => "Mainsail",
            SailType::Jib => "Jib",
            SailType::Genoa => "Genoa",
            SailType::Staysail => "Staysail",
            SailType::CodeZero => "CodeZero",
            SailType::SymSpinnaker => "SymSpinnaker",
            SailType::AsymSpinnaker => "AsymSpinnaker",
            SailType::Trisail => "Trisail",
        }
    }

    /// Override keys this sail understands. Anything else becomes an extra attribute.
    pub fn accepted_keys(&self) -> &'static [&'static str] {
        match self {
            SailType::Genoa => &["luff", "leech", "foot", "overlap_percent"],
            _ => &["luff", "leech", "foot"],
        }
    }

    /// How the luff is derived when not given.
    fn default_luff(&self) -> LuffRule {
        match self {
            SailType::Mainsail => LuffRule::Along(RigDimension::MainP),
            SailType::Jib => LuffRule::Stay(RigDimension::JibI, RigDimension::JibJ),
            SailType::Genoa => LuffRule::Stay(RigDimension::GenoaI, RigDimension::GenoaJ),
            SailType::Staysail => LuffRule::Stay(RigDimension::StaysailI, RigDimension::StaysailJ),
            SailType::CodeZero => LuffRule::Along(RigDimension::CodeZeroI),
            SailType::SymSpinnaker | SailType::AsymSpinnaker => LuffRule::Along(RigDimension::SpinI),
            SailType::Trisail => LuffRule::Along(RigDimension::TrisailI),
        }
    }

    /// Rig dimension the foot defaults to.
    fn default_foot(&self) -> RigDimension {
        match self {
            SailType::Mainsail => RigDimension::MainE,
            SailType::Jib => RigDimension::JibJ,
            SailType::Genoa => RigDimension::GenoaJ,
            SailType::Staysail => RigDimension::StaysailJ,
            SailType::CodeZero => RigDimension::CodeZeroJ,
            SailType::SymSpinnaker | SailType::AsymSpinnaker => RigDimension::SpinJ,
            SailType::Trisail => RigDimension::TrisailJ,
        }
    }
}

impl fmt::Display for SailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
enum LuffRule {
    /// Luff runs the full length of one measurement
    Along(RigDimension),
    /// Luff runs up a stay, the diagonal of (I, J)
    Stay(RigDimension, RigDimension),
}

impl LuffRule {
    fn evaluate(self, rig: &RigGeometry) -> Result<Length, RigDataError> {
        match self {
            LuffRule::Along(d) => rig.require([d]).map(|[luff]| luff),
            LuffRule::Stay(i, j) => rig.require([i, j]).map(|[i, j]| hypotenuse(i, j)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SailError {
    #[error("{sail} is missing rig data: {fields}")]
    MissingRigData {
        sail: SailType,
        fields: MissingDimensions,
    },

    #[error("{sail} has invalid rig data: {source}")]
    InvalidRigData {
        sail: SailType,
        #[source]
        source: InvalidDimension,
    },

    #[error(transparent)]
    InvalidOverride(#[from] InvalidOverrideValue),
}

/// Sail overrides after validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SailConfig {
    pub luff: Option<Length>,
    pub leech: Option<Length>,
    pub foot: Option<Length>,
    pub overlap_percent: Option<f64>,
    pub extra: BTreeMap<String, Value>,
}

impl SailConfig {
    pub fn from_overrides(
        sail_type: SailType,
        overrides: &ConfigOverrides,
    ) -> Result<Self, InvalidOverrideValue> {
        let reader = OverrideReader::new(overrides, sail_type.accepted_keys());

        let overlap_percent = if sail_type == SailType::Genoa {
            reader.positive_number("overlap_percent")?
        } else {
            None
        };

        Ok(Self {
            luff: reader.length("luff")?,
            leech: reader.length("leech")?,
            foot: reader.length("foot")?,
            overlap_percent,
            extra: reader
                .unknown_keys()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }
}

/// A sail sized from the rig, in meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sail {
    pub sail_type: SailType,
    pub luff: Length,
    pub leech: Length,
    pub foot: Length,
    /// Genoa only
    pub overlap_percent: Option<f64>,
    pub extra: BTreeMap<String, Value>,
}

/// Default genoa overlap when none is given (%)
pub const DEFAULT_GENOA_OVERLAP: f64 = 100.0;

/// A yacht's computed sails, one per type.
pub type SailWardrobe = BTreeMap<SailType, Sail>;

impl Sail {
    /// Projected area: `0.5 * luff * foot`
    pub fn area(&self) -> SailArea {
        Area::new::<square_meter>(0.5 * to_coord(self.luff) * to_coord(self.foot))
    }

    /// Lift force on this sail at the configured design wind.
    pub fn aerodynamic_force(&self, wind: &WindSettings) -> Force {
        aerodynamic_force(
            self.area(),
            wind.speed(),
            wind.lift_coefficient,
            wind.air_density(),
        )
    }
}

/// Derive a sail's dimensions from the rig and its overrides.
///
/// Explicit luff/foot/leech overrides win. Otherwise the luff and foot come
/// from the sail's rig dimensions and the leech from their hypotenuse.
pub fn compute_sail(
    sail_type: SailType,
    rig: &RigGeometry,
    overrides: &ConfigOverrides,
) -> Result<Sail, SailError> {
    let config = SailConfig::from_overrides(sail_type, overrides)?;

    let overlap_percent = (sail_type == SailType::Genoa)
        .then(|| config.overlap_percent.unwrap_or(DEFAULT_GENOA_OVERLAP));

    let luff_res = match config.luff {
        Some(luff_len) => Ok(luff_len),
        None => sail_type.default_luff().evaluate(rig),
    };
    let foot_res = match config.foot {
        Some(foot_len) => Ok(foot_len),
        None => rig.require([sail_type.default_foot()]).map(|[j]| {
            let scale = overlap_percent.map_or(1.0, |pct| pct / 100.0);
            from_coord(to_coord(j) * scale)
        }),
    };

    let (luff_len, foot_len) = match (luff_res, foot_res) {
        (Ok(luff_len), Ok(foot_len)) => (luff_len, foot_len),
        (luff_res, foot_res) => {
            let mut fields: Vec<&'static str> = Vec::new();
            for err in [luff_res.err(), foot_res.err()].into_iter().flatten() {
                match err {
                    RigDataError::Invalid(source) => {
                        warn!("Cannot size {}: {}", sail_type, source);
                        return Err(SailError::InvalidRigData {
                            sail: sail_type,
                            source,
                        });
                    }
                    RigDataError::Missing(missing) => {
                        for field in missing.0 {
                            if !fields.contains(&field) {
                                fields.push(field);
                            }
                        }
                    }
                }
            }
            warn!("Cannot size {}: missing {}", sail_type, fields.join(", "));
            return Err(SailError::MissingRigData {
                sail: sail_type,
                fields: MissingDimensions(fields),
            });
        }
    };

    let leech = config
        .leech
        .unwrap_or_else(|| hypotenuse(luff_len, foot_len));

    let sail = Sail {
        sail_type,
        luff: luff_len,
        leech,
        foot: foot_len,
        overlap_percent,
        extra: config.extra,
    };
    debug!(
        "{}: luff {}, foot {}, area {}",
        sail_type,
        DisplayLength(sail.luff),
        DisplayLength(sail.foot),
        DisplayArea(sail.area())
    );
    Ok(sail)
}
