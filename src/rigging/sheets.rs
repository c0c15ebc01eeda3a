use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capacity::RopeConstructionType;
use crate::rigging::rope::*;
use crate::rigging::termination::terminations;
use crate::sails::*;
use crate::types::*;

/// Sheets, one per trimmed sail
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SheetType {
    Mainsheet,
    Genoa,
    Jib,
    Staysail,
    SymSpin,
    AsymSpin,
    CodeZero,
    Trisail,
}

impl SheetType {
    pub const ALL: [SheetType; 8] = [
        SheetType::Mainsheet,
        SheetType::Genoa,
        SheetType::Jib,
        SheetType::Staysail,
        SheetType::SymSpin,
        SheetType::AsymSpin,
        SheetType::CodeZero,
        SheetType::Trisail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SheetType::Mainsheet => "Mainsheet",
            SheetType::Genoa => "GenoaSheet",
            SheetType::Jib => "JibSheet",
            SheetType::Staysail => "StaysailSheet",
            SheetType::SymSpin => "SymSpinSheet",
            SheetType::AsymSpin => "AsymSpinSheet",
            SheetType::CodeZero => "CodeZeroSheet",
            SheetType::Trisail => "TrisailSheet",
        }
    }

    /// Foot dimension and the (foot, boat length) coefficients of the run.
    fn length_rule(&self) -> (RigDimension, f64, f64) {
        match self {
            SheetType::Mainsheet => (RigDimension::MainE, 2.0, 1.5),
            SheetType::Genoa => (RigDimension::GenoaJ, 2.5, 2.0),
            SheetType::Jib => (RigDimension::JibJ, 2.2, 1.8),
            SheetType::Staysail => (RigDimension::StaysailJ, 2.1, 1.7),
            SheetType::SymSpin => (RigDimension::SpinJ, 3.0, 2.5),
            SheetType::AsymSpin => (RigDimension::SpinJ, 2.8, 2.2),
            SheetType::CodeZero => (RigDimension::CodeZeroJ, 2.6, 2.1),
            SheetType::Trisail => (RigDimension::TrisailJ, 1.8, 1.5),
        }
    }

    pub fn defaults(&self) -> RopeDefaults {
        let (colour, upper_termination, lower_termination) = match self {
            SheetType::Mainsheet => ("White", terminations::splice(), terminations::whipping()),
            SheetType::Genoa => (
                "Red",
                terminations::covered_splice_snap_shackle(),
                terminations::pull_through_whipping(),
            ),
            SheetType::Jib => ("Solid Blue", terminations::whipping(), terminations::whipping()),
            SheetType::Staysail => (
                "Silver Grey",
                terminations::splice_small_bail_snap_shackle(),
                terminations::whipping(),
            ),
            SheetType::SymSpin => (
                "Solid Yellow",
                terminations::covered_splice_snap_shackle(),
                terminations::pull_through_whipping(),
            ),
            SheetType::AsymSpin => (
                "Solid Red",
                terminations::covered_splice_snap_shackle(),
                terminations::pull_through_whipping(),
            ),
            SheetType::CodeZero => (
                "Purple",
                terminations::covered_splice_snap_shackle(),
                terminations::pull_through_whipping(),
            ),
            SheetType::Trisail => (
                "Solid Orange",
                terminations::splice_small_bail_snap_shackle(),
                terminations::whipping(),
            ),
        };

        RopeDefaults {
            colour,
            construction: RopeConstructionType::BraidBraid,
            upper_termination,
            lower_termination,
        }
    }
}

impl fmt::Display for SheetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Spinnaker pole guys
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum GuyType {
    SymSpin,
}

impl GuyType {
    pub const ALL: [GuyType; 1] = [GuyType::SymSpin];

    pub fn name(&self) -> &'static str {
        match self {
            GuyType::SymSpin => "SymSpinGuy",
        }
    }

    pub fn defaults(&self) -> RopeDefaults {
        match self {
            GuyType::SymSpin => RopeDefaults {
                colour: "Solid Green",
                construction: RopeConstructionType::BraidBraid,
                upper_termination: terminations::splice_small_bail_snap_shackle(),
                lower_termination: terminations::whipping(),
            },
        }
    }
}

impl fmt::Display for GuyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guy runs are this many boat lengths, plus the margin
pub const GUY_BOAT_LENGTHS: f64 = 2.5;

fn require_boat_length(
    rope: RopeType,
    boat_length: Option<Length>,
    missing: &mut Vec<&'static str>,
) -> Result<Length, RopeError> {
    match boat_length {
        Some(length) => positive_length("boat_length", length)
            .map_err(|source| RopeError::InvalidRigData { rope, source }),
        None => {
            debug!("{} needs the boat length", rope);
            missing.push("boat_length");
            Ok(from_coord(0.0))
        }
    }
}

/// Unrounded sheet run: `a * foot + b * boat_length`.
pub fn raw_sheet_length(
    sheet: SheetType,
    side: Option<Side>,
    rig: &RigGeometry,
    boat_length: Option<Length>,
) -> Result<Length, RopeError> {
    let rope = RopeType::Sheet(sheet, side);
    let (dimension, foot_coefficient, boat_coefficient) = sheet.length_rule();

    let mut missing = Vec::new();
    let foot_len = match rig.require([dimension]) {
        Ok([value]) => value,
        Err(RigDataError::Missing(MissingDimensions(fields))) => {
            missing.extend(fields);
            from_coord(0.0)
        }
        Err(RigDataError::Invalid(source)) => {
            return Err(RopeError::InvalidRigData { rope, source });
        }
    };
    let boat_length = require_boat_length(rope, boat_length, &mut missing)?;

    if !missing.is_empty() {
        return Err(RopeError::MissingRigData {
            rope,
            fields: MissingDimensions(missing),
        });
    }
    Ok(foot_len * foot_coefficient + boat_length * boat_coefficient)
}

/// Unrounded guy run: `2.5 * boat_length + margin`.
pub fn raw_guy_length(
    guy: GuyType,
    side: Option<Side>,
    boat_length: Option<Length>,
    margin: Length,
) -> Result<Length, RopeError> {
    let rope = RopeType::Guy(guy, side);
    let mut missing = Vec::new();
    let boat_length = require_boat_length(rope, boat_length, &mut missing)?;

    if !missing.is_empty() {
        return Err(RopeError::MissingRigData {
            rope,
            fields: MissingDimensions(missing),
        });
    }
    Ok(boat_length * GUY_BOAT_LENGTHS + margin)
}

/// Size one side's sheet. Sheets are not load-sized; a diameter is only
/// recorded when overridden.
pub fn build_sheet(
    sheet: SheetType,
    side: Option<Side>,
    ctx: &SizingContext<'_>,
    config: &RopeConfig,
) -> Result<Rope, RopeError> {
    let rope_type = RopeType::Sheet(sheet, side);
    let resolved = merge(&sheet.defaults(), config);

    let raw = raw_sheet_length(sheet, side, ctx.rig, ctx.boat_length)?;
    let length = ctx.finish_length(raw);
    debug!("{}: {}", rope_type, DisplayLength(length));

    let diameter = resolved.diameter;
    if let Some(d) = diameter {
        ctx.override_strength(rope_type, resolved.construction, d)?;
    }
    Ok(Rope::from_resolved(rope_type, resolved, diameter, length, None))
}

pub fn build_guy(
    guy: GuyType,
    side: Option<Side>,
    ctx: &SizingContext<'_>,
    config: &RopeConfig,
) -> Result<Rope, RopeError> {
    let rope_type = RopeType::Guy(guy, side);
    let resolved = merge(&guy.defaults(), config);

    let raw = raw_guy_length(guy, side, ctx.boat_length, resolved.length_safety_margin)?;
    let length = ctx.finish_length(raw);
    debug!("{}: {}", rope_type, DisplayLength(length));

    let diameter = resolved.diameter;
    if let Some(d) = diameter {
        ctx.override_strength(rope_type, resolved.construction, d)?;
    }
    Ok(Rope::from_resolved(rope_type, resolved, diameter, length, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::{StrengthError, preset_table};
    use crate::config::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn m(value: f64) -> Length {
        Length::new::<meter>(value)
    }

    fn rig() -> RigGeometry {
        RigGeometry::from_base(m(12.0), m(4.0), m(11.0), m(3.5))
    }

    #[test]
    fn test_sheet_coefficients() {
        let rig = rig().with(RigDimension::SpinJ, m(5.0));
        let boat = Some(m(10.0));

        let cases = [
            (SheetType::Mainsheet, 2.0 * 3.5 + 1.5 * 10.0),
            (SheetType::Genoa, 2.5 * 4.0 + 2.0 * 10.0),
            (SheetType::Jib, 2.2 * 4.0 + 1.8 * 10.0),
            (SheetType::Staysail, 2.1 * 4.0 + 1.7 * 10.0),
            (SheetType::SymSpin, 3.0 * 5.0 + 2.5 * 10.0),
            (SheetType::AsymSpin, 2.8 * 5.0 + 2.2 * 10.0),
            (SheetType::CodeZero, 2.6 * 4.0 + 2.1 * 10.0),
            (SheetType::Trisail, 1.8 * 4.0 + 1.5 * 10.0),
        ];
        for (sheet, expected) in cases {
            let raw = raw_sheet_length(sheet, None, &rig, boat).unwrap();
            assert_relative_eq!(raw.get::<meter>(), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sheet_without_boat_length() {
        let err = raw_sheet_length(SheetType::Genoa, Some(Side::Port), &RigGeometry::new(), None)
            .unwrap_err();
        assert_eq!(
            err,
            RopeError::MissingRigData {
                rope: RopeType::Sheet(SheetType::Genoa, Some(Side::Port)),
                fields: MissingDimensions(vec!["genoa_j", "boat_length"]),
            }
        );
        assert_eq!(
            err.to_string(),
            "GenoaSheet_Port is missing rig data: genoa_j, boat_length"
        );
    }

    #[test]
    fn test_rejects_non_positive_boat_length() {
        let err = raw_sheet_length(SheetType::Mainsheet, Some(Side::Port), &rig(), Some(m(-10.0)))
            .unwrap_err();
        assert_eq!(
            err,
            RopeError::InvalidRigData {
                rope: RopeType::Sheet(SheetType::Mainsheet, Some(Side::Port)),
                source: InvalidDimension {
                    field: "boat_length",
                    value: -10.0,
                },
            }
        );
        assert_eq!(
            err.to_string(),
            "Mainsheet_Port has invalid rig data: boat_length must be a positive length, got -10 m"
        );

        assert!(matches!(
            raw_guy_length(GuyType::SymSpin, None, Some(m(0.0)), m(1.0)),
            Err(RopeError::InvalidRigData { .. })
        ));

        let bent = rig().with(RigDimension::GenoaJ, m(-4.0));
        assert!(matches!(
            raw_sheet_length(SheetType::Genoa, None, &bent, Some(m(10.0))),
            Err(RopeError::InvalidRigData {
                source: InvalidDimension { field: "genoa_j", .. },
                ..
            })
        ));
    }

    #[test]
    fn test_guy_length() {
        let raw = raw_guy_length(GuyType::SymSpin, None, Some(m(8.0)), m(1.0)).unwrap();
        assert_relative_eq!(raw.get::<meter>(), 21.0);

        assert!(matches!(
            raw_guy_length(GuyType::SymSpin, None, None, m(1.0)),
            Err(RopeError::MissingRigData { .. })
        ));
    }

    #[test]
    fn test_build_sheet_per_side() {
        let rig = rig();
        let sails = SailWardrobe::new();
        let settings = EngineSettings::default();
        let ctx = SizingContext {
            rig: &rig,
            boat_length: Some(m(10.3)),
            sails: &sails,
            settings: &settings,
            strength_table: preset_table(),
        };

        let port = build_sheet(SheetType::Genoa, Some(Side::Port), &ctx, &RopeConfig::default())
            .unwrap();
        let starboard = build_sheet(
            SheetType::Genoa,
            Some(Side::Starboard),
            &ctx,
            &RopeConfig::default(),
        )
        .unwrap();

        // 2.5 * 4 + 2.0 * 10.3 = 30.6
        assert_relative_eq!(port.length.get::<meter>(), 31.0);
        assert_eq!(port.name(), "GenoaSheet_Port");
        assert_eq!(starboard.side(), Some(Side::Starboard));
        assert_eq!(port.colour, starboard.colour);
        assert_eq!(port.diameter(), None);
        assert_eq!(port.required_working_load, None);
    }

    #[test]
    fn test_sheet_overrides_and_length_factor() {
        let rig = rig();
        let sails = SailWardrobe::new();
        let settings = EngineSettings::default().with_safety_factors(SafetyFactors {
            length: 1.1,
            ..SafetyFactors::default()
        });
        let ctx = SizingContext {
            rig: &rig,
            boat_length: Some(m(10.0)),
            sails: &sails,
            settings: &settings,
            strength_table: preset_table(),
        };
        let config = RopeConfig::from_overrides(
            &serde_json::from_value(json!({"diameter": 12, "colour": "Navy"})).unwrap(),
        )
        .unwrap();

        let sheet = build_sheet(SheetType::Mainsheet, None, &ctx, &config).unwrap();
        // (7 + 15) * 1.1 = 24.2
        assert_relative_eq!(sheet.length.get::<meter>(), 24.5);
        assert_eq!(sheet.diameter(), Some(12));
        assert_eq!(sheet.colour, "Navy");
        assert_eq!(sheet.upper_termination, terminations::splice());
    }

    #[test]
    fn test_build_guy() {
        let rig = rig();
        let sails = SailWardrobe::new();
        let settings = EngineSettings::default();
        let ctx = SizingContext {
            rig: &rig,
            boat_length: Some(m(9.1)),
            sails: &sails,
            settings: &settings,
            strength_table: preset_table(),
        };

        let guy = build_guy(GuyType::SymSpin, Some(Side::Port), &ctx, &RopeConfig::default())
            .unwrap();
        // 2.5 * 9.1 + 1 = 23.75
        assert_relative_eq!(guy.length.get::<meter>(), 24.0);
        assert_eq!(guy.colour, "Solid Green");
        assert_eq!(guy.upper_termination, terminations::splice_small_bail_snap_shackle());
    }

    #[test]
    fn test_unstocked_diameter_override_fails() {
        let rig = rig();
        let sails = SailWardrobe::new();
        let settings = EngineSettings::default();
        let ctx = SizingContext {
            rig: &rig,
            boat_length: Some(m(10.0)),
            sails: &sails,
            settings: &settings,
            strength_table: preset_table(),
        };
        let config = RopeConfig::from_overrides(
            &serde_json::from_value(json!({"diameter": 7})).unwrap(),
        )
        .unwrap();

        let err = build_guy(GuyType::SymSpin, Some(Side::Port), &ctx, &config).unwrap_err();
        assert!(matches!(
            err,
            RopeError::NoSuitableDiameter {
                source: StrengthError::NotStocked { diameter: 7, .. },
                ..
            }
        ));
        assert!(build_sheet(SheetType::Jib, None, &ctx, &config).is_err());
    }
}
