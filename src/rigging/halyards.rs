use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capacity::*;
use crate::config::*;
use crate::physics::halyard_working_load;
use crate::rigging::rope::*;
use crate::rigging::sheets::{GuyType, SheetType};
use crate::rigging::termination::terminations;
use crate::sails::*;
use crate::types::*;

/// Halyard roles, one per sail (or sail family) hoisted
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum HalyardType {
    Mainsail,
    Genoa,
    Jib,
    Staysail,
    CodeZero,
    /// Hoists either spinnaker
    Spinnaker,
    /// Holds the boom end up; runs the main's track
    ToppingLift,
    Trisail,
}

impl HalyardType {
    pub const ALL: [HalyardType; 8] = [
        HalyardType::Mainsail,
        HalyardType::Genoa,
        HalyardType::Jib,
        HalyardType::Staysail,
        HalyardType::CodeZero,
        HalyardType::Spinnaker,
        HalyardType::ToppingLift,
        HalyardType::Trisail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HalyardType::Mainsail => "MainsailHalyard",
            HalyardType::Genoa => "GenoaHalyard",
            HalyardType::Jib => "JibHalyard",
            HalyardType::Staysail => "StaysailHalyard",
            HalyardType::CodeZero => "CodeZeroHalyard",
            HalyardType::Spinnaker => "SpinnakerHalyard",
            HalyardType::ToppingLift => "ToppingLiftHalyard",
            HalyardType::Trisail => "TrisailHalyard",
        }
    }

    /// Angle between the halyard and the mast at the head of the sail.
    pub fn angle(&self) -> HalyardAngle {
        let degrees = match self {
            HalyardType::Mainsail | HalyardType::ToppingLift | HalyardType::Trisail => 10.0,
            HalyardType::Genoa | HalyardType::Jib | HalyardType::Staysail => 15.0,
            HalyardType::CodeZero => 20.0,
            HalyardType::Spinnaker => 25.0,
        };
        Angle::new::<degree>(degrees)
    }

    /// Sails this halyard can hoist. It is sized for the worst of them.
    pub fn served_sails(&self) -> &'static [SailType] {
        match self {
            HalyardType::Mainsail | HalyardType::ToppingLift => &[SailType::Mainsail],
            HalyardType::Genoa => &[SailType::Genoa],
            HalyardType::Jib => &[SailType::Jib],
            HalyardType::Staysail => &[SailType::Staysail],
            HalyardType::CodeZero => &[SailType::CodeZero],
            HalyardType::Spinnaker => &[SailType::AsymSpinnaker, SailType::SymSpinnaker],
            HalyardType::Trisail => &[SailType::Trisail],
        }
    }

    /// Sheets and guys that come with this halyard, without sides.
    pub fn paired_ropes(&self) -> Vec<RopeType> {
        match self {
            HalyardType::Mainsail => vec![RopeType::Sheet(SheetType::Mainsheet, None)],
            HalyardType::Genoa => vec![RopeType::Sheet(SheetType::Genoa, None)],
            HalyardType::Jib => vec![RopeType::Sheet(SheetType::Jib, None)],
            HalyardType::Staysail => vec![RopeType::Sheet(SheetType::Staysail, None)],
            HalyardType::CodeZero => vec![RopeType::Sheet(SheetType::CodeZero, None)],
            HalyardType::Spinnaker => vec![
                RopeType::Sheet(SheetType::SymSpin, None),
                RopeType::Sheet(SheetType::AsymSpin, None),
                RopeType::Guy(GuyType::SymSpin, None),
            ],
            HalyardType::Trisail => vec![RopeType::Sheet(SheetType::Trisail, None)],
            HalyardType::ToppingLift => Vec::new(),
        }
    }

    pub fn defaults(&self) -> RopeDefaults {
        let (colour, construction) = match self {
            HalyardType::Mainsail => ("Blue Fleck", RopeConstructionType::BraidBraid),
            HalyardType::Genoa => ("Red Fleck", RopeConstructionType::BraidBraid),
            HalyardType::Jib => ("Green Fleck", RopeConstructionType::BraidBraid),
            HalyardType::Staysail => ("Orange Fleck", RopeConstructionType::BraidBraid),
            HalyardType::CodeZero => ("Black Fleck", RopeConstructionType::BraidBraid),
            HalyardType::Spinnaker => ("Yellow Fleck", RopeConstructionType::DyneemaBraid),
            HalyardType::ToppingLift => ("Grey Fleck", RopeConstructionType::BraidBraid),
            HalyardType::Trisail => ("Purple Fleck", RopeConstructionType::BraidBraid),
        };

        // Free-flying sails twist, so they hang from a swivel
        let upper_termination = match self {
            HalyardType::CodeZero | HalyardType::Spinnaker => {
                terminations::covered_splice_swivel_shackle()
            }
            _ => terminations::covered_splice_shackle(),
        };

        RopeDefaults {
            colour,
            construction,
            upper_termination,
            lower_termination: terminations::pull_through_whipping(),
        }
    }

    /// (primary, secondary, number of primary runs) for the length formula.
    fn length_dimensions(&self) -> (RigDimension, RigDimension, f64) {
        match self {
            HalyardType::Mainsail => (RigDimension::MainP, RigDimension::MainE, 2.0),
            HalyardType::ToppingLift => (RigDimension::MainP, RigDimension::MainE, 1.0),
            HalyardType::Genoa => (RigDimension::GenoaI, RigDimension::GenoaJ, 1.0),
            HalyardType::Jib => (RigDimension::JibI, RigDimension::JibJ, 1.0),
            HalyardType::Staysail => (RigDimension::StaysailI, RigDimension::StaysailJ, 1.0),
            HalyardType::CodeZero => (RigDimension::CodeZeroI, RigDimension::CodeZeroJ, 1.0),
            HalyardType::Spinnaker => (RigDimension::SpinI, RigDimension::SpinJ, 1.0),
            HalyardType::Trisail => (RigDimension::TrisailI, RigDimension::TrisailJ, 1.0),
        }
    }
}

impl fmt::Display for HalyardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrounded halyard run: `runs * primary + hypotenuse(primary, secondary) + led_aft + margin`.
pub fn raw_halyard_length(
    halyard: HalyardType,
    rig: &RigGeometry,
    led_aft: Length,
    margin: Length,
) -> Result<Length, RopeError> {
    let (primary, secondary, runs) = halyard.length_dimensions();
    let [primary, secondary] = rig
        .require([primary, secondary])
        .map_err(|e| RopeError::rig_data(RopeType::Halyard(halyard), e))?;

    Ok(primary * runs + hypotenuse(primary, secondary) + led_aft + margin)
}

/// Worst-case working load over every served sail present in the wardrobe.
pub fn required_working_load(
    halyard: HalyardType,
    sails: &SailWardrobe,
    settings: &EngineSettings,
) -> Result<WorkingLoad, RopeError> {
    let mut worst = Mass::new::<kilogram>(0.0);

    for sail_type in halyard.served_sails() {
        let Some(sail) = sails.get(sail_type) else {
            continue;
        };
        let force = sail.aerodynamic_force(&settings.wind);
        let load = halyard_working_load(force, halyard.angle(), &settings.safety_factors);
        trace!(
            "{} load from {}: {} at {} gives {}",
            halyard,
            sail_type,
            DisplayForce(force),
            DisplayAngle(halyard.angle()),
            DisplayMass(load)
        );

        if load > worst {
            worst = load;
        }
    }

    if worst.get::<kilogram>() <= 0.0 {
        return Err(RopeError::NoValidSail {
            halyard,
            sails: halyard.served_sails().to_vec(),
        });
    }
    Ok(worst)
}

/// Size a halyard: length from the rig, diameter from the worst sail load.
pub fn build_halyard(
    halyard: HalyardType,
    ctx: &SizingContext<'_>,
    config: &RopeConfig,
) -> Result<Rope, RopeError> {
    let rope_type = RopeType::Halyard(halyard);
    let resolved = merge(&halyard.defaults(), config);

    let raw = raw_halyard_length(halyard, ctx.rig, resolved.led_aft, resolved.length_safety_margin)?;
    let length = ctx.finish_length(raw);

    let required = required_working_load(halyard, ctx.sails, ctx.settings)?;
    let diameter = match resolved.diameter {
        Some(diameter) => {
            let strength = ctx.override_strength(rope_type, resolved.construction, diameter)?;
            if strength < required {
                warn!(
                    "{} overridden to {} mm ({}), below required {}",
                    rope_type,
                    diameter,
                    DisplayMass(strength),
                    DisplayMass(required)
                );
            }
            diameter
        }
        None => ctx
            .strength_table
            .select_minimum_diameter(resolved.construction, required)
            .map_err(|source| RopeError::NoSuitableDiameter { rope: rope_type, source })?,
    };

    debug!(
        "{}: {} {} mm, {}, WL {}",
        rope_type,
        resolved.construction,
        diameter,
        DisplayLength(length),
        DisplayMass(required)
    );

    Ok(Rope::from_resolved(
        rope_type,
        resolved,
        Some(diameter),
        length,
        Some(required),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn m(value: f64) -> Length {
        Length::new::<meter>(value)
    }

    fn rig() -> RigGeometry {
        RigGeometry::new()
            .with(RigDimension::I, m(12.0))
            .with(RigDimension::J, m(4.0))
            .with(RigDimension::P, m(11.0))
            .with(RigDimension::E, m(3.5))
    }

    fn wardrobe(rig: &RigGeometry, sail_types: &[SailType]) -> SailWardrobe {
        sail_types
            .iter()
            .map(|&t| (t, compute_sail(t, rig, &ConfigOverrides::new()).unwrap()))
            .collect()
    }

    fn config(value: serde_json::Value) -> RopeConfig {
        RopeConfig::from_overrides(&serde_json::from_value(value).unwrap()).unwrap()
    }

    #[test]
    fn test_main_halyard_length() {
        let raw = raw_halyard_length(HalyardType::Mainsail, &rig(), m(2.0), m(1.0)).unwrap();
        assert_relative_eq!(raw.get::<meter>(), 36.543396380615196, epsilon = 1e-9);
        assert_relative_eq!(round_up_half_meter(raw).get::<meter>(), 37.0);
    }

    #[test]
    fn test_headsail_halyard_length_uses_own_dimensions() {
        let rig = rig()
            .with(RigDimension::GenoaI, m(10.0))
            .with(RigDimension::GenoaJ, m(4.0));
        let raw = raw_halyard_length(HalyardType::Genoa, &rig, m(0.0), m(1.0)).unwrap();
        assert_relative_eq!(raw.get::<meter>(), 10.0 + 10.770329614269007 + 1.0, epsilon = 1e-9);

        let topping = raw_halyard_length(HalyardType::ToppingLift, &rig, m(0.0), m(0.0)).unwrap();
        assert_relative_eq!(topping.get::<meter>(), 11.0 + 11.543396380615196, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_rig_data() {
        let rig = RigGeometry::new().with(RigDimension::I, m(12.0));
        let err = raw_halyard_length(HalyardType::Jib, &rig, m(0.0), m(1.0)).unwrap_err();
        assert_eq!(
            err,
            RopeError::MissingRigData {
                rope: RopeType::Halyard(HalyardType::Jib),
                fields: MissingDimensions(vec!["jib_j"]),
            }
        );
    }

    #[test]
    fn test_spinnaker_halyard_without_spinnakers() {
        let rig = rig();
        let sails = wardrobe(&rig, &[SailType::Mainsail, SailType::Genoa]);

        let err = required_working_load(HalyardType::Spinnaker, &sails, &EngineSettings::default())
            .unwrap_err();
        assert_eq!(
            err,
            RopeError::NoValidSail {
                halyard: HalyardType::Spinnaker,
                sails: vec![SailType::AsymSpinnaker, SailType::SymSpinnaker],
            }
        );
        assert_eq!(
            err.to_string(),
            "SpinnakerHalyard has no sail on the yacht to size against (serves AsymSpinnaker, SymSpinnaker)"
        );
    }

    #[test]
    fn test_no_wind_means_no_valid_sail() {
        let rig = rig();
        let sails = wardrobe(&rig, &[SailType::Mainsail]);
        let calm = EngineSettings::default().with_wind_speed(Velocity::new::<knot>(0.0));

        assert!(matches!(
            required_working_load(HalyardType::Mainsail, &sails, &calm),
            Err(RopeError::NoValidSail { .. })
        ));
    }

    #[test]
    fn test_load_is_worst_case_sail() {
        let rig = rig()
            .with(RigDimension::SpinI, m(13.0))
            .with(RigDimension::SpinJ, m(4.5));
        let mut sails = wardrobe(&rig, &[SailType::SymSpinnaker]);
        let settings = EngineSettings::default();

        let sym_only = required_working_load(HalyardType::Spinnaker, &sails, &settings).unwrap();

        let big_asym = compute_sail(
            SailType::AsymSpinnaker,
            &rig,
            &serde_json::from_value(json!({"luff": 15.0, "foot": 7.0})).unwrap(),
        )
        .unwrap();
        let asym_force = big_asym.aerodynamic_force(&settings.wind);
        sails.insert(SailType::AsymSpinnaker, big_asym);

        let both = required_working_load(HalyardType::Spinnaker, &sails, &settings).unwrap();
        assert!(both > sym_only);
        assert_relative_eq!(
            both.get::<kilogram>(),
            halyard_working_load(asym_force, HalyardType::Spinnaker.angle(), &settings.safety_factors)
                .get::<kilogram>(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_main_halyard_load_matches_formula() {
        let rig = rig();
        let sails = wardrobe(&rig, &[SailType::Mainsail]);
        let load = required_working_load(HalyardType::Mainsail, &sails, &EngineSettings::default())
            .unwrap();

        // 2808.378 N * sin(10°) * 1.25 * 1.5 / 9.80665
        assert_relative_eq!(load.get::<kilogram>(), 93.241, epsilon = 1e-3);
    }

    #[test]
    fn test_build_main_halyard() {
        let rig = rig();
        let sails = wardrobe(&rig, &[SailType::Mainsail]);
        let settings = EngineSettings::default();
        let ctx = SizingContext {
            rig: &rig,
            boat_length: Some(m(10.0)),
            sails: &sails,
            settings: &settings,
            strength_table: preset_table(),
        };

        let rope = build_halyard(HalyardType::Mainsail, &ctx, &config(json!({"led_aft": 2.0})))
            .unwrap();
        assert_relative_eq!(rope.length.get::<meter>(), 37.0);
        assert_eq!(rope.diameter(), Some(6));
        assert_eq!(rope.colour, "Blue Fleck");
        assert_eq!(rope.upper_termination, terminations::covered_splice_shackle());
        assert_eq!(rope.lower_termination, terminations::pull_through_whipping());
        assert!(rope.required_working_load.is_some());
    }

    #[test]
    fn test_heavy_load_picks_bigger_diameter_or_fails() {
        let rig = rig()
            .with(RigDimension::GenoaI, m(20.0))
            .with(RigDimension::GenoaJ, m(8.0));
        let sails = wardrobe(&rig, &[SailType::Genoa]);
        let settings = EngineSettings::default()
            .with_wind_speed(Velocity::new::<knot>(40.0))
            .with_safety_factors(SafetyFactors {
                halyard_load: 4.0,
                dynamic_load: 2.0,
                length: 1.0,
            });
        let ctx = SizingContext {
            rig: &rig,
            boat_length: None,
            sails: &sails,
            settings: &settings,
            strength_table: preset_table(),
        };

        // Braid/Braid tops out at 4500 kg
        let err = build_halyard(HalyardType::Genoa, &ctx, &RopeConfig::default()).unwrap_err();
        assert!(matches!(err, RopeError::NoSuitableDiameter { .. }));

        let rope = build_halyard(
            HalyardType::Genoa,
            &ctx,
            &config(json!({"construction": "Dyneema/Dyneema"})),
        )
        .unwrap();
        let required = rope.required_working_load.unwrap();
        assert!(rope.construction.total_break_strength(preset_table()) >= required);
        assert_eq!(rope.construction_type(), RopeConstructionType::DyneemaDyneema);
    }

    #[test]
    fn test_diameter_override_is_kept() {
        let rig = rig();
        let sails = wardrobe(&rig, &[SailType::Mainsail]);
        let settings = EngineSettings::default();
        let ctx = SizingContext {
            rig: &rig,
            boat_length: None,
            sails: &sails,
            settings: &settings,
            strength_table: preset_table(),
        };

        let rope = build_halyard(HalyardType::Mainsail, &ctx, &config(json!({"diameter": 10})))
            .unwrap();
        assert_eq!(rope.diameter(), Some(10));
        assert_eq!(rope.construction.diameter, Some(10));

        // Stocked sizes are kept as asked
        let rope = build_halyard(HalyardType::Mainsail, &ctx, &config(json!({"diameter": 6})))
            .unwrap();
        assert_eq!(rope.diameter(), Some(6));
    }

    #[test]
    fn test_diameter_override_must_be_stocked() {
        let rig = rig();
        let sails = wardrobe(&rig, &[SailType::Mainsail]);
        let settings = EngineSettings::default();
        let ctx = SizingContext {
            rig: &rig,
            boat_length: None,
            sails: &sails,
            settings: &settings,
            strength_table: preset_table(),
        };

        // 7 mm is a candidate size, but not made in Braid/Braid
        let err = build_halyard(HalyardType::Mainsail, &ctx, &config(json!({"diameter": 7})))
            .unwrap_err();
        assert_eq!(
            err,
            RopeError::NoSuitableDiameter {
                rope: RopeType::Halyard(HalyardType::Mainsail),
                source: StrengthError::NotStocked {
                    construction: RopeConstructionType::BraidBraid,
                    diameter: 7,
                },
            }
        );
        assert_eq!(
            err.to_string(),
            "MainsailHalyard: Braid/Braid is not stocked in 7 mm"
        );

        let rope = build_halyard(
            HalyardType::Mainsail,
            &ctx,
            &config(json!({"diameter": 7, "construction": "Dyneema/Braid"})),
        )
        .unwrap();
        assert_eq!(rope.diameter(), Some(7));
    }
}
