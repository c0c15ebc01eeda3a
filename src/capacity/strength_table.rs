use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::types::*;

/// Diameters a rope can be specified in, smallest first (mm).
pub const CANDIDATE_DIAMETERS_MM: [DiameterMm; 6] = [6, 7, 8, 10, 12, 14];

/// Core/cover material combination of a rope
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum RopeConstructionType {
    /// Polyester braid core, polyester braid cover
    #[serde(rename = "Braid/Braid", alias = "BRAID_BRAID")]
    BraidBraid,

    /// Dyneema core, polyester braid cover
    #[serde(rename = "Dyneema/Braid", alias = "DYNEEMA_BRAID")]
    DyneemaBraid,

    /// Dyneema core, Dyneema cover
    #[serde(rename = "Dyneema/Dyneema", alias = "DYNEEMA_DYNEEMA")]
    DyneemaDyneema,
}

impl RopeConstructionType {
    pub const ALL: [RopeConstructionType; 3] = [
        RopeConstructionType::BraidBraid,
        RopeConstructionType::DyneemaBraid,
        RopeConstructionType::DyneemaDyneema,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RopeConstructionType::BraidBraid => "Braid/Braid",
            RopeConstructionType::DyneemaBraid => "Dyneema/Braid",
            RopeConstructionType::DyneemaDyneema => "Dyneema/Dyneema",
        }
    }

    /// (core, cover) materials
    pub fn materials(&self) -> (&'static str, &'static str) {
        match self {
            RopeConstructionType::BraidBraid => ("braid", "braid"),
            RopeConstructionType::DyneemaBraid => ("dyneema", "braid"),
            RopeConstructionType::DyneemaDyneema => ("dyneema", "dyneema"),
        }
    }
}

impl fmt::Display for RopeConstructionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown rope construction: {0}")]
pub struct UnknownConstruction(pub String);

impl FromStr for RopeConstructionType {
    type Err = UnknownConstruction;

    /// Accepts "Braid/Braid", "BRAID_BRAID", "braid braid" and similar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match compact.as_str() {
            "braidbraid" => Ok(RopeConstructionType::BraidBraid),
            "dyneemabraid" => Ok(RopeConstructionType::DyneemaBraid),
            "dyneemadyneema" => Ok(RopeConstructionType::DyneemaDyneema),
            _ => Err(UnknownConstruction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrengthError {
    #[error("No {construction} diameter up to {largest} mm reaches the required working load of {required}")]
    NoSuitableDiameter {
        required: DisplayMass,
        construction: RopeConstructionType,
        largest: DiameterMm,
    },

    #[error("{construction} is not stocked in {diameter} mm")]
    NotStocked {
        construction: RopeConstructionType,
        diameter: DiameterMm,
    },
}

/// A rope's construction and, once sized, its diameter.
///
/// The diameter lives only here; ropes read it back through their
/// construction so the two cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RopeConstruction {
    pub construction_type: RopeConstructionType,
    pub diameter: Option<DiameterMm>,
}

impl RopeConstruction {
    pub fn new(construction_type: RopeConstructionType, diameter: Option<DiameterMm>) -> Self {
        Self {
            construction_type,
            diameter,
        }
    }

    /// Breaking strength from the given table, zero if unsized or not catalogued.
    pub fn total_break_strength(&self, table: &StrengthTable) -> Mass {
        match self.diameter {
            Some(d) => table.total_break_strength(self.construction_type, d),
            None => Mass::new::<kilogram>(0.0),
        }
    }
}

/// Breaking strength by construction and diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthTable {
    entries: BTreeMap<RopeConstructionType, BTreeMap<DiameterMm, Mass>>,
}

impl Default for StrengthTable {
    fn default() -> Self {
        Self::preset()
    }
}

impl StrengthTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Catalogue breaking strengths (kg).
    pub fn preset() -> Self {
        let mut table = Self::empty();

        let rows: [(RopeConstructionType, &[(DiameterMm, f64)]); 3] = [
            (
                RopeConstructionType::BraidBraid,
                &[(6, 820.0), (8, 2400.0), (10, 2400.0), (12, 3200.0), (14, 4500.0)],
            ),
            (
                RopeConstructionType::DyneemaBraid,
                &[
                    (4, 1600.0),
                    (5, 2300.0),
                    (6, 3100.0),
                    (7, 4100.0),
                    (8, 5200.0),
                    (10, 7700.0),
                    (12, 10500.0),
                    (14, 13500.0),
                ],
            ),
            (
                RopeConstructionType::DyneemaDyneema,
                &[
                    (4, 2000.0),
                    (5, 3000.0),
                    (6, 4000.0),
                    (7, 5200.0),
                    (8, 6500.0),
                    (10, 9500.0),
                    (12, 13000.0),
                    (14, 17000.0),
                ],
            ),
        ];

        for (construction, strengths) in rows {
            for &(diameter, kg) in strengths {
                table.insert(construction, diameter, Mass::new::<kilogram>(kg));
            }
        }
        table
    }

    pub fn insert(&mut self, construction: RopeConstructionType, diameter: DiameterMm, strength: Mass) {
        self.entries
            .entry(construction)
            .or_default()
            .insert(diameter, strength);
    }

    /// Breaking strength for a construction and diameter.
    ///
    /// An uncatalogued pair returns zero, meaning the diameter is not
    /// available in that construction.
    pub fn total_break_strength(&self, construction: RopeConstructionType, diameter: DiameterMm) -> Mass {
        self.entries
            .get(&construction)
            .and_then(|row| row.get(&diameter))
            .copied()
            .unwrap_or_else(|| Mass::new::<kilogram>(0.0))
    }

    /// Breaking strength of a pair that must be catalogued.
    pub fn stocked_strength(
        &self,
        construction: RopeConstructionType,
        diameter: DiameterMm,
    ) -> Result<Mass, StrengthError> {
        let strength = self.total_break_strength(construction, diameter);
        if strength > Mass::new::<kilogram>(0.0) {
            Ok(strength)
        } else {
            Err(StrengthError::NotStocked {
                construction,
                diameter,
            })
        }
    }

    /// Smallest candidate diameter whose breaking strength meets `required`.
    pub fn select_minimum_diameter(
        &self,
        construction: RopeConstructionType,
        required: Mass,
    ) -> Result<DiameterMm, StrengthError> {
        let zero = Mass::new::<kilogram>(0.0);

        CANDIDATE_DIAMETERS_MM
            .iter()
            .copied()
            .find(|&d| {
                let strength = self.total_break_strength(construction, d);
                strength > zero && strength >= required
            })
            .ok_or(StrengthError::NoSuitableDiameter {
                required: DisplayMass(required),
                construction,
                largest: CANDIDATE_DIAMETERS_MM[CANDIDATE_DIAMETERS_MM.len() - 1],
            })
    }

    /// Catalogued (diameter, strength) pairs for a construction, ascending.
    pub fn row(&self, construction: RopeConstructionType) -> Vec<(DiameterMm, Mass)> {
        self.entries
            .get(&construction)
            .map(|row| row.iter().map(|(d, m)| (*d, *m)).collect())
            .unwrap_or_default()
    }

    pub fn construction_types(&self) -> Vec<RopeConstructionType> {
        self.entries.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|row| row.is_empty())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.values().map(|row| row.len()).sum()
    }
}

/// Shared catalogue table.
pub fn preset_table() -> &'static StrengthTable {
    static PRESET: OnceLock<StrengthTable> = OnceLock::new();
    PRESET.get_or_init(StrengthTable::preset)
}

/// Catalogue breaking strength; zero when the pair is not stocked.
pub fn total_break_strength(construction: RopeConstructionType, diameter: DiameterMm) -> Mass {
    preset_table().total_break_strength(construction, diameter)
}

/// Smallest catalogue diameter meeting the required working load.
pub fn select_minimum_diameter(
    construction: RopeConstructionType,
    required: Mass,
) -> Result<DiameterMm, StrengthError> {
    preset_table().select_minimum_diameter(construction, required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kg(value: f64) -> Mass {
        Mass::new::<kilogram>(value)
    }

    #[test]
    fn test_preset_lookup() {
        let strength = total_break_strength(RopeConstructionType::DyneemaBraid, 10);
        assert_relative_eq!(strength.get::<kilogram>(), 7700.0);

        let strength = total_break_strength(RopeConstructionType::BraidBraid, 14);
        assert_relative_eq!(strength.get::<kilogram>(), 4500.0);
    }

    #[test]
    fn test_missing_entry_is_zero() {
        let strength = total_break_strength(RopeConstructionType::BraidBraid, 7);
        assert_relative_eq!(strength.get::<kilogram>(), 0.0);

        let strength = total_break_strength(RopeConstructionType::DyneemaDyneema, 16);
        assert_relative_eq!(strength.get::<kilogram>(), 0.0);
    }

    #[test]
    fn test_braid_braid_2500kg_selects_12mm() {
        let diameter = select_minimum_diameter(RopeConstructionType::BraidBraid, kg(2500.0)).unwrap();
        assert_eq!(diameter, 12);
    }

    #[test]
    fn test_exact_match_is_accepted() {
        let diameter = select_minimum_diameter(RopeConstructionType::BraidBraid, kg(2400.0)).unwrap();
        assert_eq!(diameter, 8);
    }

    #[test]
    fn test_uncatalogued_diameter_never_selected() {
        // 7 mm Braid/Braid is not stocked, so a tiny load still gets 6 mm and
        // a load above 6 mm jumps straight to 8 mm.
        assert_eq!(
            select_minimum_diameter(RopeConstructionType::BraidBraid, kg(0.0)).unwrap(),
            6
        );
        assert_eq!(
            select_minimum_diameter(RopeConstructionType::BraidBraid, kg(821.0)).unwrap(),
            8
        );
    }

    #[test]
    fn test_no_suitable_diameter() {
        let err = select_minimum_diameter(RopeConstructionType::BraidBraid, kg(4500.1)).unwrap_err();
        match err {
            StrengthError::NoSuitableDiameter { required, construction, largest } => {
                assert_relative_eq!(required.0.get::<kilogram>(), 4500.1);
                assert_eq!(construction, RopeConstructionType::BraidBraid);
                assert_eq!(largest, 14);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stocked_strength() {
        let table = preset_table();
        assert_relative_eq!(
            table
                .stocked_strength(RopeConstructionType::BraidBraid, 8)
                .unwrap()
                .get::<kilogram>(),
            2400.0
        );

        let err = table
            .stocked_strength(RopeConstructionType::BraidBraid, 7)
            .unwrap_err();
        assert_eq!(
            err,
            StrengthError::NotStocked {
                construction: RopeConstructionType::BraidBraid,
                diameter: 7,
            }
        );
        assert_eq!(err.to_string(), "Braid/Braid is not stocked in 7 mm");
    }

    #[test]
    fn test_selection_is_smallest_sufficient_candidate() {
        for construction in RopeConstructionType::ALL {
            let mut load = 0.0;
            while load < 20_000.0 {
                let required = kg(load);
                match select_minimum_diameter(construction, required) {
                    Ok(d) => {
                        assert!(total_break_strength(construction, d) >= required);
                        for smaller in CANDIDATE_DIAMETERS_MM.iter().filter(|&&c| c < d) {
                            assert!(total_break_strength(construction, *smaller) < required
                                || total_break_strength(construction, *smaller) == kg(0.0));
                        }
                    }
                    Err(_) => {
                        assert!(total_break_strength(construction, 14) < required);
                    }
                }
                load += 250.0;
            }
        }
    }

    #[test]
    fn test_strength_non_decreasing_over_stocked_candidates() {
        for construction in RopeConstructionType::ALL {
            let stocked: Vec<f64> = CANDIDATE_DIAMETERS_MM
                .iter()
                .map(|&d| total_break_strength(construction, d).get::<kilogram>())
                .filter(|&s| s > 0.0)
                .collect();
            assert!(stocked.windows(2).all(|w| w[0] <= w[1]), "{construction}");
        }
    }

    #[test]
    fn test_construction_parsing_and_materials() {
        assert_eq!("Braid/Braid".parse::<RopeConstructionType>(), Ok(RopeConstructionType::BraidBraid));
        assert_eq!("DYNEEMA_BRAID".parse::<RopeConstructionType>(), Ok(RopeConstructionType::DyneemaBraid));
        assert_eq!("dyneema dyneema".parse::<RopeConstructionType>(), Ok(RopeConstructionType::DyneemaDyneema));
        assert!("wire".parse::<RopeConstructionType>().is_err());

        assert_eq!(RopeConstructionType::DyneemaBraid.materials(), ("dyneema", "braid"));
        assert_eq!(RopeConstructionType::DyneemaBraid.to_string(), "Dyneema/Braid");
    }

    #[test]
    fn test_construction_strength_follows_diameter() {
        let mut construction = RopeConstruction::new(RopeConstructionType::DyneemaDyneema, None);
        assert_relative_eq!(construction.total_break_strength(preset_table()).get::<kilogram>(), 0.0);

        construction.diameter = Some(8);
        assert_relative_eq!(
            construction.total_break_strength(preset_table()).get::<kilogram>(),
            6500.0
        );
    }
}
