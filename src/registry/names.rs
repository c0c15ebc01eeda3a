//! Symbolic type names.
//!
//! Input names are matched ignoring case, spaces, underscores and hyphens,
//! then canonicalised to one display form: `MainsailHalyard`,
//! `GenoaSheet_Port`, `SymSpinnaker`.

use std::str::FromStr;

use crate::rigging::*;
use crate::sails::SailType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown type `{0}`")]
pub struct UnknownType(pub String);

/// Lowercase alphanumerics only.
fn compact(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn halyard_alias(key: &str) -> Option<HalyardType> {
    let halyard = match key {
        "mainhalyard" | "mainsailhalyard" => HalyardType::Mainsail,
        "genoa" | "genoahalyard" => HalyardType::Genoa,
        "jib" | "jibhalyard" => HalyardType::Jib,
        "staysail" | "staysailhalyard" => HalyardType::Staysail,
        "codezero" | "codezerohalyard" => HalyardType::CodeZero,
        "spinnaker" | "spinnakerhalyard" | "spinhalyard" => HalyardType::Spinnaker,
        "toppinglift" | "toppinglifthalyard" => HalyardType::ToppingLift,
        "trisail" | "trisailhalyard" => HalyardType::Trisail,
        _ => return None,
    };
    Some(halyard)
}

fn sheet_alias(key: &str) -> Option<SheetType> {
    let sheet = match key {
        "mainsheet" | "mainsailsheet" => SheetType::Mainsheet,
        "genoasheet" => SheetType::Genoa,
        "jibsheet" => SheetType::Jib,
        "staysailsheet" => SheetType::Staysail,
        "symspinsheet" | "symspinnakersheet" | "symmetricspinnakersheet" => SheetType::SymSpin,
        "asymspinsheet" | "asymspinnakersheet" | "asymmetricspinnakersheet" => {
            SheetType::AsymSpin
        }
        "codezerosheet" => SheetType::CodeZero,
        "trisailsheet" => SheetType::Trisail,
        _ => return None,
    };
    Some(sheet)
}

fn guy_alias(key: &str) -> Option<GuyType> {
    match key {
        "symspinguy" | "symspinnakerguy" | "symmetricspinnakerguy" | "spinnakerguy" => {
            Some(GuyType::SymSpin)
        }
        _ => None,
    }
}

fn sail_alias(key: &str) -> Option<SailType> {
    let sail = match key {
        "main" | "mainsail" => SailType::Mainsail,
        "jib" => SailType::Jib,
        "genoa" => SailType::Genoa,
        "staysail" => SailType::Staysail,
        "codezero" => SailType::CodeZero,
        "symspinnaker" | "symmetricspinnaker" | "symspin" => SailType::SymSpinnaker,
        "asymspinnaker" | "asymmetricspinnaker" | "asymspin" => SailType::AsymSpinnaker,
        "trisail" => SailType::Trisail,
        _ => return None,
    };
    Some(sail)
}

/// Split a trailing side off a compacted name.
fn split_side(key: &str) -> (&str, Option<Side>) {
    if let Some(base) = key.strip_suffix("starboard") {
        (base, Some(Side::Starboard))
    } else if let Some(base) = key.strip_suffix("port") {
        (base, Some(Side::Port))
    } else {
        (key, None)
    }
}

impl FromStr for RopeType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = compact(s);

        if let Some(halyard) = halyard_alias(&key) {
            return Ok(RopeType::Halyard(halyard));
        }

        let (base, side) = split_side(&key);
        if let Some(sheet) = sheet_alias(base) {
            return Ok(RopeType::Sheet(sheet, side));
        }
        if let Some(guy) = guy_alias(base) {
            return Ok(RopeType::Guy(guy, side));
        }

        Err(UnknownType(s.to_string()))
    }
}

impl FromStr for SailType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        sail_alias(&compact(s)).ok_or_else(|| UnknownType(s.to_string()))
    }
}

/// Canonical rope name, or the input unchanged when it is not recognised.
///
/// Callers that need to reject unknown names should parse into
/// [`RopeType`] instead.
pub fn normalize_rope_type(name: &str) -> String {
    name.parse::<RopeType>()
        .map(|rope| rope.to_string())
        .unwrap_or_else(|_| name.to_string())
}

/// Canonical sail name, or the input unchanged when it is not recognised.
pub fn normalize_sail_type(name: &str) -> String {
    name.parse::<SailType>()
        .map(|sail| sail.name().to_string())
        .unwrap_or_else(|_| name.to_string())
}

/// Every canonical rope name, with sheets and guys on both sides.
pub fn all_rope_types() -> Vec<RopeType> {
    let mut ropes: Vec<RopeType> = HalyardType::ALL.into_iter().map(RopeType::Halyard).collect();
    for side in Side::BOTH {
        ropes.extend(SheetType::ALL.into_iter().map(|s| RopeType::Sheet(s, Some(side))));
        ropes.extend(GuyType::ALL.into_iter().map(|g| RopeType::Guy(g, Some(side))));
    }
    ropes
}
