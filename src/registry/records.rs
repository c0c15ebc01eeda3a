use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::capacity::RopeConstructionType;
use crate::registry::store::YachtId;
use crate::rigging::*;
use crate::sails::*;
use crate::types::*;

/// Flat row for one generated sail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SailRecord {
    pub yacht_id: YachtId,
    pub sail_type: String,
    pub luff_m: f64,
    pub leech_m: f64,
    pub foot_m: f64,
    pub area_m2: f64,
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl SailRecord {
    pub fn from_sail(yacht_id: &str, sail: &Sail) -> Self {
        Self {
            yacht_id: yacht_id.to_string(),
            sail_type: sail.sail_type.name().to_string(),
            luff_m: to_coord(sail.luff),
            leech_m: to_coord(sail.leech),
            foot_m: to_coord(sail.foot),
            area_m2: sail.area().get::<square_meter>(),
            extra: sail.extra.clone(),
        }
    }
}

/// Flat row for one generated rope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RopeRecord {
    pub yacht_id: YachtId,
    pub rope_type: String,
    pub construction: RopeConstructionType,
    pub colour: String,
    pub length_m: f64,
    pub diameter_mm: Option<DiameterMm>,
    pub upper_term_type: String,
    pub upper_hardware: Option<String>,
    pub lower_term_type: String,
    pub lower_hardware: Option<String>,
    pub led_aft_m: f64,
    pub required_wl_kg: Option<f64>,
    pub side: Option<Side>,
}

impl RopeRecord {
    pub fn from_rope(yacht_id: &str, rope: &Rope) -> Self {
        Self {
            yacht_id: yacht_id.to_string(),
            rope_type: rope.name(),
            construction: rope.construction_type(),
            colour: rope.colour.clone(),
            length_m: to_coord(rope.length),
            diameter_mm: rope.diameter(),
            upper_term_type: rope.upper_termination.term_type.clone(),
            upper_hardware: rope.upper_termination.hardware.clone(),
            lower_term_type: rope.lower_termination.term_type.clone(),
            lower_hardware: rope.lower_termination.hardware.clone(),
            led_aft_m: to_coord(rope.led_aft),
            required_wl_kg: rope.required_working_load.map(|wl| wl.get::<kilogram>()),
            side: rope.side(),
        }
    }
}

/// Write rope records as a CSV schedule, one row per rope with a header.
pub fn write_rope_schedule<W: Write>(writer: W, records: &[RopeRecord]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_rope_schedule_file(
    path: impl AsRef<Path>,
    records: &[RopeRecord],
) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_rope_schedule(file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::RopeConstruction;
    use crate::config::ConfigOverrides;
    use approx::assert_relative_eq;

    fn genoa_sheet() -> Rope {
        Rope {
            rope_type: RopeType::Sheet(SheetType::Genoa, Some(Side::Port)),
            construction: RopeConstruction::new(RopeConstructionType::BraidBraid, None),
            length: from_coord(31.0),
            colour: "Red".to_string(),
            upper_termination: terminations::covered_splice_snap_shackle(),
            lower_termination: terminations::pull_through_whipping(),
            led_aft: from_coord(0.0),
            required_working_load: None,
        }
    }

    #[test]
    fn test_sail_record() {
        let rig = RigGeometry::new()
            .with(RigDimension::P, from_coord(11.0))
            .with(RigDimension::E, from_coord(3.5));
        let main = compute_sail(SailType::Mainsail, &rig, &ConfigOverrides::new()).unwrap();

        let record = SailRecord::from_sail("yacht-1", &main);
        assert_eq!(record.sail_type, "Mainsail");
        assert_relative_eq!(record.area_m2, 19.25, epsilon = 1e-9);
        assert_relative_eq!(record.luff_m, 11.0);
    }

    #[test]
    fn test_rope_record_flattens_terminations() {
        let record = RopeRecord::from_rope("yacht-1", &genoa_sheet());

        assert_eq!(record.rope_type, "GenoaSheet_Port");
        assert_eq!(record.upper_term_type, "Covered Splice");
        assert_eq!(record.upper_hardware.as_deref(), Some("Snap Shackle"));
        assert_eq!(record.lower_hardware, None);
        assert_eq!(record.diameter_mm, None);
        assert_eq!(record.required_wl_kg, None);
        assert_eq!(record.side, Some(Side::Port));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["construction"], "Braid/Braid");
        assert_eq!(json["side"], "Port");
    }

    #[test]
    fn test_rope_schedule_csv() {
        let records = vec![RopeRecord::from_rope("yacht-1", &genoa_sheet())];
        let mut out = Vec::new();
        write_rope_schedule(&mut out, &records).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "yacht_id,rope_type,construction,colour,length_m,diameter_mm,upper_term_type,\
                 upper_hardware,lower_term_type,lower_hardware,led_aft_m,required_wl_kg,side"
            )
        );
        assert_eq!(
            lines.next(),
            Some("yacht-1,GenoaSheet_Port,Braid/Braid,Red,31.0,,Covered Splice,Snap Shackle,Pull Through Whipping,,0.0,,Port")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_rope_schedule_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.csv");
        let records = vec![RopeRecord::from_rope("yacht-1", &genoa_sheet())];

        write_rope_schedule_file(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("GenoaSheet_Port"));
    }
}
