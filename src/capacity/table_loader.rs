use crate::capacity::strength_table::*;
use crate::types::*;

use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Error types for strength table loading
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),

    #[error(transparent)]
    UnknownConstruction(#[from] UnknownConstruction),

    #[error("Row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// One line of a strength CSV: `construction,diameter_mm,break_strength,unit`
#[derive(Debug, Deserialize)]
struct StrengthRow {
    construction: String,
    diameter_mm: DiameterMm,
    break_strength: f64,
    unit: String,
}

impl StrengthTable {
    /// Read a table from CSV. Any bad row fails the whole table.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, TableError> {
        let mut table = Self::empty();
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        for (index, row) in csv_reader.deserialize::<StrengthRow>().enumerate() {
            let row = row?;
            let construction: RopeConstructionType = row.construction.parse()?;
            let strength = MassValue::new(row.break_strength, row.unit).to_mass()?;

            if !row.break_strength.is_finite() || row.break_strength <= 0.0 {
                return Err(TableError::InvalidRow {
                    row: index + 1,
                    reason: format!("break strength must be positive, got {}", row.break_strength),
                });
            }
            if row.diameter_mm == 0 {
                return Err(TableError::InvalidRow {
                    row: index + 1,
                    reason: "diameter must be positive".into(),
                });
            }

            table.insert(construction, row.diameter_mm, strength);
        }

        Ok(table)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let file = fs::File::open(path.as_ref())?;
        Self::from_csv_reader(io::BufReader::new(file))
    }

    /// Merge every `.csv` table in a directory. Unreadable files are skipped.
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let mut table = Self::empty();
        let mut paths: Vec<_> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("csv"))
            .collect();
        paths.sort();

        for path in paths {
            match Self::from_csv_path(&path) {
                Ok(loaded) => {
                    debug!("Loaded strength table {}", path.display());
                    table.merge(loaded);
                }
                Err(e) => warn!("Skipped strength table {}: {}", path.display(), e),
            }
        }
        Ok(table)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Entries from `other` replace matching entries here.
    pub fn merge(&mut self, other: StrengthTable) {
        for construction in other.construction_types() {
            for (diameter, strength) in other.row(construction) {
                self.insert(construction, diameter, strength);
            }
        }
    }

    /// Check that each construction can be sized against this table.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        for construction in self.construction_types() {
            let mut errors = Vec::new();
            let row = self.row(construction);

            for (diameter, strength) in &row {
                let kg = strength.get::<kilogram>();
                if !kg.is_finite() || kg <= 0.0 {
                    errors.push(format!("{} mm: non-positive strength {}", diameter, kg));
                }
            }

            let stocked: Vec<(DiameterMm, Mass)> = CANDIDATE_DIAMETERS_MM
                .iter()
                .map(|&d| (d, self.total_break_strength(construction, d)))
                .filter(|(_, s)| s.get::<kilogram>() > 0.0)
                .collect();

            if stocked.is_empty() {
                errors.push("no candidate diameter is stocked".into());
            }

            for pair in stocked.windows(2) {
                let (smaller, weaker) = (pair[0], pair[1]);
                if weaker.1 < smaller.1 {
                    errors.push(format!(
                        "{} mm ({}) is weaker than {} mm ({})",
                        weaker.0,
                        DisplayMass(weaker.1),
                        smaller.0,
                        DisplayMass(smaller.1),
                    ));
                }
            }

            if !errors.is_empty() {
                report.add_errors(construction, errors);
            }
        }

        report
    }
}

/// Validation report for strength tables
#[derive(Debug, Default)]
pub struct ValidationReport {
    errors: BTreeMap<RopeConstructionType, Vec<String>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    pub fn add_errors(&mut self, construction: RopeConstructionType, errors: Vec<String>) {
        self.errors.entry(construction).or_default().extend(errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(|v| v.len()).sum()
    }

    pub fn errors_for(&self, construction: RopeConstructionType) -> &[String] {
        self.errors.get(&construction).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return writeln!(f, "All strength tables valid");
        }

        writeln!(f, "Validation errors found:")?;
        for (construction, errors) in &self.errors {
            writeln!(f, "\n{}", construction)?;
            for error in errors {
                writeln!(f, " - {}", error)?;
            }
        }
        Ok(())
    }
}
