use log::{debug, info, warn};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

use crate::capacity::StrengthTable;
use crate::config::*;
use crate::registry::names::UnknownType;
use crate::registry::records::*;
use crate::registry::store::*;
use crate::rigging::*;
use crate::sails::*;
use crate::types::*;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    UnknownType(#[from] UnknownType),

    #[error("`{0}` is not a halyard")]
    NotAHalyard(String),

    #[error(transparent)]
    Sail(#[from] SailError),

    #[error(transparent)]
    Rope(#[from] RopeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidOverride(#[from] InvalidOverrideValue),
}

/// One type that could not be generated, and why
#[derive(Debug)]
pub struct GenerationFailure {
    pub type_name: String,
    pub error: RegistryError,
}

/// Outcome of one generation pass: everything that was built, keyed by
/// canonical name, plus every type that failed.
#[derive(Debug)]
pub struct GenerationReport<T> {
    pub generated: BTreeMap<String, T>,
    pub failures: Vec<GenerationFailure>,
}

impl<T> GenerationReport<T> {
    fn new() -> Self {
        Self {
            generated: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, type_name: &str, error: RegistryError) {
        warn!("Skipping {}: {}", type_name, error);
        self.failures.push(GenerationFailure {
            type_name: type_name.to_string(),
            error,
        });
    }

    /// True when nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure(&self, type_name: &str) -> Option<&RegistryError> {
        self.failures
            .iter()
            .find(|f| f.type_name == type_name)
            .map(|f| &f.error)
    }
}

#[derive(Debug)]
pub struct RiggingReport {
    pub sails: GenerationReport<Sail>,
    pub ropes: GenerationReport<Rope>,
}

/// A bare sheet or guy name stands for both sides.
fn expand_sides(rope: RopeType) -> Vec<RopeType> {
    if rope.is_paired() && rope.side().is_none() {
        Side::BOTH
            .into_iter()
            .map(|side| rope.with_side(Some(side)))
            .collect()
    } else {
        vec![rope]
    }
}

fn compute_wardrobe(rig: &RigGeometry, possible: &[PossibleType]) -> GenerationReport<Sail> {
    let mut report = GenerationReport::new();
    for entry in possible {
        let sail_type = match entry.type_name.parse::<SailType>() {
            Ok(sail_type) => sail_type,
            Err(e) => {
                report.fail(&entry.type_name, e.into());
                continue;
            }
        };
        match compute_sail(sail_type, rig, &entry.config) {
            Ok(sail) => {
                report.generated.insert(sail_type.name().to_string(), sail);
            }
            Err(e) => report.fail(sail_type.name(), e.into()),
        }
    }
    report
}

/// Sails that were opted into but could not be sized.
fn failed_sails(report: &GenerationReport<Sail>) -> BTreeMap<SailType, SailError> {
    report
        .failures
        .iter()
        .filter_map(|failure| match &failure.error {
            RegistryError::Sail(e) => failure
                .type_name
                .parse::<SailType>()
                .ok()
                .map(|sail| (sail, e.clone())),
            _ => None,
        })
        .collect()
}

/// A halyard left without a sail because a served sail failed reports that
/// sail's failure rather than an empty wardrobe.
fn blame_failed_sail(error: RegistryError, failed: &BTreeMap<SailType, SailError>) -> RegistryError {
    if let RegistryError::Rope(RopeError::NoValidSail { halyard, sails }) = &error {
        let culprit = sails
            .iter()
            .find_map(|sail| failed.get(sail).map(|e| (*sail, e.clone())));
        if let Some((sail, source)) = culprit {
            return RopeError::SailFailed {
                halyard: *halyard,
                sail,
                source,
            }
            .into();
        }
    }
    error
}

fn size_rope(
    rope: RopeType,
    ctx: &SizingContext<'_>,
    overrides: &ConfigOverrides,
) -> Result<Rope, RegistryError> {
    let config = RopeConfig::from_overrides(overrides)?;
    let built = match rope {
        RopeType::Halyard(halyard) => build_halyard(halyard, ctx, &config),
        RopeType::Sheet(sheet, side) => build_sheet(sheet, side, ctx, &config),
        RopeType::Guy(guy, side) => build_guy(guy, side, ctx, &config),
    }?;
    Ok(built)
}

/// Per-yacht sail and rope generation over a [`RiggingStore`].
///
/// Every pass re-reads the yacht's particulars and possible types from the
/// store, sizes everything, and replaces the stored records wholesale.
#[derive(Debug)]
pub struct RiggingService<S> {
    store: S,
    settings: EngineSettings,
    strength_table: StrengthTable,
}

impl<S: RiggingStore> RiggingService<S> {
    pub fn new(store: S, settings: EngineSettings) -> Self {
        Self {
            store,
            settings,
            strength_table: StrengthTable::preset(),
        }
    }

    pub fn with_strength_table(mut self, strength_table: StrengthTable) -> Self {
        self.strength_table = strength_table;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn strength_table(&self) -> &StrengthTable {
        &self.strength_table
    }

    /// Opt a yacht into a sail type. Adding one twice keeps its config.
    pub fn add_sail_type(&mut self, yacht: &str, name: &str) -> Result<SailType, RegistryError> {
        let sail_type: SailType = name.parse()?;
        let existing = self.store.possible_sails(yacht)?;

        if !existing.iter().any(|p| p.type_name == sail_type.name()) {
            self.store
                .upsert_possible_sail(yacht, PossibleType::new(sail_type.name()))?;
            debug!("{}: added sail {}", yacht, sail_type);
        }
        Ok(sail_type)
    }

    /// Opt a yacht into a rope type. A bare sheet or guy name adds both sides.
    pub fn add_rope_type(&mut self, yacht: &str, name: &str) -> Result<Vec<RopeType>, RegistryError> {
        let rope: RopeType = name.parse()?;
        let added = expand_sides(rope);
        self.add_ropes(yacht, &added)?;
        Ok(added)
    }

    fn add_ropes(&mut self, yacht: &str, ropes: &[RopeType]) -> Result<(), RegistryError> {
        let existing = self.store.possible_ropes(yacht)?;
        for rope in ropes {
            let canonical = rope.to_string();
            if !existing.iter().any(|p| p.type_name == canonical) {
                self.store
                    .upsert_possible_rope(yacht, PossibleType::new(canonical))?;
                debug!("{}: added rope {}", yacht, rope);
            }
        }
        Ok(())
    }

    /// Add a halyard with its run aft recorded, plus its paired sheets and
    /// guys on both sides.
    pub fn add_halyard_with_sheets(
        &mut self,
        yacht: &str,
        halyard: &str,
        led_aft: Length,
    ) -> Result<Vec<RopeType>, RegistryError> {
        let halyard = match halyard.parse::<RopeType>()? {
            RopeType::Halyard(h) => h,
            _ => return Err(RegistryError::NotAHalyard(halyard.to_string())),
        };

        let led_aft: ConfigOverrides = [("led_aft".to_string(), json!(to_coord(led_aft)))]
            .into_iter()
            .collect();
        self.set_rope_config(yacht, halyard.name(), &led_aft)?;

        let mut added = vec![RopeType::Halyard(halyard)];
        added.extend(halyard.paired_ropes().into_iter().flat_map(expand_sides));
        self.add_ropes(yacht, &added)?;

        info!("{}: added {} with {} paired ropes", yacht, halyard, added.len() - 1);
        Ok(added)
    }

    /// Lay overrides over a sail's stored config. Values are validated before
    /// anything is written.
    pub fn set_sail_config(
        &mut self,
        yacht: &str,
        name: &str,
        overrides: &ConfigOverrides,
    ) -> Result<SailType, RegistryError> {
        let sail_type: SailType = name.parse()?;
        let current = self
            .store
            .possible_sails(yacht)?
            .into_iter()
            .find(|p| p.type_name == sail_type.name())
            .map(|p| p.config)
            .unwrap_or_default();

        let merged = overlay(&current, overrides);
        SailConfig::from_overrides(sail_type, &merged)?;

        self.store
            .upsert_possible_sail(yacht, PossibleType::with_config(sail_type.name(), merged))?;
        Ok(sail_type)
    }

    /// Lay overrides over a rope's stored config. A bare sheet or guy name
    /// updates both sides.
    pub fn set_rope_config(
        &mut self,
        yacht: &str,
        name: &str,
        overrides: &ConfigOverrides,
    ) -> Result<Vec<RopeType>, RegistryError> {
        let rope: RopeType = name.parse()?;
        let targets = expand_sides(rope);
        let existing = self.store.possible_ropes(yacht)?;

        let mut updates = Vec::with_capacity(targets.len());
        for target in &targets {
            let canonical = target.to_string();
            let current = existing
                .iter()
                .find(|p| p.type_name == canonical)
                .map(|p| p.config.clone())
                .unwrap_or_default();

            let merged = overlay(&current, overrides);
            RopeConfig::from_overrides(&merged)?;
            updates.push(PossibleType::with_config(canonical, merged));
        }

        for update in updates {
            self.store.upsert_possible_rope(yacht, update)?;
        }
        Ok(targets)
    }

    /// Size every possible sail and replace the yacht's stored sails.
    pub fn generate_sails(&mut self, yacht: &str) -> Result<GenerationReport<Sail>, RegistryError> {
        let particulars = self.store.particulars(yacht)?;
        let report = compute_wardrobe(&particulars.rig, &self.store.possible_sails(yacht)?);

        let records = report
            .generated
            .values()
            .map(|sail| SailRecord::from_sail(yacht, sail))
            .collect();
        self.store.replace_sails(yacht, records)?;

        info!(
            "{}: generated {} sails, {} failed",
            yacht,
            report.generated.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Size every possible rope and replace the yacht's stored ropes.
    ///
    /// Halyards are sized against the sails the yacht's possible sail types
    /// produce right now, not against previously stored sail records.
    pub fn generate_ropes(&mut self, yacht: &str) -> Result<GenerationReport<Rope>, RegistryError> {
        let particulars = self.store.particulars(yacht)?;
        let sails = compute_wardrobe(&particulars.rig, &self.store.possible_sails(yacht)?);
        self.generate_ropes_with(yacht, &particulars, &sails)
    }

    pub fn generate_all(&mut self, yacht: &str) -> Result<RiggingReport, RegistryError> {
        let sails = self.generate_sails(yacht)?;
        let particulars = self.store.particulars(yacht)?;
        let ropes = self.generate_ropes_with(yacht, &particulars, &sails)?;
        Ok(RiggingReport { sails, ropes })
    }

    fn generate_ropes_with(
        &mut self,
        yacht: &str,
        particulars: &YachtParticulars,
        sails: &GenerationReport<Sail>,
    ) -> Result<GenerationReport<Rope>, RegistryError> {
        let wardrobe: SailWardrobe = sails
            .generated
            .values()
            .map(|sail| (sail.sail_type, sail.clone()))
            .collect();
        let failed = failed_sails(sails);

        let mut report = GenerationReport::new();
        let mut configs: BTreeMap<RopeType, ConfigOverrides> = BTreeMap::new();
        for entry in self.store.possible_ropes(yacht)? {
            match entry.type_name.parse::<RopeType>() {
                Ok(rope) => {
                    configs.insert(rope, entry.config);
                }
                Err(e) => report.fail(&entry.type_name, e.into()),
            }
        }

        debug!(
            "{}: sizing ropes for {} of wind",
            yacht,
            DisplayVelocity(self.settings.wind.speed())
        );
        let ctx = SizingContext {
            rig: &particulars.rig,
            boat_length: particulars.boat_length,
            sails: &wardrobe,
            settings: &self.settings,
            strength_table: &self.strength_table,
        };

        let empty = ConfigOverrides::new();
        let ropes: BTreeSet<RopeType> = configs.keys().flat_map(|r| expand_sides(*r)).collect();
        for rope in ropes {
            let own = configs.get(&rope).unwrap_or(&empty);
            // Config stored under the bare name applies to both sides;
            // anything set on one side wins.
            let overrides = match (rope.side(), configs.get(&rope.with_side(None))) {
                (Some(_), Some(shared)) => overlay(shared, own),
                _ => own.clone(),
            };

            let name = rope.to_string();
            match size_rope(rope, &ctx, &overrides) {
                Ok(built) => {
                    report.generated.insert(name, built);
                }
                Err(e) => report.fail(&name, blame_failed_sail(e, &failed)),
            }
        }

        let records = report
            .generated
            .values()
            .map(|rope| RopeRecord::from_rope(yacht, rope))
            .collect();
        self.store.replace_ropes(yacht, records)?;

        info!(
            "{}: generated {} ropes, {} failed",
            yacht,
            report.generated.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// A stored rope by any spelling of its name.
    pub fn rope(&self, yacht: &str, name: &str) -> Result<Option<RopeRecord>, RegistryError> {
        let canonical = name.parse::<RopeType>()?.to_string();
        Ok(self
            .store
            .ropes(yacht)?
            .into_iter()
            .find(|r| r.rope_type == canonical))
    }

    pub fn ropes(&self, yacht: &str) -> Result<Vec<RopeRecord>, RegistryError> {
        Ok(self.store.ropes(yacht)?)
    }

    pub fn sails(&self, yacht: &str) -> Result<Vec<SailRecord>, RegistryError> {
        Ok(self.store.sails(yacht)?)
    }

    pub fn delete_ropes(&mut self, yacht: &str) -> Result<usize, RegistryError> {
        let removed = self.store.delete_ropes(yacht)?;
        info!("{}: deleted {} ropes", yacht, removed);
        Ok(removed)
    }
}
