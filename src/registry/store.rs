//! Persistence collaborator for per-yacht rigging data.
//!
//! The generation service only talks to a [`RiggingStore`]. Two stores ship
//! with the crate: [`InMemoryStore`] and [`JsonFileStore`], which keeps every
//! yacht in one JSON document and rewrites it atomically on each change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::ConfigOverrides;
use crate::registry::records::*;
use crate::sails::{InvalidDimension, RigGeometry, positive_length};
use crate::types::*;

/// Externally assigned yacht identifier
pub type YachtId = String;

/// What the sizing engine needs to know about the boat itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YachtParticulars {
    #[serde(default)]
    pub rig: RigGeometry,
    /// Overall length; sheets and guys are sized from it
    #[serde(default)]
    pub boat_length: Option<Length>,
}

impl YachtParticulars {
    /// Every recorded measurement must be a finite, positive length.
    pub fn validate(&self) -> Result<(), InvalidDimension> {
        self.rig.validate()?;
        if let Some(length) = self.boat_length {
            positive_length("boat_length", length)?;
        }
        Ok(())
    }
}

/// A sail or rope type the owner has opted into, with its overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossibleType {
    pub type_name: String,
    #[serde(default)]
    pub config: ConfigOverrides,
}

impl PossibleType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            config: ConfigOverrides::new(),
        }
    }

    pub fn with_config(type_name: impl Into<String>, config: ConfigOverrides) -> Self {
        Self {
            type_name: type_name.into(),
            config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("No particulars recorded for yacht `{0}`")]
    YachtNotFound(YachtId),

    #[error("Invalid yacht particulars: {0}")]
    InvalidParticulars(#[from] InvalidDimension),
}

pub trait RiggingStore {
    fn particulars(&self, yacht: &str) -> Result<YachtParticulars, StoreError>;

    fn put_particulars(
        &mut self,
        yacht: &str,
        particulars: YachtParticulars,
    ) -> Result<(), StoreError>;

    /// Opted-in sail types, in insertion order.
    fn possible_sails(&self, yacht: &str) -> Result<Vec<PossibleType>, StoreError>;

    /// Opted-in rope types, in insertion order.
    fn possible_ropes(&self, yacht: &str) -> Result<Vec<PossibleType>, StoreError>;

    /// Insert, or replace the entry with the same type name.
    fn upsert_possible_sail(
        &mut self,
        yacht: &str,
        possible: PossibleType,
    ) -> Result<(), StoreError>;

    fn upsert_possible_rope(
        &mut self,
        yacht: &str,
        possible: PossibleType,
    ) -> Result<(), StoreError>;

    /// Drop every stored sail for the yacht and store these instead.
    fn replace_sails(&mut self, yacht: &str, records: Vec<SailRecord>) -> Result<(), StoreError>;

    fn replace_ropes(&mut self, yacht: &str, records: Vec<RopeRecord>) -> Result<(), StoreError>;

    fn sails(&self, yacht: &str) -> Result<Vec<SailRecord>, StoreError>;

    fn ropes(&self, yacht: &str) -> Result<Vec<RopeRecord>, StoreError>;

    /// Remove the generated ropes, returning how many there were.
    fn delete_ropes(&mut self, yacht: &str) -> Result<usize, StoreError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct YachtEntry {
    #[serde(default)]
    particulars: Option<YachtParticulars>,
    #[serde(default)]
    possible_sails: Vec<PossibleType>,
    #[serde(default)]
    possible_ropes: Vec<PossibleType>,
    #[serde(default)]
    sails: Vec<SailRecord>,
    #[serde(default)]
    ropes: Vec<RopeRecord>,
}

fn upsert(list: &mut Vec<PossibleType>, possible: PossibleType) {
    match list.iter_mut().find(|p| p.type_name == possible.type_name) {
        Some(existing) => *existing = possible,
        None => list.push(possible),
    }
}

/// Every yacht's data, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    yachts: BTreeMap<YachtId, YachtEntry>,
}

impl StoreDocument {
    fn entry(&self, yacht: &str) -> Option<&YachtEntry> {
        self.yachts.get(yacht)
    }

    fn entry_mut(&mut self, yacht: &str) -> &mut YachtEntry {
        self.yachts.entry(yacht.to_string()).or_default()
    }

    fn particulars(&self, yacht: &str) -> Result<YachtParticulars, StoreError> {
        self.entry(yacht)
            .and_then(|e| e.particulars.clone())
            .ok_or_else(|| StoreError::YachtNotFound(yacht.to_string()))
    }

    fn read<T: Clone>(&self, yacht: &str, field: impl Fn(&YachtEntry) -> &Vec<T>) -> Vec<T> {
        self.entry(yacht).map(|e| field(e).clone()).unwrap_or_default()
    }
}

/// Store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    document: StoreDocument,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RiggingStore for InMemoryStore {
    fn particulars(&self, yacht: &str) -> Result<YachtParticulars, StoreError> {
        self.document.particulars(yacht)
    }

    fn put_particulars(
        &mut self,
        yacht: &str,
        particulars: YachtParticulars,
    ) -> Result<(), StoreError> {
        particulars.validate()?;
        self.document.entry_mut(yacht).particulars = Some(particulars);
        Ok(())
    }

    fn possible_sails(&self, yacht: &str) -> Result<Vec<PossibleType>, StoreError> {
        Ok(self.document.read(yacht, |e| &e.possible_sails))
    }

    fn possible_ropes(&self, yacht: &str) -> Result<Vec<PossibleType>, StoreError> {
        Ok(self.document.read(yacht, |e| &e.possible_ropes))
    }

    fn upsert_possible_sail(
        &mut self,
        yacht: &str,
        possible: PossibleType,
    ) -> Result<(), StoreError> {
        upsert(&mut self.document.entry_mut(yacht).possible_sails, possible);
        Ok(())
    }

    fn upsert_possible_rope(
        &mut self,
        yacht: &str,
        possible: PossibleType,
    ) -> Result<(), StoreError> {
        upsert(&mut self.document.entry_mut(yacht).possible_ropes, possible);
        Ok(())
    }

    fn replace_sails(&mut self, yacht: &str, records: Vec<SailRecord>) -> Result<(), StoreError> {
        self.document.entry_mut(yacht).sails = records;
        Ok(())
    }

    fn replace_ropes(&mut self, yacht: &str, records: Vec<RopeRecord>) -> Result<(), StoreError> {
        self.document.entry_mut(yacht).ropes = records;
        Ok(())
    }

    fn sails(&self, yacht: &str) -> Result<Vec<SailRecord>, StoreError> {
        Ok(self.document.read(yacht, |e| &e.sails))
    }

    fn ropes(&self, yacht: &str) -> Result<Vec<RopeRecord>, StoreError> {
        Ok(self.document.read(yacht, |e| &e.ropes))
    }

    fn delete_ropes(&mut self, yacht: &str) -> Result<usize, StoreError> {
        Ok(std::mem::take(&mut self.document.entry_mut(yacht).ropes).len())
    }
}

/// Store backed by a single JSON file.
///
/// Reads go to disk every time, so changes made by another process are
/// picked up on the next generation pass. A missing or empty file is an
/// empty store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Write through a temporary file in the same directory, then rename.
    fn save(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut file = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut file, document)?;
        file.as_file().sync_all()?;
        file.persist(&self.path)?;
        Ok(())
    }

    fn update<T>(&self, change: impl FnOnce(&mut StoreDocument) -> T) -> Result<T, StoreError> {
        let mut document = self.load()?;
        let result = change(&mut document);
        self.save(&document)?;
        Ok(result)
    }
}

impl RiggingStore for JsonFileStore {
    fn particulars(&self, yacht: &str) -> Result<YachtParticulars, StoreError> {
        self.load()?.particulars(yacht)
    }

    fn put_particulars(
        &mut self,
        yacht: &str,
        particulars: YachtParticulars,
    ) -> Result<(), StoreError> {
        particulars.validate()?;
        self.update(|doc| doc.entry_mut(yacht).particulars = Some(particulars))
    }

    fn possible_sails(&self, yacht: &str) -> Result<Vec<PossibleType>, StoreError> {
        Ok(self.load()?.read(yacht, |e| &e.possible_sails))
    }

    fn possible_ropes(&self, yacht: &str) -> Result<Vec<PossibleType>, StoreError> {
        Ok(self.load()?.read(yacht, |e| &e.possible_ropes))
    }

    fn upsert_possible_sail(
        &mut self,
        yacht: &str,
        possible: PossibleType,
    ) -> Result<(), StoreError> {
        self.update(|doc| upsert(&mut doc.entry_mut(yacht).possible_sails, possible))
    }

    fn upsert_possible_rope(
        &mut self,
        yacht: &str,
        possible: PossibleType,
    ) -> Result<(), StoreError> {
        self.update(|doc| upsert(&mut doc.entry_mut(yacht).possible_ropes, possible))
    }

    fn replace_sails(&mut self, yacht: &str, records: Vec<SailRecord>) -> Result<(), StoreError> {
        self.update(|doc| doc.entry_mut(yacht).sails = records)
    }

    fn replace_ropes(&mut self, yacht: &str, records: Vec<RopeRecord>) -> Result<(), StoreError> {
        self.update(|doc| doc.entry_mut(yacht).ropes = records)
    }

    fn sails(&self, yacht: &str) -> Result<Vec<SailRecord>, StoreError> {
        Ok(self.load()?.read(yacht, |e| &e.sails))
    }

    fn ropes(&self, yacht: &str) -> Result<Vec<RopeRecord>, StoreError> {
        Ok(self.load()?.read(yacht, |e| &e.ropes))
    }

    fn delete_ropes(&mut self, yacht: &str) -> Result<usize, StoreError> {
        self.update(|doc| std::mem::take(&mut doc.entry_mut(yacht).ropes).len())
    }
}
