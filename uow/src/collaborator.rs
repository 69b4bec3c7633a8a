//! Read-only lookups the generators depend on: the target catalog (Kepler ID
//! to sky group) and the pixel log (target-table boundaries, data presence).
//!
//! Both are traits so a launch can back them with a database session; the
//! in-memory versions here serve the CLI and the tests.

use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::params::CadenceType;
use crate::task::IntRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    LongCadence,
    ShortCadence,
    Background,
}

impl TargetType {
    pub fn cadence_type(self) -> CadenceType {
        match self {
            TargetType::LongCadence | TargetType::Background => CadenceType::Long,
            TargetType::ShortCadence => CadenceType::Short,
        }
    }
}

impl From<CadenceType> for TargetType {
    fn from(cadence_type: CadenceType) -> Self {
        match cadence_type {
            CadenceType::Long => TargetType::LongCadence,
            CadenceType::Short => TargetType::ShortCadence,
        }
    }
}

/// Cadence span during which one target table was in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTableBoundary {
    pub target_table_id: i32,
    pub cadence_start: i32,
    pub cadence_end: i32,
}

impl TargetTableBoundary {
    pub fn new(target_table_id: i32, cadence_start: i32, cadence_end: i32) -> Self {
        Self {
            target_table_id,
            cadence_start,
            cadence_end,
        }
    }
}

impl fmt::Display for TargetTableBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table {} [{},{}]",
            self.target_table_id, self.cadence_start, self.cadence_end
        )
    }
}

pub trait CatalogLookup {
    /// Smallest and largest Kepler ID in the catalog, `None` when empty.
    fn kepler_id_range(&self) -> anyhow::Result<Option<IntRange>>;

    /// Sorted Kepler IDs present in `[start, end]`.
    fn kepler_ids(&self, start: i32, end: i32) -> anyhow::Result<Vec<i32>>;

    /// Sky group of each known ID. Unknown IDs are simply absent.
    fn sky_groups(&self, kepler_ids: &[i32]) -> anyhow::Result<HashMap<i32, i32>>;
}

pub trait LogStore {
    /// Boundaries of every table seen in `[start, end]`, ascending by start.
    fn target_table_boundaries(
        &self,
        target_type: TargetType,
        start: i32,
        end: i32,
    ) -> anyhow::Result<Vec<TargetTableBoundary>>;

    fn has_data(&self, cadence_type: CadenceType, start: i32, end: i32) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryCatalog {
    sky_group_by_kepler_id: BTreeMap<i32, i32>,
}

impl InMemoryCatalog {
    pub fn new(sky_group_by_kepler_id: BTreeMap<i32, i32>) -> Self {
        Self {
            sky_group_by_kepler_id,
        }
    }

    /// Reads a JSON object of `"kepler id": sky group` entries.
    pub fn from_json_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        let sky_group_by_kepler_id: BTreeMap<i32, i32> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse catalog {}", path.display()))?;
        Ok(Self::new(sky_group_by_kepler_id))
    }

    pub fn len(&self) -> usize {
        self.sky_group_by_kepler_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sky_group_by_kepler_id.is_empty()
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn kepler_id_range(&self) -> anyhow::Result<Option<IntRange>> {
        let first = self.sky_group_by_kepler_id.keys().next();
        let last = self.sky_group_by_kepler_id.keys().next_back();
        Ok(first
            .zip(last)
            .map(|(start, end)| IntRange::new(*start, *end)))
    }

    fn kepler_ids(&self, start: i32, end: i32) -> anyhow::Result<Vec<i32>> {
        if end < start {
            return Ok(Vec::new());
        }
        Ok(self
            .sky_group_by_kepler_id
            .range(start..=end)
            .map(|(kepler_id, _)| *kepler_id)
            .collect())
    }

    fn sky_groups(&self, kepler_ids: &[i32]) -> anyhow::Result<HashMap<i32, i32>> {
        Ok(kepler_ids
            .iter()
            .filter_map(|kepler_id| {
                self.sky_group_by_kepler_id
                    .get(kepler_id)
                    .map(|sky_group_id| (*kepler_id, *sky_group_id))
            })
            .collect())
    }
}

/// One cadence of the pixel log with the tables that were active for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelLog {
    pub cadence_type: CadenceType,
    pub cadence_number: i32,
    #[serde(default)]
    pub lc_target_table_id: Option<i32>,
    #[serde(default)]
    pub sc_target_table_id: Option<i32>,
    #[serde(default)]
    pub back_target_table_id: Option<i32>,
}

impl PixelLog {
    pub fn long_cadence(cadence_number: i32, lc_target_table_id: i32) -> Self {
        Self {
            cadence_type: CadenceType::Long,
            cadence_number,
            lc_target_table_id: Some(lc_target_table_id),
            sc_target_table_id: None,
            back_target_table_id: None,
        }
    }

    pub fn short_cadence(cadence_number: i32, sc_target_table_id: i32) -> Self {
        Self {
            cadence_type: CadenceType::Short,
            cadence_number,
            lc_target_table_id: None,
            sc_target_table_id: Some(sc_target_table_id),
            back_target_table_id: None,
        }
    }

    fn target_table_id(&self, target_type: TargetType) -> Option<i32> {
        match target_type {
            TargetType::LongCadence => self.lc_target_table_id,
            TargetType::ShortCadence => self.sc_target_table_id,
            TargetType::Background => self.back_target_table_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryLogStore {
    pixel_logs: Vec<PixelLog>,
}

impl InMemoryLogStore {
    pub fn new(pixel_logs: Vec<PixelLog>) -> Self {
        Self { pixel_logs }
    }

    /// Reads a JSON array of [`PixelLog`] records.
    pub fn from_json_path(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pixel log {}", path.display()))?;
        let pixel_logs: Vec<PixelLog> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse pixel log {}", path.display()))?;
        Ok(Self::new(pixel_logs))
    }

    fn logs_of(&self, cadence_type: CadenceType) -> impl Iterator<Item = &PixelLog> {
        self.pixel_logs
            .iter()
            .filter(move |log| log.cadence_type == cadence_type)
    }
}

impl LogStore for InMemoryLogStore {
    fn target_table_boundaries(
        &self,
        target_type: TargetType,
        start: i32,
        end: i32,
    ) -> anyhow::Result<Vec<TargetTableBoundary>> {
        let cadence_type = target_type.cadence_type();

        // Tables are found within the range, but each is reported with its
        // full extent in the log.
        let table_ids: BTreeSet<i32> = self
            .logs_of(cadence_type)
            .filter(|log| (start..=end).contains(&log.cadence_number))
            .filter_map(|log| log.target_table_id(target_type))
            .collect();

        let mut boundaries = Vec::with_capacity(table_ids.len());
        for table_id in table_ids {
            let cadences = self
                .logs_of(cadence_type)
                .filter(|log| log.target_table_id(target_type) == Some(table_id))
                .map(|log| log.cadence_number);
            let (first, last) = cadences.fold((i32::MAX, i32::MIN), |(first, last), cadence| {
                (first.min(cadence), last.max(cadence))
            });
            boundaries.push(TargetTableBoundary::new(table_id, first, last));
        }
        boundaries.sort_by_key(|boundary| boundary.cadence_start);

        tracing::debug!(
            target_type = ?target_type,
            start,
            end,
            tables = boundaries.len(),
            "retrieved target table boundaries"
        );
        Ok(boundaries)
    }

    fn has_data(&self, cadence_type: CadenceType, start: i32, end: i32) -> anyhow::Result<bool> {
        Ok(self
            .logs_of(cadence_type)
            .any(|log| (start..=end).contains(&log.cadence_number)))
    }
}
