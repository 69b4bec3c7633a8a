//! Unit-of-work task values and the capability traits binners work against.
//!
//! Binners never see a concrete task type. Each one asks only for the
//! accessors it needs (a cadence range, a Kepler ID range plus sky group, a
//! channel list) and produces new tasks by cloning the input and overwriting
//! those fields.

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

use crate::error::BinningError;
use crate::error::Result;
use crate::focal_plane;
use crate::focal_plane::ModOut;

/// Closed integer interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntRange {
    pub start: i32,
    pub end: i32,
}

impl IntRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Builds a range, rejecting negative bounds and `end < start`.
    pub fn checked(start: i32, end: i32) -> Result<Self> {
        if start < 0 {
            return Err(BinningError::invalid(format!(
                "start ({start}) must not be negative"
            )));
        }
        if end < 0 {
            return Err(BinningError::invalid(format!(
                "end ({end}) must not be negative"
            )));
        }
        if end < start {
            return Err(BinningError::invalid(format!(
                "end ({end}) must not come before start ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of integers covered. Always at least 1 for a checked range.
    pub fn size(self) -> i64 {
        i64::from(self.end) - i64::from(self.start) + 1
    }

    pub fn contains(self, value: i32) -> bool {
        (self.start..=self.end).contains(&value)
    }

    /// Overlap of two ranges, `None` when they are disjoint.
    pub fn intersect(self, other: IntRange) -> Option<IntRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(IntRange { start, end })
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// Anything the pipeline framework can schedule.
pub trait UnitOfWorkTask: Clone + fmt::Debug + Serialize {
    /// Short description used in log lines and task listings.
    fn brief_state(&self) -> String;
}

pub trait CadenceBinnable: UnitOfWorkTask {
    fn start_cadence(&self) -> i32;
    fn end_cadence(&self) -> i32;
    fn set_start_cadence(&mut self, start_cadence: i32);
    fn set_end_cadence(&mut self, end_cadence: i32);

    fn cadence_range(&self) -> IntRange {
        IntRange::new(self.start_cadence(), self.end_cadence())
    }

    fn set_cadence_range(&mut self, range: IntRange) {
        self.set_start_cadence(range.start);
        self.set_end_cadence(range.end);
    }

    /// Copy of this task covering `range` instead.
    fn with_cadence_range(&self, range: IntRange) -> Self {
        let mut copy = self.clone();
        copy.set_cadence_range(range);
        copy
    }
}

pub trait TargetTableBinnable: CadenceBinnable {
    fn target_table_id(&self) -> Option<i32>;
    fn set_target_table_id(&mut self, target_table_id: Option<i32>);
}

pub trait KeplerIdChunkBinnable: UnitOfWorkTask {
    /// `None` until a sky-group split has assigned one.
    fn sky_group_id(&self) -> Option<i32>;
    fn set_sky_group_id(&mut self, sky_group_id: Option<i32>);
    fn start_kepler_id(&self) -> i32;
    fn end_kepler_id(&self) -> i32;
    fn set_start_kepler_id(&mut self, start_kepler_id: i32);
    fn set_end_kepler_id(&mut self, end_kepler_id: i32);

    fn kepler_id_range(&self) -> IntRange {
        IntRange::new(self.start_kepler_id(), self.end_kepler_id())
    }

    fn set_kepler_id_range(&mut self, range: IntRange) {
        self.set_start_kepler_id(range.start);
        self.set_end_kepler_id(range.end);
    }
}

pub trait ModOutBinnable: UnitOfWorkTask {
    fn module_outputs(&self) -> &[ModOut];
    fn set_module_outputs(&mut self, module_outputs: Vec<ModOut>);

    /// Channel numbers for the held pairs. Pairs that land in a grid gap are
    /// skipped.
    fn channels(&self) -> Vec<i32> {
        self.module_outputs()
            .iter()
            .filter_map(|mod_out| {
                let channel = mod_out.channel();
                if channel.is_none() {
                    tracing::warn!(%mod_out, "skipping module/output outside the focal plane");
                }
                channel
            })
            .collect()
    }

    fn set_channels(&mut self, channels: &[i32]) -> Result<()> {
        let module_outputs = channels
            .iter()
            .map(|channel| focal_plane::module_output(*channel))
            .collect::<Result<Vec<_>>>()?;
        self.set_module_outputs(module_outputs);
        Ok(())
    }
}

fn format_channels(module_outputs: &[ModOut]) -> String {
    module_outputs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn format_sky_group(sky_group_id: Option<i32>) -> String {
    sky_group_id.map_or_else(|| "sg -".to_string(), |id| format!("sg {id}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceUowTask {
    pub start_cadence: i32,
    pub end_cadence: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table_id: Option<i32>,
}

impl CadenceUowTask {
    pub fn new(start_cadence: i32, end_cadence: i32) -> Self {
        Self {
            start_cadence,
            end_cadence,
            target_table_id: None,
        }
    }
}

impl UnitOfWorkTask for CadenceUowTask {
    fn brief_state(&self) -> String {
        format!("{}", self.cadence_range())
    }
}

impl CadenceBinnable for CadenceUowTask {
    fn start_cadence(&self) -> i32 {
        self.start_cadence
    }

    fn end_cadence(&self) -> i32 {
        self.end_cadence
    }

    fn set_start_cadence(&mut self, start_cadence: i32) {
        self.start_cadence = start_cadence;
    }

    fn set_end_cadence(&mut self, end_cadence: i32) {
        self.end_cadence = end_cadence;
    }
}

impl TargetTableBinnable for CadenceUowTask {
    fn target_table_id(&self) -> Option<i32> {
        self.target_table_id
    }

    fn set_target_table_id(&mut self, target_table_id: Option<i32>) {
        self.target_table_id = target_table_id;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModOutUowTask {
    pub module_outputs: Vec<ModOut>,
}

impl ModOutUowTask {
    pub fn new(module_outputs: Vec<ModOut>) -> Self {
        Self { module_outputs }
    }
}

impl UnitOfWorkTask for ModOutUowTask {
    fn brief_state(&self) -> String {
        format!("[{}]", format_channels(&self.module_outputs))
    }
}

impl ModOutBinnable for ModOutUowTask {
    fn module_outputs(&self) -> &[ModOut] {
        &self.module_outputs
    }

    fn set_module_outputs(&mut self, module_outputs: Vec<ModOut>) {
        self.module_outputs = module_outputs;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModOutCadenceUowTask {
    pub module_outputs: Vec<ModOut>,
    pub start_cadence: i32,
    pub end_cadence: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table_id: Option<i32>,
}

impl ModOutCadenceUowTask {
    pub fn new(module_outputs: Vec<ModOut>, start_cadence: i32, end_cadence: i32) -> Self {
        Self {
            module_outputs,
            start_cadence,
            end_cadence,
            target_table_id: None,
        }
    }
}

impl UnitOfWorkTask for ModOutCadenceUowTask {
    fn brief_state(&self) -> String {
        format!(
            "[{}]{}",
            format_channels(&self.module_outputs),
            self.cadence_range()
        )
    }
}

impl CadenceBinnable for ModOutCadenceUowTask {
    fn start_cadence(&self) -> i32 {
        self.start_cadence
    }

    fn end_cadence(&self) -> i32 {
        self.end_cadence
    }

    fn set_start_cadence(&mut self, start_cadence: i32) {
        self.start_cadence = start_cadence;
    }

    fn set_end_cadence(&mut self, end_cadence: i32) {
        self.end_cadence = end_cadence;
    }
}

impl TargetTableBinnable for ModOutCadenceUowTask {
    fn target_table_id(&self) -> Option<i32> {
        self.target_table_id
    }

    fn set_target_table_id(&mut self, target_table_id: Option<i32>) {
        self.target_table_id = target_table_id;
    }
}

impl ModOutBinnable for ModOutCadenceUowTask {
    fn module_outputs(&self) -> &[ModOut] {
        &self.module_outputs
    }

    fn set_module_outputs(&mut self, module_outputs: Vec<ModOut>) {
        self.module_outputs = module_outputs;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeplerIdChunkUowTask {
    pub sky_group_id: Option<i32>,
    pub start_kepler_id: i32,
    pub end_kepler_id: i32,
}

impl KeplerIdChunkUowTask {
    pub fn new(start_kepler_id: i32, end_kepler_id: i32) -> Self {
        Self {
            sky_group_id: None,
            start_kepler_id,
            end_kepler_id,
        }
    }
}

impl UnitOfWorkTask for KeplerIdChunkUowTask {
    fn brief_state(&self) -> String {
        format!(
            "{} {}",
            format_sky_group(self.sky_group_id),
            self.kepler_id_range()
        )
    }
}

impl KeplerIdChunkBinnable for KeplerIdChunkUowTask {
    fn sky_group_id(&self) -> Option<i32> {
        self.sky_group_id
    }

    fn set_sky_group_id(&mut self, sky_group_id: Option<i32>) {
        self.sky_group_id = sky_group_id;
    }

    fn start_kepler_id(&self) -> i32 {
        self.start_kepler_id
    }

    fn end_kepler_id(&self) -> i32 {
        self.end_kepler_id
    }

    fn set_start_kepler_id(&mut self, start_kepler_id: i32) {
        self.start_kepler_id = start_kepler_id;
    }

    fn set_end_kepler_id(&mut self, end_kepler_id: i32) {
        self.end_kepler_id = end_kepler_id;
    }
}

/// Kepler ID chunk restricted to a cadence window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeplerIdChunkCadenceUowTask {
    pub sky_group_id: Option<i32>,
    pub start_kepler_id: i32,
    pub end_kepler_id: i32,
    pub start_cadence: i32,
    pub end_cadence: i32,
}

impl KeplerIdChunkCadenceUowTask {
    pub fn new(kepler_ids: IntRange, cadences: IntRange) -> Self {
        Self {
            sky_group_id: None,
            start_kepler_id: kepler_ids.start,
            end_kepler_id: kepler_ids.end,
            start_cadence: cadences.start,
            end_cadence: cadences.end,
        }
    }
}

impl UnitOfWorkTask for KeplerIdChunkCadenceUowTask {
    fn brief_state(&self) -> String {
        format!(
            "{} {}{}",
            format_sky_group(self.sky_group_id),
            self.kepler_id_range(),
            self.cadence_range()
        )
    }
}

impl KeplerIdChunkBinnable for KeplerIdChunkCadenceUowTask {
    fn sky_group_id(&self) -> Option<i32> {
        self.sky_group_id
    }

    fn set_sky_group_id(&mut self, sky_group_id: Option<i32>) {
        self.sky_group_id = sky_group_id;
    }

    fn start_kepler_id(&self) -> i32 {
        self.start_kepler_id
    }

    fn end_kepler_id(&self) -> i32 {
        self.end_kepler_id
    }

    fn set_start_kepler_id(&mut self, start_kepler_id: i32) {
        self.start_kepler_id = start_kepler_id;
    }

    fn set_end_kepler_id(&mut self, end_kepler_id: i32) {
        self.end_kepler_id = end_kepler_id;
    }
}

impl CadenceBinnable for KeplerIdChunkCadenceUowTask {
    fn start_cadence(&self) -> i32 {
        self.start_cadence
    }

    fn end_cadence(&self) -> i32 {
        self.end_cadence
    }

    fn set_start_cadence(&mut self, start_cadence: i32) {
        self.start_cadence = start_cadence;
    }

    fn set_end_cadence(&mut self, end_cadence: i32) {
        self.end_cadence = end_cadence;
    }
}
