//! Parameter sets consumed by the task generators.
//!
//! A launch supplies a [`UowParameters`] document, usually read from TOML, and
//! each generator names the sections it cannot run without.

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::error::BinningError;
use crate::error::Result;
use crate::focal_plane;
use crate::focal_plane::ModOut;
use crate::task::IntRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    CadenceRange,
    CadenceType,
    ModuleOutputLists,
    SkyGroupIdLists,
    KeplerIdRange,
    KeplerIdChunk,
    KicGroup,
}

impl ParameterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterKind::CadenceRange => "cadence_range",
            ParameterKind::CadenceType => "cadence_type",
            ParameterKind::ModuleOutputLists => "module_output_lists",
            ParameterKind::SkyGroupIdLists => "sky_group_id_lists",
            ParameterKind::KeplerIdRange => "kepler_id_range",
            ParameterKind::KeplerIdChunk => "kepler_id_chunk",
            ParameterKind::KicGroup => "kic_group",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceType {
    #[default]
    Long,
    Short,
}

impl fmt::Display for CadenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CadenceType::Long => f.write_str("long"),
            CadenceType::Short => f.write_str("short"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceTypeParameters {
    pub cadence_type: CadenceType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceRangeParameters {
    pub start_cadence: i32,
    pub end_cadence: i32,
    /// Target number of cadence chunks; 0 leaves the range whole.
    pub number_of_bins: i32,
    pub minimum_bin_size: i32,
    /// Split along target-table boundaries before the cadence split.
    pub bin_by_target_table: bool,
    pub exclude_cadences: Vec<i32>,
    /// Drop tasks whose cadence range has no pixel data behind it.
    pub skip_ranges_without_data: bool,
}

impl CadenceRangeParameters {
    pub fn new(start_cadence: i32, end_cadence: i32) -> Self {
        Self {
            start_cadence,
            end_cadence,
            ..Self::default()
        }
    }

    pub fn cadence_range(&self) -> Result<IntRange> {
        IntRange::checked(self.start_cadence, self.end_cadence)
    }
}

/// Channel selection for module/output units of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleOutputListsParameters {
    pub channel_include_array: Vec<i32>,
    pub channel_exclude_array: Vec<i32>,
    pub channel_groups_enabled: bool,
    /// `;` separates groups, `,` separates members, `a:b` is an inclusive run.
    pub channel_groups: Option<String>,
    /// Channels per task when groups are disabled; 0 puts every channel in one task.
    pub channels_per_task: usize,
    pub dead_channel_array: Vec<i32>,
    pub cadence_of_death_array: Vec<i32>,
}

impl Default for ModuleOutputListsParameters {
    fn default() -> Self {
        Self {
            channel_include_array: Vec::new(),
            channel_exclude_array: Vec::new(),
            channel_groups_enabled: false,
            channel_groups: None,
            channels_per_task: 1,
            dead_channel_array: Vec::new(),
            cadence_of_death_array: Vec::new(),
        }
    }
}

impl ModuleOutputListsParameters {
    pub fn with_channels(channel_include_array: Vec<i32>, channel_exclude_array: Vec<i32>) -> Self {
        Self {
            channel_include_array,
            channel_exclude_array,
            ..Self::default()
        }
    }

    pub fn with_channel_groups(channel_groups: Option<&str>) -> Self {
        Self {
            channel_groups_enabled: true,
            channel_groups: channel_groups.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn included(&self, ccd_module: i32, ccd_output: i32) -> Result<bool> {
        let Some(channel) = focal_plane::channel_number(ccd_module, ccd_output) else {
            return Ok(false);
        };
        let groups = self.enabled_groups()?;
        Ok(self.channel_selected(channel, groups.as_deref()))
    }

    /// Every selected channel in module-then-output order. Channel groups are
    /// parsed once for the whole walk.
    pub fn included_channels(&self) -> Result<Vec<i32>> {
        let groups = self.enabled_groups()?;
        Ok(focal_plane::module_outputs()
            .filter_map(ModOut::channel)
            .filter(|channel| self.channel_selected(*channel, groups.as_deref()))
            .collect())
    }

    fn enabled_groups(&self) -> Result<Option<Vec<Vec<i32>>>> {
        if self.channel_groups_enabled {
            self.parse_channel_groups().map(Some)
        } else {
            Ok(None)
        }
    }

    fn channel_selected(&self, channel: i32, groups: Option<&[Vec<i32>]>) -> bool {
        if self.channel_exclude_array.contains(&channel) {
            return false;
        }
        match groups {
            Some(groups) => groups.iter().any(|group| group.contains(&channel)),
            None => {
                self.channel_include_array.is_empty()
                    || self.channel_include_array.contains(&channel)
            }
        }
    }

    /// Channel groups with excluded channels removed; groups left empty are dropped.
    pub fn channel_groups_lists(&self) -> Result<Vec<Vec<i32>>> {
        if !self.channel_groups_enabled {
            return Err(BinningError::IllegalState(
                "channel groups requested while channel groups are disabled".to_string(),
            ));
        }

        let groups = self
            .parse_channel_groups()?
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .filter(|channel| !self.channel_exclude_array.contains(channel))
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty())
            .collect();
        Ok(groups)
    }

    fn parse_channel_groups(&self) -> Result<Vec<Vec<i32>>> {
        let configured = self
            .channel_groups
            .as_deref()
            .map(str::trim)
            .filter(|groups| !groups.is_empty())
            .ok_or_else(|| {
                BinningError::invalid("channel groups are enabled but none are configured")
            })?;

        let mut groups = Vec::new();
        for group in configured.split(';') {
            let group = group.trim();
            if group.is_empty() {
                continue;
            }
            let mut channels = Vec::new();
            for member in group.split(',') {
                channels.extend(parse_channel_member(member)?);
            }
            groups.push(channels);
        }
        Ok(groups)
    }

    /// `(channel, cadence of death)` pairs.
    pub fn dead_channel_cadence_pairs(&self) -> Result<Vec<(i32, i32)>> {
        if self.dead_channel_array.len() != self.cadence_of_death_array.len() {
            return Err(BinningError::invalid(format!(
                "dead channel array has {} entries but cadence of death array has {}",
                self.dead_channel_array.len(),
                self.cadence_of_death_array.len()
            )));
        }
        Ok(self
            .dead_channel_array
            .iter()
            .copied()
            .zip(self.cadence_of_death_array.iter().copied())
            .collect())
    }
}

fn parse_channel_member(member: &str) -> Result<Vec<i32>> {
    let parse = |token: &str| {
        let token = token.trim();
        let channel = token.parse::<i32>().map_err(|_| {
            BinningError::invalid(format!("invalid channel `{token}` in channel groups"))
        })?;
        if !(1..=focal_plane::MODULE_OUTPUTS).contains(&channel) {
            return Err(BinningError::invalid(format!(
                "channel {channel} in channel groups is out of range (1-{})",
                focal_plane::MODULE_OUTPUTS
            )));
        }
        Ok(channel)
    };

    match member.split_once(':') {
        Some((first, last)) => {
            let first = parse(first)?;
            let last = parse(last)?;
            if last < first {
                return Err(BinningError::invalid(format!(
                    "channel run {first}:{last} is reversed"
                )));
            }
            Ok((first..=last).collect())
        }
        None => Ok(vec![parse(member)?]),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyGroupIdListsParameters {
    pub sky_group_id_include_array: Vec<i32>,
    pub sky_group_id_exclude_array: Vec<i32>,
}

impl SkyGroupIdListsParameters {
    pub fn included(&self, sky_group_id: i32) -> bool {
        if self.sky_group_id_exclude_array.contains(&sky_group_id) {
            return false;
        }
        self.sky_group_id_include_array.is_empty()
            || self.sky_group_id_include_array.contains(&sky_group_id)
    }
}

/// Kepler ID window. Both bounds 0 means "the whole catalog".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerIdRangeParameters {
    pub start_kepler_id: i32,
    pub end_kepler_id: i32,
}

impl KeplerIdRangeParameters {
    pub fn is_unbounded(&self) -> bool {
        self.start_kepler_id == 0 && self.end_kepler_id == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerIdChunkParameters {
    /// 0 keeps each sky group in one task.
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KicGroupParameters {
    pub bin_size: i32,
    /// Cap on the total number of tasks; 0 means no cap.
    pub max_groups: usize,
}

/// All parameter sets a launch may carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UowParameters {
    pub cadence_range: Option<CadenceRangeParameters>,
    pub cadence_type: Option<CadenceTypeParameters>,
    pub module_output_lists: Option<ModuleOutputListsParameters>,
    pub sky_group_id_lists: Option<SkyGroupIdListsParameters>,
    pub kepler_id_range: Option<KeplerIdRangeParameters>,
    pub kepler_id_chunk: Option<KeplerIdChunkParameters>,
    pub kic_group: Option<KicGroupParameters>,
}

impl UowParameters {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| BinningError::invalid(format!("failed to parse parameters: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| BinningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn has(&self, kind: ParameterKind) -> bool {
        match kind {
            ParameterKind::CadenceRange => self.cadence_range.is_some(),
            ParameterKind::CadenceType => self.cadence_type.is_some(),
            ParameterKind::ModuleOutputLists => self.module_output_lists.is_some(),
            ParameterKind::SkyGroupIdLists => self.sky_group_id_lists.is_some(),
            ParameterKind::KeplerIdRange => self.kepler_id_range.is_some(),
            ParameterKind::KeplerIdChunk => self.kepler_id_chunk.is_some(),
            ParameterKind::KicGroup => self.kic_group.is_some(),
        }
    }

    /// Fails with every absent kind listed, in declaration order.
    pub fn check_required(&self, required: &[ParameterKind]) -> Result<()> {
        let missing: BTreeSet<ParameterKind> = required
            .iter()
            .copied()
            .filter(|kind| !self.has(*kind))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BinningError::MissingParameters(missing.into_iter().collect()))
        }
    }

    pub(crate) fn require<'a, T>(
        section: &'a Option<T>,
        kind: ParameterKind,
    ) -> Result<&'a T> {
        section
            .as_ref()
            .ok_or_else(|| BinningError::MissingParameters(vec![kind]))
    }
}
