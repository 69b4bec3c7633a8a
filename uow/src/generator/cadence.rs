use std::sync::Arc;

use super::UnitOfWorkTaskGenerator;
use super::require_log_store;
use super::retain_tasks_with_data;
use crate::binner;
use crate::collaborator::LogStore;
use crate::error::Result;
use crate::params::CadenceRangeParameters;
use crate::params::CadenceType;
use crate::params::ParameterKind;
use crate::params::UowParameters;
use crate::task::CadenceUowTask;
use crate::task::TargetTableBinnable;

/// Cadence-only units of work.
#[derive(Clone, Default)]
pub struct CadenceUowTaskGenerator {
    log_store: Option<Arc<dyn LogStore>>,
}

impl CadenceUowTaskGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Needed when binning by target table or skipping ranges without data.
    pub fn with_log_store(mut self, log_store: Arc<dyn LogStore>) -> Self {
        self.log_store = Some(log_store);
        self
    }
}

impl UnitOfWorkTaskGenerator for CadenceUowTaskGenerator {
    type Task = CadenceUowTask;

    fn name(&self) -> &'static str {
        "cadence"
    }

    fn required_parameters(&self) -> &'static [ParameterKind] {
        &[ParameterKind::CadenceRange, ParameterKind::CadenceType]
    }

    fn build_tasks(&self, params: &UowParameters) -> Result<Vec<CadenceUowTask>> {
        let cadence_range = UowParameters::require(&params.cadence_range, ParameterKind::CadenceRange)?;
        let cadence_type =
            UowParameters::require(&params.cadence_type, ParameterKind::CadenceType)?.cadence_type;

        let range = cadence_range.cadence_range()?;
        let prototype = CadenceUowTask::new(range.start, range.end);
        let tasks = bin_cadences(vec![prototype], cadence_range, cadence_type, &self.log_store)?;

        if cadence_range.skip_ranges_without_data {
            return retain_tasks_with_data(tasks, require_log_store(&self.log_store)?, cadence_type);
        }
        Ok(tasks)
    }
}

/// Target-table split when enabled, then the cadence split.
pub(crate) fn bin_cadences<T: TargetTableBinnable>(
    tasks: Vec<T>,
    cadence_range: &CadenceRangeParameters,
    cadence_type: CadenceType,
    log_store: &Option<Arc<dyn LogStore>>,
) -> Result<Vec<T>> {
    let tasks = if cadence_range.bin_by_target_table {
        let tasks = binner::target_table::subdivide(
            &tasks,
            require_log_store(log_store)?,
            cadence_type,
            &cadence_range.exclude_cadences,
        )?;
        tracing::debug!(tasks = tasks.len(), "binned by target table");
        tasks
    } else {
        tasks
    };

    binner::cadence::subdivide(
        &tasks,
        cadence_range.number_of_bins,
        cadence_range.minimum_bin_size,
    )
}
