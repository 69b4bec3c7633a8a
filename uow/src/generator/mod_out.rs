use std::sync::Arc;

use super::UnitOfWorkTaskGenerator;
use super::cadence::bin_cadences;
use super::require_log_store;
use super::retain_tasks_with_data;
use crate::binner;
use crate::collaborator::LogStore;
use crate::error::Result;
use crate::params::ParameterKind;
use crate::params::UowParameters;
use crate::task::ModOutCadenceUowTask;
use crate::task::ModOutUowTask;

/// One task per channel or channel group.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModOutUowTaskGenerator;

impl UnitOfWorkTaskGenerator for ModOutUowTaskGenerator {
    type Task = ModOutUowTask;

    fn name(&self) -> &'static str {
        "mod-out"
    }

    fn required_parameters(&self) -> &'static [ParameterKind] {
        &[ParameterKind::ModuleOutputLists]
    }

    fn build_tasks(&self, params: &UowParameters) -> Result<Vec<ModOutUowTask>> {
        let lists = UowParameters::require(&params.module_output_lists, ParameterKind::ModuleOutputLists)?;
        binner::mod_out::subdivide(&[ModOutUowTask::default()], lists)
    }
}

/// Channel units of work further split along the cadence axis.
#[derive(Clone, Default)]
pub struct ModOutCadenceUowTaskGenerator {
    log_store: Option<Arc<dyn LogStore>>,
}

impl ModOutCadenceUowTaskGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_store(mut self, log_store: Arc<dyn LogStore>) -> Self {
        self.log_store = Some(log_store);
        self
    }
}

impl UnitOfWorkTaskGenerator for ModOutCadenceUowTaskGenerator {
    type Task = ModOutCadenceUowTask;

    fn name(&self) -> &'static str {
        "mod-out-cadence"
    }

    fn required_parameters(&self) -> &'static [ParameterKind] {
        &[
            ParameterKind::ModuleOutputLists,
            ParameterKind::CadenceRange,
            ParameterKind::CadenceType,
        ]
    }

    fn build_tasks(&self, params: &UowParameters) -> Result<Vec<ModOutCadenceUowTask>> {
        let lists = UowParameters::require(&params.module_output_lists, ParameterKind::ModuleOutputLists)?;
        let cadence_range = UowParameters::require(&params.cadence_range, ParameterKind::CadenceRange)?;
        let cadence_type =
            UowParameters::require(&params.cadence_type, ParameterKind::CadenceType)?.cadence_type;
        let dead_channels = lists.dead_channel_cadence_pairs()?;

        let range = cadence_range.cadence_range()?;
        let prototype = ModOutCadenceUowTask::new(Vec::new(), range.start, range.end);

        let tasks = binner::mod_out::subdivide(&[prototype], lists)?;
        tracing::debug!(tasks = tasks.len(), "binned by module/output");
        let tasks = bin_cadences(tasks, cadence_range, cadence_type, &self.log_store)?;
        let tasks = binner::dead_channel::trim(tasks, &dead_channels);

        if cadence_range.skip_ranges_without_data {
            return retain_tasks_with_data(tasks, require_log_store(&self.log_store)?, cadence_type);
        }
        Ok(tasks)
    }
}
