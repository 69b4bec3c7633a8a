//! Task generators: one per unit-of-work shape.
//!
//! A generator builds a single prototype task from the launch parameters and
//! runs it through a fixed sequence of binners. The task list it returns is
//! what the pipeline scheduler executes.

mod cadence;
mod kepler_id;
mod mod_out;

pub use cadence::CadenceUowTaskGenerator;
pub use kepler_id::KeplerIdChunkCadenceUowTaskGenerator;
pub use kepler_id::KeplerIdChunkUowTaskGenerator;
pub use kepler_id::KicGroupUowTaskGenerator;
pub use mod_out::ModOutCadenceUowTaskGenerator;
pub use mod_out::ModOutUowTaskGenerator;

use std::sync::Arc;

use crate::collaborator::LogStore;
use crate::error::BinningError;
use crate::error::Result;
use crate::params::CadenceType;
use crate::params::ParameterKind;
use crate::params::UowParameters;
use crate::task::CadenceBinnable;
use crate::task::UnitOfWorkTask;

pub trait UnitOfWorkTaskGenerator {
    type Task: UnitOfWorkTask;

    /// Name used in logs and on the command line.
    fn name(&self) -> &'static str;

    /// Parameter sections that must be present before generation starts.
    fn required_parameters(&self) -> &'static [ParameterKind];

    /// Runs the binning pipeline. Callers go through [`Self::generate_tasks`].
    fn build_tasks(&self, params: &UowParameters) -> Result<Vec<Self::Task>>;

    fn generate_tasks(&self, params: &UowParameters) -> Result<Vec<Self::Task>> {
        params.check_required(self.required_parameters())?;
        let tasks = self.build_tasks(params)?;
        tracing::info!(generator = self.name(), tasks = tasks.len(), "generated unit of work tasks");
        for task in &tasks {
            tracing::debug!(generator = self.name(), task = %task.brief_state(), "task");
        }
        Ok(tasks)
    }
}

pub(crate) fn require_log_store(log_store: &Option<Arc<dyn LogStore>>) -> Result<&dyn LogStore> {
    log_store.as_deref().ok_or_else(|| {
        BinningError::IllegalState("a log store is required but none was configured".to_string())
    })
}

/// Drops tasks with no pixel data anywhere in their cadence range. The start
/// cadence alone is probed first since it settles most tasks in one lookup.
pub(crate) fn retain_tasks_with_data<T: CadenceBinnable>(
    tasks: Vec<T>,
    log_store: &dyn LogStore,
    cadence_type: CadenceType,
) -> Result<Vec<T>> {
    let mut retained = Vec::with_capacity(tasks.len());
    for task in tasks {
        let start = task.start_cadence();
        let has_data = log_store.has_data(cadence_type, start, start)?
            || log_store.has_data(cadence_type, start, task.end_cadence())?;
        if has_data {
            retained.push(task);
        } else {
            tracing::info!(task = %task.brief_state(), "skipping task without data");
        }
    }
    Ok(retained)
}
