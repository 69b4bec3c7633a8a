//! Removes channels that had already failed by the time a task's cadences
//! were collected.

use std::collections::HashMap;

use crate::focal_plane::ModOut;
use crate::task::CadenceBinnable;
use crate::task::ModOutBinnable;

/// Applies `(channel, cadence of death)` pairs to each task.
///
/// A channel dead at or before the task's first cadence is removed, and a task
/// left with no channels is dropped. When every remaining channel dies inside
/// the task's range, the range is cut to end just before the last death.
pub fn trim<T: ModOutBinnable + CadenceBinnable>(tasks: Vec<T>, dead_channels: &[(i32, i32)]) -> Vec<T> {
    if dead_channels.is_empty() {
        return tasks;
    }

    // A channel listed twice died at its earliest cadence.
    let mut death_by_channel: HashMap<i32, i32> = HashMap::new();
    for (channel, cadence_of_death) in dead_channels {
        death_by_channel
            .entry(*channel)
            .and_modify(|death| *death = (*death).min(*cadence_of_death))
            .or_insert(*cadence_of_death);
    }
    let death_of = |mod_out: &ModOut| {
        mod_out
            .channel()
            .and_then(|channel| death_by_channel.get(&channel).copied())
    };

    let mut trimmed = Vec::with_capacity(tasks.len());
    for mut task in tasks {
        let range = task.cadence_range();

        let living: Vec<_> = task
            .module_outputs()
            .iter()
            .copied()
            .filter(|mod_out| death_of(mod_out).is_none_or(|death| death > range.start))
            .collect();
        if living.is_empty() {
            tracing::info!(task = %task.brief_state(), "dropping task, every channel is dead");
            continue;
        }

        let deaths: Option<Vec<i32>> = living.iter().map(death_of).collect();
        let last_death = deaths.and_then(|deaths| deaths.into_iter().max());
        if let Some(last_death) = last_death.filter(|death| *death <= range.end) {
            task.set_end_cadence(last_death - 1);
        }

        if living.len() != task.module_outputs().len() {
            tracing::debug!(
                task = %task.brief_state(),
                removed = task.module_outputs().len() - living.len(),
                "removed dead channels"
            );
            task.set_module_outputs(living);
        }
        trimmed.push(task);
    }
    trimmed
}
