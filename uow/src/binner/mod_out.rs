//! Channel splits over the 84 module/outputs of the focal plane.

use crate::error::Result;
use crate::params::ModuleOutputListsParameters;
use crate::task::ModOutBinnable;

/// Replaces each task with one copy per channel group, or with one copy per
/// batch of `channels_per_task` included channels taken in module-then-output
/// order when channel groups are disabled.
pub fn subdivide<T: ModOutBinnable>(
    tasks: &[T],
    params: &ModuleOutputListsParameters,
) -> Result<Vec<T>> {
    let batches = if params.channel_groups_enabled {
        params.channel_groups_lists()?
    } else {
        channel_batches(params)?
    };

    if batches.is_empty() {
        tracing::warn!("module/output selection left no channels");
    }

    let mut subdivided = Vec::with_capacity(tasks.len() * batches.len());
    for task in tasks {
        for channels in &batches {
            let mut copy = task.clone();
            copy.set_channels(channels)?;
            subdivided.push(copy);
        }
    }

    tracing::debug!(
        tasks = tasks.len(),
        batches = batches.len(),
        channel_groups = params.channel_groups_enabled,
        "subdivided by module/output"
    );
    Ok(subdivided)
}

fn channel_batches(params: &ModuleOutputListsParameters) -> Result<Vec<Vec<i32>>> {
    let channels = params.included_channels()?;
    if channels.is_empty() {
        return Ok(Vec::new());
    }
    let batch_size = match params.channels_per_task {
        0 => channels.len(),
        n => n,
    };
    Ok(channels.chunks(batch_size).map(<[i32]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focal_plane::ModOut;
    use crate::task::ModOutCadenceUowTask;
    use crate::task::ModOutUowTask;
    use pretty_assertions::assert_eq;

    fn channels(tasks: &[ModOutUowTask]) -> Vec<Vec<i32>> {
        tasks.iter().map(ModOutBinnable::channels).collect()
    }

    #[test]
    fn test_one_channel_per_task_covers_focal_plane() -> Result<()> {
        let tasks = subdivide(&[ModOutUowTask::default()], &ModuleOutputListsParameters::default())?;
        assert_eq!(tasks.len(), 84);
        assert_eq!(tasks[0].module_outputs, vec![ModOut::new(2, 1)]);
        assert_eq!(tasks[83].module_outputs, vec![ModOut::new(24, 4)]);

        let flattened: Vec<i32> = channels(&tasks).concat();
        assert_eq!(flattened, (1..=84).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_batches_respect_channels_per_task() -> Result<()> {
        for channels_per_task in 1..=13 {
            let params = ModuleOutputListsParameters {
                channels_per_task,
                channel_exclude_array: vec![5, 6, 40],
                ..Default::default()
            };
            let tasks = subdivide(&[ModOutUowTask::default()], &params)?;
            let batches = channels(&tasks);
            assert!(batches.iter().all(|batch| batch.len() <= channels_per_task));

            let flattened = batches.concat();
            let expected: Vec<i32> = (1..=84).filter(|c| ![5, 6, 40].contains(c)).collect();
            assert_eq!(flattened, expected);
        }
        Ok(())
    }

    #[test]
    fn test_zero_channels_per_task_means_one_task() -> Result<()> {
        let params = ModuleOutputListsParameters {
            channels_per_task: 0,
            channel_include_array: vec![3, 1, 2],
            ..Default::default()
        };
        let tasks = subdivide(&[ModOutUowTask::default()], &params)?;
        assert_eq!(channels(&tasks), vec![vec![1, 2, 3]]);
        Ok(())
    }

    #[test]
    fn test_channel_groups() -> Result<()> {
        let mut params = ModuleOutputListsParameters::with_channel_groups(Some("1:3;10, 12"));
        params.channel_exclude_array = vec![2];
        let tasks = subdivide(&[ModOutUowTask::default()], &params)?;
        assert_eq!(channels(&tasks), vec![vec![1, 3], vec![10, 12]]);
        Ok(())
    }

    #[test]
    fn test_channel_group_outside_focal_plane_is_rejected() {
        let params = ModuleOutputListsParameters::with_channel_groups(Some("84:85"));
        assert!(subdivide(&[ModOutUowTask::default()], &params).is_err());
    }

    #[test]
    fn test_other_fields_are_copied() -> Result<()> {
        let params = ModuleOutputListsParameters::with_channels(vec![1, 84], vec![]);
        let tasks = subdivide(&[ModOutCadenceUowTask::new(Vec::new(), 10, 20)], &params)?;
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| (t.start_cadence, t.end_cadence) == (10, 20)));
        assert_eq!(tasks[1].module_outputs, vec![ModOut::new(24, 4)]);
        Ok(())
    }

    #[test]
    fn test_empty_selection_yields_no_tasks() -> Result<()> {
        let params = ModuleOutputListsParameters::with_channels(vec![7], vec![7]);
        assert!(subdivide(&[ModOutUowTask::default()], &params)?.is_empty());
        Ok(())
    }
}
