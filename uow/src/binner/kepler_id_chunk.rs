//! Chunks each sky group's Kepler IDs into tasks of bounded size.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::task::IntRange;
use crate::task::KeplerIdChunkBinnable;

/// Splits every task into chunks of that task's sky group.
///
/// Only IDs inside the task's own Kepler ID range count toward the group, so
/// a task that is already a chunk comes back unchanged. A task whose group
/// has no IDs passes through unsplit. A `chunk_size` of 0 keeps the group in
/// one task.
pub fn subdivide<T: KeplerIdChunkBinnable>(
    tasks: &[T],
    chunk_size: usize,
    sky_group_by_kepler_id: &HashMap<i32, i32>,
) -> Vec<T> {
    let kepler_ids_by_sky_group = index_by_sky_group(sky_group_by_kepler_id);

    let mut subdivided = Vec::new();
    for task in tasks {
        let range = task.kepler_id_range();
        let kepler_ids: Vec<i32> = task
            .sky_group_id()
            .and_then(|sky_group_id| kepler_ids_by_sky_group.get(&sky_group_id))
            .map(|ids| ids.iter().copied().filter(|id| range.contains(*id)).collect())
            .unwrap_or_default();

        if kepler_ids.is_empty() {
            tracing::debug!(task = %task.brief_state(), "no Kepler IDs for task, keeping it whole");
            subdivided.push(task.clone());
            continue;
        }

        let uow_size = uow_size(kepler_ids.len(), chunk_size);
        tracing::debug!(
            task = %task.brief_state(),
            group_size = kepler_ids.len(),
            chunk_size,
            uow_size,
            "chunking sky group"
        );

        for chunk in kepler_ids.chunks(uow_size) {
            if let (Some(first), Some(last)) = (chunk.first(), chunk.last()) {
                let mut copy = task.clone();
                copy.set_kepler_id_range(IntRange::new(*first, *last));
                subdivided.push(copy);
            }
        }
    }
    subdivided
}

/// IDs per chunk. Both `+ 1` terms lean toward chunks slightly smaller than
/// `chunk_size`, including when the group size is an exact multiple of it.
fn uow_size(group_size: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return group_size;
    }
    let task_count = group_size / chunk_size + 1;
    group_size / task_count + 1
}

fn index_by_sky_group(sky_group_by_kepler_id: &HashMap<i32, i32>) -> BTreeMap<i32, Vec<i32>> {
    let mut index: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for (kepler_id, sky_group_id) in sky_group_by_kepler_id {
        index.entry(*sky_group_id).or_default().push(*kepler_id);
    }
    for kepler_ids in index.values_mut() {
        kepler_ids.sort_unstable();
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::KeplerIdChunkUowTask;
    use pretty_assertions::assert_eq;

    fn sky_group_task(sky_group_id: i32, start: i32, end: i32) -> KeplerIdChunkUowTask {
        let mut task = KeplerIdChunkUowTask::new(start, end);
        task.sky_group_id = Some(sky_group_id);
        task
    }

    fn ranges(tasks: &[KeplerIdChunkUowTask]) -> Vec<(Option<i32>, i32, i32)> {
        tasks
            .iter()
            .map(|t| (t.sky_group_id, t.start_kepler_id, t.end_kepler_id))
            .collect()
    }

    /// IDs 1..=10 in group 1, 100..=104 in group 2.
    fn catalog() -> HashMap<i32, i32> {
        (1..=10)
            .map(|id| (id, 1))
            .chain((100..=104).map(|id| (id, 2)))
            .collect()
    }

    #[test]
    fn test_uow_size_stays_below_chunk_size() {
        assert_eq!(uow_size(10, 5), 4);
        assert_eq!(uow_size(10, 0), 10);
        assert_eq!(uow_size(3, 10), 4);
        assert_eq!(uow_size(10, 1), 1);
        for group_size in 1..200 {
            for chunk_size in 1..30 {
                assert!(uow_size(group_size, chunk_size) <= chunk_size);
            }
        }
    }

    #[test]
    fn test_zero_chunk_size_keeps_groups_whole() {
        let tasks = subdivide(
            &[sky_group_task(1, 0, 1000), sky_group_task(2, 0, 1000)],
            0,
            &catalog(),
        );
        assert_eq!(
            ranges(&tasks),
            vec![(Some(1), 1, 10), (Some(2), 100, 104)]
        );
    }

    #[test]
    fn test_chunks_group() {
        let tasks = subdivide(&[sky_group_task(1, 0, 1000)], 5, &catalog());
        assert_eq!(
            ranges(&tasks),
            vec![(Some(1), 1, 4), (Some(1), 5, 8), (Some(1), 9, 10)]
        );
    }

    #[test]
    fn test_unknown_group_passes_through() {
        let tasks = subdivide(
            &[KeplerIdChunkUowTask::new(0, 1000), sky_group_task(9, 0, 1000)],
            5,
            &catalog(),
        );
        assert_eq!(ranges(&tasks), vec![(None, 0, 1000), (Some(9), 0, 1000)]);
    }

    #[test]
    fn test_rerun_on_chunks_with_larger_size_is_stable() {
        let first = subdivide(&[sky_group_task(1, 0, 1000)], 3, &catalog());
        assert_eq!(first.len(), 4);
        let second = subdivide(&first, 4, &catalog());
        assert_eq!(first, second);
        let unlimited = subdivide(&first, 0, &catalog());
        assert_eq!(first, unlimited);
    }

    #[test]
    fn test_chunks_reconstruct_group() {
        let catalog: HashMap<i32, i32> = (0..97).map(|i| (i * 3 + 1, 4)).collect();
        let mut expected: Vec<i32> = catalog.keys().copied().collect();
        expected.sort_unstable();

        for chunk_size in 1..40 {
            let tasks = subdivide(&[sky_group_task(4, 0, 10_000)], chunk_size, &catalog);
            let mut rebuilt = Vec::new();
            for task in &tasks {
                let members: Vec<i32> = expected
                    .iter()
                    .copied()
                    .filter(|id| task.kepler_id_range().contains(*id))
                    .collect();
                assert!(members.len() <= chunk_size);
                rebuilt.extend(members);
            }
            assert_eq!(rebuilt, expected);
        }
    }
}
