//! One task per sky group present in a task's Kepler ID range.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::params::SkyGroupIdListsParameters;
use crate::task::IntRange;
use crate::task::KeplerIdChunkBinnable;

/// For every task, groups the `kepler_ids` falling in its range by sky group
/// and emits one copy per group that passes `filter`, tagged with the group
/// and spanning the smallest to largest ID seen for it. IDs without a sky
/// group are left out.
pub fn subdivide<T: KeplerIdChunkBinnable>(
    tasks: &[T],
    kepler_ids: &[i32],
    sky_group_by_kepler_id: &HashMap<i32, i32>,
    filter: &SkyGroupIdListsParameters,
) -> Vec<T> {
    let mut subdivided = Vec::new();
    for task in tasks {
        let range = task.kepler_id_range();
        let mut extent_by_sky_group: BTreeMap<i32, IntRange> = BTreeMap::new();
        let mut unassigned = 0usize;

        for kepler_id in kepler_ids.iter().copied().filter(|id| range.contains(*id)) {
            let Some(sky_group_id) = sky_group_by_kepler_id.get(&kepler_id) else {
                unassigned += 1;
                continue;
            };
            extent_by_sky_group
                .entry(*sky_group_id)
                .and_modify(|extent| {
                    extent.start = extent.start.min(kepler_id);
                    extent.end = extent.end.max(kepler_id);
                })
                .or_insert_with(|| IntRange::new(kepler_id, kepler_id));
        }

        if unassigned > 0 {
            tracing::warn!(
                task = %task.brief_state(),
                unassigned,
                "Kepler IDs without a sky group were skipped"
            );
        }

        for (sky_group_id, extent) in extent_by_sky_group {
            if !filter.included(sky_group_id) {
                tracing::debug!(sky_group_id, "sky group filtered out");
                continue;
            }
            let mut copy = task.clone();
            copy.set_sky_group_id(Some(sky_group_id));
            copy.set_kepler_id_range(extent);
            subdivided.push(copy);
        }
    }
    subdivided
}
