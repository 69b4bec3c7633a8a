//! Fixed-size Kepler ID intervals with a cap on the total task count.

use super::integer;
use crate::error::Result;
use crate::task::KeplerIdChunkBinnable;

/// Splits each task's Kepler ID range into intervals of `bin_size` IDs.
///
/// `max_groups` caps the number of tasks produced by the whole call, counted
/// across all input tasks, so a late task may be cut short or skipped. 0
/// disables the cap; a `bin_size` of 0 leaves every range whole.
pub fn subdivide<T: KeplerIdChunkBinnable>(
    tasks: &[T],
    bin_size: i32,
    max_groups: usize,
) -> Result<Vec<T>> {
    let mut subdivided = Vec::new();
    'tasks: for task in tasks {
        for range in integer::pieces(task.kepler_id_range(), bin_size)? {
            if max_groups > 0 && subdivided.len() >= max_groups {
                tracing::info!(max_groups, "reached maximum number of Kepler ID groups");
                break 'tasks;
            }
            let mut copy = task.clone();
            copy.set_kepler_id_range(range);
            subdivided.push(copy);
        }
    }
    Ok(subdivided)
}
