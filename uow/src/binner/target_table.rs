//! Splits cadence ranges where the spacecraft switched target tables.

use crate::collaborator::LogStore;
use crate::collaborator::TargetTableBoundary;
use crate::collaborator::TargetType;
use crate::error::BinningError;
use crate::error::Result;
use crate::params::CadenceType;
use crate::task::IntRange;
use crate::task::TargetTableBinnable;

/// One task per target table in effect during each task's cadence range,
/// narrowed to the part of the table's span that lies inside the task and
/// does not begin or end on an excluded cadence.
pub fn subdivide<T: TargetTableBinnable>(
    tasks: &[T],
    log_store: &dyn LogStore,
    cadence_type: CadenceType,
    exclude_cadences: &[i32],
) -> Result<Vec<T>> {
    let target_type = TargetType::from(cadence_type);

    let mut subdivided = Vec::new();
    for task in tasks {
        let range = IntRange::checked(task.start_cadence(), task.end_cadence())?;
        let boundaries = log_store.target_table_boundaries(target_type, range.start, range.end)?;
        check_order(&boundaries)?;

        if boundaries.is_empty() {
            tracing::warn!(task = %task.brief_state(), "no target tables cover task");
        }

        for boundary in &boundaries {
            let Some(trimmed) = trim_excluded(boundary, exclude_cadences) else {
                tracing::warn!(%boundary, "every cadence of target table is excluded");
                continue;
            };
            let Some(cadences) = trimmed.intersect(range) else {
                continue;
            };
            let mut copy = task.with_cadence_range(cadences);
            copy.set_target_table_id(Some(boundary.target_table_id));
            subdivided.push(copy);
        }
    }
    Ok(subdivided)
}

fn check_order(boundaries: &[TargetTableBoundary]) -> Result<()> {
    for pair in boundaries.windows(2) {
        let [previous, next] = pair else {
            continue;
        };
        if previous.cadence_end >= next.cadence_start {
            return Err(BinningError::OutOfOrder {
                previous: *previous,
                next: *next,
            });
        }
    }
    Ok(())
}

/// Moves both edges inward past excluded cadences. `None` when nothing is left.
fn trim_excluded(boundary: &TargetTableBoundary, exclude_cadences: &[i32]) -> Option<IntRange> {
    let mut start = boundary.cadence_start;
    let mut end = boundary.cadence_end;
    while exclude_cadences.contains(&start) {
        start = start.checked_add(1).filter(|next| *next <= end)?;
    }
    while exclude_cadences.contains(&end) {
        end = end.checked_sub(1).filter(|previous| *previous >= start)?;
    }
    (start <= end).then(|| IntRange::new(start, end))
}
