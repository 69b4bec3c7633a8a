//! Near-equal cadence chunks with a floor on chunk size.

use crate::error::BinningError;
use crate::error::Result;
use crate::task::CadenceBinnable;
use crate::task::IntRange;

/// Splits every task's cadence range into `number_of_bins` contiguous chunks
/// whose sizes differ by at most one, earliest cadences in the first (and
/// larger) chunks. When a chunk would fall below `minimum_bin_size` the bin
/// count is lowered until none does; reaching zero bins leaves the task whole.
pub fn subdivide<T: CadenceBinnable>(
    tasks: &[T],
    number_of_bins: i32,
    minimum_bin_size: i32,
) -> Result<Vec<T>> {
    if number_of_bins < 0 {
        return Err(BinningError::invalid(format!(
            "number of bins ({number_of_bins}) must not be negative"
        )));
    }
    if minimum_bin_size < 0 {
        return Err(BinningError::invalid(format!(
            "minimum bin size ({minimum_bin_size}) must not be negative"
        )));
    }

    let mut subdivided = Vec::with_capacity(tasks.len());
    for task in tasks {
        let range = IntRange::checked(task.start_cadence(), task.end_cadence())?;
        let sizes = bin_sizes(range.size(), i64::from(number_of_bins), i64::from(minimum_bin_size));

        tracing::debug!(
            task = %task.brief_state(),
            requested_bins = number_of_bins,
            bins = sizes.len(),
            "subdividing cadence range"
        );

        let mut start = i64::from(range.start);
        for size in sizes {
            let end = start + size - 1;
            subdivided.push(task.with_cadence_range(IntRange::new(
                narrow(start),
                narrow(end),
            )));
            start = end + 1;
        }
    }
    Ok(subdivided)
}

/// Occupancy of each bin when `size` cadences are dealt out round-robin.
/// Empty bins never satisfy the minimum.
fn bin_sizes(size: i64, number_of_bins: i64, minimum_bin_size: i64) -> Vec<i64> {
    let floor = minimum_bin_size.max(1);
    // `size / floor` is the largest bin count whose smallest bin still holds
    // `floor` cadences.
    let bins = number_of_bins.min(size / floor);
    if bins == 0 {
        return vec![size];
    }
    let base = size / bins;
    let remainder = size % bins;
    (0..bins)
        .map(|bin| if bin < remainder { base + 1 } else { base })
        .collect()
}

/// Values here are always bounded by the task's own `i32` cadences.
fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
