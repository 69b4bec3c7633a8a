//! Splits a closed integer interval into consecutive pieces of bounded span.

use crate::error::BinningError;
use crate::error::Result;
use crate::task::IntRange;

/// Consecutive sub-ranges of at most `max_span` integers covering `range`
/// exactly. A `max_span` of 0 means no limit.
pub fn subdivide(range: IntRange, max_span: i32) -> Result<Vec<IntRange>> {
    let ranges: Vec<IntRange> = pieces(range, max_span)?.collect();
    tracing::debug!(%range, max_span, bins = ranges.len(), "subdivided integer range");
    Ok(ranges)
}

/// Lazy form of [`subdivide`]: pieces are produced on demand, so a caller
/// that stops early never walks the rest of the range.
pub fn pieces(range: IntRange, max_span: i32) -> Result<Pieces> {
    let range = IntRange::checked(range.start, range.end)?;
    if max_span < 0 {
        return Err(BinningError::invalid(format!(
            "max span ({max_span}) must not be negative"
        )));
    }
    Ok(Pieces {
        next_start: Some(range.start),
        end: range.end,
        max_span,
    })
}

#[derive(Debug, Clone)]
pub struct Pieces {
    next_start: Option<i32>,
    end: i32,
    max_span: i32,
}

impl Iterator for Pieces {
    type Item = IntRange;

    fn next(&mut self) -> Option<IntRange> {
        let start = self.next_start?;
        let end = if self.max_span == 0 {
            self.end
        } else {
            start.saturating_add(self.max_span - 1).min(self.end)
        };
        self.next_start = if end >= self.end { None } else { Some(end + 1) };
        Some(IntRange::new(start, end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some(start) = self.next_start else {
            return (0, Some(0));
        };
        let remaining = i64::from(self.end) - i64::from(start) + 1;
        let span = if self.max_span == 0 {
            remaining
        } else {
            i64::from(self.max_span)
        };
        let count = usize::try_from((remaining + span - 1) / span).unwrap_or(usize::MAX);
        (count, Some(count))
    }
}
