//! Presence-aware aggregation
//!
//! The core invariant of the whole engine: a subject score only enters a
//! group's count and mean when it is inside [0, 1000] AND the candidate's
//! presence flag for that exam component says "present". A presence column
//! that carries no values at all for a year (historical schema gap) is
//! treated as unavailable and the range check alone applies.
//!
//! Two interchangeable strategies compute the geography aggregates: a
//! DuckDB-backed engine for large inputs and a pure in-memory fallback.
//! They must produce identical results; the streaming-equivalence tests
//! hold them to that.

pub mod duck;
pub mod memory;

pub use duck::DuckDbEngine;
pub use memory::InMemoryEngine;

use crate::error::EtlResult;
use enem_core::schema::SCORE_RANGE;
use enem_core::Subject;
use enem_frame::gold::{GeoRow, GeoUfRow};
use enem_frame::CandidateFrame;
use std::path::Path;

/// Strategy interface: "compute these group-by aggregates over one year's
/// cleaned artifact".
pub trait AggregateEngine {
    fn name(&self) -> &'static str;

    /// (year, state, municipality) aggregate rows.
    fn municipality_year(&self, cleaned: &Path, year: i32) -> EtlResult<Vec<GeoRow>>;

    /// (year, state) aggregate rows.
    fn state_year(&self, cleaned: &Path, year: i32) -> EtlResult<Vec<GeoUfRow>>;
}

/// Whether each physical presence column (CN, CH, LC, MT) carries any
/// non-null value in this frame.
pub(crate) fn presence_availability(frame: &CandidateFrame) -> [bool; 4] {
    std::array::from_fn(|i| frame.presenca[i].iter().any(|v| v.is_some()))
}

/// The masked score: in range, and present when presence data exists.
///
/// Data-entry artifacts sometimes leave a numeric score next to an absent
/// flag; the flag wins.
pub(crate) fn masked_score(
    frame: &CandidateFrame,
    availability: &[bool; 4],
    subject: Subject,
    row: usize,
) -> Option<f64> {
    let value = f64::from(frame.nota(subject, row)?);
    if !(SCORE_RANGE.0..=SCORE_RANGE.1).contains(&value) {
        return None;
    }
    if availability[subject.presence_index()] && frame.presenca_for(subject, row) != Some(1) {
        return None;
    }
    Some(value)
}

/// Arithmetic mean; `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n-1 denominator); `None` below two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}

/// Linearly interpolated quantile over an already-sorted slice.
pub(crate) fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let frac = pos - lower as f64;
    if lower + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[lower] + (sorted[lower + 1] - sorted[lower]) * frac
}

pub(crate) fn median(sorted: &[f64]) -> f64 {
    quantile_linear(sorted, 0.5)
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
