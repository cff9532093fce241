//! Tick, beat, measure and millisecond conversions.
//!
//! - [`TempoMap`]: tick ↔ millisecond over piecewise-constant tempo.
//! - [`MeasureMap`]: tick ↔ measure over piecewise measure length.
//! - [`RealTimeProjection`]: one-pass millisecond snapshot of a hit list for playback.

mod measure_map;
mod projection;
mod tempo_map;
mod tick_rate;

pub use measure_map::{DEFAULT_BEATS_PER_MEASURE, MeasureChange, MeasureMap};
pub use projection::{ProjectedHit, RealTimeProjection};
pub use tempo_map::{
    DEFAULT_MICROS_PER_QUARTER, TempoChange, TempoMap, bpm_from_micros, micros_from_bpm,
};
pub use tick_rate::{TickRate, gcd};

use tracing::warn;

/// Stable-sorts change points by tick and drops duplicates, keeping the one
/// listed last for each tick.
fn normalize_change_points<T: Copy>(changes: &mut Vec<T>, time: impl Fn(&T) -> i64, kind: &str) {
    // `sort_by_key` is a stable merge sort: equal ticks keep loader order.
    changes.sort_by_key(|c| time(c));
    let before = changes.len();
    changes.dedup_by(|later, earlier| {
        if time(later) == time(earlier) {
            *earlier = *later;
            true
        } else {
            false
        }
    });
    if changes.len() != before {
        warn!(
            kind,
            dropped = before - changes.len(),
            "duplicate change points on the same tick, keeping the last"
        );
    }
}
