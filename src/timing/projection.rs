use serde::{Deserialize, Serialize};

use super::tempo_map::TempoMap;
use crate::model::{HitObject, HitObjectData};

/// A hit resolved to wall-clock time, detached from the live tick list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedHit {
    pub tick: i64,
    pub time_ms: f64,
    /// Roll length in milliseconds; `None` for plain notes.
    pub duration_ms: Option<f64>,
    pub data: HitObjectData,
    pub velocity: u8,
}

/// Owned millisecond snapshot of a hit list, safe to hand to another thread.
///
/// Built in a single pass that interleaves tempo changes with hits and adds up
/// elapsed time event by event. The running sum drifts from
/// [`TempoMap::ms_from_tick`] by floating-point error over long charts, so
/// compare the two only with an epsilon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealTimeProjection {
    hits: Vec<ProjectedHit>,
}

impl RealTimeProjection {
    /// `hits` must be sorted by tick. `offset_ms` is added to every event.
    pub fn build(tempo: &TempoMap, hits: &[HitObject], offset_ms: f64) -> Self {
        let rate = tempo.tick_rate().as_f64();
        let ms_per_tick = |micros: i64| micros as f64 / rate / 1000.0;

        let changes = tempo.changes();
        let mut next_change = 0;
        let mut micros = tempo.default_micros();
        let mut cursor = 0i64;
        let mut elapsed = 0.0;

        let mut projected = Vec::with_capacity(hits.len());
        for hit in hits {
            let tick = hit.time();
            if tick < 0 {
                // Lead-in events never cross a tempo change.
                projected.push(Self::project(tempo, hit, tempo.ms_from_tick(tick) + offset_ms));
                continue;
            }

            while let Some(change) = changes.get(next_change) {
                if change.time > tick {
                    break;
                }
                if change.time > cursor {
                    elapsed += (change.time - cursor) as f64 * ms_per_tick(micros);
                    cursor = change.time;
                }
                micros = change.micros_per_quarter;
                next_change += 1;
            }
            elapsed += (tick - cursor) as f64 * ms_per_tick(micros);
            cursor = tick;

            projected.push(Self::project(tempo, hit, elapsed + offset_ms));
        }

        Self { hits: projected }
    }

    fn project(tempo: &TempoMap, hit: &HitObject, time_ms: f64) -> ProjectedHit {
        let duration_ms = hit.duration().map(|duration| {
            tempo.ms_from_tick(hit.time() + duration) - tempo.ms_from_tick(hit.time())
        });
        ProjectedHit {
            tick: hit.time(),
            time_ms,
            duration_ms,
            data: hit.data,
            velocity: hit.velocity(),
        }
    }

    pub fn hits(&self) -> &[ProjectedHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits with `time_ms` in `[start_ms, end_ms)`, for a playback cursor.
    pub fn between(&self, start_ms: f64, end_ms: f64) -> &[ProjectedHit] {
        let from = self.hits.partition_point(|h| h.time_ms < start_ms);
        let to = self.hits.partition_point(|h| h.time_ms < end_ms).max(from);
        &self.hits[from..to]
    }
}
