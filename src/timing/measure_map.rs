use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize_change_points;
use super::tick_rate::TickRate;
use crate::error::ChartError;

/// Beats per measure before the first change point.
pub const DEFAULT_BEATS_PER_MEASURE: f64 = 4.0;

/// Measure-length change point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasureChange {
    /// Tick where the new measure length takes effect.
    pub time: i64,
    pub beats_per_measure: f64,
}

impl MeasureChange {
    pub fn new(time: i64, beats_per_measure: f64) -> Self {
        Self {
            time,
            beats_per_measure,
        }
    }
}

/// Piecewise measure length over the tick axis. Purely tick-domain.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureMap {
    tick_rate: TickRate,
    default_beats: f64,
    changes: Vec<MeasureChange>,
}

impl MeasureMap {
    /// Validates, stable-sorts and de-duplicates the change points.
    pub fn new(
        tick_rate: TickRate,
        default_beats: f64,
        mut changes: Vec<MeasureChange>,
    ) -> Result<Self, ChartError> {
        if !(default_beats > 0.0) {
            return Err(ChartError::NonPositiveMeasure {
                time: 0,
                beats: default_beats,
            });
        }
        if let Some(bad) = changes.iter().find(|c| !(c.beats_per_measure > 0.0)) {
            return Err(ChartError::NonPositiveMeasure {
                time: bad.time,
                beats: bad.beats_per_measure,
            });
        }
        normalize_change_points(&mut changes, |c| c.time, "measure");
        Ok(Self {
            tick_rate,
            default_beats,
            changes,
        })
    }

    /// A map with no change points: every measure is the default length.
    pub fn constant(tick_rate: TickRate) -> Self {
        Self {
            tick_rate,
            default_beats: DEFAULT_BEATS_PER_MEASURE,
            changes: Vec::new(),
        }
    }

    pub fn tick_rate(&self) -> TickRate {
        self.tick_rate
    }

    pub fn default_beats(&self) -> f64 {
        self.default_beats
    }

    pub fn changes(&self) -> &[MeasureChange] {
        &self.changes
    }

    fn ticks_per_measure(&self, beats_per_measure: f64) -> i64 {
        self.tick_rate.tick_from_beat(beats_per_measure).max(1)
    }

    /// Measure length of the segment that covers tick 0, extended backward.
    fn first_ticks_per_measure(&self) -> i64 {
        match self.changes.first() {
            Some(first) if first.time <= 0 => self.ticks_per_measure(first.beats_per_measure),
            _ => self.ticks_per_measure(self.default_beats),
        }
    }

    /// The single-segment case every caller hits during layout.
    fn uniform_ticks_per_measure(&self) -> Option<i64> {
        match self.changes.as_slice() {
            [] => Some(self.ticks_per_measure(self.default_beats)),
            [only] if only.time == 0 => Some(self.ticks_per_measure(only.beats_per_measure)),
            _ => None,
        }
    }

    /// Measure index containing `tick`. Negative ticks clamp to 0.
    pub fn measure_from_tick(&self, tick: i64) -> i64 {
        let tick = tick.max(0);
        if let Some(tpm) = self.uniform_ticks_per_measure() {
            return tick / tpm;
        }

        let mut start = 0;
        let mut beats = self.default_beats;
        let mut measures = 0;
        for change in &self.changes {
            if change.time > tick {
                break;
            }
            if change.time > start {
                measures += (change.time - start) / self.ticks_per_measure(beats);
                start = change.time;
            }
            beats = change.beats_per_measure;
        }
        measures + (tick - start) / self.ticks_per_measure(beats)
    }

    /// Walks to the segment containing `measure`, returning
    /// `(segment start tick, measures before it, beats per measure)`.
    fn segment_for_measure(&self, measure: i64) -> (i64, i64, f64) {
        let mut start = 0;
        let mut beats = self.default_beats;
        let mut measures = 0;
        for change in &self.changes {
            if change.time > start {
                let count = (change.time - start) / self.ticks_per_measure(beats);
                if measure < measures + count {
                    break;
                }
                measures += count;
                start = change.time;
            }
            beats = change.beats_per_measure;
        }
        (start, measures, beats)
    }

    /// First tick of `measure`. Negative measures clamp to 0.
    pub fn tick_from_measure(&self, measure: i64) -> i64 {
        let measure = measure.max(0);
        if let Some(tpm) = self.uniform_ticks_per_measure() {
            return measure * tpm;
        }
        let (start, before, beats) = self.segment_for_measure(measure);
        start + (measure - before) * self.ticks_per_measure(beats)
    }

    /// First beat of `measure`, exact for fractional measure lengths.
    pub fn beat_from_measure(&self, measure: i64) -> f64 {
        let measure = measure.max(0);
        let (start, before, beats) = self.segment_for_measure(measure);
        self.tick_rate.beat_from_tick(start) + (measure - before) as f64 * beats
    }

    /// Like [`measure_from_tick`](Self::measure_from_tick), but negative ticks
    /// fall into measures of the first segment's length extended to −∞.
    pub fn measure_from_tick_negative(&self, tick: i64) -> i64 {
        if tick >= 0 {
            return self.measure_from_tick(tick);
        }
        tick.div_euclid(self.first_ticks_per_measure())
    }

    /// Like [`tick_from_measure`](Self::tick_from_measure), but negative
    /// measures extend the first segment backward.
    pub fn tick_from_measure_negative(&self, measure: i64) -> i64 {
        if measure >= 0 {
            return self.tick_from_measure(measure);
        }
        measure * self.first_ticks_per_measure()
    }

    /// Start tick of the measure `tick` falls in.
    ///
    /// Measures restart at every change point, so a tick in the unfinished
    /// tail of a segment belongs to a partial measure starting on the last
    /// whole-measure boundary. Never later than `tick`.
    pub fn measure_start_tick(&self, tick: i64) -> i64 {
        let tick = tick.max(0);
        let (start, beats) = match self.changes.partition_point(|c| c.time <= tick).checked_sub(1) {
            Some(i) => (self.changes[i].time.max(0), self.changes[i].beats_per_measure),
            None => (0, self.default_beats),
        };
        let tpm = self.ticks_per_measure(beats);
        start + (tick - start) / tpm * tpm
    }

    pub fn beats_per_measure_at(&self, tick: i64) -> f64 {
        self.changes
            .partition_point(|c| c.time <= tick)
            .checked_sub(1)
            .map_or(self.default_beats, |i| self.changes[i].beats_per_measure)
    }

    /// Moves every change point that does not sit on a measure boundary of the
    /// previous segment to the nearest one. Ties go to the later boundary. A
    /// change pushed onto its predecessor's tick replaces it.
    ///
    /// Returns true if any change point moved or merged.
    pub fn snap_measure_changes(&mut self) -> bool {
        let mut changed = false;
        let mut snapped: Vec<MeasureChange> = Vec::with_capacity(self.changes.len());
        let mut start = 0;
        let mut beats = self.default_beats;

        for change in std::mem::take(&mut self.changes) {
            let mut time = change.time;
            if time > start {
                let tpm = self.ticks_per_measure(beats);
                let offset = (time - start) % tpm;
                if offset != 0 {
                    let lower = time - offset;
                    let upper = lower + tpm;
                    time = if upper - time <= time - lower { upper } else { lower };
                    debug!(from = change.time, to = time, "snapped measure change");
                    changed = true;
                }
            }

            match snapped.last_mut() {
                Some(last) if last.time >= time => {
                    last.beats_per_measure = change.beats_per_measure;
                    changed = true;
                }
                _ => snapped.push(MeasureChange::new(time, change.beats_per_measure)),
            }
            start = start.max(time);
            beats = change.beats_per_measure;
        }

        self.changes = snapped;
        changed
    }

    /// Inserts or replaces the change at `change.time`. Returns false when nothing changed.
    pub fn set(&mut self, change: MeasureChange) -> Result<bool, ChartError> {
        if !(change.beats_per_measure > 0.0) {
            return Err(ChartError::NonPositiveMeasure {
                time: change.time,
                beats: change.beats_per_measure,
            });
        }
        match self.changes.binary_search_by_key(&change.time, |c| c.time) {
            Ok(i) if self.changes[i] == change => Ok(false),
            Ok(i) => {
                self.changes[i] = change;
                Ok(true)
            }
            Err(i) => {
                self.changes.insert(i, change);
                Ok(true)
            }
        }
    }

    /// Removes the change point at exactly `tick`.
    pub fn remove(&mut self, tick: i64) -> bool {
        match self.changes.binary_search_by_key(&tick, |c| c.time) {
            Ok(i) => {
                self.changes.remove(i);
                true
            }
            Err(_) => false,
        }
    }
}
