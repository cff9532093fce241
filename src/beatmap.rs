//! One chart's timing maps and hit objects behind a single conversion surface.
//!
//! Queries flow from here into the maps; hit edits go straight to the
//! store through [`Beatmap::hits_mut`] and report back an [`AffectedRange`].
//! Tempo and measure edits always invalidate everything.

use std::ops::Range;

use tracing::{debug, info};

use crate::config::DoubleBassConfig;
use crate::edit::{AffectedRange, BeatSelection};
use crate::error::ChartError;
use crate::model::HitObject;
use crate::store::{HitObjects, SimplifyOutcome};
use crate::timing::{
    DEFAULT_BEATS_PER_MEASURE, DEFAULT_MICROS_PER_QUARTER, MeasureChange, MeasureMap,
    RealTimeProjection, TempoChange, TempoMap, TickRate,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Beatmap {
    tick_rate: TickRate,
    tempo: TempoMap,
    measures: MeasureMap,
    hits: HitObjects,
    /// Silence before tick 0, in milliseconds.
    pub lead_in_ms: f64,
    /// Shift between the chart and its audio, in milliseconds.
    pub start_offset_ms: f64,
}

impl Beatmap {
    /// Builds a beatmap from a loader's lists. Each list gets one stable sort.
    pub fn load(
        tick_rate: i64,
        hits: Vec<HitObject>,
        tempo_changes: Vec<TempoChange>,
        measure_changes: Vec<MeasureChange>,
    ) -> Result<Self, ChartError> {
        let tick_rate = TickRate::new(tick_rate)?;
        let beatmap = Self {
            tick_rate,
            tempo: TempoMap::new(tick_rate, DEFAULT_MICROS_PER_QUARTER, tempo_changes)?,
            measures: MeasureMap::new(tick_rate, DEFAULT_BEATS_PER_MEASURE, measure_changes)?,
            hits: HitObjects::from_unsorted(tick_rate, hits)?,
            lead_in_ms: 0.0,
            start_offset_ms: 0.0,
        };
        info!(
            tick_rate = tick_rate.get(),
            hits = beatmap.hits.len(),
            tempo_changes = beatmap.tempo.changes().len(),
            measure_changes = beatmap.measures.changes().len(),
            "loaded beatmap"
        );
        Ok(beatmap)
    }

    /// An empty chart at the default tempo and measure length.
    pub fn empty(tick_rate: TickRate) -> Self {
        Self {
            tick_rate,
            tempo: TempoMap::constant(tick_rate),
            measures: MeasureMap::constant(tick_rate),
            hits: HitObjects::new(tick_rate),
            lead_in_ms: 0.0,
            start_offset_ms: 0.0,
        }
    }

    /// Replaces all three lists after a bulk edit, re-running load normalization.
    ///
    /// On error the beatmap is left untouched. Offsets are kept.
    pub fn reload(
        &mut self,
        hits: Vec<HitObject>,
        tempo_changes: Vec<TempoChange>,
        measure_changes: Vec<MeasureChange>,
    ) -> Result<AffectedRange, ChartError> {
        let tempo = TempoMap::new(self.tick_rate, self.tempo.default_micros(), tempo_changes)?;
        let measures =
            MeasureMap::new(self.tick_rate, self.measures.default_beats(), measure_changes)?;
        let hits = HitObjects::from_unsorted(self.tick_rate, hits)?;
        self.tempo = tempo;
        self.measures = measures;
        self.hits = hits;
        debug!(hits = self.hits.len(), "reloaded beatmap");
        Ok(AffectedRange::everything())
    }

    pub fn tick_rate(&self) -> TickRate {
        self.tick_rate
    }

    pub fn tempo(&self) -> &TempoMap {
        &self.tempo
    }

    pub fn measures(&self) -> &MeasureMap {
        &self.measures
    }

    pub fn hits(&self) -> &HitObjects {
        &self.hits
    }

    pub fn hits_mut(&mut self) -> &mut HitObjects {
        &mut self.hits
    }

    pub fn length_ticks(&self) -> i64 {
        self.hits.length_ticks()
    }

    pub fn recompute_length(&mut self) -> i64 {
        self.hits.recompute_length()
    }

    fn offset_ms(&self) -> f64 {
        self.lead_in_ms + self.start_offset_ms
    }

    // Beat and tick domain to real time.

    pub fn ms_from_beat(&self, beat: f64) -> f64 {
        self.tempo.ms_from_beat(beat) + self.offset_ms()
    }

    pub fn beat_from_ms(&self, ms: f64) -> f64 {
        self.tempo.beat_from_ms(ms - self.offset_ms())
    }

    pub fn ms_from_tick(&self, tick: i64) -> f64 {
        self.tempo.ms_from_tick(tick) + self.offset_ms()
    }

    pub fn tick_from_ms(&self, ms: f64) -> i64 {
        self.tick_rate.tick_from_beat(self.beat_from_ms(ms))
    }

    pub fn tick_from_beat(&self, beat: f64) -> i64 {
        self.tick_rate.tick_from_beat(beat)
    }

    pub fn beat_from_tick(&self, tick: i64) -> f64 {
        self.tick_rate.beat_from_tick(tick)
    }

    // Measure domain.

    pub fn measure_from_tick(&self, tick: i64) -> i64 {
        self.measures.measure_from_tick(tick)
    }

    pub fn measure_from_beat(&self, beat: f64) -> i64 {
        self.measures.measure_from_tick(self.tick_from_beat(beat))
    }

    pub fn tick_from_measure(&self, measure: i64) -> i64 {
        self.measures.tick_from_measure(measure)
    }

    pub fn beat_from_measure(&self, measure: i64) -> f64 {
        self.measures.beat_from_measure(measure)
    }

    pub fn measure_from_tick_negative(&self, tick: i64) -> i64 {
        self.measures.measure_from_tick_negative(tick)
    }

    pub fn tick_from_measure_negative(&self, measure: i64) -> i64 {
        self.measures.tick_from_measure_negative(measure)
    }

    pub fn measure_start_tick(&self, tick: i64) -> i64 {
        self.measures.measure_start_tick(tick)
    }

    /// Nearest `divisor`-note grid tick, e.g. 16 for sixteenths.
    pub fn snap_tick(&self, tick: i64, divisor: i64) -> i64 {
        self.tick_rate.snap_tick(tick, divisor)
    }

    /// Tick span an editing command works on.
    ///
    /// A ranged selection covers `[left, right)`. A point covers the measure
    /// it falls in, lead-in measures before tick 0 included. `None` covers
    /// the whole chart.
    pub fn scope(&self, selection: Option<&BeatSelection>) -> Range<i64> {
        match selection {
            None => i64::MIN..i64::MAX,
            Some(sel) if sel.has_volume() => sel.tick_range(self.tick_rate),
            Some(sel) => {
                let tick = sel.left_tick(self.tick_rate);
                if tick < 0 {
                    let measure = self.measure_from_tick_negative(tick);
                    return self.tick_from_measure_negative(measure)
                        ..self.tick_from_measure_negative(measure + 1);
                }
                let start = self.measure_start_tick(tick);
                let next = self.measure_from_tick(start) + 1;
                start..self.tick_from_measure(next)
            }
        }
    }

    // Tempo and measure edits.

    /// Adds or replaces a tempo change.
    pub fn set_tempo_change(&mut self, change: TempoChange) -> Result<AffectedRange, ChartError> {
        Ok(everything_if(self.tempo.set(change)?))
    }

    /// Removing a tick with no change point, including the implicit default, is a no-op.
    pub fn remove_tempo_change(&mut self, tick: i64) -> AffectedRange {
        everything_if(self.tempo.remove(tick))
    }

    pub fn set_measure_change(
        &mut self,
        change: MeasureChange,
    ) -> Result<AffectedRange, ChartError> {
        Ok(everything_if(self.measures.set(change)?))
    }

    pub fn remove_measure_change(&mut self, tick: i64) -> AffectedRange {
        everything_if(self.measures.remove(tick))
    }

    pub fn snap_measure_changes(&mut self) -> AffectedRange {
        everything_if(self.measures.snap_measure_changes())
    }

    // Edits that need both the store and the maps.

    pub fn set_double_bass_sticking(
        &mut self,
        selection: Option<&BeatSelection>,
        config: &DoubleBassConfig,
    ) -> AffectedRange {
        let ticks = self.scope(selection);
        self.hits.set_double_bass_sticking(ticks, config)
    }

    pub fn simplify(&mut self, selection: Option<&BeatSelection>) -> SimplifyOutcome {
        let ticks = self.scope(selection);
        let measures = &self.measures;
        self.hits
            .simplify(ticks, |tick| measures.measure_start_tick(tick))
    }

    /// Millisecond snapshot of every hit, offsets applied.
    pub fn projection(&self) -> RealTimeProjection {
        RealTimeProjection::build(&self.tempo, self.hits.as_slice(), self.offset_ms())
    }
}

fn everything_if(changed: bool) -> AffectedRange {
    if changed {
        AffectedRange::everything()
    } else {
        AffectedRange::NONE
    }
}
