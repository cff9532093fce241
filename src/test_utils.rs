//! Test utilities for building hits, stores, and beatmaps.
//!
//! This module provides helpers for creating test fixtures in a fluent manner.

#[cfg(test)]
pub mod builders {
    use crate::beatmap::Beatmap;
    use crate::model::{DrumChannel, HitObject, HitObjectData, Modifiers};
    use crate::store::HitObjects;
    use crate::timing::{MeasureChange, TempoChange, TickRate};

    /// A plain note with no modifiers.
    pub fn note(tick: i64, channel: DrumChannel) -> HitObject {
        HitObject::note(tick, channel.into())
    }

    /// A note carrying `modifiers`.
    pub fn marked(tick: i64, channel: DrumChannel, modifiers: Modifiers) -> HitObject {
        HitObject::note(tick, HitObjectData::new(channel).with_modifiers(modifiers))
    }

    /// A sorted store built from `hits` in any order.
    pub fn store(tick_rate: i64, hits: Vec<HitObject>) -> HitObjects {
        let rate = TickRate::new(tick_rate).unwrap();
        HitObjects::from_unsorted(rate, hits).unwrap()
    }

    /// Builder for creating test beatmaps.
    #[derive(Debug, Clone)]
    pub struct BeatmapBuilder {
        tick_rate: i64,
        hits: Vec<HitObject>,
        tempo: Vec<TempoChange>,
        measures: Vec<MeasureChange>,
    }

    impl BeatmapBuilder {
        pub fn new(tick_rate: i64) -> Self {
            Self {
                tick_rate,
                hits: Vec::new(),
                tempo: Vec::new(),
                measures: Vec::new(),
            }
        }

        /// Add a hit object.
        pub fn hit(mut self, hit: HitObject) -> Self {
            self.hits.push(hit);
            self
        }

        /// Add one note per tick on `channel`.
        pub fn notes(self, channel: DrumChannel, ticks: impl IntoIterator<Item = i64>) -> Self {
            ticks
                .into_iter()
                .fold(self, |builder, tick| builder.hit(note(tick, channel)))
        }

        /// Add a tempo change in microseconds per quarter note.
        pub fn tempo(mut self, tick: i64, micros_per_quarter: i64) -> Self {
            self.tempo.push(TempoChange::new(tick, micros_per_quarter));
            self
        }

        /// Add a measure-length change.
        pub fn measure(mut self, tick: i64, beats_per_measure: f64) -> Self {
            self.measures.push(MeasureChange::new(tick, beats_per_measure));
            self
        }

        pub fn build(self) -> Beatmap {
            Beatmap::load(self.tick_rate, self.hits, self.tempo, self.measures).unwrap()
        }
    }
}
