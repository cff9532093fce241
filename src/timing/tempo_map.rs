use serde::{Deserialize, Serialize};

use super::normalize_change_points;
use super::tick_rate::TickRate;
use crate::error::ChartError;

/// Tempo used before the first change point: 120 BPM.
pub const DEFAULT_MICROS_PER_QUARTER: i64 = 500_000;

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// Tempo change point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoChange {
    /// Tick where the tempo takes effect.
    pub time: i64,
    pub micros_per_quarter: i64,
}

impl TempoChange {
    pub fn new(time: i64, micros_per_quarter: i64) -> Self {
        Self {
            time,
            micros_per_quarter,
        }
    }

    pub fn from_bpm(time: i64, bpm: f64) -> Self {
        Self::new(time, micros_from_bpm(bpm))
    }

    pub fn bpm(&self) -> f64 {
        bpm_from_micros(self.micros_per_quarter)
    }
}

pub fn bpm_from_micros(micros_per_quarter: i64) -> f64 {
    MICROS_PER_MINUTE / micros_per_quarter as f64
}

pub fn micros_from_bpm(bpm: f64) -> i64 {
    (MICROS_PER_MINUTE / bpm).round() as i64
}

/// Piecewise-constant tempo over the tick axis.
///
/// Change points are sorted ascending with unique ticks. Ticks before the first
/// change run at the map's default tempo.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    tick_rate: TickRate,
    default_micros: i64,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    /// Validates, stable-sorts and de-duplicates the change points.
    pub fn new(
        tick_rate: TickRate,
        default_micros: i64,
        mut changes: Vec<TempoChange>,
    ) -> Result<Self, ChartError> {
        if default_micros <= 0 {
            return Err(ChartError::NonPositiveTempo {
                time: 0,
                micros: default_micros,
            });
        }
        if let Some(bad) = changes.iter().find(|c| c.micros_per_quarter <= 0) {
            return Err(ChartError::NonPositiveTempo {
                time: bad.time,
                micros: bad.micros_per_quarter,
            });
        }
        normalize_change_points(&mut changes, |c| c.time, "tempo");
        Ok(Self {
            tick_rate,
            default_micros,
            changes,
        })
    }

    /// A map with no change points at the default tempo.
    pub fn constant(tick_rate: TickRate) -> Self {
        Self {
            tick_rate,
            default_micros: DEFAULT_MICROS_PER_QUARTER,
            changes: Vec::new(),
        }
    }

    pub fn tick_rate(&self) -> TickRate {
        self.tick_rate
    }

    pub fn default_micros(&self) -> i64 {
        self.default_micros
    }

    pub fn changes(&self) -> &[TempoChange] {
        &self.changes
    }

    /// Lead-in is single-tempo: the first change point's, or the default.
    fn lead_in_micros(&self) -> i64 {
        self.changes
            .first()
            .map_or(self.default_micros, |c| c.micros_per_quarter)
    }

    fn segment_ms(&self, ticks: f64, micros_per_quarter: i64) -> f64 {
        if ticks == 0.0 {
            return 0.0;
        }
        ticks / self.tick_rate.as_f64() * micros_per_quarter as f64 / 1000.0
    }

    /// Milliseconds elapsed from tick 0 to a (fractional) tick position.
    fn ms_from_tick_position(&self, target: f64) -> f64 {
        if target < 0.0 {
            return self.segment_ms(target, self.lead_in_micros());
        }

        let mut elapsed = 0.0;
        let mut tick = 0.0;
        let mut micros = self.default_micros;
        for change in &self.changes {
            let at = change.time as f64;
            if at > target {
                break;
            }
            if at > tick {
                elapsed += self.segment_ms(at - tick, micros);
                tick = at;
            }
            micros = change.micros_per_quarter;
        }
        elapsed + self.segment_ms(target - tick, micros)
    }

    pub fn ms_from_beat(&self, beat: f64) -> f64 {
        self.ms_from_tick_position(beat * self.tick_rate.as_f64())
    }

    pub fn ms_from_tick(&self, tick: i64) -> f64 {
        self.ms_from_tick_position(tick as f64)
    }

    pub fn beat_from_ms(&self, ms: f64) -> f64 {
        let rate = self.tick_rate.as_f64();
        if ms < 0.0 {
            return ms * 1000.0 / self.lead_in_micros() as f64;
        }

        let mut elapsed = 0.0;
        let mut tick = 0.0;
        let mut micros = self.default_micros;
        for change in &self.changes {
            let at = change.time as f64;
            if at > tick {
                let segment = self.segment_ms(at - tick, micros);
                if elapsed + segment >= ms {
                    break;
                }
                elapsed += segment;
                tick = at;
            }
            micros = change.micros_per_quarter;
        }
        tick / rate + (ms - elapsed) * 1000.0 / micros as f64
    }

    pub fn tick_from_ms(&self, ms: f64) -> i64 {
        self.tick_rate.tick_from_beat(self.beat_from_ms(ms))
    }

    /// Index of the last change at or before `tick`.
    fn index_at(&self, tick: i64) -> Option<usize> {
        self.changes
            .partition_point(|c| c.time <= tick)
            .checked_sub(1)
    }

    pub fn tempo_at(&self, tick: i64) -> i64 {
        self.index_at(tick)
            .map_or(self.default_micros, |i| self.changes[i].micros_per_quarter)
    }

    pub fn bpm_at(&self, tick: i64) -> f64 {
        bpm_from_micros(self.tempo_at(tick))
    }

    /// Tempi in effect anywhere on the non-negative axis.
    fn effective_tempi(&self) -> impl Iterator<Item = i64> + '_ {
        let default_reaches = self.changes.first().is_none_or(|c| c.time > 0);
        default_reaches
            .then_some(self.default_micros)
            .into_iter()
            .chain(self.changes.iter().map(|c| c.micros_per_quarter))
    }

    pub fn min_bpm(&self) -> f64 {
        self.effective_tempi()
            .max()
            .map_or(bpm_from_micros(self.default_micros), bpm_from_micros)
    }

    pub fn max_bpm(&self) -> f64 {
        self.effective_tempi()
            .min()
            .map_or(bpm_from_micros(self.default_micros), bpm_from_micros)
    }

    /// Inserts or replaces the change at `change.time`. Returns false when nothing changed.
    pub fn set(&mut self, change: TempoChange) -> Result<bool, ChartError> {
        if change.micros_per_quarter <= 0 {
            return Err(ChartError::NonPositiveTempo {
                time: change.time,
                micros: change.micros_per_quarter,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(ticks: i64) -> TickRate {
        TickRate::new(ticks).unwrap()
    }

    fn two_tempo_map() -> TempoMap {
        TempoMap::new(
            rate(240),
            DEFAULT_MICROS_PER_QUARTER,
            vec![TempoChange::new(0, 500_000), TempoChange::new(960, 250_000)],
        )
        .unwrap()
    }

    #[test]
    fn default_tempo_four_beats_is_two_seconds() {
        let map = TempoMap::constant(rate(240));
        assert!((map.ms_from_beat(4.0) - 2000.0).abs() < 1e-9);
        assert!((map.bpm_at(12345) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn tempo_change_mid_track() {
        let map = two_tempo_map();
        assert!((map.ms_from_beat(4.0) - 2000.0).abs() < 1e-9);
        assert!((map.ms_from_beat(8.0) - 3000.0).abs() < 1e-9);
        assert!((map.ms_from_tick(1200) - 2250.0).abs() < 1e-9);
    }

    #[test]
    fn reverse_walk_matches_forward() {
        let map = two_tempo_map();
        assert!((map.beat_from_ms(2000.0) - 4.0).abs() < 1e-9);
        assert!((map.beat_from_ms(3000.0) - 8.0).abs() < 1e-9);
        assert!((map.beat_from_ms(1000.0) - 2.0).abs() < 1e-9);
        assert_eq!(map.tick_from_ms(2500.0), 1440);
    }

    #[test]
    fn first_change_after_zero_uses_default_before_it() {
        let map = TempoMap::new(
            rate(240),
            DEFAULT_MICROS_PER_QUARTER,
            vec![TempoChange::new(480, 1_000_000)],
        )
        .unwrap();
        // Two beats at 120 BPM, then one beat at 60 BPM.
        assert!((map.ms_from_beat(3.0) - 2000.0).abs() < 1e-9);
        assert!((map.beat_from_ms(2000.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn negative_beats_scale_with_first_change() {
        let map = TempoMap::new(
            rate(240),
            DEFAULT_MICROS_PER_QUARTER,
            vec![TempoChange::new(0, 1_000_000)],
        )
        .unwrap();
        assert!((map.ms_from_beat(-2.0) + 2000.0).abs() < 1e-9);
        assert!((map.beat_from_ms(-2000.0) + 2.0).abs() < 1e-9);

        let plain = TempoMap::constant(rate(240));
        assert!((plain.ms_from_beat(-1.0) + 500.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_ticks_keep_last_and_sort() {
        let map = TempoMap::new(
            rate(240),
            DEFAULT_MICROS_PER_QUARTER,
            vec![
                TempoChange::new(960, 400_000),
                TempoChange::new(0, 500_000),
                TempoChange::new(960, 250_000),
            ],
        )
        .unwrap();
        assert_eq!(
            map.changes(),
            &[TempoChange::new(0, 500_000), TempoChange::new(960, 250_000)]
        );
    }

    #[test]
    fn rejects_non_positive_tempo() {
        let err = TempoMap::new(
            rate(240),
            DEFAULT_MICROS_PER_QUARTER,
            vec![TempoChange::new(10, 0)],
        )
        .unwrap_err();
        assert_eq!(err, ChartError::NonPositiveTempo { time: 10, micros: 0 });
    }

    #[test]
    fn tempo_at_and_bpm_range() {
        let map = two_tempo_map();
        assert_eq!(map.tempo_at(-5), DEFAULT_MICROS_PER_QUARTER);
        assert_eq!(map.tempo_at(959), 500_000);
        assert_eq!(map.tempo_at(960), 250_000);
        assert!((map.min_bpm() - 120.0).abs() < 1e-9);
        assert!((map.max_bpm() - 240.0).abs() < 1e-9);
    }

    #[test]
    fn default_excluded_from_range_when_shadowed() {
        let map = TempoMap::new(
            rate(240),
            DEFAULT_MICROS_PER_QUARTER,
            vec![TempoChange::from_bpm(0, 150.0)],
        )
        .unwrap();
        assert!((map.min_bpm() - 150.0).abs() < 1e-9);
        assert!((map.max_bpm() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn set_and_remove_change_points() {
        let mut map = two_tempo_map();
        assert!(!map.set(TempoChange::new(960, 250_000)).unwrap());
        assert!(map.set(TempoChange::new(480, 400_000)).unwrap());
        assert_eq!(map.changes()[1].time, 480);
        assert!(map.remove(480));
        assert!(!map.remove(480));
        assert!(map.set(TempoChange::new(5, -1)).is_err());
    }

    #[test]
    fn bpm_micro_conversion() {
        assert_eq!(micros_from_bpm(120.0), 500_000);
        assert!((bpm_from_micros(250_000) - 240.0).abs() < 1e-9);
        assert!((TempoChange::from_bpm(0, 90.0).bpm() - 90.0).abs() < 1e-3);
    }
}
