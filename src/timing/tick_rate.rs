use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// Ticks per quarter note. Fixed per beatmap, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TickRate(i64);

impl TickRate {
    pub fn new(ticks_per_quarter: i64) -> Result<Self, ChartError> {
        if ticks_per_quarter <= 0 {
            return Err(ChartError::InvalidTickRate(ticks_per_quarter));
        }
        Ok(Self(ticks_per_quarter))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    /// Nearest tick to a beat position.
    pub fn tick_from_beat(self, beat: f64) -> i64 {
        (beat * self.as_f64()).round() as i64
    }

    pub fn beat_from_tick(self, tick: i64) -> f64 {
        tick as f64 / self.as_f64()
    }

    /// Length in ticks of one `1/divisor` note (16 = sixteenth). Never below one tick.
    pub fn ticks_per_division(self, divisor: i64) -> i64 {
        if divisor <= 0 {
            return self.0 * 4;
        }
        (self.0 * 4 / divisor).max(1)
    }

    /// Denominator of the finest subdivision `tick` sits on: 1 on the beat,
    /// 2 on an eighth, 4 on a sixteenth and so on.
    pub fn subdivision_of(self, offset: i64) -> i64 {
        self.0 / gcd(offset.rem_euclid(self.0), self.0)
    }

    /// Rounds to the nearest `1/divisor` grid position measured from tick 0.
    pub fn snap_tick(self, tick: i64, divisor: i64) -> i64 {
        let step = self.ticks_per_division(divisor);
        let below = tick.div_euclid(step) * step;
        if tick - below >= step - (tick - below) {
            below + step
        } else {
            below
        }
    }
}

impl TryFrom<i64> for TickRate {
    type Error = ChartError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TickRate> for i64 {
    fn from(rate: TickRate) -> Self {
        rate.0
    }
}

/// Greatest common divisor; `gcd(0, n) == n`.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive() {
        assert_eq!(TickRate::new(0), Err(ChartError::InvalidTickRate(0)));
        assert_eq!(TickRate::new(-480), Err(ChartError::InvalidTickRate(-480)));
        assert!(TickRate::new(1).is_ok());
    }

    #[test]
    fn tick_from_beat_rounds_to_nearest() {
        let rate = TickRate::new(240).unwrap();
        assert_eq!(rate.tick_from_beat(1.0), 240);
        assert_eq!(rate.tick_from_beat(1.0 / 3.0), 80);
        assert_eq!(rate.tick_from_beat(0.0021), 1);
        assert_eq!(rate.tick_from_beat(-1.0), -240);
    }

    #[test]
    fn subdivision_of_offsets() {
        let rate = TickRate::new(480).unwrap();
        assert_eq!(rate.subdivision_of(0), 1);
        assert_eq!(rate.subdivision_of(480), 1);
        assert_eq!(rate.subdivision_of(240), 2);
        assert_eq!(rate.subdivision_of(120), 4);
        assert_eq!(rate.subdivision_of(360), 4);
        assert_eq!(rate.subdivision_of(160), 3);
        assert_eq!(rate.subdivision_of(60), 8);
    }

    #[test]
    fn snap_tick_to_sixteenths() {
        let rate = TickRate::new(480).unwrap();
        assert_eq!(rate.snap_tick(0, 16), 0);
        assert_eq!(rate.snap_tick(59, 16), 0);
        assert_eq!(rate.snap_tick(60, 16), 120);
        assert_eq!(rate.snap_tick(130, 16), 120);
        assert_eq!(rate.snap_tick(-70, 16), -120);
    }

    #[test]
    fn deserialize_validates() {
        let rate: TickRate = serde_json::from_str("192").unwrap();
        assert_eq!(rate.get(), 192);
        assert!(serde_json::from_str::<TickRate>("0").is_err());
    }

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(0, 480), 480);
        assert_eq!(gcd(120, 480), 120);
        assert_eq!(gcd(7, 480), 1);
    }
}
