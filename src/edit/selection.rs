use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::timing::TickRate;

/// A beat position, or a beat interval when `end` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatSelection {
    pub start: f64,
    pub end: Option<f64>,
}

impl BeatSelection {
    /// A single point.
    pub fn at(beat: f64) -> Self {
        Self {
            start: beat,
            end: None,
        }
    }

    /// A range; `start` may lie after `end`, as when dragging leftward.
    pub fn range(start: f64, end: f64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn left(&self) -> f64 {
        self.end.map_or(self.start, |end| self.start.min(end))
    }

    pub fn right(&self) -> f64 {
        self.end.map_or(self.start, |end| self.start.max(end))
    }

    pub fn has_volume(&self) -> bool {
        self.end.is_some_and(|end| end != self.start)
    }

    /// `beat ∈ [left, right)`.
    pub fn contains(&self, beat: f64) -> bool {
        beat >= self.left() && beat < self.right()
    }

    pub fn left_tick(&self, rate: TickRate) -> i64 {
        rate.tick_from_beat(self.left())
    }

    pub fn right_tick(&self, rate: TickRate) -> i64 {
        rate.tick_from_beat(self.right())
    }

    /// Half-open tick range covered by the selection. Empty for a point.
    pub fn tick_range(&self, rate: TickRate) -> std::ops::Range<i64> {
        self.left_tick(rate)..self.right_tick(rate)
    }
}

/// Tick span a mutation touched, for redraw and undo bookkeeping.
///
/// The default value is "nothing changed" and converts to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AffectedRange {
    span: Option<(i64, i64)>,
    everything: bool,
}

impl AffectedRange {
    pub const NONE: AffectedRange = AffectedRange {
        span: None,
        everything: false,
    };

    /// Full invalidation: tempo and measure edits can regroup anything.
    pub fn everything() -> Self {
        Self {
            span: None,
            everything: true,
        }
    }

    /// `[start, end)`; an inverted span is normalized, an empty one widened to one tick.
    pub fn ticks(start: i64, end: i64) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self {
            span: Some((start, end.max(start + 1))),
            everything: false,
        }
    }

    /// A single tick.
    pub fn at(tick: i64) -> Self {
        Self::ticks(tick, tick + 1)
    }

    pub fn is_changed(&self) -> bool {
        self.everything || self.span.is_some()
    }

    pub fn is_everything(&self) -> bool {
        self.everything
    }

    /// `None` when nothing or everything changed.
    pub fn start(&self) -> Option<i64> {
        self.span.filter(|_| !self.everything).map(|(start, _)| start)
    }

    pub fn end(&self) -> Option<i64> {
        self.span.filter(|_| !self.everything).map(|(_, end)| end)
    }

    /// Whether `tick` must be reprocessed.
    pub fn contains(&self, tick: i64) -> bool {
        self.everything || self.span.is_some_and(|(start, end)| tick >= start && tick < end)
    }

    pub fn union(self, other: AffectedRange) -> AffectedRange {
        if self.everything || other.everything {
            return Self::everything();
        }
        let span = match (self.span, other.span) {
            (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
            (a, b) => a.or(b),
        };
        Self {
            span,
            everything: false,
        }
    }
}

impl BitOr for AffectedRange {
    type Output = AffectedRange;

    fn bitor(self, rhs: AffectedRange) -> AffectedRange {
        self.union(rhs)
    }
}

impl BitOrAssign for AffectedRange {
    fn bitor_assign(&mut self, rhs: AffectedRange) {
        *self = self.union(rhs);
    }
}

impl From<AffectedRange> for bool {
    fn from(range: AffectedRange) -> bool {
        range.is_changed()
    }
}
