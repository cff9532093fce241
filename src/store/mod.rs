//! Tick-ordered hit-object store.
//!
//! The list is always sorted ascending by tick. Every query is a binary search
//! on that order, and every mutation preserves it. Within one tick, objects
//! keep insertion order.

mod double_bass;
mod editing;
mod simplify;

pub use simplify::{SimplifyOutcome, SimplifyPass};

use std::ops::Range;

use crate::edit::BeatSelection;
use crate::error::ChartError;
use crate::model::{DrumChannel, HitObject};
use crate::timing::TickRate;

#[derive(Debug, Clone, PartialEq)]
pub struct HitObjects {
    tick_rate: TickRate,
    hits: Vec<HitObject>,
    /// Logical chart length in ticks. Grows with insertions, never shrinks on its own.
    length_ticks: i64,
}

impl HitObjects {
    pub fn new(tick_rate: TickRate) -> Self {
        Self {
            tick_rate,
            hits: Vec::new(),
            length_ticks: 0,
        }
    }

    /// Takes a loader's possibly-unsorted list and stable-sorts it once.
    pub fn from_unsorted(tick_rate: TickRate, mut hits: Vec<HitObject>) -> Result<Self, ChartError> {
        if let Some(bad) = hits
            .iter()
            .find(|h| h.duration().is_some_and(|duration| duration <= 0))
        {
            return Err(ChartError::NonPositiveRollDuration {
                time: bad.time(),
                duration: bad.duration().unwrap_or_default(),
            });
        }
        // Stable: equal ticks keep loader order, which grouping treats as first-inserted-wins.
        hits.sort_by_key(HitObject::time);
        let mut store = Self {
            tick_rate,
            hits,
            length_ticks: 0,
        };
        store.recompute_length();
        Ok(store)
    }

    pub fn tick_rate(&self) -> TickRate {
        self.tick_rate
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HitObject> {
        self.hits.iter()
    }

    pub fn as_slice(&self) -> &[HitObject] {
        &self.hits
    }

    pub fn get(&self, index: usize) -> Option<&HitObject> {
        self.hits.get(index)
    }

    pub fn length_ticks(&self) -> i64 {
        self.length_ticks
    }

    /// Resets the length to the end of the last object.
    pub fn recompute_length(&mut self) -> i64 {
        self.length_ticks = self.hits.iter().map(HitObject::end).max().unwrap_or(0).max(0);
        self.length_ticks
    }

    fn grow_length(&mut self, end: i64) {
        self.length_ticks = self.length_ticks.max(end);
    }

    /// Index of the first object with `time >= tick`, or `len()` if none.
    pub fn binary_search_first(&self, tick: i64) -> usize {
        self.hits.partition_point(|h| h.time() < tick)
    }

    /// Index range of objects with `time == tick`.
    pub fn range_at_tick(&self, tick: i64) -> Range<usize> {
        let start = self.binary_search_first(tick);
        let end = start + self.hits[start..].partition_point(|h| h.time() == tick);
        start..end
    }

    pub fn at_tick(&self, tick: i64) -> &[HitObject] {
        &self.hits[self.range_at_tick(tick)]
    }

    /// Index range of objects with `time` in `[start, end)`.
    pub fn range_in_ticks(&self, start: i64, end: i64) -> Range<usize> {
        let from = self.binary_search_first(start);
        let to = self.binary_search_first(end).max(from);
        from..to
    }

    pub fn in_ticks(&self, start: i64, end: i64) -> &[HitObject] {
        &self.hits[self.range_in_ticks(start, end)]
    }

    /// Objects in `[left, right)` of the selection, in beats.
    pub fn in_selection(&self, selection: &BeatSelection) -> &[HitObject] {
        let ticks = selection.tick_range(self.tick_rate);
        self.in_ticks(ticks.start, ticks.end)
    }

    /// Indices of objects on the selection's stride grid.
    ///
    /// A point selection yields the objects at that tick. A ranged selection
    /// yields the objects whose tick is `left + k * stride` inside `[left,
    /// right)`. The cursor jumps from note to note rather than from grid
    /// position to grid position, so sparse charts stay cheap.
    pub fn at_selection(&self, selection: &BeatSelection, stride: i64) -> Vec<usize> {
        let rate = self.tick_rate;
        let start = selection.left_tick(rate);
        if !selection.has_volume() {
            return self.range_at_tick(start).collect();
        }

        let end = selection.right_tick(rate);
        let stride = stride.max(1);
        let mut found = Vec::new();
        let mut cursor = start;
        while cursor < end {
            let Some(hit) = self.hits.get(self.binary_search_first(cursor)) else {
                break;
            };
            let tick = hit.time();
            if tick >= end {
                break;
            }
            let offset = (tick - start) % stride;
            if offset != 0 {
                cursor = tick + (stride - offset);
                continue;
            }
            found.extend(self.range_at_tick(tick));
            cursor = tick + stride;
        }
        found
    }

    pub fn channel_count(&self, channel: DrumChannel) -> usize {
        self.hits.iter().filter(|h| h.channel() == channel).count()
    }

    /// Whether every adjacent pair is in tick order.
    pub fn is_sorted(&self) -> bool {
        self.hits.windows(2).all(|w| w[0].time() <= w[1].time())
    }
}

impl<'a> IntoIterator for &'a HitObjects {
    type Item = &'a HitObject;
    type IntoIter = std::slice::Iter<'a, HitObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
