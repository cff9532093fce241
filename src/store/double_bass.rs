use std::ops::Range;

use tracing::debug;

use super::HitObjects;
use crate::config::DoubleBassConfig;
use crate::edit::AffectedRange;
use crate::model::{HitObject, Modifiers};

impl HitObjects {
    /// Assigns left/right feet to runs of bass-drum hits in `ticks`.
    ///
    /// Bass hits chain into a streak while consecutive gaps stay within
    /// `[minimum, maximum]` distance. A hi-hat pedal closer than two maximum
    /// distances before a bass hit occupies the left foot: that hit breaks the
    /// streak and cannot start a new one. Streaks shorter than
    /// `max(config.streak, 2)` are left alone. Within a streak feet alternate
    /// starting from the second hit, never two lefts in a row.
    pub fn set_double_bass_sticking(
        &mut self,
        ticks: Range<i64>,
        config: &DoubleBassConfig,
    ) -> AffectedRange {
        let rate = self.tick_rate;
        let maximum = rate.ticks_per_division(config.divisor);
        let minimum = rate.ticks_per_division(config.maximum_divisor).min(maximum);
        let shortest = config.streak.max(2);

        let span = self.range_in_ticks(ticks.start, ticks.end);
        let mut streaks: Vec<Vec<usize>> = Vec::new();
        let mut streak: Vec<usize> = Vec::new();
        let mut flush = |streak: &mut Vec<usize>| {
            if streak.len() >= shortest {
                streaks.push(std::mem::take(streak));
            } else {
                streak.clear();
            }
        };

        // A pedal just before the range still blocks the left foot inside it.
        let horizon = ticks.start.saturating_sub(2 * maximum);
        let mut last_hihat: Option<i64> = self.hits[..span.start]
            .iter()
            .rev()
            .take_while(|h| h.time() > horizon)
            .find(|h| h.channel().is_hihat_foot())
            .map(HitObject::time);
        let mut i = span.start;
        while i < span.end {
            let tick = self.hits[i].time();
            let same_tick = i..self.range_at_tick(tick).end.min(span.end);
            if self.hits[same_tick.clone()]
                .iter()
                .any(|h| h.channel().is_hihat_foot())
            {
                last_hihat = Some(tick);
            }

            for j in same_tick.clone() {
                if !self.hits[j].channel().is_bass() {
                    continue;
                }
                if last_hihat.is_some_and(|hihat| tick - hihat < 2 * maximum) {
                    flush(&mut streak);
                    continue;
                }
                if let Some(&previous) = streak.last() {
                    let gap = tick - self.hits[previous].time();
                    if gap < minimum || gap > maximum {
                        flush(&mut streak);
                    }
                }
                streak.push(j);
            }
            i = same_tick.end;
        }
        flush(&mut streak);

        let mut affected = AffectedRange::NONE;
        for streak in &streaks {
            affected |= self.assign_streak(streak, config);
        }
        debug!(
            streaks = streaks.len(),
            changed = affected.is_changed(),
            "assigned double-bass sticking"
        );
        affected
    }

    fn assign_streak(&mut self, streak: &[usize], config: &DoubleBassConfig) -> AffectedRange {
        let rate = self.tick_rate;
        let first_left = match streak {
            [first, second, ..] if config.left_lead => {
                // The metrically awkward hit goes to the weaker foot.
                rate.subdivision_of(self.hits[*first].time())
                    > rate.subdivision_of(self.hits[*second].time())
            }
            _ => false,
        };

        let mut affected = self.set_foot(streak[0], first_left);
        let mut previous_left = first_left;
        for &i in &streak[1..] {
            let left = !previous_left && !(config.no_hands_on_left && self.has_hands_at(i));
            affected |= self.set_foot(i, left);
            previous_left = left;
        }
        affected
    }

    fn has_hands_at(&self, index: usize) -> bool {
        self.at_tick(self.hits[index].time())
            .iter()
            .any(|h| !h.channel().is_bass())
    }

    fn set_foot(&mut self, index: usize, left: bool) -> AffectedRange {
        let hit = &mut self.hits[index];
        let sticking = if left { Modifiers::LEFT } else { Modifiers::NONE };
        let next = hit.data.modifiers.with_sticking(sticking);
        if next == hit.data.modifiers {
            return AffectedRange::NONE;
        }
        hit.data.modifiers = next;
        AffectedRange::at(hit.time())
    }
}
