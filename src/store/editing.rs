use tracing::{debug, warn};

use super::HitObjects;
use crate::edit::{AffectedRange, BeatSelection};
use crate::model::{ChannelGroups, HitObject, HitObjectData, Modifiers};

impl HitObjects {
    /// Indices at `tick` whose channel shares `data`'s exclusivity group.
    fn grouped_at(&self, tick: i64, data: &HitObjectData, groups: &ChannelGroups, stack: bool) -> Vec<usize> {
        self.range_at_tick(tick)
            .filter(|&i| groups.collides(data.channel, self.hits[i].channel(), stack))
            .collect()
    }

    /// Inserts after any objects already at the same tick.
    fn insert_sorted(&mut self, hit: HitObject) {
        let at = self.hits.partition_point(|h| h.time() <= hit.time());
        self.hits.insert(at, hit);
        self.grow_length(hit.end());
    }

    /// Union of the full spans of the objects at `indices`, rolls included.
    fn spans_of(&self, indices: &[usize]) -> AffectedRange {
        indices.iter().fold(AffectedRange::NONE, |acc, &i| {
            let hit = &self.hits[i];
            acc | AffectedRange::ticks(hit.time(), hit.end())
        })
    }

    fn remove_ascending(&mut self, indices: &[usize]) {
        for &i in indices.iter().rev() {
            self.hits.remove(i);
        }
    }

    /// Places a note, collapsing it with same-group hits at the tick.
    ///
    /// - exactly one same-group hit equal to `data`: removed when `toggle`, otherwise a no-op;
    /// - same-group hits exist: the first is overwritten in place, the rest removed;
    /// - otherwise the note is inserted.
    ///
    /// `stack` narrows the group to the channel itself so different channels
    /// of one group can share the tick.
    pub fn add_hit(
        &mut self,
        tick: i64,
        data: HitObjectData,
        toggle: bool,
        stack: bool,
        groups: &ChannelGroups,
    ) -> AffectedRange {
        let hit = HitObject::note(tick, data);
        let matches = self.grouped_at(tick, &data, groups, stack);
        // A replaced roll invalidates its whole span, not just the tick.
        let affected = AffectedRange::at(tick) | self.spans_of(&matches);

        match matches.as_slice() {
            [only] if self.hits[*only] == hit => {
                if !toggle {
                    return AffectedRange::NONE;
                }
                self.hits.remove(*only);
                debug!(tick, channel = ?data.channel, "toggled hit off");
            }
            [first, rest @ ..] => {
                self.hits[*first] = hit;
                self.remove_ascending(rest);
                debug!(tick, channel = ?data.channel, replaced = rest.len() + 1, "overwrote grouped hit");
            }
            [] => {
                self.insert_sorted(hit);
            }
        }
        affected
    }

    /// Places several notes on one tick with minimal churn.
    ///
    /// New hits are paired with existing same-group hits in order: pairs are
    /// overwritten in place, leftover existing hits of the touched groups are
    /// removed, leftover new hits are inserted. When two new hits share a
    /// group the later one wins.
    pub fn add_hits(
        &mut self,
        tick: i64,
        hits: &[HitObjectData],
        stack: bool,
        groups: &ChannelGroups,
    ) -> AffectedRange {
        let mut incoming: Vec<HitObjectData> = Vec::with_capacity(hits.len());
        for data in hits {
            if let Some(slot) = incoming
                .iter_mut()
                .find(|d| groups.collides(d.channel, data.channel, stack))
            {
                *slot = *data;
            } else {
                incoming.push(*data);
            }
        }
        if incoming.is_empty() {
            return AffectedRange::NONE;
        }

        let existing: Vec<usize> = self.range_at_tick(tick).collect();
        let mut consumed = vec![false; existing.len()];
        let mut pending = Vec::new();
        let mut affected = AffectedRange::NONE;

        for data in &incoming {
            let pair = existing.iter().enumerate().position(|(k, &i)| {
                !consumed[k] && groups.collides(data.channel, self.hits[i].channel(), stack)
            });
            match pair {
                Some(k) => {
                    consumed[k] = true;
                    let hit = HitObject::note(tick, *data);
                    if self.hits[existing[k]] != hit {
                        affected |= self.spans_of(&existing[k..=k]);
                        self.hits[existing[k]] = hit;
                    }
                }
                None => pending.push(HitObject::note(tick, *data)),
            }
        }

        let excess: Vec<usize> = existing
            .iter()
            .zip(&consumed)
            .filter(|&(&i, &used)| {
                !used
                    && incoming
                        .iter()
                        .any(|d| groups.collides(d.channel, self.hits[i].channel(), stack))
            })
            .map(|(&i, _)| i)
            .collect();
        if !excess.is_empty() {
            affected |= self.spans_of(&excess);
            self.remove_ascending(&excess);
        }

        if !pending.is_empty() {
            let at = self.hits.partition_point(|h| h.time() <= tick);
            self.hits.splice(at..at, pending);
            self.grow_length(tick + 1);
            affected |= AffectedRange::at(tick);
        }
        affected
    }

    /// Places `data` on every stride position of the selection.
    ///
    /// When every position already holds exactly that note, they are all
    /// removed instead, so repeating the edit toggles the pattern.
    pub fn add_hits_strided(
        &mut self,
        selection: &BeatSelection,
        stride: i64,
        data: HitObjectData,
        groups: &ChannelGroups,
    ) -> AffectedRange {
        let start = selection.left_tick(self.tick_rate);
        let positions: Vec<i64> = if selection.has_volume() {
            let end = selection.right_tick(self.tick_rate);
            (start..end).step_by(stride.max(1) as usize).collect()
        } else {
            vec![start]
        };

        let all_present = positions.iter().all(|&tick| {
            let hit = HitObject::note(tick, data);
            self.at_tick(tick).contains(&hit)
        });

        let mut affected = AffectedRange::NONE;
        for tick in positions {
            affected |= self.add_hit(tick, data, all_present, false, groups);
        }
        affected
    }

    /// Places a roll over `[time, time + duration)`.
    ///
    /// Same-channel notes strictly inside the span are absorbed. A same-group
    /// hit at `time` is replaced by the roll instead of sharing the tick.
    pub fn add_roll(
        &mut self,
        time: i64,
        duration: i64,
        data: HitObjectData,
        groups: &ChannelGroups,
    ) -> AffectedRange {
        if duration <= 0 {
            warn!(time, duration, "ignoring roll with non-positive duration");
            return AffectedRange::NONE;
        }
        let roll = HitObject::roll(time, duration, data);
        let mut affected = AffectedRange::NONE;

        let absorbed: Vec<usize> = self
            .range_in_ticks(time + 1, time + duration)
            .filter(|&i| !self.hits[i].is_roll() && self.hits[i].channel() == data.channel)
            .collect();
        if !absorbed.is_empty() {
            affected |= self.spans_of(&absorbed);
            self.remove_ascending(&absorbed);
        }

        let matches = self.grouped_at(time, &data, groups, false);
        match matches.as_slice() {
            [only] if self.hits[*only] == roll => {}
            [first, rest @ ..] => {
                affected |= self.spans_of(&matches);
                self.hits[*first] = roll;
                self.remove_ascending(rest);
                self.grow_length(roll.end());
            }
            [] => {
                self.insert_sorted(roll);
                affected |= AffectedRange::ticks(time, roll.end());
            }
        }
        if affected.is_changed() {
            // Any change rewrites the roll's whole span.
            affected |= AffectedRange::ticks(time, roll.end());
        }
        affected
    }

    /// Removes the objects at the selection's tick, or in `[left, right)` for a range.
    pub fn remove_hits(&mut self, selection: &BeatSelection) -> AffectedRange {
        let range = if selection.has_volume() {
            let ticks = selection.tick_range(self.tick_rate);
            self.range_in_ticks(ticks.start, ticks.end)
        } else {
            self.range_at_tick(selection.left_tick(self.tick_rate))
        };
        if range.is_empty() {
            return AffectedRange::NONE;
        }
        let removed: Vec<HitObject> = self.hits.drain(range).collect();
        removed
            .iter()
            .fold(AffectedRange::NONE, |acc, h| acc | AffectedRange::ticks(h.time(), h.end()))
    }

    /// Removes the objects at `indices` (any order, duplicates ignored).
    pub fn remove_indices(&mut self, indices: &[usize]) -> AffectedRange {
        let mut doomed = vec![false; self.hits.len()];
        let mut affected = AffectedRange::NONE;
        for &i in indices {
            if let Some(hit) = self.hits.get(i) {
                doomed[i] = true;
                affected |= AffectedRange::ticks(hit.time(), hit.end());
            }
        }
        let mut index = 0;
        self.hits.retain(|_| {
            let keep = !doomed[index];
            index += 1;
            keep
        });
        affected
    }

    /// Rewrites the modifiers of the given objects; reports the spans that changed.
    fn rewrite_modifiers(
        &mut self,
        indices: &[usize],
        rewrite: impl Fn(Modifiers) -> Modifiers,
    ) -> AffectedRange {
        let mut affected = AffectedRange::NONE;
        for &i in indices {
            let hit = &mut self.hits[i];
            let next = rewrite(hit.data.modifiers);
            if next != hit.data.modifiers {
                hit.data.modifiers = next;
                affected |= AffectedRange::ticks(hit.time(), hit.end());
            }
        }
        affected
    }

    /// Steps the selection's dynamics one notch: accent → ghost → plain → accent.
    ///
    /// The step is chosen for the whole selection: any ghost clears, else any
    /// accent turns ghost, else everything is accented.
    pub fn cycle_modifier(&mut self, selection: &BeatSelection, stride: i64) -> AffectedRange {
        let indices = self.at_selection(selection, stride);
        let selected = || indices.iter().map(|&i| self.hits[i].data.modifiers);
        let next = if selected().any(|m| m.is_ghost() && !m.is_clear_sentinel()) {
            Modifiers::NONE
        } else if selected().any(|m| m.is_accented() && !m.is_clear_sentinel()) {
            Modifiers::GHOST
        } else {
            Modifiers::ACCENTED
        };
        self.rewrite_modifiers(&indices, |m| m.with_dynamics(next))
    }

    /// Steps the selection's sticking one notch: left → right → none → left.
    ///
    /// Any right clears, else any left turns right, else everything goes left.
    pub fn cycle_sticking(&mut self, selection: &BeatSelection, stride: i64) -> AffectedRange {
        let indices = self.at_selection(selection, stride);
        let selected = || indices.iter().map(|&i| self.hits[i].data.modifiers);
        let next = if selected().any(Modifiers::is_right) {
            Modifiers::NONE
        } else if selected().any(Modifiers::is_left) {
            Modifiers::RIGHT
        } else {
            Modifiers::LEFT
        };
        self.rewrite_modifiers(&indices, |m| m.with_sticking(next))
    }
}
