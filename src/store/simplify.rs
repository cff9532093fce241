use std::fmt;
use std::ops::Range;

use tracing::debug;

use super::HitObjects;
use crate::edit::AffectedRange;
use crate::model::HitObject;

/// A single reduction applied by [`HitObjects::simplify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplifyPass {
    LeftFootBass,
    GhostNotes,
    /// Hits whose offset from the measure start divides the beat into
    /// `subdivision` parts.
    HighestSubdivision { subdivision: i64 },
}

impl fmt::Display for SimplifyPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimplifyPass::LeftFootBass => write!(f, "Removed left foot bass notes"),
            SimplifyPass::GhostNotes => write!(f, "Removed ghost notes"),
            SimplifyPass::HighestSubdivision { subdivision } => {
                write!(f, "Removed 1/{subdivision} beat notes")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifyOutcome {
    /// `None` when no pass removed anything.
    pub pass: Option<SimplifyPass>,
    pub removed: usize,
    pub affected: AffectedRange,
}

impl SimplifyOutcome {
    fn nothing() -> Self {
        Self {
            pass: None,
            removed: 0,
            affected: AffectedRange::NONE,
        }
    }

    pub fn message(&self) -> String {
        match self.pass {
            Some(pass) => pass.to_string(),
            None => "No simplification possible".to_string(),
        }
    }
}

impl HitObjects {
    /// Runs the reduction passes over `ticks` in order and stops after the
    /// first one that removes anything.
    ///
    /// `measure_start` maps a tick to the first tick of its measure. The
    /// subdivision pass scores each hit by its offset from that tick, not by
    /// the raw tick.
    pub fn simplify(
        &mut self,
        ticks: Range<i64>,
        measure_start: impl Fn(i64) -> i64,
    ) -> SimplifyOutcome {
        let span = self.range_in_ticks(ticks.start, ticks.end);

        let left_bass = self.matching(span.clone(), |h| {
            h.channel().is_bass() && h.data.modifiers.is_left()
        });
        if !left_bass.is_empty() {
            return self.apply(SimplifyPass::LeftFootBass, &left_bass);
        }

        let ghosts = self.matching(span.clone(), |h| h.data.modifiers.is_ghost());
        if !ghosts.is_empty() {
            return self.apply(SimplifyPass::GhostNotes, &ghosts);
        }

        let rate = self.tick_rate;
        let subdivision = |h: &HitObject| rate.subdivision_of(h.time() - measure_start(h.time()));
        let highest = self.hits[span.clone()].iter().map(|h| subdivision(h)).max();
        // Quarter notes are the floor; never strip the beat itself.
        if let Some(highest) = highest.filter(|&s| s > 1) {
            let doomed = self.matching(span, |h| subdivision(h) == highest);
            return self.apply(
                SimplifyPass::HighestSubdivision {
                    subdivision: highest,
                },
                &doomed,
            );
        }

        debug!("no simplification possible");
        SimplifyOutcome::nothing()
    }

    fn matching(&self, span: Range<usize>, keep: impl Fn(&HitObject) -> bool) -> Vec<usize> {
        span.filter(|&i| keep(&self.hits[i])).collect()
    }

    fn apply(&mut self, pass: SimplifyPass, indices: &[usize]) -> SimplifyOutcome {
        let affected = self.remove_indices(indices);
        debug!(%pass, removed = indices.len(), "simplified");
        SimplifyOutcome {
            pass: Some(pass),
            removed: indices.len(),
            affected,
        }
    }
}
