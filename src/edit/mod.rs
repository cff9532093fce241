//! Selection and "what changed" values passed in and out of every edit.

mod selection;

pub use selection::{AffectedRange, BeatSelection};
