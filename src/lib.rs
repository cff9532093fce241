pub mod beatmap;
pub mod config;
pub mod edit;
pub mod error;
pub mod model;
pub mod store;
pub mod timing;

pub use beatmap::Beatmap;
pub use config::{DoubleBassConfig, EditorConfig};
pub use edit::{AffectedRange, BeatSelection};
pub use error::ChartError;
pub use model::{ChannelGroups, DrumChannel, HitObject, HitObjectData, Modifiers, PresetId};
pub use store::{HitObjects, SimplifyOutcome, SimplifyPass};
pub use timing::{MeasureChange, MeasureMap, RealTimeProjection, TempoChange, TempoMap, TickRate};

#[cfg(test)]
mod test_utils;
