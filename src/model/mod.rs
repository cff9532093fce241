// Drum chart data model: channels, modifiers, hit objects.

pub mod channel;
pub mod hit_object;
pub mod modifiers;

pub use channel::{CHANNEL_COUNT, ChannelGroups, DrumChannel, GroupId};
pub use hit_object::{HitObject, HitObjectData, PresetId};
pub use modifiers::Modifiers;
