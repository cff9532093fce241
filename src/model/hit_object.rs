use serde::{Deserialize, Serialize};

use super::channel::DrumChannel;
use super::modifiers::Modifiers;

/// Key of a note preset owned elsewhere (the editor's preset library).
///
/// Hit objects only carry the key; equality compares keys, never contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(pub u32);

/// What a hit plays: channel, modifiers and optional preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitObjectData {
    pub channel: DrumChannel,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub preset: Option<PresetId>,
}

impl HitObjectData {
    pub fn new(channel: DrumChannel) -> Self {
        Self {
            channel,
            modifiers: Modifiers::NONE,
            preset: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_preset(mut self, preset: PresetId) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn velocity(&self) -> u8 {
        self.modifiers.velocity()
    }
}

impl From<DrumChannel> for HitObjectData {
    fn from(channel: DrumChannel) -> Self {
        Self::new(channel)
    }
}

/// A note or roll placed on the tick grid.
///
/// `duration` is `None` for a plain note and `Some(d)` with `d > 0` for a roll
/// occupying `[time, time + d)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitObject {
    time: i64,
    pub data: HitObjectData,
    #[serde(default)]
    duration: Option<i64>,
}

impl HitObject {
    pub fn note(time: i64, data: HitObjectData) -> Self {
        Self {
            time,
            data,
            duration: None,
        }
    }

    /// A roll. The `ROLL` modifier is set so velocity picks the roll triple.
    /// Callers validate `duration > 0`; see [`crate::ChartError::NonPositiveRollDuration`].
    pub fn roll(time: i64, duration: i64, data: HitObjectData) -> Self {
        Self {
            time,
            data: HitObjectData {
                modifiers: data.modifiers | Modifiers::ROLL,
                ..data
            },
            duration: Some(duration),
        }
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn channel(&self) -> DrumChannel {
        self.data.channel
    }

    pub fn duration(&self) -> Option<i64> {
        self.duration
    }

    pub fn is_roll(&self) -> bool {
        self.duration.is_some()
    }

    /// First tick after the object: `time + duration` for rolls, `time + 1` for notes.
    pub fn end(&self) -> i64 {
        self.time + self.duration.unwrap_or(1)
    }

    /// Whether `tick` lies in the object's span. Notes only cover their own tick.
    pub fn covers(&self, tick: i64) -> bool {
        match self.duration {
            Some(duration) => tick >= self.time && tick < self.time + duration,
            None => tick == self.time,
        }
    }

    pub fn velocity(&self) -> u8 {
        self.data.velocity()
    }
}
