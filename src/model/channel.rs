use serde::{Deserialize, Serialize};

/// Total number of drum channels.
pub const CHANNEL_COUNT: usize = 17;

/// A drum channel: which piece of the kit a hit object strikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrumChannel {
    // Feet
    BassDrum,
    HiHatPedal,
    // Snare family
    Snare,
    SideStick,
    // Hi-hat (hands)
    HiHatClosed,
    HiHatHalfOpen,
    HiHatOpen,
    // Toms
    HighTom,
    MidTom,
    LowTom,
    FloorTom,
    // Cymbals
    Crash,
    China,
    Splash,
    Ride,
    RideBell,
    // Percussion
    Cowbell,
}

impl DrumChannel {
    /// Returns all channels in order.
    pub fn all() -> &'static [DrumChannel] {
        &[
            DrumChannel::BassDrum,
            DrumChannel::HiHatPedal,
            DrumChannel::Snare,
            DrumChannel::SideStick,
            DrumChannel::HiHatClosed,
            DrumChannel::HiHatHalfOpen,
            DrumChannel::HiHatOpen,
            DrumChannel::HighTom,
            DrumChannel::MidTom,
            DrumChannel::LowTom,
            DrumChannel::FloorTom,
            DrumChannel::Crash,
            DrumChannel::China,
            DrumChannel::Splash,
            DrumChannel::Ride,
            DrumChannel::RideBell,
            DrumChannel::Cowbell,
        ]
    }

    /// Returns the channel index (0-based).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Create a channel from a 0-based index.
    pub fn from_index(index: usize) -> Option<DrumChannel> {
        Self::all().get(index).copied()
    }

    /// Returns true for the bass drum, the only channel that takes double-bass sticking.
    pub fn is_bass(self) -> bool {
        self == DrumChannel::BassDrum
    }

    /// Returns true for the hi-hat pedal close, which occupies the left foot.
    pub fn is_hihat_foot(self) -> bool {
        self == DrumChannel::HiHatPedal
    }

    /// Returns true if the channel is played with a foot.
    pub fn is_foot(self) -> bool {
        self.is_bass() || self.is_hihat_foot()
    }

    /// Returns true for cymbal-family channels (hi-hats excluded).
    pub fn is_cymbal(self) -> bool {
        matches!(
            self,
            DrumChannel::Crash
                | DrumChannel::China
                | DrumChannel::Splash
                | DrumChannel::Ride
                | DrumChannel::RideBell
        )
    }
}

/// Identifies the exclusivity group a channel falls into.
///
/// Channels listed in no group form their own singleton group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupId {
    Group(usize),
    Single(DrumChannel),
}

/// Partition of channels that cannot share a tick under normal editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<DrumChannel>>", into = "Vec<Vec<DrumChannel>>")]
pub struct ChannelGroups {
    groups: Vec<Vec<DrumChannel>>,
}

impl Default for ChannelGroups {
    fn default() -> Self {
        Self::new(vec![
            vec![DrumChannel::Crash, DrumChannel::China, DrumChannel::Splash],
            vec![
                DrumChannel::HiHatClosed,
                DrumChannel::HiHatHalfOpen,
                DrumChannel::HiHatOpen,
            ],
            vec![DrumChannel::Ride, DrumChannel::RideBell],
            vec![DrumChannel::Snare, DrumChannel::SideStick],
        ])
    }
}

impl From<Vec<Vec<DrumChannel>>> for ChannelGroups {
    fn from(groups: Vec<Vec<DrumChannel>>) -> Self {
        Self::new(groups)
    }
}

impl From<ChannelGroups> for Vec<Vec<DrumChannel>> {
    fn from(groups: ChannelGroups) -> Self {
        groups.groups
    }
}

impl ChannelGroups {
    /// Builds a partition. A channel listed twice keeps its first group.
    pub fn new(groups: Vec<Vec<DrumChannel>>) -> Self {
        let mut seen = Vec::with_capacity(CHANNEL_COUNT);
        let groups = groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .filter(|channel| {
                        if seen.contains(channel) {
                            false
                        } else {
                            seen.push(*channel);
                            true
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty())
            .collect();
        Self { groups }
    }

    /// No grouping at all: every channel is a singleton.
    pub fn none() -> Self {
        Self { groups: Vec::new() }
    }

    pub fn groups(&self) -> &[Vec<DrumChannel>] {
        &self.groups
    }

    pub fn group_of(&self, channel: DrumChannel) -> GroupId {
        self.groups
            .iter()
            .position(|group| group.contains(&channel))
            .map_or(GroupId::Single(channel), GroupId::Group)
    }

    /// Group lookup honoring the stack override, which isolates the channel.
    pub fn group_for(&self, channel: DrumChannel, stack: bool) -> GroupId {
        if stack {
            GroupId::Single(channel)
        } else {
            self.group_of(channel)
        }
    }

    /// Whether `other` collides with `channel` at the same tick.
    pub fn collides(&self, channel: DrumChannel, other: DrumChannel, stack: bool) -> bool {
        if stack {
            channel == other
        } else {
            self.group_of(channel) == self.group_of(other)
        }
    }
}
