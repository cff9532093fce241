use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};

/// MIDI-style velocity of a plain hit.
pub const VELOCITY_PLAIN: u8 = 96;
/// Velocity of an accented hit.
pub const VELOCITY_ACCENTED: u8 = 127;
/// Velocity of a ghost note.
pub const VELOCITY_GHOSTED: u8 = 40;
/// Rolls restrike rapidly, so each stroke sits below the single-hit triple.
pub const VELOCITY_ROLL: u8 = 72;
pub const VELOCITY_ROLL_ACCENTED: u8 = 100;
pub const VELOCITY_ROLL_GHOSTED: u8 = 28;

/// Small bit-set of per-hit modifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ACCENTED: Modifiers = Modifiers(1 << 0);
    pub const GHOST: Modifiers = Modifiers(1 << 1);
    pub const ROLL: Modifiers = Modifiers(1 << 2);
    pub const LEFT: Modifiers = Modifiers(1 << 3);
    pub const RIGHT: Modifiers = Modifiers(1 << 4);

    /// Accent and ghost bits together.
    pub const DYNAMICS: Modifiers = Modifiers(Self::ACCENTED.0 | Self::GHOST.0);
    /// Left and right bits together.
    pub const STICKING: Modifiers = Modifiers(Self::LEFT.0 | Self::RIGHT.0);

    const ALL: u8 = 0b1_1111;

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Modifiers(bits & Self::ALL)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Modifiers) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn with(self, other: Modifiers) -> Self {
        Modifiers(self.0 | other.0)
    }

    pub const fn without(self, other: Modifiers) -> Self {
        Modifiers(self.0 & !other.0)
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Modifiers) {
        self.0 &= !other.0;
    }

    pub fn is_accented(self) -> bool {
        self.contains(Self::ACCENTED)
    }

    pub fn is_ghost(self) -> bool {
        self.contains(Self::GHOST)
    }

    pub fn is_roll(self) -> bool {
        self.contains(Self::ROLL)
    }

    pub fn is_left(self) -> bool {
        self.contains(Self::LEFT)
    }

    pub fn is_right(self) -> bool {
        self.contains(Self::RIGHT)
    }

    /// Accent and ghost at once only ever means "clear dynamics".
    pub fn is_clear_sentinel(self) -> bool {
        self.contains(Self::DYNAMICS)
    }

    /// Drops both dynamics bits.
    pub const fn clear_dynamics(self) -> Self {
        self.without(Self::DYNAMICS)
    }

    /// Drops both sticking bits.
    pub const fn clear_sticking(self) -> Self {
        self.without(Self::STICKING)
    }

    /// Replaces the dynamics bits; `NONE` clears them.
    pub const fn with_dynamics(self, dynamics: Modifiers) -> Self {
        self.clear_dynamics().with(Modifiers(dynamics.0 & Self::DYNAMICS.0))
    }

    /// Replaces the sticking bits; `NONE` clears them.
    pub const fn with_sticking(self, sticking: Modifiers) -> Self {
        self.clear_sticking().with(Modifiers(sticking.0 & Self::STICKING.0))
    }

    /// Playback velocity derived purely from the flags.
    pub fn velocity(self) -> u8 {
        let accented = self.is_accented() && !self.is_clear_sentinel();
        let ghosted = self.is_ghost() && !self.is_clear_sentinel();
        match (self.is_roll(), accented, ghosted) {
            (false, true, _) => VELOCITY_ACCENTED,
            (false, _, true) => VELOCITY_GHOSTED,
            (false, _, _) => VELOCITY_PLAIN,
            (true, true, _) => VELOCITY_ROLL_ACCENTED,
            (true, _, true) => VELOCITY_ROLL_GHOSTED,
            (true, _, _) => VELOCITY_ROLL,
        }
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.with(rhs)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.insert(rhs);
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;

    fn bitand(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 & rhs.0)
    }
}

impl Not for Modifiers {
    type Output = Modifiers;

    fn not(self) -> Modifiers {
        Modifiers(!self.0 & Self::ALL)
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Modifiers, &str); 5] = [
            (Modifiers::ACCENTED, "ACCENTED"),
            (Modifiers::GHOST, "GHOST"),
            (Modifiers::ROLL, "ROLL"),
            (Modifiers::LEFT, "LEFT"),
            (Modifiers::RIGHT, "RIGHT"),
        ];
        if self.is_empty() {
            return write!(f, "Modifiers(NONE)");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Modifiers({})", names.join(" | "))
    }
}
