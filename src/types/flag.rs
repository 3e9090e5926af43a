//! Race flags and sector status codes carried on the race data wire record

use serde::{Deserialize, Serialize};

/// Race control flag currently shown to the car.
///
/// Wire codes: 0 = Green, 1 = Yellow, 2 = Red, 3 = Blue.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    #[default]
    Green,
    Yellow,
    Red,
    Blue,
}

impl Flag {
    /// Decode a wire code. Returns `None` outside 0..=3.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Flag::Green),
            1 => Some(Flag::Yellow),
            2 => Some(Flag::Red),
            3 => Some(Flag::Blue),
            _ => None,
        }
    }

    /// Wire code for this flag.
    pub fn code(self) -> i32 {
        match self {
            Flag::Green => 0,
            Flag::Yellow => 1,
            Flag::Red => 2,
            Flag::Blue => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Flag::Green => "Green",
            Flag::Yellow => "Yellow",
            Flag::Red => "Red",
            Flag::Blue => "Blue",
        }
    }
}

/// Per-sector lap time comparison against reference laps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectorStatus {
    #[default]
    NotSet,
    Worse,
    Better,
    Best,
}

impl SectorStatus {
    /// Decode a wire code. Returns `None` outside 0..=3.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SectorStatus::NotSet),
            1 => Some(SectorStatus::Worse),
            2 => Some(SectorStatus::Better),
            3 => Some(SectorStatus::Best),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            SectorStatus::NotSet => 0,
            SectorStatus::Worse => 1,
            SectorStatus::Better => 2,
            SectorStatus::Best => 3,
        }
    }
}
