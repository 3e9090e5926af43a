//! Driver and race control commands
//!
//! Commands arrive as case-insensitive tokens, either from the cockpit
//! argument or from an `Argument` message sent by race control.

use std::fmt;
use std::str::FromStr;

use crate::tyre::TyreCompound;
use crate::{CockpitError, Flag};

/// How a command changes a boolean mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    Toggle,
    On,
    Off,
}

impl Switch {
    /// New value of a mode currently at `current`.
    pub fn apply(self, current: bool) -> bool {
        match self {
            Switch::Toggle => !current,
            Switch::On => true,
            Switch::Off => false,
        }
    }
}

/// Parsed command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PitLimiter(Switch),
    Drs(Switch),
    Ers(Switch),
    /// Fit a fresh set. Only honoured in the pit box.
    ChangeTyres(TyreCompound),
    /// Arm flip recovery.
    Flip,
    /// Ask race control to show a flag.
    RequestFlag(Flag),
}

fn mode(suffix: &str) -> Option<Switch> {
    match suffix {
        "" => Some(Switch::Toggle),
        "_ON" => Some(Switch::On),
        "_OFF" => Some(Switch::Off),
        _ => None,
    }
}

impl FromStr for Command {
    type Err = CockpitError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let upper = token.trim().to_ascii_uppercase();

        let command = match upper.as_str() {
            "ULTRA" => Some(Command::ChangeTyres(TyreCompound::Ultra)),
            "SOFT" => Some(Command::ChangeTyres(TyreCompound::Soft)),
            "MEDIUM" => Some(Command::ChangeTyres(TyreCompound::Medium)),
            "HARD" => Some(Command::ChangeTyres(TyreCompound::Hard)),
            "EXTRA" => Some(Command::ChangeTyres(TyreCompound::Extra)),
            "INT" => Some(Command::ChangeTyres(TyreCompound::Intermediate)),
            "WET" => Some(Command::ChangeTyres(TyreCompound::Wet)),
            "FLIP" => Some(Command::Flip),
            "FLAG_G" => Some(Command::RequestFlag(Flag::Green)),
            "FLAG_Y" => Some(Command::RequestFlag(Flag::Yellow)),
            "FLAG_R" => Some(Command::RequestFlag(Flag::Red)),
            other => {
                if let Some(suffix) = other.strip_prefix("LMT") {
                    mode(suffix).map(Command::PitLimiter)
                } else if let Some(suffix) = other.strip_prefix("DRS") {
                    mode(suffix).map(Command::Drs)
                } else if let Some(suffix) = other.strip_prefix("ERS") {
                    mode(suffix).map(Command::Ers)
                } else {
                    None
                }
            }
        };

        command.ok_or_else(|| CockpitError::parse_error("command", format!("unknown token '{token}'")))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = |switch: &Switch| match switch {
            Switch::Toggle => "",
            Switch::On => "_ON",
            Switch::Off => "_OFF",
        };
        match self {
            Command::PitLimiter(s) => write!(f, "LMT{}", suffix(s)),
            Command::Drs(s) => write!(f, "DRS{}", suffix(s)),
            Command::Ers(s) => write!(f, "ERS{}", suffix(s)),
            Command::ChangeTyres(compound) => f.write_str(match compound {
                TyreCompound::Ultra => "ULTRA",
                TyreCompound::Soft => "SOFT",
                TyreCompound::Medium => "MEDIUM",
                TyreCompound::Hard => "HARD",
                TyreCompound::Extra => "EXTRA",
                TyreCompound::Intermediate => "INT",
                TyreCompound::Wet => "WET",
            }),
            Command::Flip => f.write_str("FLIP"),
            Command::RequestFlag(flag) => write!(f, "FLAG_{}", &flag.name()[..1]),
        }
    }
}
