//! Persisted car state
//!
//! The car survives restarts by writing a three field record:
//!
//! ```text
//! <compound symbol>;<wear fraction>;<ERS charge>
//! S;0.875;0.42
//! ```
//!
//! Writes are rate limited by [`SaveThrottle`]; an explicit driver action
//! such as a compound change forces a write through the cooldown.

use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::tyre::TyreCompound;
use crate::{CockpitError, Result};

/// Storage slot for the persisted record.
pub trait StateStore {
    /// Last stored record, if any.
    fn load(&self) -> Option<String>;

    /// Replace the stored record.
    fn store(&mut self, record: &str);
}

/// In-memory store, handy for simulations and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    pub record: Option<String>,
    pub writes: usize,
}

impl MemoryStore {
    pub fn with_record(record: impl Into<String>) -> Self {
        Self { record: Some(record.into()), writes: 0 }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.record.clone()
    }

    fn store(&mut self, record: &str) {
        self.record = Some(record.to_string());
        self.writes += 1;
    }
}

/// Decoded persisted record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistedState {
    pub compound: TyreCompound,
    pub wear: f32,
    pub ers_charge: f32,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self { compound: TyreCompound::Soft, wear: 1.0, ers_charge: 1.0 }
    }
}

impl PersistedState {
    /// Fresh softs with the given ERS charge.
    pub fn fresh(ers_charge: f32) -> Self {
        Self { ers_charge: ers_charge.clamp(0.0, 1.0), ..Self::default() }
    }

    /// Decode a stored record, falling back to [`fresh`](Self::fresh) tyres
    /// and `ers_charge` on any problem.
    pub fn load_or_default(record: Option<&str>, ers_charge: f32) -> Self {
        match record {
            Some(record) if !record.trim().is_empty() => match record.parse() {
                Ok(state) => state,
                Err(e) => {
                    warn!("Discarding persisted state: {}", e);
                    Self::fresh(ers_charge)
                }
            },
            _ => {
                debug!("No persisted state, starting on fresh softs");
                Self::fresh(ers_charge)
            }
        }
    }
}

fn parse_fraction(field: &str, name: &str) -> Result<f32> {
    let value: f32 = field.trim().parse().map_err(|_| {
        CockpitError::parse_error("persisted state", format!("{name} '{field}' is not a number"))
    })?;
    if !value.is_finite() {
        return Err(CockpitError::parse_error(
            "persisted state",
            format!("{name} '{field}' is not finite"),
        ));
    }
    Ok(value.clamp(0.0, 1.0))
}

impl FromStr for PersistedState {
    type Err = CockpitError;

    fn from_str(record: &str) -> Result<Self> {
        let fields: Vec<&str> = record.trim().split(';').collect();
        if fields.len() < 3 {
            return Err(CockpitError::parse_error(
                "persisted state",
                format!("expected 3 fields, found {}", fields.len()),
            ));
        }

        let mut symbol = fields[0].trim().chars();
        let compound = match (symbol.next(), symbol.next()) {
            (Some(c), None) => TyreCompound::from_symbol(c),
            _ => None,
        }
        .ok_or_else(|| {
            CockpitError::parse_error(
                "persisted state",
                format!("unknown compound symbol '{}'", fields[0]),
            )
        })?;

        Ok(Self {
            compound,
            wear: parse_fraction(fields[1], "wear")?,
            ers_charge: parse_fraction(fields[2], "ERS charge")?,
        })
    }
}

impl fmt::Display for PersistedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.compound.symbol(), self.wear, self.ers_charge)
    }
}

/// Cooldown between state writes.
#[derive(Debug, Clone)]
pub struct SaveThrottle {
    cooldown_ms: u32,
    period_ms: u32,
}

impl SaveThrottle {
    /// A fresh throttle allows the first write immediately.
    pub fn new(period_ms: u32) -> Self {
        Self { cooldown_ms: 0, period_ms }
    }

    /// Count down `elapsed_ms`; returns whether a write should happen now.
    pub fn poll(&mut self, elapsed_ms: u32, force: bool) -> bool {
        self.cooldown_ms = self.cooldown_ms.saturating_sub(elapsed_ms);

        if !force && self.cooldown_ms > 0 {
            return false;
        }

        self.cooldown_ms = self.period_ms;
        true
    }
}
