//! RaceData wire record
//!
//! Race control broadcasts the standings as 13 semicolon separated fields:
//!
//! ```text
//! laps;position;current;best;racers;total_laps;flag;weather;ranks;s1;s2;s3;prev
//! 3;2;01:12.345;01:10.001;8;10;0;-1;1. ABC;2;3;1;01:11.500
//! ```
//!
//! Parsing is all or nothing: any bad field rejects the whole record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::weather::WeatherLevel;
use crate::{CockpitError, Flag, Result, SectorStatus};

/// Number of fields in a RaceData record.
pub const RACE_DATA_FIELDS: usize = 13;

/// Placeholder shown for lap times that are not known yet.
pub const EMPTY_LAP_TIME: &str = "--:--.---";

/// Latest standings received from race control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub laps: i32,
    pub position: i32,
    pub current_lap_time: String,
    pub best_lap_time: String,
    pub total_racers: i32,
    pub total_laps: i32,
    pub flag: Flag,
    pub weather: WeatherLevel,
    /// Pre-rendered standings table.
    pub rank_table: String,
    pub sectors: [SectorStatus; 3],
    pub prev_lap_time: String,
}

impl Default for RaceSnapshot {
    fn default() -> Self {
        Self {
            laps: 0,
            position: 0,
            current_lap_time: EMPTY_LAP_TIME.to_string(),
            best_lap_time: EMPTY_LAP_TIME.to_string(),
            total_racers: 0,
            total_laps: 0,
            flag: Flag::Green,
            weather: WeatherLevel::Clear,
            rank_table: String::new(),
            sectors: [SectorStatus::NotSet; 3],
            prev_lap_time: EMPTY_LAP_TIME.to_string(),
        }
    }
}

fn int_field(fields: &[&str], index: usize, name: &str) -> Result<i32> {
    fields[index].trim().parse().map_err(|_| {
        CockpitError::parse_error("RaceData", format!("{name} '{}' is not an integer", fields[index]))
    })
}

fn sector_field(fields: &[&str], index: usize) -> Result<SectorStatus> {
    let code = int_field(fields, index, "sector status")?;
    SectorStatus::from_code(code)
        .ok_or_else(|| CockpitError::parse_error("RaceData", format!("unknown sector status {code}")))
}

impl FromStr for RaceSnapshot {
    type Err = CockpitError;

    fn from_str(record: &str) -> Result<Self> {
        let fields: Vec<&str> = record.split(';').collect();
        if fields.len() < RACE_DATA_FIELDS {
            return Err(CockpitError::parse_error(
                "RaceData",
                format!("expected {RACE_DATA_FIELDS} fields, found {}", fields.len()),
            ));
        }

        let flag_code = int_field(&fields, 6, "flag")?;
        let flag = Flag::from_code(flag_code)
            .ok_or_else(|| CockpitError::parse_error("RaceData", format!("unknown flag {flag_code}")))?;

        let weather_code = int_field(&fields, 7, "weather")?;
        let weather = WeatherLevel::from_code(weather_code).ok_or_else(|| {
            CockpitError::parse_error("RaceData", format!("weather level {weather_code} out of range"))
        })?;

        Ok(Self {
            laps: int_field(&fields, 0, "laps")?,
            position: int_field(&fields, 1, "position")?,
            current_lap_time: fields[2].to_string(),
            best_lap_time: fields[3].to_string(),
            total_racers: int_field(&fields, 4, "total racers")?,
            total_laps: int_field(&fields, 5, "total laps")?,
            flag,
            weather,
            rank_table: fields[8].to_string(),
            sectors: [sector_field(&fields, 9)?, sector_field(&fields, 10)?, sector_field(&fields, 11)?],
            prev_lap_time: fields[12].to_string(),
        })
    }
}

impl fmt::Display for RaceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{};{};{};{};{};{};{};{};{};{}",
            self.laps,
            self.position,
            self.current_lap_time,
            self.best_lap_time,
            self.total_racers,
            self.total_laps,
            self.flag.code(),
            self.weather.code(),
            self.rank_table,
            self.sectors[0].code(),
            self.sectors[1].code(),
            self.sectors[2].code(),
            self.prev_lap_time,
        )
    }
}
