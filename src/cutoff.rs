//! Wrapped cutoff dates.
//!
//! The provider takes its yearly snapshot before the calendar year ends, so
//! every year has a boundary day after which listens no longer count toward
//! that year's recap. Those late listens are dropped, not rolled forward into
//! the next year.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use phf::phf_map;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CUTOFF: &str = "10-31";

/// Snapshot dates observed for past recaps.
static KNOWN_CUTOFFS: phf::Map<&'static str, &'static str> = phf_map! {
    "2024" => "11-12",
    "2023" => "11-19",
    "2022" => "11-17", // unconfirmed
};

/// A fixed-width `MM-DD` day of the year.
///
/// Because the width is fixed, comparing two values as strings is the same
/// as comparing them as calendar days within one year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay(String);

impl MonthDay {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MonthDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b'-'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            bail!("Invalid cutoff date '{s}', expected MM-DD");
        }

        // 2000 is a leap year, so 02-29 is accepted.
        NaiveDate::parse_from_str(&format!("2000-{s}"), "%Y-%m-%d")
            .with_context(|| format!("Invalid cutoff date '{s}', not a calendar day"))?;

        Ok(MonthDay(s.to_string()))
    }
}

impl TryFrom<String> for MonthDay {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.0
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-year cutoff boundaries with a fallback for unlisted years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoffTable {
    pub dates: BTreeMap<String, MonthDay>,
    pub default: MonthDay,
}

impl CutoffTable {
    pub fn new(dates: BTreeMap<String, MonthDay>, default: MonthDay) -> Self {
        Self { dates, default }
    }

    /// The boundary for `year`. Listens on or after this day are excluded.
    pub fn boundary_for(&self, year: &str) -> &MonthDay {
        self.dates.get(year).unwrap_or(&self.default)
    }
}

impl Default for CutoffTable {
    fn default() -> Self {
        let dates = KNOWN_CUTOFFS
            .entries()
            .map(|(year, date)| (year.to_string(), MonthDay(date.to_string())))
            .collect();
        Self {
            dates,
            default: MonthDay(DEFAULT_CUTOFF.to_string()),
        }
    }
}
