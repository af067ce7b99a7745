//! Observation frequency definitions.
//!
//! This module defines [`Frequency`], the spacing at which a FRED series
//! reports its observations. The enum round-trips through the short codes
//! used on the wire (`D`, `W`, `BW`, `M`, `Q`, `SA`, `A`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FredError;

/// Spacing of observations within a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// One observation per day.
    #[serde(rename = "D")]
    Daily,
    /// One observation per week.
    #[serde(rename = "W")]
    Weekly,
    /// One observation every two weeks.
    #[serde(rename = "BW")]
    Biweekly,
    /// One observation per month.
    #[serde(rename = "M")]
    Monthly,
    /// One observation per quarter.
    #[serde(rename = "Q")]
    Quarterly,
    /// Two observations per year.
    #[serde(rename = "SA")]
    Semiannual,
    /// One observation per year.
    #[serde(rename = "A")]
    Annual,
}

impl Frequency {
    /// Returns the FRED short code for this frequency.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Weekly => "W",
            Self::Biweekly => "BW",
            Self::Monthly => "M",
            Self::Quarterly => "Q",
            Self::Semiannual => "SA",
            Self::Annual => "A",
        }
    }

    /// Nominal number of days between two consecutive observations.
    ///
    /// Used for graph tick layout, not for calendar arithmetic.
    #[must_use]
    pub const fn approx_days(&self) -> u32 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 90,
            Self::Semiannual => 180,
            Self::Annual => 365,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = FredError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "D" | "DAILY" => Ok(Self::Daily),
            "W" | "WEEKLY" => Ok(Self::Weekly),
            "BW" | "BIWEEKLY" => Ok(Self::Biweekly),
            "M" | "MONTHLY" => Ok(Self::Monthly),
            "Q" | "QUARTERLY" => Ok(Self::Quarterly),
            "SA" | "SEMIANNUAL" => Ok(Self::Semiannual),
            "A" | "ANNUAL" => Ok(Self::Annual),
            other => Err(FredError::Parse(format!("Unknown frequency: {other}"))),
        }
    }
}
