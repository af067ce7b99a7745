//! Core data types for FRED economic data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`CategoryId`] - Numeric category identifier
//! - [`SeriesId`] - Series identifier/ticker
//! - [`Category`] - Hierarchical grouping node for series
//! - [`Series`] - A named sequence of observations at a given frequency
//! - [`Observation`] - A single dated value within a series

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::frequency::Frequency;

/// Numeric identifier of a category. The FRED root category has id 0.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl CategoryId {
    /// The root of the FRED category hierarchy.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A series identifier (e.g. `GNPCA`).
///
/// Identifiers are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId(String);

impl SeriesId {
    /// Creates a new series id from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeriesId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for SeriesId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SeriesId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A hierarchical grouping node for series.
///
/// The parent graph is acyclic; the root category carries no parent. FRED
/// reports the root as its own parent on the wire, which is normalized to
/// `None` at parse time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier of this category.
    pub id: CategoryId,
    /// Human-readable name.
    pub name: String,
    /// Identifier of the parent category, absent for the root.
    pub parent_id: Option<CategoryId>,
}

impl Category {
    /// Creates a new category.
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>, parent_id: Option<CategoryId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {}", self.name, self.id)?;
        match self.parent_id {
            Some(parent) => write!(f, ", parent {parent})"),
            None => write!(f, ", root)"),
        }
    }
}

/// A named, timestamped sequence of observations at a given frequency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Identifier of this series.
    pub id: SeriesId,
    /// Title of the series.
    pub title: String,
    /// Expected spacing of the observations.
    pub frequency: Frequency,
    /// Category owning this series, when known.
    ///
    /// Point lookups against the series endpoint do not report a category,
    /// so a remotely fetched record may lack one.
    pub category_id: Option<CategoryId>,
    /// When the upstream copy of the series was last revised.
    pub last_updated: DateTime<FixedOffset>,
    /// Date of the earliest observation, when the series has any.
    pub observation_start: Option<NaiveDate>,
    /// Date of the latest observation, when the series has any.
    pub observation_end: Option<NaiveDate>,
}

impl Series {
    /// Creates a new series with required fields.
    #[must_use]
    pub fn new(
        id: SeriesId,
        title: impl Into<String>,
        frequency: Frequency,
        last_updated: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            frequency,
            category_id: None,
            last_updated,
            observation_start: None,
            observation_end: None,
        }
    }

    /// Sets the owning category.
    #[must_use]
    pub const fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Sets the observation date range.
    #[must_use]
    pub const fn with_observation_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.observation_start = Some(start);
        self.observation_end = Some(end);
        self
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} (last updated {})",
            self.id, self.frequency, self.title, self.last_updated
        )
    }
}

/// A single dated value within a series.
///
/// FRED reports unreleased or discontinued data points as `"."`; those parse
/// to a `None` value. Dates within one series are unique and the store
/// returns them in ascending order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Series this observation belongs to.
    pub series_id: SeriesId,
    /// Date of the observation.
    pub date: NaiveDate,
    /// Reported value, absent when unreported.
    pub value: Option<f64>,
}

impl Observation {
    /// Creates a new observation.
    #[must_use]
    pub const fn new(series_id: SeriesId, date: NaiveDate, value: Option<f64>) -> Self {
        Self {
            series_id,
            date,
            value,
        }
    }

    /// Returns the value, substituting NaN when unreported.
    #[must_use]
    pub fn value_or_nan(&self) -> f64 {
        self.value.unwrap_or(f64::NAN)
    }

    /// Days between the Unix epoch and this observation's date.
    #[must_use]
    pub fn epoch_days(&self) -> i64 {
        // NaiveDate::default() is the Unix epoch, 1970-01-01.
        self.date.signed_duration_since(NaiveDate::default()).num_days()
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{} {}: {v}", self.series_id, self.date),
            None => write!(f, "{} {}: .", self.series_id, self.date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_id_uppercased() {
        let id = SeriesId::new("gnpca");
        assert_eq!(id.as_str(), "GNPCA");
        assert_eq!(id, SeriesId::new("GNPCA"));
    }

    #[test]
    fn test_epoch_days() {
        let obs = Observation::new(
            SeriesId::new("GNPCA"),
            NaiveDate::from_ymd_opt(1970, 1, 11).unwrap(),
            Some(1.0),
        );
        assert_eq!(obs.epoch_days(), 10);
    }

    #[test]
    fn test_missing_value_is_nan() {
        let obs = Observation::new(
            SeriesId::new("GNPCA"),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
        );
        assert!(obs.value_or_nan().is_nan());
    }
}
