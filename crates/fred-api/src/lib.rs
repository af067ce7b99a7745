#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/econdata-rs/fred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! FRED REST API client.
//!
//! This crate implements the [`DataSource`] trait against the
//! [FRED](https://fred.stlouisfed.org/docs/api/fred/) HTTP API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fred_api::FredApi;
//! use fred_core::{CategoryId, DataSource, SeriesId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = FredApi::new("your_api_key");
//!
//!     let root = api.fetch_category(CategoryId::ROOT).await?;
//!     let children = api.fetch_category_children(root.id).await?;
//!
//!     let gnp = api.fetch_series(&SeriesId::new("GNPCA")).await?;
//!     let observations = api.fetch_observations(&gnp.id).await?;
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use fred_core::{
    Category, CategoryId, DataSource, FredError, Frequency, Observation, Result, Series, SeriesId,
};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;

/// Base URL of the FRED REST API.
const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Timestamp layout used by FRED, e.g. `2023-06-01 09:17:05-05`.
const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%#z";

/// FRED REST API client.
///
/// Provides access to:
/// - Category records and the category hierarchy
/// - Series metadata per category or by id
/// - Observations of a series
#[derive(Clone)]
pub struct FredApi {
    client: Client,
    api_key: String,
}

impl fmt::Debug for FredApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FredApi")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl FredApi {
    /// Create a new client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new client with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Build a URL with the API key and response format appended.
    fn url(&self, endpoint: &str) -> String {
        let sep = if endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{FRED_BASE_URL}/{endpoint}{sep}api_key={}&file_type=json",
            self.api_key
        )
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        tracing::debug!("FRED request: {}", endpoint);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FredError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FredError::RateLimited { retry_after: None });
        }

        if !response.status().is_success() {
            return Err(FredError::BadRequest {
                status: response.status().as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FredError::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| FredError::Parse(format!("{e}: {text}")))
    }
}

#[async_trait]
impl DataSource for FredApi {
    fn name(&self) -> &str {
        "FRED"
    }

    async fn fetch_category(&self, id: CategoryId) -> Result<Category> {
        let envelope: CategoriesEnvelope =
            self.get(&format!("category?category_id={id}")).await?;
        envelope
            .categories
            .into_iter()
            .next()
            .map(FredCategory::into_domain)
            .ok_or(FredError::CategoryNotFound(id))
    }

    async fn fetch_category_children(&self, id: CategoryId) -> Result<Vec<Category>> {
        let envelope: CategoriesEnvelope = self
            .get(&format!("category/children?category_id={id}"))
            .await?;
        Ok(envelope
            .categories
            .into_iter()
            .map(FredCategory::into_domain)
            .collect())
    }

    async fn fetch_series_in_category(&self, category: CategoryId) -> Result<Vec<Series>> {
        let envelope: SeriessEnvelope = self
            .get(&format!("category/series?category_id={category}"))
            .await?;
        envelope
            .seriess
            .into_iter()
            .map(|raw| raw.into_domain(Some(category)))
            .collect()
    }

    async fn fetch_series(&self, id: &SeriesId) -> Result<Series> {
        let envelope: SeriessEnvelope = self.get(&format!("series?series_id={id}")).await?;
        envelope
            .seriess
            .into_iter()
            .next()
            .ok_or_else(|| FredError::SeriesNotFound(id.to_string()))?
            .into_domain(None)
    }

    async fn fetch_observations(&self, id: &SeriesId) -> Result<Vec<Observation>> {
        let envelope: ObservationsEnvelope = self
            .get(&format!("series/observations?series_id={id}"))
            .await?;
        envelope
            .observations
            .into_iter()
            .map(|raw| raw.into_domain(id))
            .collect()
    }
}

// ============================================================================
// FRED API Response Types
// ============================================================================

/// Envelope of the category endpoints.
#[derive(Debug, Deserialize)]
struct CategoriesEnvelope {
    categories: Vec<FredCategory>,
}

/// FRED category record.
#[derive(Debug, Deserialize)]
struct FredCategory {
    id: i64,
    name: String,
    parent_id: Option<i64>,
}

impl FredCategory {
    /// FRED reports the root category as its own parent; normalize that to
    /// no parent at all.
    fn into_domain(self) -> Category {
        let parent_id = self
            .parent_id
            .filter(|&parent| parent != self.id)
            .map(CategoryId);
        Category::new(CategoryId(self.id), self.name, parent_id)
    }
}

/// Envelope of the series endpoints. The doubled `s` is FRED's spelling.
#[derive(Debug, Deserialize)]
struct SeriessEnvelope {
    seriess: Vec<FredSeries>,
}

/// FRED series record.
#[derive(Debug, Deserialize)]
struct FredSeries {
    id: String,
    title: String,
    frequency_short: String,
    last_updated: String,
    #[serde(default)]
    observation_start: Option<String>,
    #[serde(default)]
    observation_end: Option<String>,
}

impl FredSeries {
    fn into_domain(self, category: Option<CategoryId>) -> Result<Series> {
        let frequency: Frequency = self.frequency_short.parse()?;
        let last_updated = parse_last_updated(&self.last_updated)?;
        let mut series = Series::new(SeriesId::new(self.id), self.title, frequency, last_updated);
        series.category_id = category;
        series.observation_start = parse_date_opt(self.observation_start.as_deref())?;
        series.observation_end = parse_date_opt(self.observation_end.as_deref())?;
        Ok(series)
    }
}

/// Envelope of the observation endpoint.
#[derive(Debug, Deserialize)]
struct ObservationsEnvelope {
    observations: Vec<FredObservation>,
}

/// FRED observation record.
#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

impl FredObservation {
    /// FRED encodes unreported values as `"."`.
    fn into_domain(self, series: &SeriesId) -> Result<Observation> {
        let date = parse_date(&self.date)?;
        let value = match self.value.as_str() {
            "." => None,
            v => Some(
                v.parse::<f64>()
                    .map_err(|e| FredError::Parse(format!("Bad observation value {v:?}: {e}")))?,
            ),
        };
        Ok(Observation::new(series.clone(), date, value))
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| FredError::Parse(format!("Bad date {s:?}: {e}")))
}

fn parse_date_opt(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(parse_date).transpose()
}

fn parse_last_updated(s: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, LAST_UPDATED_FORMAT)
        .map_err(|e| FredError::Parse(format!("Bad last_updated {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let api = FredApi::new("test_key");
        assert_eq!(
            api.url("category?category_id=0"),
            "https://api.stlouisfed.org/fred/category?category_id=0&api_key=test_key&file_type=json"
        );
        assert_eq!(
            api.url("releases"),
            "https://api.stlouisfed.org/fred/releases?api_key=test_key&file_type=json"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let api = FredApi::new("secret_key_12345");
        let debug_str = format!("{:?}", api);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_parse_categories_envelope() {
        let payload = r#"{"categories":[
            {"id":125,"name":"Trade Balance","parent_id":13}
        ]}"#;
        let envelope: CategoriesEnvelope = serde_json::from_str(payload).unwrap();
        let category = envelope.categories.into_iter().next().unwrap().into_domain();
        assert_eq!(category.id, CategoryId(125));
        assert_eq!(category.name, "Trade Balance");
        assert_eq!(category.parent_id, Some(CategoryId(13)));
    }

    #[test]
    fn test_root_category_normalized() {
        let payload = r#"{"categories":[{"id":0,"name":"Categories","parent_id":0}]}"#;
        let envelope: CategoriesEnvelope = serde_json::from_str(payload).unwrap();
        let root = envelope.categories.into_iter().next().unwrap().into_domain();
        assert_eq!(root.id, CategoryId::ROOT);
        assert_eq!(root.parent_id, None);
    }

    #[test]
    fn test_parse_seriess_envelope() {
        let payload = r#"{"seriess":[{
            "id":"GNPCA",
            "title":"Real Gross National Product",
            "frequency_short":"A",
            "last_updated":"2023-03-30 07:54:02-05",
            "observation_start":"1929-01-01",
            "observation_end":"2022-01-01"
        }]}"#;
        let envelope: SeriessEnvelope = serde_json::from_str(payload).unwrap();
        let series = envelope
            .seriess
            .into_iter()
            .next()
            .unwrap()
            .into_domain(Some(CategoryId(106)))
            .unwrap();
        assert_eq!(series.id, SeriesId::new("GNPCA"));
        assert_eq!(series.frequency, Frequency::Annual);
        assert_eq!(series.category_id, Some(CategoryId(106)));
        assert_eq!(
            series.observation_start,
            Some(NaiveDate::from_ymd_opt(1929, 1, 1).unwrap())
        );
        assert_eq!(series.last_updated.to_rfc3339(), "2023-03-30T07:54:02-05:00");
    }

    #[test]
    fn test_parse_observations_envelope() {
        let payload = r#"{"observations":[
            {"date":"2022-01-01","value":"21407.693"},
            {"date":"2023-01-01","value":"."}
        ]}"#;
        let envelope: ObservationsEnvelope = serde_json::from_str(payload).unwrap();
        let id = SeriesId::new("GNPCA");
        let observations: Vec<Observation> = envelope
            .observations
            .into_iter()
            .map(|raw| raw.into_domain(&id).unwrap())
            .collect();
        assert_eq!(observations[0].value, Some(21407.693));
        assert_eq!(observations[1].value, None);
        assert_eq!(
            observations[1].date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_bad_observation_value_is_parse_error() {
        let raw = FredObservation {
            date: "2022-01-01".to_string(),
            value: "n/a".to_string(),
        };
        let result = raw.into_domain(&SeriesId::new("GNPCA"));
        assert!(matches!(result, Err(FredError::Parse(_))));
    }

    #[test]
    fn test_unknown_frequency_is_parse_error() {
        let raw = FredSeries {
            id: "X".to_string(),
            title: "X".to_string(),
            frequency_short: "5Y".to_string(),
            last_updated: "2023-03-30 07:54:02-05".to_string(),
            observation_start: None,
            observation_end: None,
        };
        assert!(raw.into_domain(None).is_err());
    }
}
