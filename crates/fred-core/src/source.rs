//! Remote data source trait.
//!
//! [`DataSource`] abstracts the FRED REST API so the data manager and tests
//! can run against anything that serves category, series, and observation
//! records.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{Category, CategoryId, Observation, Series, SeriesId},
};

/// A remote source of category, series, and observation records.
///
/// Implementations perform network I/O only; persistence is the store's job.
#[async_trait]
pub trait DataSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g. "FRED").
    fn name(&self) -> &str;

    /// Fetches a single category by id.
    ///
    /// Fails with [`FredError::CategoryNotFound`](crate::FredError) when the
    /// service reports no such category.
    async fn fetch_category(&self, id: CategoryId) -> Result<Category>;

    /// Fetches the direct children of a category. An empty result means the
    /// category is a leaf.
    async fn fetch_category_children(&self, id: CategoryId) -> Result<Vec<Category>>;

    /// Fetches all series belonging to a category.
    async fn fetch_series_in_category(&self, category: CategoryId) -> Result<Vec<Series>>;

    /// Fetches a single series by id.
    ///
    /// Fails with [`FredError::SeriesNotFound`](crate::FredError) when the
    /// service reports no such series.
    async fn fetch_series(&self, id: &SeriesId) -> Result<Series>;

    /// Fetches all observations of a series in ascending date order.
    async fn fetch_observations(&self, id: &SeriesId) -> Result<Vec<Observation>>;
}
