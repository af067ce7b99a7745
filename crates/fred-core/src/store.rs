//! Local store trait for persisting fetched FRED data.
//!
//! This module defines the [`SeriesStore`] trait that provides a unified
//! interface for mirroring categories, series, and observations locally so
//! repeated API calls can be avoided.

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{Category, CategoryId, Observation, Series, SeriesId},
};

/// Trait for locally persisting fetched FRED data.
///
/// Implementations can store data in various backends (SQLite, in-memory)
/// and are accessed sequentially by a single process. Lookups against absent
/// keys return `Ok(None)` or an empty vector; converting a terminal miss into
/// a not-found error is the caller's concern.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Retrieves a stored category by id.
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Stores (or replaces) a batch of categories.
    async fn put_categories(&self, categories: &[Category]) -> Result<()>;

    /// Retrieves all stored categories whose parent is the given id.
    async fn categories_by_parent(&self, parent: CategoryId) -> Result<Vec<Category>>;

    /// Retrieves a stored series by id.
    async fn get_series(&self, id: &SeriesId) -> Result<Option<Series>>;

    /// Retrieves all stored series belonging to a category.
    async fn series_in_category(&self, category: CategoryId) -> Result<Vec<Series>>;

    /// Stores (or replaces) a series record.
    async fn put_series(&self, series: &Series) -> Result<()>;

    /// Deletes a series and all of its observations.
    ///
    /// Deleting an unknown series is a no-op.
    async fn delete_series(&self, id: &SeriesId) -> Result<()>;

    /// Atomically replaces a series record and its full observation set.
    async fn replace_series(&self, series: &Series, observations: &[Observation]) -> Result<()>;

    /// Retrieves the stored observations of a series in ascending date order.
    async fn get_observations(&self, id: &SeriesId) -> Result<Vec<Observation>>;

    /// Stores a batch of observations.
    ///
    /// The batch is all-or-nothing: if any row fails, no row is kept.
    async fn put_observations(&self, observations: &[Observation]) -> Result<()>;

    /// Returns true when the series has no stored observations.
    async fn is_empty_series(&self, id: &SeriesId) -> Result<bool>;

    /// Returns true when the given remote series record is newer than the
    /// stored copy, or no copy is stored at all.
    async fn is_new_series(&self, series: &Series) -> Result<bool>;

    /// Removes all stored data.
    async fn clear(&self) -> Result<()>;
}
