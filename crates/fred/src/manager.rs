//! Cache-first data manager tying a remote source to a local store.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use fred_api::FredApi;
use fred_core::{
    Category, CategoryId, CategoryTree, DataSource, Observation, Result, Series, SeriesId,
    SeriesStore,
};

/// Cache-first access to categories, series, and observations.
///
/// Every read checks the local store first and falls back to the remote
/// source, writing fetched records through so the next read is local. Remote
/// failures are reported as-is; the manager does not retry.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use fred_data::{DataManager, MemoryStore, SeriesId};
///
/// let manager = DataManager::fred("my-api-key", Arc::new(MemoryStore::new()));
/// let series = manager.series(&SeriesId::new("GDP")).await?;
/// ```
pub struct DataManager {
    source: Arc<dyn DataSource>,
    store: Arc<dyn SeriesStore>,
}

impl std::fmt::Debug for DataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataManager")
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl DataManager {
    /// Creates a manager over an arbitrary source and store.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource>, store: Arc<dyn SeriesStore>) -> Self {
        Self { source, store }
    }

    /// Creates a manager backed by the FRED REST API.
    #[must_use]
    pub fn fred(api_key: impl Into<String>, store: Arc<dyn SeriesStore>) -> Self {
        Self::new(Arc::new(FredApi::new(api_key)), store)
    }

    /// Returns a category, fetching and persisting it on a local miss.
    ///
    /// # Errors
    ///
    /// Fails with [`FredError::CategoryNotFound`](fred_core::FredError) when
    /// neither the store nor the source knows the category.
    pub async fn category(&self, id: CategoryId) -> Result<Category> {
        if let Some(category) = self.store.get_category(id).await? {
            debug!(category = %id, "Cache hit for category");
            return Ok(category);
        }

        debug!(category = %id, source = self.source.name(), "Fetching category");
        let category = self.source.fetch_category(id).await?;
        self.store
            .put_categories(std::slice::from_ref(&category))
            .await?;
        Ok(category)
    }

    /// Returns all series of a category, fetching and persisting them when
    /// none are stored locally.
    pub async fn series_in_category(&self, category: CategoryId) -> Result<Vec<Series>> {
        let stored = self.store.series_in_category(category).await?;
        if !stored.is_empty() {
            debug!(
                category = %category,
                count = stored.len(),
                "Cache hit for series listing"
            );
            return Ok(stored);
        }

        debug!(category = %category, source = self.source.name(), "Fetching series listing");
        let fetched = self.source.fetch_series_in_category(category).await?;
        for series in &fetched {
            self.store.put_series(series).await?;
        }
        Ok(fetched)
    }

    /// Returns a series record, fetching and persisting it on a local miss.
    ///
    /// # Errors
    ///
    /// Fails with [`FredError::SeriesNotFound`](fred_core::FredError) when
    /// neither the store nor the source knows the series.
    pub async fn series(&self, id: &SeriesId) -> Result<Series> {
        if let Some(series) = self.store.get_series(id).await? {
            debug!(series = %id, "Cache hit for series");
            return Ok(series);
        }

        debug!(series = %id, source = self.source.name(), "Fetching series");
        let series = self.source.fetch_series(id).await?;
        self.store.put_series(&series).await?;
        Ok(series)
    }

    /// Returns the observations of a series in ascending date order.
    ///
    /// With `force` set the remote copy is always fetched and replaces the
    /// local one. Otherwise stored observations are returned when the series
    /// is known locally and has at least one stored observation; a miss
    /// fetches the series and its observations and persists both.
    pub async fn observations(&self, id: &SeriesId, force: bool) -> Result<Vec<Observation>> {
        let known = self.store.get_series(id).await?;
        if !force && known.is_some() && !self.store.is_empty_series(id).await? {
            debug!(series = %id, "Cache hit for observations");
            return self.store.get_observations(id).await;
        }

        debug!(series = %id, source = self.source.name(), force, "Fetching observations");
        let mut series = self.source.fetch_series(id).await?;
        if series.category_id.is_none() {
            // A point lookup does not report the owning category. Keep the
            // one recorded locally rather than losing it.
            series.category_id = known.and_then(|stored| stored.category_id);
        }
        let observations = self.source.fetch_observations(id).await?;
        self.store.replace_series(&series, &observations).await?;
        Ok(observations)
    }

    /// Refreshes a series when the remote copy is newer than the stored one,
    /// or the stored copy has no observations yet.
    ///
    /// Returns `true` when new data was fetched and stored, `false` when the
    /// stored copy is already current.
    pub async fn refresh_series(&self, id: &SeriesId) -> Result<bool> {
        let mut remote = self.source.fetch_series(id).await?;
        let stale = self.store.is_new_series(&remote).await?
            || self.store.is_empty_series(id).await?;
        if !stale {
            debug!(series = %id, "Series already current");
            return Ok(false);
        }

        if remote.category_id.is_none() {
            if let Some(stored) = self.store.get_series(id).await? {
                remote.category_id = stored.category_id;
            }
        }

        debug!(series = %id, source = self.source.name(), "Refreshing series");
        let observations = self.source.fetch_observations(id).await?;
        self.store.replace_series(&remote, &observations).await?;
        Ok(true)
    }

    /// Refreshes every series of a category.
    ///
    /// Returns `true` only when every series was refreshed with new data.
    pub async fn refresh_category(&self, category: CategoryId) -> Result<bool> {
        let series = self.series_in_category(category).await?;
        let mut all_refreshed = true;
        for record in &series {
            if !self.refresh_series(&record.id).await? {
                all_refreshed = false;
            }
        }
        Ok(all_refreshed)
    }

    /// Deletes a series and its observations from the local store.
    ///
    /// Deleting an unknown series is a no-op.
    pub async fn delete_series(&self, id: &SeriesId) -> Result<()> {
        warn!(series = %id, "Deleting series from store");
        self.store.delete_series(id).await
    }

    /// Returns a category and all of its descendants via an iterative
    /// breadth-first walk.
    ///
    /// Child listings come from the store when present; remotely fetched
    /// listings are written through. The root category is the first entry.
    pub async fn descendants(&self, id: CategoryId) -> Result<Vec<Category>> {
        let root = self.category(id).await?;
        let mut result = vec![root];
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for child in self.children(current).await? {
                queue.push_back(child.id);
                result.push(child);
            }
        }
        Ok(result)
    }

    /// Returns a category and all of its descendants via a recursive
    /// remote-only walk.
    ///
    /// Nothing is persisted. Returns the same set of categories as
    /// [`Self::descendants`], in depth-first order.
    pub async fn descendants_remote(&self, id: CategoryId) -> Result<Vec<Category>> {
        let root = self.source.fetch_category(id).await?;
        let mut result = vec![root];
        self.collect_remote(id, &mut result).await?;
        Ok(result)
    }

    /// Returns the subtree rooted at a category as a [`CategoryTree`].
    pub async fn category_tree(&self, id: CategoryId) -> Result<CategoryTree> {
        CategoryTree::from_categories(self.descendants(id).await?)
    }

    /// Returns the direct children of a category, cache-first.
    ///
    /// An empty local listing is treated as a miss, so leaves are re-queried
    /// remotely on every walk.
    async fn children(&self, id: CategoryId) -> Result<Vec<Category>> {
        let stored = self.store.categories_by_parent(id).await?;
        if !stored.is_empty() {
            return Ok(stored);
        }

        let children = self.source.fetch_category_children(id).await?;
        if !children.is_empty() {
            self.store.put_categories(&children).await?;
        }
        Ok(children)
    }

    fn collect_remote<'a>(
        &'a self,
        id: CategoryId,
        result: &'a mut Vec<Category>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            for child in self.source.fetch_category_children(id).await? {
                let child_id = child.id;
                result.push(child);
                self.collect_remote(child_id, result).await?;
            }
            Ok(())
        })
    }
}
