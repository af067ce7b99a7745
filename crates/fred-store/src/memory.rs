//! In-memory store implementation.

use async_trait::async_trait;
use fred_core::{Category, CategoryId, Observation, Result, Series, SeriesId, SeriesStore};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Simple in-memory store for testing and throwaway sessions.
///
/// Data is held in `RwLock`-protected maps and is lost when the store is
/// dropped. Observations are keyed by date per series, which also enforces
/// the one-value-per-date invariant and ascending read order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    categories: RwLock<HashMap<CategoryId, Category>>,
    series: RwLock<HashMap<SeriesId, Series>>,
    observations: RwLock<HashMap<SeriesId, BTreeMap<chrono::NaiveDate, Option<f64>>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeriesStore for MemoryStore {
    #[instrument(skip(self))]
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    #[instrument(skip(self, categories), fields(count = categories.len()))]
    async fn put_categories(&self, categories: &[Category]) -> Result<()> {
        let mut map = self.categories.write().await;
        for category in categories {
            map.insert(category.id, category.clone());
        }
        debug!("Stored {} categories", categories.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn categories_by_parent(&self, parent: CategoryId) -> Result<Vec<Category>> {
        let map = self.categories.read().await;
        let mut children: Vec<Category> = map
            .values()
            .filter(|c| c.parent_id == Some(parent))
            .cloned()
            .collect();
        children.sort_by_key(|c| c.id);
        Ok(children)
    }

    #[instrument(skip(self))]
    async fn get_series(&self, id: &SeriesId) -> Result<Option<Series>> {
        Ok(self.series.read().await.get(id).cloned())
    }

    #[instrument(skip(self))]
    async fn series_in_category(&self, category: CategoryId) -> Result<Vec<Series>> {
        let map = self.series.read().await;
        let mut series: Vec<Series> = map
            .values()
            .filter(|s| s.category_id == Some(category))
            .cloned()
            .collect();
        series.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(series)
    }

    #[instrument(skip(self, series), fields(series = %series.id))]
    async fn put_series(&self, series: &Series) -> Result<()> {
        self.series
            .write()
            .await
            .insert(series.id.clone(), series.clone());
        debug!("Stored series");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_series(&self, id: &SeriesId) -> Result<()> {
        self.series.write().await.remove(id);
        self.observations.write().await.remove(id);
        debug!("Deleted series");
        Ok(())
    }

    #[instrument(skip(self, series, observations), fields(series = %series.id, count = observations.len()))]
    async fn replace_series(&self, series: &Series, observations: &[Observation]) -> Result<()> {
        let mut series_map = self.series.write().await;
        let mut obs_map = self.observations.write().await;
        series_map.insert(series.id.clone(), series.clone());
        let entries = obs_map.entry(series.id.clone()).or_default();
        entries.clear();
        for obs in observations {
            entries.insert(obs.date, obs.value);
        }
        debug!("Replaced series with {} observations", observations.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_observations(&self, id: &SeriesId) -> Result<Vec<Observation>> {
        let map = self.observations.read().await;
        let observations = map
            .get(id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(&date, &value)| Observation::new(id.clone(), date, value))
                    .collect()
            })
            .unwrap_or_default();
        Ok(observations)
    }

    #[instrument(skip(self, observations), fields(count = observations.len()))]
    async fn put_observations(&self, observations: &[Observation]) -> Result<()> {
        let mut map = self.observations.write().await;
        for obs in observations {
            map.entry(obs.series_id.clone())
                .or_default()
                .insert(obs.date, obs.value);
        }
        debug!("Stored {} observations", observations.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn is_empty_series(&self, id: &SeriesId) -> Result<bool> {
        let map = self.observations.read().await;
        Ok(map.get(id).is_none_or(BTreeMap::is_empty))
    }

    #[instrument(skip(self, series), fields(series = %series.id))]
    async fn is_new_series(&self, series: &Series) -> Result<bool> {
        let map = self.series.read().await;
        Ok(match map.get(&series.id) {
            None => true,
            Some(stored) => series.last_updated > stored.last_updated,
        })
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.categories.write().await.clear();
        self.series.write().await.clear();
        self.observations.write().await.clear();
        debug!("Cleared all stored data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use fred_core::Frequency;

    fn sample_series(id: &str) -> Series {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        Series::new(
            SeriesId::new(id),
            format!("Series {id}"),
            Frequency::Monthly,
            tz.with_ymd_and_hms(2023, 3, 30, 7, 0, 0).unwrap(),
        )
        .with_category(CategoryId(32991))
    }

    #[tokio::test]
    async fn test_series_round_trip() {
        let store = MemoryStore::new();
        let series = sample_series("UNRATE");

        assert!(store.get_series(&series.id).await.unwrap().is_none());
        store.put_series(&series).await.unwrap();
        assert_eq!(store.get_series(&series.id).await.unwrap(), Some(series));
    }

    #[tokio::test]
    async fn test_observations_sorted_by_date() {
        let store = MemoryStore::new();
        let id = SeriesId::new("UNRATE");
        let observations = vec![
            Observation::new(
                id.clone(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                Some(3.9),
            ),
            Observation::new(
                id.clone(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                Some(3.7),
            ),
        ];
        store.put_observations(&observations).await.unwrap();

        let stored = store.get_observations(&id).await.unwrap();
        assert_eq!(stored[0].value, Some(3.7));
        assert_eq!(stored[1].value, Some(3.9));
    }

    #[tokio::test]
    async fn test_duplicate_date_replaces() {
        let store = MemoryStore::new();
        let id = SeriesId::new("UNRATE");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        store
            .put_observations(&[Observation::new(id.clone(), date, Some(3.7))])
            .await
            .unwrap();
        store
            .put_observations(&[Observation::new(id.clone(), date, Some(3.8))])
            .await
            .unwrap();

        let stored = store.get_observations(&id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value, Some(3.8));
    }

    #[tokio::test]
    async fn test_delete_and_empty_predicates() {
        let store = MemoryStore::new();
        let series = sample_series("UNRATE");
        store.put_series(&series).await.unwrap();
        store
            .put_observations(&[Observation::new(
                series.id.clone(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                Some(3.7),
            )])
            .await
            .unwrap();

        assert!(!store.is_empty_series(&series.id).await.unwrap());
        store.delete_series(&series.id).await.unwrap();
        assert!(store.is_empty_series(&series.id).await.unwrap());
        assert!(store.get_series(&series.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_categories_by_parent() {
        let store = MemoryStore::new();
        store
            .put_categories(&[
                Category::new(CategoryId(0), "Categories", None),
                Category::new(CategoryId(2), "Production", Some(CategoryId(0))),
                Category::new(CategoryId(1), "Money", Some(CategoryId(0))),
            ])
            .await
            .unwrap();

        let children = store.categories_by_parent(CategoryId(0)).await.unwrap();
        let ids: Vec<i64> = children.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
