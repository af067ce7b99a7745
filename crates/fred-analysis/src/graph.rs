//! Render-agnostic graph model for one or more series.
//!
//! [`SeriesGraph`] prepares everything a plotting backend needs to draw a
//! series: per-trace x/y vectors, a shared y-range, x-axis tick dates, and
//! an optional regression overlay. It deliberately stops short of rasterizing
//! anything.

use chrono::NaiveDate;
use fred_core::{FredError, Observation, Result, Series};

/// Maximum number of tick marks laid out on the x-axis.
const MAX_TICKS: usize = 15;

/// One polyline on the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    /// Title shown in the legend.
    pub title: String,
    /// X values, in days since the Unix epoch.
    pub xs: Vec<i64>,
    /// Y values; unreported observations surface as NaN gaps.
    pub ys: Vec<f64>,
}

/// A plot description for one or more series sharing an axis.
#[derive(Clone, Debug)]
pub struct SeriesGraph {
    series: Vec<Series>,
    traces: Vec<Trace>,
    tick_dates: Vec<NaiveDate>,
    min_value: f64,
    max_value: f64,
    regression: Option<(f64, f64)>,
}

impl SeriesGraph {
    /// Builds a graph for one series from its observations.
    ///
    /// # Errors
    ///
    /// Returns [`FredError::NotPlottable`] when the series carries the FRED
    /// empty-range sentinel, reports no observation range at all, or has
    /// fewer than two observations.
    pub fn build(series: &Series, observations: &[Observation]) -> Result<Self> {
        let (start, end) = match (series.observation_start, series.observation_end) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(FredError::NotPlottable(series.id.to_string())),
        };
        // FRED marks series without data with this impossible range.
        if start == NaiveDate::from_ymd_opt(1776, 7, 4).unwrap_or_default()
            && end == NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or_default()
        {
            return Err(FredError::NotPlottable(series.id.to_string()));
        }
        if observations.len() < 2 {
            return Err(FredError::NotPlottable(series.id.to_string()));
        }

        let mut observations = observations.to_vec();
        observations.sort_by_key(|obs| obs.date);

        let xs: Vec<i64> = observations.iter().map(Observation::epoch_days).collect();
        let ys: Vec<f64> = observations.iter().map(Observation::value_or_nan).collect();

        let mut min_value = f64::INFINITY;
        let mut max_value = f64::NEG_INFINITY;
        for value in observations.iter().filter_map(|obs| obs.value) {
            min_value = min_value.min(value);
            max_value = max_value.max(value);
        }

        // Lay out at most MAX_TICKS date labels: step through the sorted
        // observations by the number of nominal periods the span covers.
        let span_days = (xs[xs.len() - 1] - xs[0]).unsigned_abs();
        let periods = span_days / u64::from(series.frequency.approx_days());
        let step = (periods.div_ceil(MAX_TICKS as u64) as usize).max(1);
        let tick_dates: Vec<NaiveDate> = observations
            .iter()
            .step_by(step)
            .map(|obs| obs.date)
            .collect();

        Ok(Self {
            series: vec![series.clone()],
            traces: vec![Trace {
                title: series.title.clone(),
                xs,
                ys,
            }],
            tick_dates,
            min_value,
            max_value,
            regression: None,
        })
    }

    /// Merges another graph into this one so both render on a shared axis.
    ///
    /// The y-range widens to cover both graphs. The other graph's tick dates
    /// take over when its date range encloses this one's. The other graph's
    /// regression line, if any, is dropped.
    pub fn merge(&mut self, other: Self) {
        self.min_value = self.min_value.min(other.min_value);
        self.max_value = self.max_value.max(other.max_value);

        if let (Some(&other_first), Some(&other_last), Some(&first), Some(&last)) = (
            other.tick_dates.first(),
            other.tick_dates.last(),
            self.tick_dates.first(),
            self.tick_dates.last(),
        ) {
            if other_first <= first && other_last >= last {
                self.tick_dates = other.tick_dates;
            }
        }

        self.series.extend(other.series);
        self.traces.extend(other.traces);
    }

    /// Merges any number of graphs into this one. See [`Self::merge`].
    pub fn merge_all(&mut self, others: impl IntoIterator<Item = Self>) {
        for other in others {
            self.merge(other);
        }
    }

    /// Overlays a regression line `y = intercept + slope * x`.
    ///
    /// A graph carries at most one regression line; a second call replaces
    /// the first.
    pub fn add_regression(&mut self, intercept: f64, slope: f64) {
        self.regression = Some((intercept, slope));
    }

    /// Endpoints of the regression line across the full x-span of all
    /// traces, as `((x, y), (x, y))` pairs in epoch days. `None` when no
    /// regression line was added.
    #[must_use]
    pub fn regression_endpoints(&self) -> Option<((i64, f64), (i64, f64))> {
        let (intercept, slope) = self.regression?;
        let first = self.traces.iter().filter_map(|t| t.xs.first()).min()?;
        let last = self.traces.iter().filter_map(|t| t.xs.last()).max()?;
        Some((
            (*first, intercept + slope * *first as f64),
            (*last, intercept + slope * *last as f64),
        ))
    }

    /// The series rendered on this graph, in merge order.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// The traces rendered on this graph, in merge order.
    #[must_use]
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Dates to label on the x-axis.
    #[must_use]
    pub fn tick_dates(&self) -> &[NaiveDate] {
        &self.tick_dates
    }

    /// Smallest and largest reported y values across all traces.
    #[must_use]
    pub const fn value_range(&self) -> (f64, f64) {
        (self.min_value, self.max_value)
    }

    /// The fitted `(intercept, slope)` overlay, when one was added.
    #[must_use]
    pub const fn regression(&self) -> Option<(f64, f64)> {
        self.regression
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, FixedOffset, TimeZone};
    use fred_core::{Frequency, SeriesId};

    fn sample_series(id: &str, start: NaiveDate, end: NaiveDate) -> Series {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        Series::new(
            SeriesId::new(id),
            format!("Series {id}"),
            Frequency::Daily,
            tz.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap(),
        )
        .with_observation_range(start, end)
    }

    fn daily_observations(id: &str, start: NaiveDate, values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Observation::new(
                    SeriesId::new(id),
                    start + Days::new(i as u64),
                    Some(v),
                )
            })
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_build_sorts_and_ranges() {
        let start = date(2024, 1, 1);
        let series = sample_series("A", start, date(2024, 1, 4));
        let mut observations = daily_observations("A", start, &[3.0, 1.0, 4.0, 2.0]);
        observations.reverse();

        let graph = SeriesGraph::build(&series, &observations).unwrap();
        assert_eq!(graph.value_range(), (1.0, 4.0));
        let trace = &graph.traces()[0];
        assert!(trace.xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(trace.ys, vec![3.0, 1.0, 4.0, 2.0]);
    }

    #[test]
    fn test_tick_layout_capped() {
        let start = date(2020, 1, 1);
        let values: Vec<f64> = (0..120).map(f64::from).collect();
        let series = sample_series("A", start, start + Days::new(119));
        let graph =
            SeriesGraph::build(&series, &daily_observations("A", start, &values)).unwrap();
        assert!(graph.tick_dates().len() <= MAX_TICKS + 1);
        assert_eq!(graph.tick_dates()[0], start);
    }

    #[test]
    fn test_short_span_ticks_every_observation() {
        let start = date(2024, 1, 1);
        let series = sample_series("A", start, date(2024, 1, 3));
        let graph =
            SeriesGraph::build(&series, &daily_observations("A", start, &[1.0, 2.0, 3.0]))
                .unwrap();
        assert_eq!(graph.tick_dates().len(), 3);
    }

    #[test]
    fn test_not_plottable_sentinel_range() {
        let series = sample_series("A", date(1776, 7, 4), date(9999, 12, 31));
        let observations = daily_observations("A", date(2024, 1, 1), &[1.0, 2.0]);
        assert!(matches!(
            SeriesGraph::build(&series, &observations),
            Err(FredError::NotPlottable(_))
        ));
    }

    #[test]
    fn test_not_plottable_missing_range() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let series = Series::new(
            SeriesId::new("A"),
            "Series A",
            Frequency::Daily,
            tz.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap(),
        );
        let observations = daily_observations("A", date(2024, 1, 1), &[1.0, 2.0]);
        assert!(SeriesGraph::build(&series, &observations).is_err());
    }

    #[test]
    fn test_not_plottable_single_observation() {
        let series = sample_series("A", date(2024, 1, 1), date(2024, 1, 1));
        let observations = daily_observations("A", date(2024, 1, 1), &[1.0]);
        assert!(SeriesGraph::build(&series, &observations).is_err());
    }

    #[test]
    fn test_merge_widens_range_and_adopts_ticks() {
        let narrow_start = date(2024, 1, 5);
        let narrow = SeriesGraph::build(
            &sample_series("A", narrow_start, date(2024, 1, 7)),
            &daily_observations("A", narrow_start, &[5.0, 6.0, 7.0]),
        )
        .unwrap();

        let wide_start = date(2024, 1, 1);
        let wide = SeriesGraph::build(
            &sample_series("B", wide_start, date(2024, 1, 12)),
            &daily_observations(
                "B",
                wide_start,
                &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            ),
        )
        .unwrap();
        let wide_ticks = wide.tick_dates().to_vec();

        let mut graph = narrow;
        graph.merge(wide);
        assert_eq!(graph.value_range(), (1.0, 12.0));
        assert_eq!(graph.tick_dates(), wide_ticks);
        assert_eq!(graph.traces().len(), 2);
        assert_eq!(graph.series().len(), 2);
    }

    #[test]
    fn test_merge_keeps_ticks_for_partial_overlap() {
        let start = date(2024, 1, 1);
        let first = SeriesGraph::build(
            &sample_series("A", start, date(2024, 1, 5)),
            &daily_observations("A", start, &[1.0, 2.0, 3.0, 4.0, 5.0]),
        )
        .unwrap();
        let ticks = first.tick_dates().to_vec();

        let later_start = date(2024, 1, 3);
        let second = SeriesGraph::build(
            &sample_series("B", later_start, date(2024, 1, 6)),
            &daily_observations("B", later_start, &[1.0, 2.0, 3.0, 4.0]),
        )
        .unwrap();

        let mut graph = first;
        graph.merge(second);
        assert_eq!(graph.tick_dates(), ticks);
    }

    #[test]
    fn test_regression_overlay() {
        let start = date(2024, 1, 1);
        let series = sample_series("A", start, date(2024, 1, 3));
        let mut graph =
            SeriesGraph::build(&series, &daily_observations("A", start, &[1.0, 2.0, 3.0]))
                .unwrap();
        assert!(graph.regression_endpoints().is_none());

        graph.add_regression(0.0, 2.0);
        let ((x0, y0), (x1, y1)) = graph.regression_endpoints().unwrap();
        assert_eq!(y0, 2.0 * x0 as f64);
        assert_eq!(y1, 2.0 * x1 as f64);
        assert!(x1 > x0);
    }
}
