#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/econdata-rs/fred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Statistical transforms and graph models for FRED series.
//!
//! All functions here are pure: they take observations already fetched by a
//! data manager and return derived observations or fitted coefficients.
//! Nothing in this crate performs I/O.

/// Render-agnostic graph model for one or more series.
pub mod graph;
/// Pure statistical transforms over observations.
pub mod stats;

pub use graph::SeriesGraph;
pub use stats::{covariance, diff, diff_percent, linear_regression, moving_average};
