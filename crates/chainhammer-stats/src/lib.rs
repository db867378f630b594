//! Statistical helpers for summarizing Markov chain observables.
//!
//! This crate holds the small, stateless utilities used to present estimator
//! outputs, most notably holding-time distributions:
//!
//! - **Descriptive statistics**: min, max, mean, median, variance and standard deviation
//! - **Histograms**: uniform binning with probability, count or custom weights
//!
//! The estimation core does not depend on histograms; they exist for callers
//! that want to display a distribution.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`histogram`]: Uniform-width histograms with configurable weighting
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use chainhammer_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Creating a histogram
//!
//! ```
//! use chainhammer_stats::histogram::{Histogram, HistogramOptions};
//!
//! let values = [1.0, 2.0, 2.0, 3.0];
//! let histogram = Histogram::new(&values, &HistogramOptions::default()).unwrap();
//! assert_eq!(histogram.bin_weights.len(), 4);
//! ```

pub mod descriptive;
pub mod histogram;
