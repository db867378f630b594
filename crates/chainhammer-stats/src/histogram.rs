use serde::Serialize;

/// Default upper bound on the number of bins when none is requested.
pub const MAX_DEFAULT_BINS: usize = 100;

/// How much weight each value contributes to its bin.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Normalization {
    /// Every value weighs `1 / n`, so the bin weights of in-range data sum to 1.
    #[default]
    Uniform,
    /// Every value weighs 1; bin weights are plain counts.
    Count,
    /// Explicit per-value weights, parallel to the input values.
    Weights(Vec<f64>),
}

/// Options controlling [`Histogram::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramOptions {
    /// Number of uniform-width bins. Defaults to `min(100, values.len())`.
    pub bins: Option<usize>,
    /// Per-value weighting.
    pub normalization: Normalization,
    /// Explicit `(min, max)` range. Defaults to the extrema of the data.
    pub range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum HistogramError {
    #[display("cannot build a histogram from an empty sequence")]
    Empty,
    #[display("number of bins must be positive")]
    ZeroBins,
    #[display("expected {expected} weights, got {actual}")]
    WeightLengthMismatch { expected: usize, actual: usize },
    #[display("invalid histogram range ({min}, {max})")]
    InvalidRange { min: f64, max: f64 },
}

/// A uniform-width histogram of a numeric sequence.
///
/// Bins are half-open `[edge_k, edge_{k+1})` except for the last one, which
/// also includes the upper edge. Values outside the range (and NaNs) are
/// dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` monotonically increasing bin boundaries.
    pub bin_edges: Vec<f64>,
    /// Midpoint of each bin.
    pub bin_centers: Vec<f64>,
    /// Accumulated weight of each bin.
    pub bin_weights: Vec<f64>,
}

impl Histogram {
    /// Bins `values` according to `options`.
    ///
    /// When the range collapses to a single value `x` it is widened to
    /// `(x - 1, x + 1)` so that every bin has a positive width.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chainhammer_stats::histogram::{Histogram, HistogramOptions, Normalization};
    /// let values = [0.0, 1.0, 1.5, 4.0];
    /// let options = HistogramOptions {
    ///     bins: Some(2),
    ///     normalization: Normalization::Count,
    ///     range: None,
    /// };
    /// let histogram = Histogram::new(&values, &options).unwrap();
    /// assert_eq!(histogram.bin_edges, vec![0.0, 2.0, 4.0]);
    /// assert_eq!(histogram.bin_weights, vec![3.0, 1.0]);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn new(values: &[f64], options: &HistogramOptions) -> Result<Self, HistogramError> {
        if values.is_empty() {
            return Err(HistogramError::Empty);
        }
        let num_bins = options
            .bins
            .unwrap_or_else(|| usize::min(MAX_DEFAULT_BINS, values.len()));
        if num_bins == 0 {
            return Err(HistogramError::ZeroBins);
        }

        let weights = match &options.normalization {
            Normalization::Uniform => vec![1.0 / values.len() as f64; values.len()],
            Normalization::Count => vec![1.0; values.len()],
            Normalization::Weights(weights) => {
                if weights.len() != values.len() {
                    return Err(HistogramError::WeightLengthMismatch {
                        expected: values.len(),
                        actual: weights.len(),
                    });
                }
                weights.clone()
            }
        };

        let (mut min, mut max) = options.range.unwrap_or_else(|| {
            values
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                })
        });
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(HistogramError::InvalidRange { min, max });
        }
        if max <= min {
            min -= 1.0;
            max += 1.0;
        }

        let span = max - min;
        let bin_edges = (0..=num_bins)
            .map(|k| {
                if k == num_bins {
                    max
                } else {
                    min + span * (k as f64) / (num_bins as f64)
                }
            })
            .collect::<Vec<_>>();
        let bin_centers = bin_edges
            .windows(2)
            .map(|edge| 0.5 * (edge[0] + edge[1]))
            .collect();

        let mut bin_weights = vec![0.0; num_bins];
        for (&value, &weight) in values.iter().zip(&weights) {
            if !(min..=max).contains(&value) {
                continue;
            }
            // Recompute from the span rather than stepping edges to avoid drift
            let idx = (((value - min) / span) * num_bins as f64).floor() as usize;
            bin_weights[idx.min(num_bins - 1)] += weight;
        }

        Ok(Self {
            bin_edges,
            bin_centers,
            bin_weights,
        })
    }

    /// Number of bins.
    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.bin_weights.len()
    }

    /// Sum of all bin weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.bin_weights.iter().sum()
    }
}
