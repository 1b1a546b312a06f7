//! Extrema detection on filtered signals.

use std::fmt;

use crate::{filter::FilteredSignal, histogram::Histogram};

/// Local maxima and minima of a filtered signal, as histogram bin indices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Extrema {
    maxes: Vec<usize>,
    mins: Vec<usize>,
}

impl Extrema {
    /// Classifies the extrema of a filtered signal by a second derivative
    /// test.
    ///
    /// A candidate sits where consecutive first differences change sign
    /// strictly, so plateaus are not flagged. Candidates are kept as maxima
    /// or minima according to the sign of the second difference two samples
    /// back; candidates too close to the start of the signal for that test,
    /// or with a second difference of exactly zero, are dropped. The
    /// returned indices are in histogram space, i.e. offset by the start of
    /// the filtered sub-range.
    ///
    /// # Errors
    ///
    /// If no minima are classified.
    pub fn classify(signal: &FilteredSignal) -> Result<Self, NoExtremaFoundError> {
        let values = signal.values();
        let offset = signal.offset();

        let d: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        let dd: Vec<f64> = d.windows(2).map(|w| w[1] - w[0]).collect();

        let mut maxes = Vec::new();
        let mut mins = Vec::new();

        for i in 1..d.len() {
            if d[i - 1] * d[i] < 0.0 {
                if i < 2 {
                    continue;
                }

                let curvature = dd[i - 2];
                if curvature < 0.0 {
                    maxes.push(offset + i);
                } else if curvature > 0.0 {
                    mins.push(offset + i);
                }
            }
        }

        if mins.is_empty() {
            return Err(NoExtremaFoundError);
        }

        Ok(Self { maxes, mins })
    }

    /// Returns the bin indices of the classified maxima.
    pub fn maxes(&self) -> &[usize] {
        &self.maxes
    }

    /// Returns the bin indices of the classified minima.
    pub fn mins(&self) -> &[usize] {
        &self.mins
    }

    /// Returns the bin index of the first minimum.
    ///
    /// [`Extrema::classify`] guarantees at least one minimum, so this is
    /// always defined for classified extrema. Pruning may remove it.
    pub fn first_min(&self) -> usize {
        self.mins[0]
    }

    /// Retains the extrema whose raw count exceeds `count_thr`.
    ///
    /// A threshold of zero keeps every extremum with at least one supporting
    /// fragment.
    pub fn retain_above(&self, histogram: &Histogram, count_thr: u64) -> Self {
        let keep = |indices: &[usize]| -> Vec<usize> {
            indices
                .iter()
                .copied()
                .filter(|&i| histogram.counts()[i] > count_thr)
                .collect()
        };

        Self {
            maxes: keep(&self.maxes),
            mins: keep(&self.mins),
        }
    }
}

/// An error for a signal without classifiable minima.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NoExtremaFoundError;

impl fmt::Display for NoExtremaFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no minima found in the filtered signal")
    }
}

impl std::error::Error for NoExtremaFoundError {}
