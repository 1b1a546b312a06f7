//! The estimation pipeline from fragment lengths to repeat lengths.

use std::fmt;

use crate::{
    extrema::{Extrema, NoExtremaFoundError},
    filter::{FilteredSignal, InsufficientDataError, InvalidCutoffError, LowPassFilter},
    histogram::{EmptyInputError, Histogram},
};

/// Pipeline parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// First fragment length to include for filtering.
    pub offset: usize,
    /// Low-pass cutoff frequency in thousandths of the sampling frequency.
    pub freq_cutoff: f64,
    /// Number of raw counts required to retain an extremum.
    pub count_thr: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            offset: 75,
            freq_cutoff: 40.0,
            count_thr: 10,
        }
    }
}

/// The full result of a pipeline run.
///
/// The record owns the intermediate products alongside the headline
/// numbers, so callers can render or post-process without re-running the
/// pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Estimate {
    histogram: Histogram,
    filtered: FilteredSignal,
    extrema: Extrema,
    auc: f64,
}

impl Estimate {
    /// Returns the fragment length histogram.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Returns the low-pass filtered sub-range of the histogram.
    pub fn filtered(&self) -> &FilteredSignal {
        &self.filtered
    }

    /// Returns the retained maxima, i.e. the estimated repeat lengths.
    pub fn maxes(&self) -> &[usize] {
        self.extrema.maxes()
    }

    /// Returns the retained minima.
    pub fn mins(&self) -> &[usize] {
        self.extrema.mins()
    }

    /// Returns the area under the raw histogram from the first minimum.
    ///
    /// The anchoring minimum is the first one classified, whether or not
    /// count pruning retains it.
    pub fn auc(&self) -> f64 {
        self.auc
    }
}

/// Runs the pipeline over the provided fragment lengths.
///
/// The stages run strictly in sequence: histogram construction, zero-phase
/// low-pass filtering from `config.offset`, extrema classification, area
/// under the curve from the first minimum, and finally count pruning of the
/// extrema. Any failing stage aborts the run.
///
/// # Errors
///
/// If any stage fails; see [`Error`].
pub fn estimate(lengths: &[u64], config: &Config) -> Result<Estimate, Error> {
    let histogram = Histogram::from_lengths(lengths)?;
    log::info!(
        "Counted {} fragments into a histogram of {} bins.",
        histogram.total(),
        histogram.len()
    );

    let filter = LowPassFilter::new(config.freq_cutoff)?;
    let filtered = filter.apply(&histogram, config.offset)?;

    let extrema = Extrema::classify(&filtered)?;
    let auc = histogram.tail_sum(extrema.first_min());
    let retained = extrema.retain_above(&histogram, config.count_thr);
    log::info!(
        "Retained {}/{} maxima and {}/{} minima above count threshold {}.",
        retained.maxes().len(),
        extrema.maxes().len(),
        retained.mins().len(),
        extrema.mins().len(),
        config.count_thr,
    );

    Ok(Estimate {
        histogram,
        filtered,
        extrema: retained,
        auc,
    })
}

/// An error associated with running the pipeline.
#[derive(Debug)]
pub enum Error {
    /// No input lengths.
    EmptyInputError(EmptyInputError),
    /// Cutoff frequency outside the filterable range.
    InvalidCutoffError(InvalidCutoffError),
    /// Too little data past the offset to filter.
    InsufficientDataError(InsufficientDataError),
    /// No minima in the filtered signal.
    NoExtremaFoundError(NoExtremaFoundError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInputError(e) => write!(f, "{e}"),
            Error::InvalidCutoffError(e) => write!(f, "{e}"),
            Error::InsufficientDataError(e) => write!(f, "{e}"),
            Error::NoExtremaFoundError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<EmptyInputError> for Error {
    fn from(e: EmptyInputError) -> Self {
        Self::EmptyInputError(e)
    }
}

impl From<InvalidCutoffError> for Error {
    fn from(e: InvalidCutoffError) -> Self {
        Self::InvalidCutoffError(e)
    }
}

impl From<InsufficientDataError> for Error {
    fn from(e: InsufficientDataError) -> Self {
        Self::InsufficientDataError(e)
    }
}

impl From<NoExtremaFoundError> for Error {
    fn from(e: NoExtremaFoundError) -> Self {
        Self::NoExtremaFoundError(e)
    }
}
