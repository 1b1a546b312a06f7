#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Estimation of nucleosome repeat lengths from fragment length data.
//!
//! This serves as the core library implementation for the `nrl` CLI, but can also be used as a
//! free-standing library for working with fragment length distributions.
//!
//! # Overview
//!
//! Fragment lengths are binned into a unit-width [`Histogram`], smoothed with a zero-phase
//! Butterworth [`LowPassFilter`], and searched for [`Extrema`]: the retained maxima are the
//! estimated repeat lengths, and the area under the raw histogram from the first minimum
//! summarizes the protected fraction. [`pipeline::estimate`] runs all of the stages in order.
//!
//! # Example
//!
//! As a very brief introduction to the API, let's bin a handful of fragment lengths and
//! summarize the histogram.
//!
//! ```
//! use nrl_core::Histogram;
//!
//! let histogram = Histogram::from_lengths(&[147, 147, 148, 320]).expect("no lengths");
//!
//! // Bins are indexed by fragment length, up to the largest observed
//! assert_eq!(histogram.len(), 321);
//! assert_eq!(histogram.counts()[147], 2);
//!
//! // The sum of raw counts from a bin onward, as used for the area under the curve
//! assert_eq!(histogram.tail_sum(300), 1.0);
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod bed;

pub mod extrema;
pub use extrema::Extrema;

pub mod filter;
pub use filter::{FilteredSignal, LowPassFilter};

pub mod histogram;
pub use histogram::Histogram;

pub mod input;
pub use input::Input;

pub mod pipeline;
pub use pipeline::{estimate, Config, Estimate};
