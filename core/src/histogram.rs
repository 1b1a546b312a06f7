//! Fragment length histograms.

use std::fmt;

/// A histogram of fragment lengths over unit-width bins.
///
/// Bin `i` counts the fragments of length exactly `i`, so that the histogram
/// spans `0..=max` for the largest observed length `max`. Equivalently, bin
/// `i` covers the interval `(i - 0.5, i + 0.5]` with the integer length as
/// its center.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u64>,
}

impl Histogram {
    /// Creates a histogram by binning the provided fragment lengths.
    ///
    /// # Errors
    ///
    /// If `lengths` is empty.
    pub fn from_lengths(lengths: &[u64]) -> Result<Self, EmptyInputError> {
        let max = lengths.iter().copied().max().ok_or(EmptyInputError)?;

        let mut counts = vec![0; max as usize + 1];
        for &length in lengths {
            counts[length as usize] += 1;
        }

        Ok(Self { counts })
    }

    /// Returns the per-bin counts, indexed by fragment length.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Returns the number of bins.
    ///
    /// This is one more than the largest observed length, since bins start
    /// at length zero.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns the largest observed fragment length.
    pub fn max_length(&self) -> u64 {
        self.counts.len() as u64 - 1
    }

    /// Returns the total number of fragments behind the histogram.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Sums the raw counts from bin `from` (inclusive) to the end.
    pub fn tail_sum(&self, from: usize) -> f64 {
        self.counts
            .get(from..)
            .unwrap_or(&[])
            .iter()
            .map(|&count| count as f64)
            .sum()
    }
}

/// An error for empty input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EmptyInputError;

impl fmt::Display for EmptyInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no fragment lengths provided")
    }
}

impl std::error::Error for EmptyInputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lengths() {
        let histogram = Histogram::from_lengths(&[3, 3, 4]).unwrap();

        assert_eq!(histogram.counts(), &[0, 0, 0, 2, 1]);
        assert_eq!(histogram.len(), 5);
        assert_eq!(histogram.max_length(), 4);
    }

    #[test]
    fn test_from_lengths_empty_is_error() {
        assert_eq!(Histogram::from_lengths(&[]), Err(EmptyInputError));
    }

    #[test]
    fn test_total_is_input_size() {
        let lengths = [7, 2, 2, 9, 7, 7];
        let histogram = Histogram::from_lengths(&lengths).unwrap();

        assert_eq!(histogram.total(), lengths.len() as u64);
    }

    #[test]
    fn test_tail_sum() {
        let histogram = Histogram::from_lengths(&[1, 2, 2, 3]).unwrap();

        assert_approx_eq!(histogram.tail_sum(0), 4.0);
        assert_approx_eq!(histogram.tail_sum(2), 3.0);
        assert_approx_eq!(histogram.tail_sum(3), 1.0);
        assert_approx_eq!(histogram.tail_sum(17), 0.0);
    }
}
