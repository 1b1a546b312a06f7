//! Zero-phase low-pass filtering of histogram counts.

use std::fmt;

use crate::histogram::Histogram;

pub mod design;
use design::Coefficients;

/// The filter order used for smoothing fragment length histograms.
const ORDER: usize = 6;

/// The frequency granularity of the cutoff parameter: a cutoff of `f`
/// corresponds to the normalized frequency `f / 1000`.
const CUTOFF_SCALE: f64 = 1000.0;

/// A 6th-order Butterworth low-pass filter applied forward and backward
/// for zero phase distortion.
#[derive(Clone, Debug, PartialEq)]
pub struct LowPassFilter {
    coefficients: Coefficients,
}

impl LowPassFilter {
    /// Creates a filter with the provided cutoff frequency.
    ///
    /// The cutoff is expressed in thousandths of the sampling frequency and
    /// must lie in the open interval `(0, 500)`, i.e. strictly below the
    /// Nyquist frequency.
    ///
    /// # Errors
    ///
    /// If `freq_cutoff` is outside the valid interval.
    pub fn new(freq_cutoff: f64) -> Result<Self, InvalidCutoffError> {
        if !(0.0 < freq_cutoff && freq_cutoff < CUTOFF_SCALE / 2.0) {
            return Err(InvalidCutoffError { freq_cutoff });
        }

        let coefficients = design::design_low_pass(ORDER, freq_cutoff / CUTOFF_SCALE)
            .map_err(|_| InvalidCutoffError { freq_cutoff })?;

        Ok(Self { coefficients })
    }

    /// Filters the histogram counts from `offset` onwards.
    ///
    /// The counts below `offset` do not take part in filtering at all; the
    /// returned signal covers histogram bins `offset..`.
    ///
    /// # Errors
    ///
    /// If fewer bins remain past `offset` than zero-phase padding requires.
    pub fn apply(
        &self,
        histogram: &Histogram,
        offset: usize,
    ) -> Result<FilteredSignal, InsufficientDataError> {
        let sub: Vec<f64> = histogram
            .counts()
            .get(offset..)
            .unwrap_or(&[])
            .iter()
            .map(|&count| count as f64)
            .collect();

        let pad_len = self.coefficients.pad_len();
        if sub.len() <= pad_len {
            return Err(InsufficientDataError {
                len: sub.len(),
                pad_len,
            });
        }

        let values = filtfilt(&self.coefficients, &sub);

        Ok(FilteredSignal { offset, values })
    }
}

/// The result of filtering a histogram sub-range.
#[derive(Clone, Debug, PartialEq)]
pub struct FilteredSignal {
    offset: usize,
    values: Vec<f64>,
}

impl FilteredSignal {
    #[cfg(test)]
    pub(crate) fn from_values(offset: usize, values: Vec<f64>) -> Self {
        Self { offset, values }
    }

    /// Returns the histogram bin corresponding to the first filtered value.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the filtered values.
    ///
    /// `values()[j]` corresponds to histogram bin `offset() + j`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Applies the filter forward and backward over an odd extension of `x`,
/// with steady-state initial conditions scaled to the first sample of each
/// pass.
///
/// The caller must guarantee `x.len() > coefficients.pad_len()`.
fn filtfilt(coefficients: &Coefficients, x: &[f64]) -> Vec<f64> {
    let edge = coefficients.pad_len();
    debug_assert!(x.len() > edge);

    let extended = odd_extension(x, edge);
    let zi = initial_conditions(coefficients);
    let scale = |x0: f64| -> Vec<f64> { zi.iter().map(|z| z * x0).collect() };

    let mut y = lfilter(coefficients, &extended, scale(extended[0]));
    y.reverse();
    let mut y = lfilter(coefficients, &y, scale(y[0]));
    y.reverse();

    y[edge..edge + x.len()].to_vec()
}

/// Extends `x` by `n` samples on both ends, reflected through the end
/// points so the extension is odd about them.
fn odd_extension(x: &[f64], n: usize) -> Vec<f64> {
    let first = x[0];
    let last = x[x.len() - 1];

    let left = (0..n).map(|j| 2.0 * first - x[n - j]);
    let right = (0..n).map(|j| 2.0 * last - x[x.len() - 2 - j]);

    left.chain(x.iter().copied()).chain(right).collect()
}

/// Direct form II transposed IIR filtering of `x` with initial state `z`.
fn lfilter(coefficients: &Coefficients, x: &[f64], mut z: Vec<f64>) -> Vec<f64> {
    let n = coefficients.a().len().max(coefficients.b().len());
    let b = |i: usize| coefficients.b().get(i).copied().unwrap_or(0.0);
    let a = |i: usize| coefficients.a().get(i).copied().unwrap_or(0.0);

    // One slot past the state so z[i + 1] is defined for the last tap
    z.resize(n, 0.0);

    let mut out = Vec::with_capacity(x.len());
    for &sample in x {
        let y = b(0) * sample + z[0];
        for i in 0..n - 1 {
            z[i] = b(i + 1) * sample + z[i + 1] - a(i + 1) * y;
        }
        out.push(y);
    }

    out
}

/// Initial filter state producing a steady-state response to a unit step,
/// from the linear system `(I - Aᵀ) zi = B` over the filter's companion
/// matrix.
fn initial_conditions(coefficients: &Coefficients) -> Vec<f64> {
    let n = coefficients.a().len().max(coefficients.b().len());
    let b = |i: usize| coefficients.b().get(i).copied().unwrap_or(0.0);
    let a = |i: usize| coefficients.a().get(i).copied().unwrap_or(0.0);

    let dim = n - 1;
    let mut matrix = vec![vec![0.0; dim]; dim];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = if i == 0 { 1.0 } else { 0.0 } + a(i + 1);
        for j in 1..dim {
            let identity = if i == j { 1.0 } else { 0.0 };
            let companion = if i == j - 1 { 1.0 } else { 0.0 };
            row[j] = identity - companion;
        }
    }
    let rhs = (0..dim).map(|i| b(i + 1) - a(i + 1) * b(0)).collect();

    solve(matrix, rhs)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Vec<f64> {
    let n = rhs.len();

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if matrix[row][col].abs() > matrix[pivot][col].abs() {
                pivot = row;
            }
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        let lead = matrix[col].clone();
        let lead_rhs = rhs[col];
        for row in col + 1..n {
            let factor = matrix[row][col] / lead[col];
            for k in col..n {
                matrix[row][k] -= factor * lead[k];
            }
            rhs[row] -= factor * lead_rhs;
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = 0.0;
        for k in row + 1..n {
            sum += matrix[row][k] * solution[k];
        }
        solution[row] = (rhs[row] - sum) / matrix[row][row];
    }

    solution
}

/// An error for a cutoff frequency outside the filterable range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidCutoffError {
    freq_cutoff: f64,
}

impl fmt::Display for InvalidCutoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cutoff frequency {} outside the open interval (0, 500)",
            self.freq_cutoff
        )
    }
}

impl std::error::Error for InvalidCutoffError {}

/// An error for a histogram sub-range too short to filter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InsufficientDataError {
    len: usize,
    pad_len: usize,
}

impl fmt::Display for InsufficientDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bins past the offset cannot be filtered; \
             zero-phase padding requires more than {}",
            self.len, self.pad_len
        )
    }
}

impl std::error::Error for InsufficientDataError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_extension() {
        let extended = odd_extension(&[1.0, 2.0, 4.0, 7.0], 2);

        assert_eq!(extended, [-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }

    #[test]
    fn test_lfilter_first_order() {
        let coefficients = Coefficients::from_parts(vec![0.5, 0.5], vec![1.0, -0.5]);

        let y = lfilter(&coefficients, &[1.0, 0.0, 0.0, 1.0], vec![0.0]);

        assert_eq!(y, [0.5, 0.75, 0.375, 0.6875]);
    }

    #[test]
    fn test_initial_conditions() {
        let coefficients = design::design_low_pass(6, 0.3).unwrap();

        let zi = [
            9.9741493581576268e-1,
            -1.3978164938444360e0,
            1.4738141112566916e0,
            -6.3301860920115072e-1,
            2.0612932566937867e-1,
            -1.9246509795734560e-2,
        ];
        assert_approx_eq!(initial_conditions(&coefficients)[..], zi[..], epsilon = 1e-10);
    }

    #[test]
    fn test_filtfilt_matches_reference() {
        let coefficients = design::design_low_pass(6, 0.3).unwrap();
        let x: Vec<f64> = (0..30).map(|i| (0.35 * i as f64).sin() + 0.05 * i as f64).collect();

        let expected = [
            1.3163368988547159e-4,
            3.9274343867631739e-1,
            7.4399441790874876e-1,
            1.0172725725777794e0,
            1.1853771843025751e0,
            1.2339581751124702e0,
            1.1632555281649637e0,
            9.8794963699383020e-1,
            7.3527822820483557e-1,
            4.4177520600920506e-1,
            1.4902086427890490e-1,
            -1.0124053443358863e-1,
            -2.7221897407239265e-1,
            -3.3685564073126384e-1,
            -2.8146393748944343e-1,
            -1.0742583069327057e-1,
            1.6947135603144775e-1,
            5.2173208518626191e-1,
            9.1388158033348410e-1,
            1.3061510268769017e0,
            1.6577776561970283e0,
            1.9306309568911371e0,
            2.0942255869622990e0,
            2.1320583758698359e0,
            2.0470104305110892e0,
            1.8620251796832878e0,
            1.6133731921727963e0,
            1.3378664782572072e0,
            1.0600340436766809e0,
            7.8671931737053991e-1,
        ];
        assert_approx_eq!(filtfilt(&coefficients, &x)[..], expected[..], epsilon = 1e-8);
    }

    #[test]
    fn test_apply_preserves_constant_signal() {
        let lengths: Vec<u64> = (0..=60).flat_map(|length| [length; 5]).collect();
        let histogram = Histogram::from_lengths(&lengths).unwrap();
        let filter = LowPassFilter::new(40.0).unwrap();

        let signal = filter.apply(&histogram, 0).unwrap();

        assert_eq!(signal.values().len(), 61);
        for &value in signal.values() {
            assert_approx_eq!(value, 5.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_apply_covers_sub_range() {
        let lengths: Vec<u64> = (0..100).collect();
        let histogram = Histogram::from_lengths(&lengths).unwrap();
        let filter = LowPassFilter::new(40.0).unwrap();

        let signal = filter.apply(&histogram, 30).unwrap();

        assert_eq!(signal.offset(), 30);
        assert_eq!(signal.values().len(), histogram.len() - 30);
    }

    #[test]
    fn test_apply_insufficient_data() {
        let lengths = [80, 80, 80];
        let histogram = Histogram::from_lengths(&lengths).unwrap();
        let filter = LowPassFilter::new(40.0).unwrap();

        // 6 bins past the offset, padding requires more than 21
        let result = filter.apply(&histogram, 75);

        assert_eq!(
            result,
            Err(InsufficientDataError {
                len: 6,
                pad_len: 21,
            })
        );
    }

    #[test]
    fn test_apply_offset_past_end() {
        let histogram = Histogram::from_lengths(&[10, 12]).unwrap();
        let filter = LowPassFilter::new(40.0).unwrap();

        let result = filter.apply(&histogram, 100);

        assert_eq!(
            result,
            Err(InsufficientDataError {
                len: 0,
                pad_len: 21,
            })
        );
    }

    #[test]
    fn test_new_rejects_cutoff_outside_range() {
        for freq_cutoff in [0.0, -1.0, 500.0, 600.0, f64::NAN] {
            assert!(LowPassFilter::new(freq_cutoff).is_err());
        }
    }

    #[test]
    fn test_new_accepts_interior_cutoff() {
        for freq_cutoff in [1.0, 40.0, 499.0] {
            assert!(LowPassFilter::new(freq_cutoff).is_ok());
        }
    }
}
