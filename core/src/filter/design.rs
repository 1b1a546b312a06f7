//! Digital Butterworth filter design.
//!
//! Designs are produced in transfer function form by the classical route:
//! analog prototype poles, low-pass frequency scaling with bilinear
//! prewarping, bilinear transform, and expansion of the pole and zero
//! polynomials to real coefficients.

use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

/// Transfer function coefficients of a designed filter.
///
/// `b` holds the numerator and `a` the denominator coefficients, both in
/// order of descending powers of `z`, with `a` normalized so that its
/// leading coefficient is one.
#[derive(Clone, Debug, PartialEq)]
pub struct Coefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl Coefficients {
    #[cfg(test)]
    pub(crate) fn from_parts(b: Vec<f64>, a: Vec<f64>) -> Self {
        Self { b, a }
    }

    /// Returns the numerator coefficients.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Returns the denominator coefficients.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Returns the padding length required for zero-phase application.
    pub fn pad_len(&self) -> usize {
        3 * self.b.len().max(self.a.len())
    }
}

/// Designs a digital Butterworth low-pass filter of the given order.
///
/// `cutoff` is the cutoff frequency normalized such that `1.0` is the
/// Nyquist frequency.
///
/// # Errors
///
/// If `cutoff` does not lie strictly between zero and one.
pub fn design_low_pass(order: usize, cutoff: f64) -> Result<Coefficients, DesignError> {
    if !(0.0 < cutoff && cutoff < 1.0) {
        return Err(DesignError::CutoffOutOfRange { cutoff });
    }

    const FS: f64 = 2.0;
    let warped = 2.0 * FS * (std::f64::consts::PI * cutoff / FS).tan();

    // Scale the analog prototype to the prewarped cutoff
    let poles: Vec<Complex> = prototype_poles(order)
        .into_iter()
        .map(|pole| pole * warped)
        .collect();
    let gain = warped.powi(order as i32);

    // Bilinear transform at twice the sampling rate
    let fs2 = Complex::from(2.0 * FS);
    let zpoles: Vec<Complex> = poles.iter().map(|&pole| (fs2 + pole) / (fs2 - pole)).collect();
    let denominator = poles
        .iter()
        .fold(Complex::from(1.0), |acc, &pole| acc * (fs2 - pole));
    let gain = gain * (Complex::from(1.0) / denominator).re;

    // All zeros map to z = -1, so the numerator is a scaled binomial
    let b = poly(&vec![Complex::from(-1.0); order])
        .iter()
        .map(|c| gain * c.re)
        .collect();
    let a = poly(&zpoles).iter().map(|c| c.re).collect();

    Ok(Coefficients { b, a })
}

/// Poles of the analog Butterworth prototype, evenly spaced on the left
/// half of the unit circle.
fn prototype_poles(order: usize) -> Vec<Complex> {
    let n = order as i64;
    (1 - n..n)
        .step_by(2)
        .map(|m| -Complex::cis(std::f64::consts::PI * m as f64 / (2.0 * n as f64)))
        .collect()
}

/// Expands a monic polynomial from its roots, coefficients in order of
/// descending powers.
fn poly(roots: &[Complex]) -> Vec<Complex> {
    let mut coefficients = vec![Complex::from(1.0)];

    for &root in roots {
        let mut next = vec![Complex::from(0.0); coefficients.len() + 1];
        for (i, &c) in coefficients.iter().enumerate() {
            next[i] = next[i] + c;
            next[i + 1] = next[i + 1] - c * root;
        }
        coefficients = next;
    }

    coefficients
}

/// An error associated with filter design.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DesignError {
    /// Normalized cutoff frequency outside the open unit interval.
    CutoffOutOfRange {
        /// The offending cutoff.
        cutoff: f64,
    },
}

impl fmt::Display for DesignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignError::CutoffOutOfRange { cutoff } => {
                write!(f, "normalized cutoff {cutoff} outside the open interval (0, 1)")
            }
        }
    }
}

impl std::error::Error for DesignError {}

#[derive(Clone, Copy, Debug)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    /// `exp(iθ)` on the unit circle.
    fn cis(theta: f64) -> Self {
        Self {
            re: theta.cos(),
            im: theta.sin(),
        }
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Self { re, im: 0.0 }
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl Mul<f64> for Complex {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            re: self.re * rhs,
            im: self.im * rhs,
        }
    }
}

impl Div for Complex {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let norm = rhs.re * rhs.re + rhs.im * rhs.im;
        Self {
            re: (self.re * rhs.re + self.im * rhs.im) / norm,
            im: (self.im * rhs.re - self.re * rhs.im) / norm,
        }
    }
}

impl Neg for Complex {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_band_order_two() {
        let coefficients = design_low_pass(2, 0.5).unwrap();

        let b = [
            2.9289321881345243e-1,
            5.8578643762690485e-1,
            2.9289321881345243e-1,
        ];
        assert_approx_eq!(coefficients.b(), &b[..], epsilon = 1e-12);

        assert_approx_eq!(coefficients.a()[0], 1.0, epsilon = 1e-12);
        assert_approx_eq!(coefficients.a()[1], 0.0, epsilon = 1e-12);
        assert_approx_eq!(coefficients.a()[2], 1.7157287525380990e-1, epsilon = 1e-12);
    }

    #[test]
    fn test_order_six_narrow() {
        let coefficients = design_low_pass(6, 0.04).unwrap();

        let b = [
            4.8639875007808367e-8,
            2.9183925004685022e-7,
            7.2959812511712554e-7,
            9.7279750015616732e-7,
            7.2959812511712554e-7,
            2.9183925004685022e-7,
            4.8639875007808367e-8,
        ];
        let a = [
            1.0,
            -5.5145351211661637,
            12.689113056515136,
            -15.593635210704095,
            10.793296670485377,
            -3.9893594042308820,
            0.61512312205262809,
        ];
        assert_approx_eq!(coefficients.b(), &b[..], epsilon = 1e-12);
        assert_approx_eq!(coefficients.a(), &a[..], epsilon = 1e-10);
    }

    #[test]
    fn test_order_six_moderate() {
        let coefficients = design_low_pass(6, 0.08).unwrap();

        let b = [
            2.4972225268903720e-6,
            1.4983335161342231e-5,
            3.7458337903355578e-5,
            4.9944450537807442e-5,
            3.7458337903355578e-5,
            1.4983335161342231e-5,
            2.4972225268903720e-6,
        ];
        let a = [
            1.0,
            -5.0294383514216081,
            10.607042183779683,
            -11.999315816216694,
            7.6754745482002011,
            -2.6310551284739478,
            0.37745238637408857,
        ];
        assert_approx_eq!(coefficients.b(), &b[..], epsilon = 1e-12);
        assert_approx_eq!(coefficients.a(), &a[..], epsilon = 1e-10);
    }

    #[test]
    fn test_numerator_is_symmetric() {
        let coefficients = design_low_pass(6, 0.3).unwrap();

        let b = coefficients.b();
        for (i, &value) in b.iter().enumerate() {
            assert_approx_eq!(value, b[b.len() - 1 - i], epsilon = 1e-18);
        }
    }

    #[test]
    fn test_pad_len() {
        let coefficients = design_low_pass(6, 0.04).unwrap();

        assert_eq!(coefficients.pad_len(), 21);
    }

    #[test]
    fn test_cutoff_out_of_range() {
        for cutoff in [0.0, 1.0, -0.3, 1.7, f64::NAN] {
            let result = design_low_pass(6, cutoff);

            assert!(matches!(
                result,
                Err(DesignError::CutoffOutOfRange { .. })
            ));
        }
    }
}
