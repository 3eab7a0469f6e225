//! Window function closed forms. Coefficients are computed directly
//! from the standard definitions rather than sourced from a generic
//! windowing crate, since the four forms must match bit-for-bit.

use crate::settings::WindowFunction;
use libm::cosf;
use std::f32::consts::PI;

/// Derives a `WindowCoefficients` vector of length `n` for the given
/// window function. `n == 1` is a degenerate case (avoids division by
/// zero in the `N - 1` denominators); it returns a single unity tap.
pub fn coefficients(n: usize, wf: WindowFunction) -> Vec<f32> {
    if n <= 1 {
        return vec![1.0; n];
    }
    let nf = n as f32;
    let denom = nf - 1.0;
    (0..n)
        .map(|i| {
            let x = i as f32;
            match wf {
                WindowFunction::Hann => 0.5 * (1.0 - cosf(2.0 * PI * x / denom)),
                WindowFunction::Hamming => 0.54 - 0.46 * cosf(2.0 * PI * x / denom),
                WindowFunction::Bartlett => {
                    let half = denom / 2.0;
                    1.0 - ((x - half) / half).abs()
                }
                WindowFunction::Rectangular => 1.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangular_is_all_ones() {
        let w = coefficients(8, WindowFunction::Rectangular);
        assert!(w.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn hann_endpoints_are_zero() {
        let w = coefficients(16, WindowFunction::Hann);
        assert!(w[0].abs() < 1e-6);
        assert!(w[w.len() - 1].abs() < 1e-6);
    }

    #[test]
    fn hamming_endpoints_match_closed_form() {
        let w = coefficients(16, WindowFunction::Hamming);
        assert!((w[0] - 0.08).abs() < 1e-5);
    }

    #[test]
    fn bartlett_peaks_at_center() {
        let w = coefficients(17, WindowFunction::Bartlett);
        let center = w.iter().cloned().fold(0.0f32, f32::max);
        assert!((center - 1.0).abs() < 1e-5);
    }

    #[test]
    fn coefficients_length_matches_n() {
        for n in [64usize, 1024, 8192] {
            for wf in [
                WindowFunction::Hann,
                WindowFunction::Hamming,
                WindowFunction::Bartlett,
                WindowFunction::Rectangular,
            ] {
                assert_eq!(coefficients(n, wf).len(), n);
            }
        }
    }
}
