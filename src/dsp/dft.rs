//! Real-input DFT engine. Owns a cached `realfft` plan plus its
//! real/complex scratch buffers as plain arrays, replanning only when
//! the size changes, not on every `compute` call.

use crate::dsp::window;
use crate::error::{AllocationError, SizeMismatch};
use crate::settings::WindowFunction;
use realfft::num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

pub struct DftEngine {
    planner: RealFftPlanner<f32>,
    plan: Arc<dyn RealToComplex<f32>>,
    window_coefficients: Vec<f32>,
    window_function: WindowFunction,
    windowed: Vec<f32>,
    scratch: Vec<Complex32>,
    size: usize,
}

impl DftEngine {
    /// Establishes the initial plan and `WindowCoefficients`. Fails with
    /// `AllocationError` only if the underlying planner cannot produce a
    /// plan for `n` (it never does in practice for power-of-two sizes,
    /// but the seam is kept fallible).
    pub fn new(n: usize, wf: WindowFunction) -> Result<Self, AllocationError> {
        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(n);
        let scratch = plan.make_scratch_vec();
        Ok(Self {
            window_coefficients: window::coefficients(n, wf),
            window_function: wf,
            windowed: vec![0.0; n],
            scratch,
            planner,
            plan,
            size: n,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn window_function(&self) -> WindowFunction {
        self.window_function
    }

    /// Replaces the plan and reallocates internal buffers; recomputes
    /// `WindowCoefficients`. `n` must already have been range/power-of-two
    /// checked by the caller (the Controller does this against
    /// `settings::limits` before calling).
    pub fn set_size(&mut self, n: usize) -> Result<(), AllocationError> {
        let plan = self.planner.plan_fft_forward(n);
        self.scratch = plan.make_scratch_vec();
        self.windowed = vec![0.0; n];
        self.window_coefficients = window::coefficients(n, self.window_function);
        self.plan = plan;
        self.size = n;
        Ok(())
    }

    /// Recomputes `WindowCoefficients` over the existing size.
    pub fn set_window_function(&mut self, wf: WindowFunction) {
        self.window_function = wf;
        self.window_coefficients = window::coefficients(self.size, wf);
    }

    /// Applies the window, runs the real-to-complex DFT, and resizes
    /// `spectrum` to `size/2 + 1`. Precondition: `samples.len() == size`.
    pub fn compute(
        &mut self,
        spectrum: &mut Vec<Complex32>,
        samples: &[f32],
    ) -> Result<(), SizeMismatch> {
        if samples.len() != self.size {
            return Err(SizeMismatch {
                expected: self.size,
                actual: samples.len(),
            });
        }
        for i in 0..self.size {
            self.windowed[i] = samples[i] * self.window_coefficients[i];
        }
        let out_len = self.size / 2 + 1;
        if spectrum.len() != out_len {
            spectrum.resize(out_len, Complex32::new(0.0, 0.0));
        }
        self.plan
            .process_with_scratch(&mut self.windowed, spectrum, &mut self.scratch)
            .expect("realfft process with matching buffer sizes cannot fail");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn output_length_is_n_over_2_plus_1() {
        for n in [64usize, 128, 1024, 8192] {
            let mut dft = DftEngine::new(n, WindowFunction::Hann).unwrap();
            let samples = vec![0.0f32; n];
            let mut spectrum = Vec::new();
            dft.compute(&mut spectrum, &samples).unwrap();
            assert_eq!(spectrum.len(), n / 2 + 1);
        }
    }

    #[test]
    fn size_mismatch_is_reported() {
        let mut dft = DftEngine::new(64, WindowFunction::Rectangular).unwrap();
        let mut spectrum = Vec::new();
        let err = dft.compute(&mut spectrum, &vec![0.0; 32]).unwrap_err();
        assert_eq!(err.expected, 64);
        assert_eq!(err.actual, 32);
    }

    #[test]
    fn pure_tone_peaks_at_expected_bin() {
        let n = 2048;
        let k = 5;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * k as f32 * i as f32 / n as f32).sin())
            .collect();
        let mut dft = DftEngine::new(n, WindowFunction::Rectangular).unwrap();
        let mut spectrum = Vec::new();
        dft.compute(&mut spectrum, &samples).unwrap();
        let argmax = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| {
                let ma = (a.1.re * a.1.re + a.1.im * a.1.im).sqrt();
                let mb = (b.1.re * b.1.re + b.1.im * b.1.im).sqrt();
                ma.partial_cmp(&mb).unwrap()
            })
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(argmax, k);
    }

    #[test]
    fn dc_input_puts_all_energy_in_bin_zero() {
        let n = 2048;
        let samples = vec![1.0f32; n];
        let mut dft = DftEngine::new(n, WindowFunction::Rectangular).unwrap();
        let mut spectrum = Vec::new();
        dft.compute(&mut spectrum, &samples).unwrap();
        let mag0 = (spectrum[0].re * spectrum[0].re + spectrum[0].im * spectrum[0].im).sqrt();
        assert!((mag0 - n as f32).abs() < 1e-2);
        for bin in &spectrum[1..] {
            let m = (bin.re * bin.re + bin.im * bin.im).sqrt();
            assert!(m < 1e-2);
        }
    }

    #[test]
    fn set_size_round_trips() {
        let mut dft = DftEngine::new(1024, WindowFunction::Hann).unwrap();
        dft.set_size(2048).unwrap();
        assert_eq!(dft.size(), 2048);
        let samples = vec![0.0f32; 2048];
        let mut spectrum = Vec::new();
        dft.compute(&mut spectrum, &samples).unwrap();
        assert_eq!(spectrum.len(), 1025);
    }

    #[test]
    fn set_window_function_round_trips() {
        let mut dft = DftEngine::new(64, WindowFunction::Hann).unwrap();
        dft.set_window_function(WindowFunction::Bartlett);
        assert_eq!(dft.window_function(), WindowFunction::Bartlett);
    }
}
