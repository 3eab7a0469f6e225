//! Spectrum renderer: maps a `Spectrum` to a `PixelRow` of arbitrary
//! width under the current magnitude bounds, scale, and color scheme.
//! Pure aside from the mutable settings it carries; no DFT coupling, no
//! display geometry.

use crate::render::colorscheme;
use crate::settings::ColorScheme;
use realfft::num_complex::Complex32;

pub struct SpectrumRenderer {
    magnitude_min: f32,
    magnitude_max: f32,
    magnitude_log: bool,
    color_scheme: ColorScheme,
}

impl SpectrumRenderer {
    pub fn new(magnitude_min: f32, magnitude_max: f32, magnitude_log: bool, color_scheme: ColorScheme) -> Self {
        Self {
            magnitude_min,
            magnitude_max,
            magnitude_log,
            color_scheme,
        }
    }

    pub fn magnitude_min(&self) -> f32 {
        self.magnitude_min
    }

    pub fn magnitude_max(&self) -> f32 {
        self.magnitude_max
    }

    pub fn magnitude_log(&self) -> bool {
        self.magnitude_log
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub fn set_magnitude_min(&mut self, v: f32) {
        self.magnitude_min = v;
        self.enforce_ordering();
    }

    pub fn set_magnitude_max(&mut self, v: f32) {
        self.magnitude_max = v;
        self.enforce_ordering();
    }

    pub fn set_magnitude_log(&mut self, log: bool) {
        self.magnitude_log = log;
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;
    }

    /// Setters that would break `min < max` are silently clamped to
    /// preserve the invariant.
    fn enforce_ordering(&mut self) {
        if self.magnitude_min >= self.magnitude_max {
            self.magnitude_max = self.magnitude_min + f32::EPSILON.max(1e-6);
        }
    }

    fn normalize(&self, magnitude: f32) -> f32 {
        let m = if self.magnitude_log {
            20.0 * magnitude.max(1e-12).log10()
        } else {
            magnitude
        };
        ((m - self.magnitude_min) / (self.magnitude_max - self.magnitude_min)).clamp(0.0, 1.0)
    }

    /// Renders `spectrum` (length `N/2+1`) into `pixels`, resizing it to
    /// exactly `width` elements. Each output index picks its
    /// nearest-neighbor source bin `k = floor(i * spectrum.len() / width)`.
    pub fn render(&self, pixels: &mut Vec<u32>, spectrum: &[Complex32], width: usize) {
        pixels.resize(width, 0);
        if spectrum.is_empty() || width == 0 {
            return;
        }
        for i in 0..width {
            let k = (i * spectrum.len()) / width;
            let bin = spectrum[k];
            let magnitude = (bin.re * bin.re + bin.im * bin.im).sqrt();
            let v = self.normalize(magnitude);
            pixels[i] = colorscheme::pack(colorscheme::map(v, self.color_scheme));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum_with_magnitudes(mags: &[f32]) -> Vec<Complex32> {
        mags.iter().map(|&m| Complex32::new(m, 0.0)).collect()
    }

    #[test]
    fn silence_renders_to_black_under_heat() {
        let renderer = SpectrumRenderer::new(0.0, 45.0, true, ColorScheme::Heat);
        let spectrum = spectrum_with_magnitudes(&[0.0; 513]);
        let mut pixels = Vec::new();
        renderer.render(&mut pixels, &spectrum, 640);
        assert!(pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn dc_full_scale_renders_to_white_single_pixel() {
        let renderer = SpectrumRenderer::new(0.0, 2048.0, false, ColorScheme::Heat);
        let mut mags = vec![0.0f32; 1025];
        mags[0] = 2048.0;
        let spectrum = spectrum_with_magnitudes(&mags);
        let mut pixels = Vec::new();
        renderer.render(&mut pixels, &spectrum, 1);
        assert_eq!(pixels[0], 0x00FFFFFF);
    }

    #[test]
    fn pixel_row_always_has_exactly_width_elements() {
        let renderer = SpectrumRenderer::new(0.0, 45.0, true, ColorScheme::Grayscale);
        let spectrum = spectrum_with_magnitudes(&[1.0; 17]);
        let mut pixels = Vec::new();
        for w in [1usize, 63, 640, 4096] {
            renderer.render(&mut pixels, &spectrum, w);
            assert_eq!(pixels.len(), w);
        }
    }

    #[test]
    fn rerendering_same_input_is_bit_identical() {
        let renderer = SpectrumRenderer::new(0.0, 45.0, true, ColorScheme::Heat);
        let spectrum = spectrum_with_magnitudes(&[0.1, 5.0, 0.3, 10.0]);
        let mut a = Vec::new();
        let mut b = Vec::new();
        renderer.render(&mut a, &spectrum, 32);
        renderer.render(&mut b, &spectrum, 32);
        assert_eq!(a, b);
    }

    #[test]
    fn setters_preserve_min_less_than_max_invariant() {
        let mut renderer = SpectrumRenderer::new(0.0, 45.0, true, ColorScheme::Heat);
        renderer.set_magnitude_min(45.0);
        assert!(renderer.magnitude_min() < renderer.magnitude_max());
        renderer.set_magnitude_max(renderer.magnitude_min());
        assert!(renderer.magnitude_min() < renderer.magnitude_max());
    }
}
