//! Controller contract: the set of operations Presenter invokes on the
//! Analyzer's shared DFT engine and Spectrum renderer to change
//! tunables while the pipeline runs. Not a thread. Locking discipline:
//! when a coherent change touches both DFT state and renderer state,
//! `dftLock` is acquired before `rendererLock`.

use crate::dsp::DftEngine;
use crate::error::AllocationError;
use crate::pipeline::analyzer::DftState;
use crate::render::SpectrumRenderer;
use crate::settings::{limits, ColorScheme, Orientation, Settings, WindowFunction};
use crate::shared::Shared;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Width/height/orientation/sample-rate: Presenter-owned display
/// dimensions, not coupled to the DFT/renderer invariants and so kept
/// behind their own lock rather than `dftLock`/`rendererLock`.
struct DisplayDims {
    width: u32,
    height: u32,
    orientation: Orientation,
    sample_rate: u32,
}

pub struct Controller {
    dft: Shared<DftState>,
    renderer: Shared<SpectrumRenderer>,
    dims: Shared<DisplayDims>,
    spectrum_width: Arc<AtomicUsize>,
}

impl Controller {
    pub fn new(
        dft: Shared<DftState>,
        renderer: Shared<SpectrumRenderer>,
        spectrum_width: Arc<AtomicUsize>,
        settings: &Settings,
    ) -> Self {
        let w = Self::compute_spectrum_width(settings.width, settings.height, settings.orientation);
        spectrum_width.store(w as usize, Ordering::Release);
        Self {
            dft,
            renderer,
            dims: Shared::new(DisplayDims {
                width: settings.width,
                height: settings.height,
                orientation: settings.orientation,
                sample_rate: settings.audio_sample_rate,
            }),
            spectrum_width,
        }
    }

    /// The spectrum axis is `width` in vertical orientation; internal
    /// buffers always stay in vertical layout, so a horizontal display
    /// uses `height` as W and rotates at blit/finalize time.
    fn compute_spectrum_width(width: u32, height: u32, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Vertical => width,
            Orientation::Horizontal => height,
        }
    }

    fn refresh_spectrum_width(&self, dims: &DisplayDims) {
        let w = Self::compute_spectrum_width(dims.width, dims.height, dims.orientation);
        self.spectrum_width.store(w as usize, Ordering::Release);
    }

    // --- DFT engine ---------------------------------------------------

    pub fn dft_size(&self) -> u32 {
        self.dft.lock().engine.size() as u32
    }

    pub fn window_function(&self) -> WindowFunction {
        self.dft.lock().engine.window_function()
    }

    pub fn samples_overlap(&self) -> f32 {
        let guard = self.dft.lock();
        1.0 - (guard.hop as f32 / guard.engine.size() as f32)
    }

    /// Replaces the DFT plan, preserving the current overlap fraction as
    /// closely as rounding allows (read-modify-write under `dftLock`).
    /// On allocation failure the previous size is retained and the error
    /// is returned to the caller.
    pub fn set_dft_size(&self, n: u32) -> Result<(), AllocationError> {
        if !n.is_power_of_two() || !(limits::DFT_SIZE_MIN..=limits::DFT_SIZE_MAX).contains(&n) {
            return Ok(()); // out-of-limit requests are a no-op
        }
        let mut guard = self.dft.lock();
        let overlap = 1.0 - (guard.hop as f32 / guard.engine.size() as f32);
        guard.engine.set_size(n as usize)?;
        guard.hop = Self::hop_for(n, overlap);
        Ok(())
    }

    fn hop_for(n: u32, overlap: f32) -> usize {
        ((1.0 - overlap) * n as f32).round().max(1.0) as usize
    }

    /// `←`/`→`: halve/double the DFT size within limits, resetting
    /// overlap to 50%.
    pub fn halve_dft_size(&self) -> Result<(), AllocationError> {
        let current = self.dft_size();
        if current <= limits::DFT_SIZE_MIN {
            return Ok(());
        }
        self.set_dft_size_and_overlap(current / 2, 0.5)
    }

    pub fn double_dft_size(&self) -> Result<(), AllocationError> {
        let current = self.dft_size();
        if current >= limits::DFT_SIZE_MAX {
            return Ok(());
        }
        self.set_dft_size_and_overlap(current * 2, 0.5)
    }

    fn set_dft_size_and_overlap(&self, n: u32, overlap: f32) -> Result<(), AllocationError> {
        let mut guard = self.dft.lock();
        guard.engine.set_size(n as usize)?;
        guard.hop = Self::hop_for(n, overlap);
        Ok(())
    }

    pub fn set_window_function(&self, wf: WindowFunction) {
        self.dft.lock().engine.set_window_function(wf);
    }

    /// `w`: cycle window function.
    pub fn cycle_window_function(&self) {
        let next = self.window_function().next();
        self.set_window_function(next);
    }

    /// `↑`/`↓`: increase/decrease overlap by the configured step.
    pub fn set_samples_overlap(&self, overlap: f32) {
        let overlap = overlap.clamp(limits::OVERLAP_MIN, limits::OVERLAP_MAX);
        let mut guard = self.dft.lock();
        let n = guard.engine.size() as u32;
        guard.hop = Self::hop_for(n, overlap);
    }

    pub fn increase_overlap(&self) {
        self.set_samples_overlap(self.samples_overlap() + limits::OVERLAP_STEP);
    }

    pub fn decrease_overlap(&self) {
        self.set_samples_overlap(self.samples_overlap() - limits::OVERLAP_STEP);
    }

    // --- Spectrum renderer ---------------------------------------------

    pub fn magnitude_log(&self) -> bool {
        self.renderer.lock().magnitude_log()
    }

    pub fn magnitude_min(&self) -> f32 {
        self.renderer.lock().magnitude_min()
    }

    pub fn magnitude_max(&self) -> f32 {
        self.renderer.lock().magnitude_max()
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.renderer.lock().color_scheme()
    }

    /// `l`: toggle log/linear, resetting magnitude bounds to that
    /// scale's defaults.
    pub fn toggle_magnitude_scale(&self) {
        let mut guard = self.renderer.lock();
        let new_log = !guard.magnitude_log();
        let (lo, hi) = Settings::default_magnitude_bounds(new_log);
        guard.set_magnitude_log(new_log);
        guard.set_magnitude_min(lo);
        guard.set_magnitude_max(hi);
    }

    pub fn set_magnitude_min(&self, v: f32) {
        self.renderer.lock().set_magnitude_min(v);
    }

    pub fn set_magnitude_max(&self, v: f32) {
        self.renderer.lock().set_magnitude_max(v);
    }

    fn magnitude_step(&self) -> f32 {
        if self.magnitude_log() {
            limits::MAGNITUDE_LOG_STEP
        } else {
            limits::MAGNITUDE_LINEAR_STEP
        }
    }

    /// `-`: decrease magnitude min.
    pub fn decrease_magnitude_min(&self) {
        let step = self.magnitude_step();
        self.set_magnitude_min(self.magnitude_min() - step);
    }

    /// `=`: increase magnitude min.
    pub fn increase_magnitude_min(&self) {
        let step = self.magnitude_step();
        self.set_magnitude_min(self.magnitude_min() + step);
    }

    /// `[`: decrease magnitude max.
    pub fn decrease_magnitude_max(&self) {
        let step = self.magnitude_step();
        self.set_magnitude_max(self.magnitude_max() - step);
    }

    /// `]`: increase magnitude max.
    pub fn increase_magnitude_max(&self) {
        let step = self.magnitude_step();
        self.set_magnitude_max(self.magnitude_max() + step);
    }

    pub fn set_color_scheme(&self, scheme: ColorScheme) {
        self.renderer.lock().set_color_scheme(scheme);
    }

    /// `c`: cycle color scheme.
    pub fn cycle_color_scheme(&self) {
        let next = self.color_scheme().next();
        self.set_color_scheme(next);
    }

    // --- Display dimensions ---------------------------------------------

    pub fn width(&self) -> u32 {
        self.dims.lock().width
    }

    pub fn height(&self) -> u32 {
        self.dims.lock().height
    }

    pub fn orientation(&self) -> Orientation {
        self.dims.lock().orientation
    }

    pub fn sample_rate(&self) -> u32 {
        self.dims.lock().sample_rate
    }

    /// Records the audio source's actually-negotiated sample rate.
    /// Called once at start-up after the source has reported what it
    /// really opened at, since a live device may not honor the
    /// requested rate (the CLI value is only ever a request).
    pub fn set_sample_rate(&self, sample_rate: u32) {
        self.dims.lock().sample_rate = sample_rate;
    }

    pub fn set_width(&self, width: u32) {
        let mut guard = self.dims.lock();
        guard.width = width.max(1);
        self.refresh_spectrum_width(&guard);
    }

    pub fn set_height(&self, height: u32) {
        let mut guard = self.dims.lock();
        guard.height = height.max(1);
        self.refresh_spectrum_width(&guard);
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        let mut guard = self.dims.lock();
        guard.orientation = orientation;
        self.refresh_spectrum_width(&guard);
    }

    /// `binsPerPixel`/`hzPerBin` for the cursor frequency overlay.
    pub fn cursor_frequency(&self, x: u32) -> f32 {
        let dft_size = self.dft_size() as usize;
        let bins = dft_size / 2 + 1;
        let width = self.spectrum_width.load(Ordering::Acquire).max(1);
        let bins_per_pixel = bins as f32 / width as f32;
        let hz_per_bin = (self.sample_rate() as f32 / 2.0) / bins as f32;
        ((x as f32 * bins_per_pixel).floor()) * hz_per_bin
    }

    /// A read-only snapshot of every tunable, for HUD display.
    pub fn snapshot(&self) -> Settings {
        let dims = self.dims.lock();
        Settings {
            audio_sample_rate: dims.sample_rate,
            samples_overlap: self.samples_overlap(),
            dft_size: self.dft_size(),
            dft_window: self.window_function(),
            magnitude_log: self.magnitude_log(),
            magnitude_min: self.magnitude_min(),
            magnitude_max: self.magnitude_max(),
            color_scheme: self.color_scheme(),
            width: dims.width,
            height: dims.height,
            orientation: dims.orientation,
        }
    }
}

/// Convenience constructor bundling a freshly built `DftEngine` and
/// `SpectrumRenderer` from a validated `Settings` record.
pub fn build(settings: &Settings) -> Result<(Shared<DftState>, Shared<SpectrumRenderer>, Controller, Arc<AtomicUsize>), AllocationError> {
    let engine = DftEngine::new(settings.dft_size as usize, settings.dft_window)?;
    let hop = settings.hop() as usize;
    let dft = Shared::new(DftState::new(engine, hop));
    let renderer = Shared::new(SpectrumRenderer::new(
        settings.magnitude_min,
        settings.magnitude_max,
        settings.magnitude_log,
        settings.color_scheme,
    ));
    let spectrum_width = Arc::new(AtomicUsize::new(0));
    let controller = Controller::new(dft.clone(), renderer.clone(), spectrum_width.clone(), settings);
    Ok((dft, renderer, controller, spectrum_width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_controller() -> Controller {
        let settings = Settings::default();
        let (_, _, controller, _) = build(&settings).unwrap();
        controller
    }

    #[test]
    fn set_window_function_round_trips() {
        let c = test_controller();
        c.set_window_function(WindowFunction::Bartlett);
        assert_eq!(c.window_function(), WindowFunction::Bartlett);
    }

    #[test]
    fn set_dft_size_round_trips_and_preserves_overlap() {
        let c = test_controller();
        c.set_dft_size(2048).unwrap();
        assert_eq!(c.dft_size(), 2048);
        assert!((c.samples_overlap() - 0.5).abs() <= 1.0 / 2048.0 + 1e-6);
    }

    #[test]
    fn out_of_limit_dft_size_is_a_no_op() {
        let c = test_controller();
        c.set_dft_size(16).unwrap();
        assert_eq!(c.dft_size(), 1024);
        c.set_dft_size(16384).unwrap();
        assert_eq!(c.dft_size(), 1024);
    }

    #[test]
    fn halve_and_double_reset_overlap_to_half() {
        let c = test_controller();
        c.set_samples_overlap(0.8);
        c.double_dft_size().unwrap();
        assert_eq!(c.dft_size(), 2048);
        assert!((c.samples_overlap() - 0.5).abs() < 0.02);
    }

    #[test]
    fn double_dft_size_is_a_no_op_at_max() {
        let c = test_controller();
        c.set_dft_size(8192).unwrap();
        c.double_dft_size().unwrap();
        assert_eq!(c.dft_size(), 8192);
    }

    #[test]
    fn toggle_magnitude_scale_resets_to_scale_defaults() {
        let c = test_controller();
        c.toggle_magnitude_scale();
        assert!(!c.magnitude_log());
        let (lo, hi) = Settings::default_magnitude_bounds(false);
        assert_eq!(c.magnitude_min(), lo);
        assert_eq!(c.magnitude_max(), hi);
    }

    #[test]
    fn cycle_color_scheme_visits_all_three() {
        let c = test_controller();
        assert_eq!(c.color_scheme(), ColorScheme::Heat);
        c.cycle_color_scheme();
        assert_eq!(c.color_scheme(), ColorScheme::Blue);
        c.cycle_color_scheme();
        assert_eq!(c.color_scheme(), ColorScheme::Grayscale);
        c.cycle_color_scheme();
        assert_eq!(c.color_scheme(), ColorScheme::Heat);
    }

    #[test]
    fn cursor_frequency_matches_formula() {
        let c = test_controller(); // sampleRate 24000, dftSize 1024, width 640
        let bins = 1024 / 2 + 1;
        let expected_bins_per_pixel = bins as f32 / 640.0;
        let expected_hz_per_bin = 12000.0 / bins as f32;
        let x = 100;
        let expected = (x as f32 * expected_bins_per_pixel).floor() * expected_hz_per_bin;
        assert_eq!(c.cursor_frequency(x), expected);
    }

    #[test]
    fn horizontal_orientation_uses_height_as_spectrum_width() {
        let mut settings = Settings::default();
        settings.width = 640;
        settings.height = 480;
        settings.orientation = Orientation::Horizontal;
        let (_, _, _controller, spectrum_width) = build(&settings).unwrap();
        assert_eq!(spectrum_width.load(Ordering::Acquire), 480);
    }
}
