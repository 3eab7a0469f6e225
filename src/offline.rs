//! Offline driver: runs the DFT and Spectrum renderer synchronously over
//! a finite file-sourced sample stream and writes the resulting image.
//! The image sink plays the role of the Presenter's pixel sink; there is
//! no Controller and no reconfiguration mid-run.

use crate::audio_source::AudioSource;
use crate::dsp::DftEngine;
use crate::error::{AllocationError, SinkError};
use crate::image_sink::ImageSink;
use crate::render::SpectrumRenderer;
use crate::settings::Settings;
use realfft::num_complex::Complex32;

/// Runs the synchronous analysis loop: the first iteration primes the
/// overlap window by reading a full `dftSize` samples (zero-padded at
/// an early EOF); subsequent iterations read exactly `hop` fresh
/// samples, shift the window, and render one row each. Stops once the
/// source is exhausted, then commits the sink.
pub fn run(
    source: &mut dyn AudioSource,
    sink: &mut dyn ImageSink,
    settings: &Settings,
) -> Result<(), SinkError> {
    let n = settings.dft_size as usize;
    let hop = settings.hop() as usize;
    let width = settings.width as usize;

    let mut dft = DftEngine::new(n, settings.dft_window).map_err(allocation_to_sink)?;
    let renderer = SpectrumRenderer::new(
        settings.magnitude_min,
        settings.magnitude_max,
        settings.magnitude_log,
        settings.color_scheme,
    );

    let mut overlap_buf = vec![0.0f32; n];
    let mut spectrum: Vec<Complex32> = Vec::new();
    let mut row: Vec<u32> = Vec::new();

    // Prime the window with a full N samples.
    let filled = read_filling(source, &mut overlap_buf[..]);
    let exhausted_after_fill = filled < n;
    if filled > 0 {
        dft.compute(&mut spectrum, &overlap_buf).expect("buffer length matches n");
        renderer.render(&mut row, &spectrum, width);
        sink.append(&row)?;
    }

    if !exhausted_after_fill {
        let mut fresh = vec![0.0f32; hop];
        loop {
            let read = read_filling(source, &mut fresh[..]);
            if read == 0 {
                break;
            }
            overlap_buf.copy_within(hop.., 0);
            let tail_start = n - hop;
            overlap_buf[tail_start..].copy_from_slice(&fresh);
            dft.compute(&mut spectrum, &overlap_buf).expect("buffer length matches n");
            renderer.render(&mut row, &spectrum, width);
            sink.append(&row)?;
            if read < hop {
                break;
            }
        }
    }

    sink.write()
}

fn allocation_to_sink(err: AllocationError) -> SinkError {
    SinkError::Display(err.to_string())
}

/// Reads into `buf`, zero-padding any samples past end-of-stream.
/// Returns the number of real (non-padded) samples read.
fn read_filling(source: &mut dyn AudioSource, buf: &mut [f32]) -> usize {
    match source.read(buf) {
        Ok(n) => {
            for slot in &mut buf[n..] {
                *slot = 0.0;
            }
            n
        }
        Err(err) => {
            log::error!("offline: source read error: {err}");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_source::MemoryAudioSource;
    use crate::image_sink::InMemoryImageSink;
    use crate::settings::{ColorScheme, Orientation, WindowFunction};
    use image::Rgb;
    use std::f32::consts::PI;

    fn tone(freq: f32, sample_rate: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn offline_sine_produces_consistent_bright_band() {
        let sample_rate = 48000.0;
        let samples = tone(1000.0, sample_rate, sample_rate as usize);
        let mut source = MemoryAudioSource::new(samples, sample_rate as u32);

        let mut settings = Settings::default();
        settings.audio_sample_rate = sample_rate as u32;
        settings.dft_size = 1024;
        settings.samples_overlap = 0.5;
        settings.dft_window = WindowFunction::Hann;
        settings.magnitude_log = true;
        settings.magnitude_min = -80.0;
        settings.magnitude_max = 0.0;
        settings.color_scheme = ColorScheme::Grayscale;
        settings.width = 512;
        settings.orientation = Orientation::Vertical;

        let mut sink = InMemoryImageSink::new(settings.width, settings.orientation);
        run(&mut source, &mut sink, &settings).unwrap();

        let expected_index = (1000.0 * 512.0 * 2.0 / sample_rate).round() as usize;
        assert_eq!(expected_index, 21);

        let image = sink.finalized.expect("offline run must finalize the sink");
        assert!(image.height() > 0);
        for y in 0..image.height() {
            let mut brightest = 0usize;
            let mut brightest_value = 0u8;
            for x in 0..image.width() {
                let px = image.get_pixel(x, y);
                if px[0] > brightest_value {
                    brightest_value = px[0];
                    brightest = x as usize;
                }
            }
            assert!((brightest as i64 - expected_index as i64).abs() <= 1);
        }
    }

    #[test]
    fn silence_produces_an_all_black_image_for_heat() {
        let sample_rate = 24000.0;
        let samples = vec![0.0f32; 48000];
        let mut source = MemoryAudioSource::new(samples, sample_rate as u32);
        let mut settings = Settings::default();
        settings.width = 64;
        settings.height = 1;
        let mut sink = InMemoryImageSink::new(settings.width, settings.orientation);
        run(&mut source, &mut sink, &settings).unwrap();
        let image = sink.finalized.unwrap();
        for px in image.pixels() {
            assert_eq!(*px, Rgb([0, 0, 0]));
        }
    }
}
