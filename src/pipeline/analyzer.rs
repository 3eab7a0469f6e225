//! Analyzer worker: maintains the overlap window, computes DFTs, renders
//! pixel rows, and pushes them to the `PixelsQueue`. The hardest
//! engineering in the pipeline lives here, reconciling a reconfigurable
//! DFT size against an unbounded staging buffer under two locks.

use crate::dsp::DftEngine;
use crate::queue::Queue;
use crate::render::SpectrumRenderer;
use crate::shared::Shared;
use realfft::num_complex::Complex32;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long a `SamplesQueue.waitNonEmpty` blocks before re-checking
/// `running`, permitting clean shutdown without cancelling a blocking
/// read.
const WAIT_TIMEOUT: Duration = Duration::from_millis(200);

/// `dftLock`'s contents: the DFT engine plus the hop derived from
/// `(dftSize, samplesOverlap)`, updated together so a `setDftSize` call
/// can perform its read-modify-write (preserve overlap) under one lock.
pub struct DftState {
    pub engine: DftEngine,
    pub hop: usize,
}

impl DftState {
    pub fn new(engine: DftEngine, hop: usize) -> Self {
        Self { engine, hop }
    }
}

pub struct Analyzer {
    samples_queue: Queue<Vec<f32>>,
    pixels_queue: Queue<Vec<u32>>,
    dft: Shared<DftState>,
    renderer: Shared<SpectrumRenderer>,
    width: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
}

impl Analyzer {
    pub fn new(
        samples_queue: Queue<Vec<f32>>,
        pixels_queue: Queue<Vec<u32>>,
        dft: Shared<DftState>,
        renderer: Shared<SpectrumRenderer>,
        width: Arc<AtomicUsize>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            samples_queue,
            pixels_queue,
            dft,
            renderer,
            width,
            running,
        }
    }

    /// Runs the analyzer loop until `running` is cleared.
    pub fn run(&self) {
        let mut audio_buf: Vec<f32> = Vec::new();
        let mut overlap_buf: Vec<f32> = Vec::new();
        let mut spectrum: Vec<Complex32> = Vec::new();

        while self.running.load(Ordering::Acquire) {
            // Bounded wait for a frame, re-checking `running` on timeout
            // rather than cancelling a blocking read.
            if !self.samples_queue.wait_non_empty(WAIT_TIMEOUT) {
                continue;
            }
            let frame = self.samples_queue.pop();
            audio_buf.extend_from_slice(&frame);

            // This inner loop may run more than once per incoming frame:
            // a SampleFrame larger than dftSize can yield multiple DFTs.
            loop {
                let mut dft_guard = self.dft.lock();
                // Absorb a concurrent setDftSize by resizing the overlap
                // window and spectrum buffer to match.
                let n = dft_guard.engine.size();
                if overlap_buf.len() != n {
                    overlap_buf.resize(n, 0.0);
                }
                let hop = dft_guard.hop;

                if audio_buf.len() < hop {
                    break;
                }

                // Shift the overlap window left by hop, append the
                // oldest `hop` fresh samples, drop them from audio_buf.
                overlap_buf.copy_within(hop.., 0);
                let tail_start = n - hop;
                overlap_buf[tail_start..].copy_from_slice(&audio_buf[..hop]);
                audio_buf.drain(..hop);

                if let Err(err) = dft_guard.engine.compute(&mut spectrum, &overlap_buf) {
                    log::error!("analyzer: dft compute failed: {err}");
                    drop(dft_guard);
                    continue;
                }

                let width = self.width.load(Ordering::Acquire);
                let mut row = Vec::new();
                {
                    let renderer = self.renderer.lock();
                    renderer.render(&mut row, &spectrum, width);
                }
                drop(dft_guard);

                // Queue push never fails.
                self.pixels_queue.push(row);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ColorScheme, WindowFunction};

    fn make_analyzer(n: usize, hop: usize, width: usize) -> (Analyzer, Queue<Vec<f32>>, Queue<Vec<u32>>) {
        let engine = DftEngine::new(n, WindowFunction::Hann).unwrap();
        let dft = Shared::new(DftState::new(engine, hop));
        let renderer = Shared::new(SpectrumRenderer::new(0.0, 45.0, true, ColorScheme::Heat));
        let samples_queue = Queue::new();
        let pixels_queue = Queue::new();
        let running = Arc::new(AtomicBool::new(true));
        let analyzer = Analyzer::new(
            samples_queue.clone(),
            pixels_queue.clone(),
            dft,
            renderer,
            Arc::new(AtomicUsize::new(width)),
            running,
        );
        (analyzer, samples_queue, pixels_queue)
    }

    #[test]
    fn frame_smaller_than_hop_accumulates_without_emitting() {
        let (analyzer, samples_queue, pixels_queue) = make_analyzer(64, 32, 16);
        samples_queue.push(vec![0.0; 10]);
        analyzer.run_once_for_test();
        assert!(pixels_queue.is_empty());
    }

    #[test]
    fn emits_a_row_once_hop_reached() {
        let (analyzer, samples_queue, pixels_queue) = make_analyzer(64, 32, 16);
        samples_queue.push(vec![0.5; 32]);
        analyzer.run_once_for_test();
        assert_eq!(pixels_queue.len(), 1);
        let row = pixels_queue.pop();
        assert_eq!(row.len(), 16);
    }

    #[test]
    fn large_frame_emits_multiple_rows() {
        let (analyzer, samples_queue, pixels_queue) = make_analyzer(64, 32, 8);
        samples_queue.push(vec![0.2; 200]);
        analyzer.run_once_for_test();
        assert!(pixels_queue.len() >= 6);
    }

    impl Analyzer {
        /// Test-only hook: process exactly one queued frame through the
        /// inner hop/DFT/render loop without the outer `running` poll.
        fn run_once_for_test(&self) {
            let mut audio_buf: Vec<f32> = Vec::new();
            let mut overlap_buf: Vec<f32> = Vec::new();
            let mut spectrum: Vec<Complex32> = Vec::new();
            let frame = self.samples_queue.pop();
            audio_buf.extend_from_slice(&frame);
            loop {
                let mut dft_guard = self.dft.lock();
                let n = dft_guard.engine.size();
                if overlap_buf.len() != n {
                    overlap_buf.resize(n, 0.0);
                }
                let hop = dft_guard.hop;
                if audio_buf.len() < hop {
                    break;
                }
                overlap_buf.copy_within(hop.., 0);
                let tail_start = n - hop;
                overlap_buf[tail_start..].copy_from_slice(&audio_buf[..hop]);
                audio_buf.drain(..hop);
                dft_guard.engine.compute(&mut spectrum, &overlap_buf).unwrap();
                let width = self.width.load(Ordering::Acquire);
                let mut row = Vec::new();
                {
                    let renderer = self.renderer.lock();
                    renderer.render(&mut row, &spectrum, width);
                }
                drop(dft_guard);
                self.pixels_queue.push(row);
            }
        }
    }
}
