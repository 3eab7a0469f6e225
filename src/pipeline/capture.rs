//! Capture worker: repeatedly reads fixed-size `SampleFrame`s from the
//! audio source and hands them to the `SamplesQueue`, isolating the
//! potentially blocking source from downstream consumers.

use crate::audio_source::AudioSource;
use crate::queue::Queue;
use crate::shared::Shared;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// `readSize` is fixed at a small value, chosen much smaller than any
/// `dftSize`, so the Analyzer's overlap accounting stays independent of
/// it. `readSize` must never feed `hop`.
pub const READ_SIZE: usize = 128;

pub struct Capture {
    source: Shared<Box<dyn AudioSource>>,
    samples_queue: Queue<Vec<f32>>,
    running: Arc<AtomicBool>,
}

impl Capture {
    pub fn new(
        source: Shared<Box<dyn AudioSource>>,
        samples_queue: Queue<Vec<f32>>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            samples_queue,
            running,
        }
    }

    /// Runs the capture loop until `running` is cleared or a read fails.
    /// A read failure is fatal for this worker: it clears `running` so
    /// the Presenter and Analyzer observe the shutdown.
    pub fn run(&self) {
        let mut buf = vec![0.0f32; READ_SIZE];
        while self.running.load(Ordering::Acquire) {
            let read = {
                let mut source = self.source.lock();
                source.read(&mut buf)
            };
            match read {
                Ok(n) if n == 0 => {
                    log::info!("capture: source exhausted, stopping");
                    self.running.store(false, Ordering::Release);
                    break;
                }
                Ok(n) => {
                    self.samples_queue.push(buf[..n].to_vec());
                }
                Err(err) => {
                    log::error!("capture: fatal read error: {err}");
                    self.running.store(false, Ordering::Release);
                    break;
                }
            }
        }
    }
}
