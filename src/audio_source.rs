//! `AudioSource`: `read(into buf)` / `sample_rate()`, with a live `cpal`
//! backend and a file `hound` backend. Mirrors the two generations of
//! `AudioSource` implementations in the original C++ program
//! (`PulseAudioSource` / `WaveAudioSource`) behind one trait.

use crate::error::AudioReadError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Read-only observation (e.g. `sample_rate()`) is expected to be safe
/// to call concurrently with `read` from another thread; concrete
/// implementations guard any interior state accordingly.
pub trait AudioSource: Send {
    /// Fills `buf` with up to `buf.len()` samples, returning the number
    /// actually written. A short return signals end-of-stream for file
    /// sources; live sources always fill `buf` fully or return `Err`.
    fn read(&mut self, buf: &mut [f32]) -> Result<usize, AudioReadError>;

    fn sample_rate(&self) -> u32;
}

/// Live capture backed by `cpal`'s default input device. The data
/// callback pushes samples into an internal channel; `read` drains it,
/// blocking with a timeout so the Capture worker can observe `running`.
pub struct LiveAudioSource {
    _stream: cpal::Stream,
    receiver: Receiver<f32>,
    sample_rate: u32,
}

impl LiveAudioSource {
    pub fn new(requested_sample_rate: u32) -> Result<Self, AudioReadError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioReadError::NoDevice)?;
        let supported = device
            .default_input_config()
            .map_err(|e| AudioReadError::Device(e.to_string()))?;
        // Best-effort: report back whatever rate the device actually
        // supports rather than silently resampling (resampling is a
        // Non-goal).
        let sample_rate = supported.sample_rate().0;
        let _ = requested_sample_rate;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.into();

        let (tx, rx): (Sender<f32>, Receiver<f32>) = std::sync::mpsc::channel();
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _| {
                    for frame in data.chunks(channels) {
                        let mono = frame.iter().sum::<f32>() / channels as f32;
                        let _ = tx.send(mono);
                    }
                },
                move |err| log::error!("audio input stream error: {err}"),
                None,
            )
            .map_err(|e| AudioReadError::Device(e.to_string()))?;
        stream
            .play()
            .map_err(|e| AudioReadError::Device(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            receiver: rx,
            sample_rate,
        })
    }
}

impl AudioSource for LiveAudioSource {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize, AudioReadError> {
        for slot in buf.iter_mut() {
            match self.receiver.recv_timeout(Duration::from_millis(500)) {
                Ok(sample) => *slot = sample,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(AudioReadError::Device("input stream stalled".into()))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(AudioReadError::Device("input stream closed".into()))
                }
            }
        }
        Ok(buf.len())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// File-backed source over a WAV file via `hound`. Multi-channel files
/// are downmixed to mono by averaging channels (monaural only). A short
/// final frame at EOF is normal, not an error.
pub struct FileAudioSource {
    reader: hound::WavReader<std::io::BufReader<std::fs::File>>,
    channels: usize,
    sample_rate: u32,
}

impl FileAudioSource {
    pub fn open(path: &std::path::Path) -> Result<Self, AudioReadError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        Ok(Self {
            channels: spec.channels as usize,
            sample_rate: spec.sample_rate,
            reader,
        })
    }

    fn next_sample(&mut self) -> Option<f32> {
        use hound::SampleFormat;
        let spec = self.reader.spec();
        match spec.sample_format {
            SampleFormat::Float => self.reader.samples::<f32>().next().and_then(Result::ok),
            SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                self.reader
                    .samples::<i32>()
                    .next()
                    .and_then(Result::ok)
                    .map(|s| s as f32 / max)
            }
        }
    }
}

impl AudioSource for FileAudioSource {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize, AudioReadError> {
        let mut written = 0;
        'outer: for slot in buf.iter_mut() {
            let mut sum = 0.0f32;
            for _ in 0..self.channels {
                match self.next_sample() {
                    Some(s) => sum += s,
                    None => break 'outer,
                }
            }
            *slot = sum / self.channels as f32;
            written += 1;
        }
        Ok(written)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// An in-memory source used by tests: a fixed vector of samples played
/// back in fixed-size frames, reporting a short frame at the end.
pub struct MemoryAudioSource {
    samples: Vec<f32>,
    cursor: usize,
    sample_rate: u32,
}

impl MemoryAudioSource {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            cursor: 0,
            sample_rate,
        }
    }
}

impl AudioSource for MemoryAudioSource {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize, AudioReadError> {
        let remaining = self.samples.len() - self.cursor;
        let n = remaining.min(buf.len());
        buf[..n].copy_from_slice(&self.samples[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reports_short_frame_at_eof() {
        let mut src = MemoryAudioSource::new(vec![1.0, 2.0, 3.0], 48000);
        let mut buf = [0.0f32; 2];
        assert_eq!(src.read(&mut buf).unwrap(), 2);
        let mut buf2 = [0.0f32; 2];
        assert_eq!(src.read(&mut buf2).unwrap(), 1);
        assert_eq!(buf2[0], 3.0);
    }

    #[test]
    fn memory_source_reports_configured_sample_rate() {
        let src = MemoryAudioSource::new(vec![], 44100);
        assert_eq!(src.sample_rate(), 44100);
    }
}
