//! Error types for every fallible seam named in the design: CLI/config
//! validation, DFT allocation, audio source reads, and image sink writes.

use std::io;
use thiserror::Error;

/// Invalid CLI arguments or out-of-limit settings. Fatal at startup; the
/// caller prints usage text and exits non-zero.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Usage(String),

    #[error("{field} = {value} is out of range (limit: {limit})")]
    OutOfRange {
        field: &'static str,
        value: String,
        limit: &'static str,
    },
}

/// The DFT engine could not obtain its internal buffers/plan, either at
/// construction (fatal) or during a runtime resize (recoverable: the
/// Controller setter reports this and the previous size is retained).
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("failed to allocate DFT engine state: {reason}")]
    Plan { reason: String },
}

/// `DftEngine::compute` precondition violation: the input slice did not
/// have exactly `dft_size` samples.
#[derive(Debug, Error)]
#[error("sample count mismatch: expected {expected}, got {actual}")]
pub struct SizeMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Audio source read failures. Live-source failures are fatal to the
/// pipeline; file-source failures abort the offline driver.
#[derive(Debug, Error)]
pub enum AudioReadError {
    #[error("audio device error: {0}")]
    Device(String),

    #[error("no default input device available")]
    NoDevice,

    #[error("file read error: {0}")]
    Io(#[from] io::Error),

    #[error("wav decode error: {0}")]
    Wav(#[from] hound::Error),
}

/// Image/texture sink failures: on-disk write errors (offline) or
/// texture upload errors (realtime display).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("image encode/write error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("display error: {0}")]
    Display(String),
}
