//! The `Settings` record and the compiled-constant `limits` bundle that
//! replaces the source's `InitialSettings` / `UserLimits` globals.

use crate::error::ConfigError;

/// Hard limits on every tunable, as compile-time constants rather than
/// runtime-mutable globals.
pub mod limits {
    pub const DFT_SIZE_MIN: u32 = 64;
    pub const DFT_SIZE_MAX: u32 = 8192;

    pub const OVERLAP_MIN: f32 = 0.05;
    pub const OVERLAP_MAX: f32 = 0.95;
    pub const OVERLAP_STEP: f32 = 0.01;

    pub const MAGNITUDE_LOG_MIN: f32 = -80.0;
    pub const MAGNITUDE_LOG_MAX: f32 = 80.0;
    pub const MAGNITUDE_LOG_STEP: f32 = 5.0;

    pub const MAGNITUDE_LINEAR_MIN: f32 = 0.0;
    pub const MAGNITUDE_LINEAR_MAX: f32 = 1000.0;
    pub const MAGNITUDE_LINEAR_STEP: f32 = 25.0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFunction {
    Hann,
    Hamming,
    Bartlett,
    Rectangular,
}

impl WindowFunction {
    /// Cycle order used by the `w` interactive key.
    pub fn next(self) -> Self {
        match self {
            WindowFunction::Hann => WindowFunction::Hamming,
            WindowFunction::Hamming => WindowFunction::Bartlett,
            WindowFunction::Bartlett => WindowFunction::Rectangular,
            WindowFunction::Rectangular => WindowFunction::Hann,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Heat,
    Blue,
    Grayscale,
}

impl ColorScheme {
    /// Cycle order used by the `c` interactive key.
    pub fn next(self) -> Self {
        match self {
            ColorScheme::Heat => ColorScheme::Blue,
            ColorScheme::Blue => ColorScheme::Grayscale,
            ColorScheme::Grayscale => ColorScheme::Heat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// The full tunable bundle, mutated only through Controller setters so
/// that clamping and locking stay in one place.
#[derive(Debug, Clone)]
pub struct Settings {
    pub audio_sample_rate: u32,
    pub samples_overlap: f32,
    pub dft_size: u32,
    pub dft_window: WindowFunction,
    pub magnitude_log: bool,
    pub magnitude_min: f32,
    pub magnitude_max: f32,
    pub color_scheme: ColorScheme,
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_sample_rate: 24000,
            samples_overlap: 0.50,
            dft_size: 1024,
            dft_window: WindowFunction::Hann,
            magnitude_log: true,
            magnitude_min: 0.0,
            magnitude_max: 45.0,
            color_scheme: ColorScheme::Heat,
            width: 640,
            height: 480,
            orientation: Orientation::Vertical,
        }
    }
}

impl Settings {
    /// Number of fresh samples consumed per DFT: `round((1 - overlap) * N)`.
    pub fn hop(&self) -> u32 {
        ((1.0 - self.samples_overlap) * self.dft_size as f32).round() as u32
    }

    /// Default magnitude bounds for the given scale, used both at
    /// start-up and when the `l` key flips `magnitudeLog`.
    pub fn default_magnitude_bounds(log: bool) -> (f32, f32) {
        if log {
            (0.0, 45.0)
        } else {
            (0.0, 100.0)
        }
    }

    fn magnitude_limits(log: bool) -> (f32, f32) {
        if log {
            (limits::MAGNITUDE_LOG_MIN, limits::MAGNITUDE_LOG_MAX)
        } else {
            (limits::MAGNITUDE_LINEAR_MIN, limits::MAGNITUDE_LINEAR_MAX)
        }
    }

    /// Clamp `magnitude_min`/`magnitude_max` into the current scale's
    /// limits while preserving `min < max`.
    pub fn clamp_magnitude_bounds(&mut self) {
        let (lo, hi) = Self::magnitude_limits(self.magnitude_log);
        self.magnitude_min = self.magnitude_min.clamp(lo, hi);
        self.magnitude_max = self.magnitude_max.clamp(lo, hi);
        if self.magnitude_min >= self.magnitude_max {
            // Preserve the invariant by nudging the max up by one step,
            // clamped back into range.
            let step = if self.magnitude_log {
                limits::MAGNITUDE_LOG_STEP
            } else {
                limits::MAGNITUDE_LINEAR_STEP
            };
            self.magnitude_max = (self.magnitude_min + step).min(hi);
            if self.magnitude_min >= self.magnitude_max {
                self.magnitude_min = self.magnitude_max - step;
            }
        }
    }

    /// Full validation against the documented limit table. Used both by
    /// the CLI parser and as a defensive check before worker construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio_sample_rate < 1 {
            return Err(ConfigError::OutOfRange {
                field: "audioSampleRate",
                value: self.audio_sample_rate.to_string(),
                limit: ">= 1",
            });
        }
        if !(limits::OVERLAP_MIN..=limits::OVERLAP_MAX).contains(&self.samples_overlap) {
            return Err(ConfigError::OutOfRange {
                field: "samplesOverlap",
                value: self.samples_overlap.to_string(),
                limit: "[0.05, 0.95]",
            });
        }
        if !self.dft_size.is_power_of_two()
            || !(limits::DFT_SIZE_MIN..=limits::DFT_SIZE_MAX).contains(&self.dft_size)
        {
            return Err(ConfigError::OutOfRange {
                field: "dftSize",
                value: self.dft_size.to_string(),
                limit: "power of two in [64, 8192]",
            });
        }
        let (lo, hi) = Self::magnitude_limits(self.magnitude_log);
        if !(lo..=hi).contains(&self.magnitude_min) || !(lo..=hi).contains(&self.magnitude_max) {
            return Err(ConfigError::OutOfRange {
                field: "magnitudeMin/magnitudeMax",
                value: format!("{}/{}", self.magnitude_min, self.magnitude_max),
                limit: if self.magnitude_log {
                    "[-80, 80]"
                } else {
                    "[0, 1000]"
                },
            });
        }
        if self.magnitude_min >= self.magnitude_max {
            return Err(ConfigError::OutOfRange {
                field: "magnitudeMin",
                value: self.magnitude_min.to_string(),
                limit: "< magnitudeMax",
            });
        }
        if self.width < 1 || self.height < 1 {
            return Err(ConfigError::OutOfRange {
                field: "width/height",
                value: format!("{}/{}", self.width, self.height),
                limit: ">= 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn hop_is_half_dft_size_at_default_overlap() {
        let s = Settings::default();
        assert_eq!(s.hop(), 512);
    }

    #[test]
    fn clamp_preserves_min_less_than_max() {
        let mut s = Settings::default();
        s.magnitude_min = 45.0;
        s.magnitude_max = 45.0;
        s.clamp_magnitude_bounds();
        assert!(s.magnitude_min < s.magnitude_max);
    }

    #[test]
    fn rejects_non_power_of_two_dft_size() {
        let mut s = Settings::default();
        s.dft_size = 1000;
        assert!(s.validate().is_err());
    }
}
