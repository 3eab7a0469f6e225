//! CLI surface: a `clap::Parser` struct mirroring every flag, validated
//! into a `Settings` + `RunMode` before any worker starts.

use crate::error::ConfigError;
use crate::settings::{limits, ColorScheme, Orientation, Settings, WindowFunction};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrientationArg {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WindowArg {
    Hann,
    Hamming,
    Bartlett,
    Rectangular,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MagnitudeScaleArg {
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorsArg {
    Heat,
    Blue,
    Grayscale,
}

/// Realtime and offline scrolling spectrogram renderer.
#[derive(Debug, Parser)]
#[command(name = "spectrovue", disable_help_flag = false)]
pub struct Args {
    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub orientation: Option<OrientationArg>,

    #[arg(short = 'r', long = "sample-rate")]
    pub sample_rate: Option<u32>,

    /// Samples overlap as an integer percent, e.g. `50`.
    #[arg(long)]
    pub overlap: Option<u32>,

    #[arg(long = "dft-size")]
    pub dft_size: Option<u32>,

    #[arg(long)]
    pub window: Option<WindowArg>,

    #[arg(long = "magnitude-scale")]
    pub magnitude_scale: Option<MagnitudeScaleArg>,

    #[arg(long = "magnitude-min")]
    pub magnitude_min: Option<f32>,

    #[arg(long = "magnitude-max")]
    pub magnitude_max: Option<f32>,

    #[arg(long)]
    pub colors: Option<ColorsArg>,

    /// Zero or two positional args: `<audio-in> <image-out>` selects
    /// file mode; any other count is an error.
    pub positional: Vec<PathBuf>,
}

#[derive(Debug)]
pub enum RunMode {
    Realtime,
    Offline { audio_in: PathBuf, image_out: PathBuf },
}

/// Parses `argv`, applies overrides on top of `Settings::default()`, and
/// range-checks every value before any worker is constructed.
pub fn parse_from<I, T>(argv: I) -> Result<(Settings, RunMode), ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let args = Args::try_parse_from(argv).map_err(|e| ConfigError::Usage(e.to_string()))?;
    build_settings(args)
}

fn build_settings(args: Args) -> Result<(Settings, RunMode), ConfigError> {
    let mut settings = Settings::default();

    if let Some(w) = args.width {
        settings.width = w;
    }
    if let Some(h) = args.height {
        settings.height = h;
    }
    if let Some(o) = args.orientation {
        settings.orientation = match o {
            OrientationArg::Horizontal => Orientation::Horizontal,
            OrientationArg::Vertical => Orientation::Vertical,
        };
    }
    if let Some(rate) = args.sample_rate {
        settings.audio_sample_rate = rate;
    }
    if let Some(pct) = args.overlap {
        if !(5..=95).contains(&pct) {
            return Err(ConfigError::OutOfRange {
                field: "overlap",
                value: pct.to_string(),
                limit: "[5, 95]",
            });
        }
        settings.samples_overlap = pct as f32 / 100.0;
    }
    if let Some(n) = args.dft_size {
        if !n.is_power_of_two() || !(limits::DFT_SIZE_MIN..=limits::DFT_SIZE_MAX).contains(&n) {
            return Err(ConfigError::OutOfRange {
                field: "dftSize",
                value: n.to_string(),
                limit: "power of two in [64, 8192]",
            });
        }
        settings.dft_size = n;
    }
    if let Some(w) = args.window {
        settings.dft_window = match w {
            WindowArg::Hann => WindowFunction::Hann,
            WindowArg::Hamming => WindowFunction::Hamming,
            WindowArg::Bartlett => WindowFunction::Bartlett,
            WindowArg::Rectangular => WindowFunction::Rectangular,
        };
    }
    if let Some(scale) = args.magnitude_scale {
        let log = matches!(scale, MagnitudeScaleArg::Logarithmic);
        let (lo, hi) = Settings::default_magnitude_bounds(log);
        settings.magnitude_log = log;
        settings.magnitude_min = lo;
        settings.magnitude_max = hi;
    }
    if let Some(v) = args.magnitude_min {
        settings.magnitude_min = v;
    }
    if let Some(v) = args.magnitude_max {
        settings.magnitude_max = v;
    }
    if let Some(c) = args.colors {
        settings.color_scheme = match c {
            ColorsArg::Heat => ColorScheme::Heat,
            ColorsArg::Blue => ColorScheme::Blue,
            ColorsArg::Grayscale => ColorScheme::Grayscale,
        };
    }

    settings.validate()?;

    let mode = match args.positional.len() {
        0 => RunMode::Realtime,
        2 => RunMode::Offline {
            audio_in: args.positional[0].clone(),
            image_out: args.positional[1].clone(),
        },
        _ => {
            return Err(ConfigError::Usage(
                "expected zero positional arguments (realtime) or exactly two (<audio-in> <image-out>)"
                    .to_string(),
            ))
        }
    };

    Ok((settings, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_positional_args_selects_realtime() {
        let (_, mode) = parse_from(["spectrovue"]).unwrap();
        assert!(matches!(mode, RunMode::Realtime));
    }

    #[test]
    fn two_positional_args_selects_offline() {
        let (_, mode) = parse_from(["spectrovue", "in.wav", "out.png"]).unwrap();
        assert!(matches!(mode, RunMode::Offline { .. }));
    }

    #[test]
    fn one_positional_arg_is_an_error() {
        assert!(parse_from(["spectrovue", "in.wav"]).is_err());
    }

    #[test]
    fn overlap_out_of_range_is_rejected() {
        assert!(parse_from(["spectrovue", "--overlap", "2"]).is_err());
    }

    #[test]
    fn dft_size_must_be_power_of_two() {
        assert!(parse_from(["spectrovue", "--dft-size", "1000"]).is_err());
    }

    #[test]
    fn magnitude_scale_resets_bounds_to_scale_defaults() {
        let (settings, _) = parse_from(["spectrovue", "--magnitude-scale", "linear"]).unwrap();
        assert!(!settings.magnitude_log);
        let (lo, hi) = Settings::default_magnitude_bounds(false);
        assert_eq!(settings.magnitude_min, lo);
        assert_eq!(settings.magnitude_max, hi);
    }
}
