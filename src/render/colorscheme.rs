//! Magnitude-to-color mapping. Pure function of a normalized value in
//! `[0, 1]`; packed as `0x00RRGGBB`.

use crate::settings::ColorScheme;

/// Linearly interpolate between two RGB stops over `[lo, hi]`.
fn lerp_segment(v: f32, lo: f32, hi: f32, from: (u8, u8, u8), to: (u8, u8, u8)) -> (u8, u8, u8) {
    let t = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    (ch(from.0, to.0), ch(from.1, to.1), ch(from.2, to.2))
}

/// Maps a normalized magnitude `v in [0, 1]` to `(r, g, b)` under the
/// given color scheme.
pub fn map(v: f32, scheme: ColorScheme) -> (u8, u8, u8) {
    let v = v.clamp(0.0, 1.0);
    match scheme {
        ColorScheme::Heat => {
            const BLACK: (u8, u8, u8) = (0, 0, 0);
            const BLUE: (u8, u8, u8) = (0, 0, 255);
            const GREEN: (u8, u8, u8) = (0, 255, 0);
            const YELLOW: (u8, u8, u8) = (255, 255, 0);
            const RED: (u8, u8, u8) = (255, 0, 0);
            const WHITE: (u8, u8, u8) = (255, 255, 255);
            if v < 0.2 {
                lerp_segment(v, 0.0, 0.2, BLACK, BLUE)
            } else if v < 0.4 {
                lerp_segment(v, 0.2, 0.4, BLUE, GREEN)
            } else if v < 0.6 {
                lerp_segment(v, 0.4, 0.6, GREEN, YELLOW)
            } else if v < 0.8 {
                lerp_segment(v, 0.6, 0.8, YELLOW, RED)
            } else {
                lerp_segment(v, 0.8, 1.0, RED, WHITE)
            }
        }
        ColorScheme::Blue => {
            const BLACK: (u8, u8, u8) = (0, 0, 0);
            const BLUE: (u8, u8, u8) = (0, 0, 255);
            const WHITE: (u8, u8, u8) = (255, 255, 255);
            if v < 0.5 {
                lerp_segment(v, 0.0, 0.5, BLACK, BLUE)
            } else {
                lerp_segment(v, 0.5, 1.0, BLUE, WHITE)
            }
        }
        ColorScheme::Grayscale => {
            let c = (255.0 * v).round() as u8;
            (c, c, c)
        }
    }
}

/// Packs an `(r, g, b)` triple as `0x00RRGGBB`.
pub fn pack(rgb: (u8, u8, u8)) -> u32 {
    (rgb.0 as u32) << 16 | (rgb.1 as u32) << 8 | rgb.2 as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_black_for_heat_and_blue() {
        assert_eq!(map(0.0, ColorScheme::Heat), (0, 0, 0));
        assert_eq!(map(0.0, ColorScheme::Blue), (0, 0, 0));
    }

    #[test]
    fn one_is_white_for_heat_and_blue() {
        assert_eq!(map(1.0, ColorScheme::Heat), (255, 255, 255));
        assert_eq!(map(1.0, ColorScheme::Blue), (255, 255, 255));
    }

    #[test]
    fn grayscale_is_linear() {
        assert_eq!(map(0.0, ColorScheme::Grayscale), (0, 0, 0));
        assert_eq!(map(1.0, ColorScheme::Grayscale), (255, 255, 255));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(map(-1.0, ColorScheme::Grayscale), (0, 0, 0));
        assert_eq!(map(2.0, ColorScheme::Grayscale), (255, 255, 255));
    }

    #[test]
    fn pack_matches_00rrggbb() {
        assert_eq!(pack((0x11, 0x22, 0x33)), 0x00112233);
    }
}
