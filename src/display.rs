//! The concrete realtime `Display`/input layer, backed by `minifb`.
//! Window creation, texture upload, and keyboard/mouse polling are named
//! interfaces only; this module is the one adapter that implements
//! them. HUD text needs glyphs, and font discovery on disk is out of
//! scope, so this adapter owns a small embedded bitmap font rather than
//! loading one.

use crate::error::SinkError;
use minifb::{Key, MouseMode, Window, WindowOptions};

pub struct Display {
    window: Window,
    width: usize,
    height: usize,
}

impl Display {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, SinkError> {
        let width = width as usize;
        let height = height as usize;
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| SinkError::Display(e.to_string()))?;
        Ok(Self {
            window,
            width,
            height,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn update(&mut self, pixels: &[u32]) -> Result<(), SinkError> {
        self.window
            .update_with_buffer(pixels, self.width, self.height)
            .map_err(|e| SinkError::Display(e.to_string()))
    }

    /// Composites `text` onto `pixels` (an already-allocated `width x
    /// height` buffer) at `(x0, y0)` using the embedded bitmap font.
    pub fn draw_text(&self, pixels: &mut [u32], x0: usize, y0: usize, text: &str, color: u32) {
        bitmap_font::draw(pixels, self.width, self.height, x0, y0, text, color);
    }

    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Clamp)
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, minifb::KeyRepeat::No)
    }

    pub fn set_fullscreen(&mut self, on: bool) {
        self.window.set_cursor_visibility(!on);
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}

/// A 5x7 embedded bitmap font covering the characters this repository's
/// HUDs actually draw (digits, uppercase letters, and a handful of
/// punctuation marks); not a general-purpose font.
mod bitmap_font {
    const WIDTH: usize = 5;
    const HEIGHT: usize = 7;

    fn glyph(ch: char) -> [u8; WIDTH] {
        match ch.to_ascii_uppercase() {
            '0' => [0x3E, 0x51, 0x49, 0x45, 0x3E],
            '1' => [0x00, 0x42, 0x7F, 0x40, 0x00],
            '2' => [0x42, 0x61, 0x51, 0x49, 0x46],
            '3' => [0x21, 0x41, 0x45, 0x4B, 0x31],
            '4' => [0x18, 0x14, 0x12, 0x7F, 0x10],
            '5' => [0x27, 0x45, 0x45, 0x45, 0x39],
            '6' => [0x3C, 0x4A, 0x49, 0x49, 0x30],
            '7' => [0x01, 0x71, 0x09, 0x05, 0x03],
            '8' => [0x36, 0x49, 0x49, 0x49, 0x36],
            '9' => [0x06, 0x49, 0x49, 0x29, 0x1E],
            'A' => [0x7E, 0x11, 0x11, 0x11, 0x7E],
            'B' => [0x7F, 0x49, 0x49, 0x49, 0x36],
            'C' => [0x3E, 0x41, 0x41, 0x41, 0x22],
            'D' => [0x7F, 0x41, 0x41, 0x22, 0x1C],
            'E' => [0x7F, 0x49, 0x49, 0x49, 0x41],
            'F' => [0x7F, 0x09, 0x09, 0x09, 0x01],
            'G' => [0x3E, 0x41, 0x49, 0x49, 0x7A],
            'H' => [0x7F, 0x08, 0x08, 0x08, 0x7F],
            'I' => [0x00, 0x41, 0x7F, 0x41, 0x00],
            'J' => [0x20, 0x40, 0x41, 0x3F, 0x01],
            'K' => [0x7F, 0x08, 0x14, 0x22, 0x41],
            'L' => [0x7F, 0x40, 0x40, 0x40, 0x40],
            'M' => [0x7F, 0x02, 0x0C, 0x02, 0x7F],
            'N' => [0x7F, 0x04, 0x08, 0x10, 0x7F],
            'O' => [0x3E, 0x41, 0x41, 0x41, 0x3E],
            'P' => [0x7F, 0x09, 0x09, 0x09, 0x06],
            'Q' => [0x3E, 0x41, 0x51, 0x21, 0x5E],
            'R' => [0x7F, 0x09, 0x19, 0x29, 0x46],
            'S' => [0x46, 0x49, 0x49, 0x49, 0x31],
            'T' => [0x01, 0x01, 0x7F, 0x01, 0x01],
            'U' => [0x3F, 0x40, 0x40, 0x40, 0x3F],
            'V' => [0x1F, 0x20, 0x40, 0x20, 0x1F],
            'W' => [0x3F, 0x40, 0x38, 0x40, 0x3F],
            'X' => [0x63, 0x14, 0x08, 0x14, 0x63],
            'Y' => [0x07, 0x08, 0x70, 0x08, 0x07],
            'Z' => [0x61, 0x51, 0x49, 0x45, 0x43],
            ':' => [0x00, 0x36, 0x36, 0x00, 0x00],
            '.' => [0x00, 0x60, 0x60, 0x00, 0x00],
            '%' => [0x23, 0x13, 0x08, 0x64, 0x62],
            '-' => [0x08, 0x08, 0x08, 0x08, 0x08],
            '/' => [0x20, 0x10, 0x08, 0x04, 0x02],
            _ => [0x00, 0x00, 0x00, 0x00, 0x00],
        }
    }

    pub fn draw(
        pixels: &mut [u32],
        buf_width: usize,
        buf_height: usize,
        x0: usize,
        y0: usize,
        text: &str,
        color: u32,
    ) {
        for (i, ch) in text.chars().enumerate() {
            let gx = x0 + i * (WIDTH + 1);
            if gx + WIDTH > buf_width {
                break;
            }
            let g = glyph(ch);
            for (col, bits) in g.iter().enumerate() {
                for row in 0..HEIGHT {
                    if bits & (1 << row) != 0 {
                        let x = gx + col;
                        let y = y0 + row;
                        if x < buf_width && y < buf_height {
                            pixels[y * buf_width + x] = color;
                        }
                    }
                }
            }
        }
    }
}
