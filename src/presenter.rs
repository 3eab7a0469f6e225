//! Presenter: drains the PixelsQueue, scrolls the image, composites
//! HUD overlays, processes input, and invokes Controller setters on the
//! other workers. Runs on the initiating thread; never blocks on
//! PixelsQueue (it drains whatever is available).

use crate::display::Display;
use crate::pipeline::controller::Controller;
use crate::queue::Queue;
use crate::settings::Orientation;
use minifb::Key;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct Presenter {
    display: Display,
    pixels_queue: Queue<Vec<u32>>,
    controller: Arc<Controller>,
    running: Arc<AtomicBool>,
    image: Vec<u32>,
    show_help: bool,
    show_settings: bool,
    show_stats: bool,
    fullscreen: bool,
    rows_received: u64,
    overrun_count: u64,
}

impl Presenter {
    pub fn new(
        display: Display,
        pixels_queue: Queue<Vec<u32>>,
        controller: Arc<Controller>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            display,
            pixels_queue,
            controller,
            running,
            image: Vec::new(),
            show_help: false,
            show_settings: true,
            show_stats: false,
            fullscreen: false,
            rows_received: 0,
            overrun_count: 0,
        }
    }

    /// Realtime event loop: runs until the window closes or `running`
    /// is cleared by another worker's fatal error.
    pub fn run(&mut self) {
        while self.running.load(Ordering::Acquire) && self.display.is_open() {
            self.handle_input();
            self.ingest_pixels();
            self.compose_and_present();
        }
        self.running.store(false, Ordering::Release);
    }

    /// The spectrum axis length of the internal (always-vertical-layout)
    /// image buffer: `width` in vertical orientation, `height` in
    /// horizontal orientation.
    fn spectrum_width(&self) -> usize {
        match self.controller.orientation() {
            Orientation::Vertical => self.controller.width() as usize,
            Orientation::Horizontal => self.controller.height() as usize,
        }
    }

    /// The time axis length of the internal image buffer: the
    /// complement of `spectrum_width` among `(width, height)`.
    fn time_axis_length(&self) -> usize {
        match self.controller.orientation() {
            Orientation::Vertical => self.controller.height() as usize,
            Orientation::Horizontal => self.controller.width() as usize,
        }
    }

    /// Drains all available PixelRows, validates their width against
    /// the current spectrum width (replacing mismatches with a zero
    /// row), then scrolls the image buffer.
    fn ingest_pixels(&mut self) {
        let rows = self.pixels_queue.drain();
        if rows.is_empty() {
            return;
        }
        let w = self.spectrum_width().max(1);
        let h = self.time_axis_length().max(1);
        let capacity = w * h;

        let mut staged = Vec::with_capacity(rows.len() * w);
        for row in rows {
            if row.len() == w {
                staged.extend(row);
            } else {
                staged.extend(std::iter::repeat(0u32).take(w));
            }
            self.rows_received += 1;
        }

        if self.image.len() != capacity {
            self.image = vec![0; capacity];
        }

        if staged.len() >= capacity {
            self.overrun_count += 1;
            log::warn!(
                "presenter: overrun, discarding {} stale pixels",
                staged.len() - capacity
            );
            let start = staged.len() - capacity;
            self.image.copy_from_slice(&staged[start..]);
        } else {
            let keep = capacity - staged.len();
            self.image.copy_within(staged.len().., 0);
            self.image[keep..].copy_from_slice(&staged);
        }
    }

    fn compose_and_present(&mut self) {
        let (mut frame, _fw, fh) = rotate_for_display(
            &self.image,
            self.spectrum_width().max(1),
            self.time_axis_length().max(1),
            self.controller.orientation(),
        );

        if self.show_settings {
            let s = self.controller.snapshot();
            self.display.draw_text(
                &mut frame,
                4,
                4,
                &format!(
                    "N{} {} OVR{}",
                    s.dft_size,
                    window_label(s.dft_window),
                    (s.samples_overlap * 100.0).round() as u32
                ),
                0x00FFFFFF,
            );
        }
        if self.show_stats {
            self.display.draw_text(
                &mut frame,
                4,
                14,
                &format!("ROWS{} OVR{}", self.rows_received, self.overrun_count),
                0x00FFFF00,
            );
        }
        if self.show_help {
            self.display.draw_text(
                &mut frame,
                4,
                fh.saturating_sub(10),
                "Q H S D C W L F",
                0x0000FF00,
            );
        }
        if let Some((mx, _my)) = self.display.mouse_position() {
            let freq = self.controller.cursor_frequency(mx as u32);
            self.display.draw_text(
                &mut frame,
                4,
                24,
                &format!("{}HZ", freq.round() as i64),
                0x00FF8000,
            );
        }

        if let Err(err) = self.display.update(&frame) {
            log::error!("presenter: display update failed: {err}");
            self.running.store(false, Ordering::Release);
        }
    }

    /// Maps interactive keys to Controller operations; re-rendering
    /// overlays implicitly happens on the next `compose_and_present`
    /// since it re-polls getters via `snapshot()` each frame.
    fn handle_input(&mut self) {
        if self.display.is_key_pressed(Key::Q) {
            self.running.store(false, Ordering::Release);
            return;
        }
        if self.display.is_key_pressed(Key::H) {
            self.show_help = !self.show_help;
        }
        if self.display.is_key_pressed(Key::S) {
            self.show_settings = !self.show_settings;
        }
        if self.display.is_key_pressed(Key::D) {
            self.show_stats = !self.show_stats;
        }
        if self.display.is_key_pressed(Key::C) {
            self.controller.cycle_color_scheme();
        }
        if self.display.is_key_pressed(Key::W) {
            self.controller.cycle_window_function();
        }
        if self.display.is_key_pressed(Key::L) {
            self.controller.toggle_magnitude_scale();
        }
        if self.display.is_key_pressed(Key::Left) {
            if let Err(err) = self.controller.halve_dft_size() {
                log::warn!("presenter: halve dft size failed: {err}");
            }
        }
        if self.display.is_key_pressed(Key::Right) {
            if let Err(err) = self.controller.double_dft_size() {
                log::warn!("presenter: double dft size failed: {err}");
            }
        }
        if self.display.is_key_pressed(Key::Up) {
            self.controller.increase_overlap();
        }
        if self.display.is_key_pressed(Key::Down) {
            self.controller.decrease_overlap();
        }
        if self.display.is_key_pressed(Key::Minus) {
            self.controller.decrease_magnitude_min();
        }
        if self.display.is_key_pressed(Key::Equal) {
            self.controller.increase_magnitude_min();
        }
        if self.display.is_key_pressed(Key::LeftBracket) {
            self.controller.decrease_magnitude_max();
        }
        if self.display.is_key_pressed(Key::RightBracket) {
            self.controller.increase_magnitude_max();
        }
        if self.display.is_key_pressed(Key::F) {
            self.fullscreen = !self.fullscreen;
            self.display.set_fullscreen(self.fullscreen);
        }
    }
}

fn window_label(wf: crate::settings::WindowFunction) -> &'static str {
    use crate::settings::WindowFunction::*;
    match wf {
        Hann => "HANN",
        Hamming => "HAMMING",
        Bartlett => "BARTLETT",
        Rectangular => "RECT",
    }
}

/// Rotates the always-vertical internal buffer 90 degrees for a
/// horizontal-orientation display; a no-op copy for vertical.
fn rotate_for_display(
    image: &[u32],
    w: usize,
    h: usize,
    orientation: Orientation,
) -> (Vec<u32>, usize, usize) {
    match orientation {
        Orientation::Vertical => (image.to_vec(), w, h),
        Orientation::Horizontal => {
            let mut rotated = vec![0u32; w * h];
            for y in 0..h {
                for x in 0..w {
                    // 90 degree rotation: new[x][h-1-y] = old[y][x]
                    let src = y * w + x;
                    let dst = x * h + (h - 1 - y);
                    rotated[dst] = image[src];
                }
            }
            (rotated, h, w)
        }
    }
}
