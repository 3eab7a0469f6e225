pub mod colorscheme;
pub mod spectrum_renderer;

pub use spectrum_renderer::SpectrumRenderer;
