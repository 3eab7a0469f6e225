//! CLI entry point: dispatches realtime vs. offline mode, installs the
//! logger, and maps a top-level error to a non-zero exit code.

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use spectrovue::audio_source::{AudioSource, FileAudioSource, LiveAudioSource};
use spectrovue::cli::{self, RunMode};
use spectrovue::display::Display;
use spectrovue::image_sink::{ImageSink, PngImageSink};
use spectrovue::pipeline::{controller, Analyzer, Capture, Controller};
use spectrovue::presenter::Presenter;
use spectrovue::queue::Queue;
use spectrovue::settings::Settings;
use spectrovue::shared::Shared;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn main() -> ExitCode {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let (settings, mode) = cli::parse_from(std::env::args_os()).map_err(|e| e.to_string())?;

    match mode {
        RunMode::Realtime => run_realtime(settings).map_err(|e| e.to_string()),
        RunMode::Offline {
            audio_in,
            image_out,
        } => run_offline(settings, &audio_in, &image_out).map_err(|e| e.to_string()),
    }
}

fn run_realtime(settings: Settings) -> anyhow::Result<()> {
    let running = Arc::new(AtomicBool::new(true));

    let source: Box<dyn AudioSource> = Box::new(LiveAudioSource::new(settings.audio_sample_rate)?);
    let shared_source = Shared::new(source);

    let samples_queue: Queue<Vec<f32>> = Queue::new();
    let pixels_queue: Queue<Vec<u32>> = Queue::new();

    let (dft, renderer, ctrl, spectrum_width) = controller::build(&settings)?;
    let controller = Arc::new(ctrl);
    // The device may not honor the requested rate; read back what it
    // actually opened at through the same lock the Presenter would use
    // to observe the source, rather than trusting the CLI value.
    controller.set_sample_rate(shared_source.lock().sample_rate());

    let capture = Capture::new(shared_source, samples_queue.clone(), running.clone());
    let analyzer = Analyzer::new(
        samples_queue,
        pixels_queue.clone(),
        dft,
        renderer,
        spectrum_width,
        running.clone(),
    );

    let capture_handle = std::thread::Builder::new()
        .name("capture".into())
        .spawn(move || capture.run())?;
    let analyzer_handle = std::thread::Builder::new()
        .name("analyzer".into())
        .spawn(move || analyzer.run())?;

    let display = Display::new("spectrovue", settings.width, settings.height)?;
    let mut presenter = Presenter::new(display, pixels_queue, controller, running.clone());
    presenter.run();

    running.store(false, std::sync::atomic::Ordering::Release);
    analyzer_handle.join().map_err(|_| anyhow::anyhow!("analyzer thread panicked"))?;
    capture_handle.join().map_err(|_| anyhow::anyhow!("capture thread panicked"))?;
    Ok(())
}

fn run_offline(
    settings: Settings,
    audio_in: &std::path::Path,
    image_out: &std::path::Path,
) -> anyhow::Result<()> {
    let mut source = FileAudioSource::open(audio_in)?;
    if source.sample_rate() != settings.audio_sample_rate {
        log::info!(
            "offline: using file sample rate {} Hz (CLI sample rate is ignored in file mode)",
            source.sample_rate()
        );
    }
    let mut sink: Box<dyn ImageSink> =
        Box::new(PngImageSink::new(image_out.to_path_buf(), settings.width, settings.orientation));
    spectrovue::offline::run(&mut source, sink.as_mut(), &settings)?;
    Ok(())
}
