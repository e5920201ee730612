//! cv-features CLI: detect corners or line segments in an image, save the overlay and the
//! feature export, and optionally tune the threshold interactively.

use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use std::io;
use std::path::PathBuf;

use cv_features::{
    CornerDetector, CornerDetectorParams, Detector, FeatureDetector, FeatureRenderer, ImageContainer,
    InteractiveTuner, LineDetector, LineDetectorParams, TextSurface,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Corner,
    Line,
}

#[derive(Debug, Parser)]
#[command(name = "cv-features")]
#[command(about = "Detect corners or line segments and tune the detection threshold")]
#[command(version)]
struct Cli {
    /// Path to the input image.
    image: PathBuf,

    /// Identifier of the image, used in window titles and output file names.
    #[arg(long, default_value = "0")]
    id: String,

    /// Which features to detect.
    #[arg(long, value_enum, default_value = "corner")]
    mode: Mode,

    /// Corner response threshold (0..255, raised to 95 if lower).
    #[arg(long, default_value_t = CornerDetectorParams::default().threshold)]
    threshold: i32,

    /// Lower edge threshold for line detection.
    #[arg(long, default_value_t = LineDetectorParams::default().min_threshold)]
    min_threshold: i32,

    /// Upper edge threshold for line detection.
    #[arg(long, default_value_t = LineDetectorParams::default().max_threshold)]
    max_threshold: i32,

    /// Blur kernel size for line detection.
    #[arg(long, default_value_t = LineDetectorParams::default().kernel_size)]
    kernel_size: u32,

    /// Directory receiving the overlay image and the feature export.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Label segment lengths / corner coordinates on the overlay.
    #[arg(long)]
    annotate: bool,

    /// Tune the threshold from stdin (one value per line, q to stop) after the first run.
    #[arg(long)]
    interactive: bool,

    /// With --interactive, save every tuned frame to this file.
    #[arg(long)]
    frames: Option<PathBuf>,

    /// With --interactive, tune in a native window instead of stdin (needs the `display`
    /// feature).
    #[arg(long)]
    window: bool,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn build_detector(cli: &Cli) -> CliResult<Detector> {
    let image = ImageContainer::load(cli.id.clone(), &cli.image)?;
    info!("{}", image);
    Ok(match cli.mode {
        Mode::Corner => CornerDetector::new(
            image,
            CornerDetectorParams {
                threshold: cli.threshold,
            },
        )
        .into(),
        Mode::Line => LineDetector::new(
            image,
            LineDetectorParams {
                min_threshold: cli.min_threshold,
                max_threshold: cli.max_threshold,
                kernel_size: cli.kernel_size,
            },
        )
        .into(),
    })
}

fn run(cli: Cli) -> CliResult<()> {
    let mut detector = build_detector(&cli)?;
    let renderer = FeatureRenderer::default();

    let features = detector.detect();
    info!("{} {} groups", features.len(), features.kind());

    let overlay = if cli.annotate {
        renderer.render_annotated(detector.features(), detector.image().image())
    } else {
        renderer.render(detector.features(), detector.image().image())
    };
    let overlay_path = cli
        .out_dir
        .join(format!("{}{}_overlay.png", detector.kind(), detector.id()));
    ImageContainer::new(detector.id().to_string(), overlay).save(&overlay_path)?;
    info!("overlay saved to {}", overlay_path.display());

    cv_features::write_features_file(&cli.out_dir, detector.features(), detector.id())?;

    if cli.interactive {
        if cli.window && !cfg!(feature = "display") {
            warn!("built without the display feature, tuning from stdin instead");
        }
        #[cfg(feature = "display")]
        {
            if cli.window {
                let surface = cv_features::display::WindowSurface::open(&detector.window_name())?;
                InteractiveTuner::new(&mut detector, surface, renderer).run()?;
                info!("{}", detector);
                return Ok(());
            }
        }
        let stdin = io::stdin();
        let mut surface = TextSurface::new(stdin.lock());
        if let Some(path) = &cli.frames {
            surface = surface.with_frame_path(path);
        }
        InteractiveTuner::new(&mut detector, surface, renderer).run()?;
        info!("{}", detector);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    #[cfg(feature = "display")]
    {
        if cli.interactive && cli.window {
            show_image::run_context(move || {
                exit_with(run(cli));
            });
        }
    }

    exit_with(run(cli));
}

fn exit_with(result: CliResult<()>) -> ! {
    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    }
}
