//! debris-overlay - Marine debris detection overlay and risk scoring
//!
//! Draws YOLO detection boxes over debris photos, colored by a per-class
//! risk score, and serves uploads, analyses and the debris record catalogue.

mod app;
mod config;
mod overlay;
mod records;
mod risk;
mod server;
mod shared;
mod storage;
mod vision;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::OverlayViewer;
use crate::config::AppConfig;
use crate::overlay::{compose_annotated, load_font, LegendEntry, RasterSurface};
use crate::records::{RecordCatalogue, RecordView, RiskBand};
use crate::risk::LabelStyle;
use crate::vision::{load_detections, AnalysisReport, Detection, ModelKind, YoloAnalyzer};

/// debris-overlay - Marine debris detection overlay
#[derive(Parser, Debug)]
#[command(name = "debris-overlay", version)]
#[command(about = "Annotate debris photos with risk-colored detection boxes")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the upload and data server
    Serve {
        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Draw detections from a JSON file over an image
    Annotate {
        /// Image to annotate
        image: PathBuf,
        /// Detection list or analysis report (JSON)
        #[arg(short, long)]
        detections: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Run the YOLO analyzer on an image
    Analyze {
        /// Image to analyze
        image: PathBuf,
        /// Trained model to use
        #[arg(short, long, value_enum, default_value_t = ModelKind::Coastal)]
        model: ModelKind,
        /// Also write an annotated copy of the image
        #[arg(long)]
        annotate: bool,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Browse the debris record catalogue
    Records {
        /// Dataset to read instead of the configured one
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Only records with this class label
        #[arg(long)]
        label: Option<String>,
        /// Only records in this risk band
        #[arg(long, value_enum)]
        risk: Option<RiskBand>,
        /// Print aggregate statistics instead of records
        #[arg(long, conflicts_with = "markers")]
        stats: bool,
        /// Print map markers instead of records
        #[arg(long)]
        markers: bool,
    },
    /// Check analyzer script, models and interpreter
    Status,
    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct RenderArgs {
    /// Output PNG (defaults to <image>_annotated.png)
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Viewport size the image is laid out in, as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_viewport)]
    viewport: Option<(u32, u32)>,
    /// Show detector class names instead of Korean labels
    #[arg(long)]
    raw_labels: bool,
}

fn parse_viewport(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let height = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if width == 0 || height == 0 {
        return Err("viewport dimensions must be positive".to_string());
    }
    Ok((width, height))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    run(args.command, args.config.as_deref())
}

fn run(command: Command, config_path: Option<&Path>) -> Result<()> {
    let load_config = || load_or_default_config(config_path);

    match command {
        Command::InitConfig { force } => init_config(config_path, force),
        Command::Serve { port } => {
            let mut config = load_config()?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if config.records.dataset_path.is_none() {
                config.records.dataset_path = storage::default_dataset_path();
            }
            actix_web::rt::System::new().block_on(server::run(&config))
        }
        Command::Annotate {
            image,
            detections,
            render,
        } => {
            let config = load_config()?;
            let detections = load_detections(&detections)?;
            info!("Loaded {} detections", detections.len());
            let legend = annotate(&config, &image, detections, &render)?;
            print_json(&legend)
        }
        Command::Analyze {
            image,
            model,
            annotate: write_annotated,
            render,
        } => {
            let config = load_config()?;
            let analyzer = YoloAnalyzer::new(config.analyzer.clone());
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            let report = runtime.block_on(analyzer.analyze(&image, model));
            print_json(&report)?;
            if write_annotated {
                annotate_report(&config, &image, &report, &render)?;
            }
            Ok(())
        }
        Command::Records {
            dataset,
            label,
            risk,
            stats,
            markers,
        } => {
            let config = load_config()?;
            let path = dataset
                .or(config.records.dataset_path)
                .or_else(storage::default_dataset_path)
                .context("No record dataset configured; pass --dataset or set records.dataset_path")?;
            let catalogue = RecordCatalogue::load(&path)?;

            if stats {
                print_json(&catalogue.statistics())
            } else if markers {
                print_json(&catalogue.markers())
            } else {
                let views: Vec<RecordView> = catalogue
                    .filter(label.as_deref(), risk)
                    .into_iter()
                    .map(RecordView::from)
                    .collect();
                print_json(&views)
            }
        }
        Command::Status => {
            let config = load_config()?;
            let analyzer = YoloAnalyzer::new(config.analyzer.clone());
            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            print_json(&runtime.block_on(analyzer.status()))
        }
    }
}

/// Load configuration from `path`, the platform config file, or defaults
fn load_or_default_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        let config = config::load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_path) = storage::default_config_path() {
        if config_path.exists() {
            let config = config::load_config(&config_path)?;
            info!("Loaded configuration from {:?}", config_path);
            return Ok(config);
        }
    }

    info!("Using default configuration");
    Ok(AppConfig::default())
}

fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => storage::default_config_path()?,
    };
    if path.exists() && !force {
        bail!("{:?} already exists (use --force to overwrite)", path);
    }
    config::save_config(&AppConfig::default(), &path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn annotate_report(
    config: &AppConfig,
    image: &Path,
    report: &AnalysisReport,
    render: &RenderArgs,
) -> Result<()> {
    if !report.success {
        info!("Analysis failed; skipping annotated output");
        return Ok(());
    }
    annotate(config, image, report.all_detections.clone(), render)?;
    Ok(())
}

/// Lay out `image`, draw the overlay for `detections`, save the composite
/// and return the legend
fn annotate(
    config: &AppConfig,
    image_path: &Path,
    detections: Vec<Detection>,
    render: &RenderArgs,
) -> Result<Vec<LegendEntry>> {
    let image = image::open(image_path)
        .with_context(|| format!("Failed to open image {:?}", image_path))?;

    let mut settings = config.overlay.clone();
    if render.raw_labels {
        settings.label_style = LabelStyle::Raw;
    }

    let font = load_font(settings.font_path.as_deref());
    let surface = RasterSurface::new(font, settings.style.font_size);

    let viewer = OverlayViewer::start(surface, &settings)?;
    viewer.set_detections(detections);
    viewer.image_loaded(image.width(), image.height());
    if let Some((width, height)) = render.viewport {
        viewer.resize(width, height);
    }
    let controller = viewer.finish()?;

    if controller.state().redraw_count == 0 {
        bail!("Overlay was never drawn for {:?}", image_path);
    }
    let legend = controller.legend();
    let overlay = controller.into_surface().into_canvas();
    let composed = compose_annotated(&image, &overlay);

    let out = render
        .out
        .clone()
        .unwrap_or_else(|| annotated_path(image_path));
    composed
        .save(&out)
        .with_context(|| format!("Failed to write {:?}", out))?;
    info!(
        "Wrote {}x{} annotated image to {:?}",
        composed.width(),
        composed.height(),
        out
    );

    Ok(legend)
}

fn annotated_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    image.with_file_name(format!("{}_annotated.png", stem))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("1280x800").unwrap(), (1280, 800));
        assert_eq!(parse_viewport("640X480").unwrap(), (640, 480));
        assert!(parse_viewport("1280").is_err());
        assert!(parse_viewport("0x10").is_err());
    }

    #[test]
    fn test_annotated_path() {
        assert_eq!(
            annotated_path(Path::new("/data/shore.jpg")),
            PathBuf::from("/data/shore_annotated.png")
        );
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from([
            "debris-overlay",
            "annotate",
            "shore.jpg",
            "--detections",
            "det.json",
            "--viewport",
            "800x600",
            "--raw-labels",
        ])
        .unwrap();
        match args.command {
            Command::Annotate { render, .. } => {
                assert_eq!(render.viewport, Some((800, 600)));
                assert!(render.raw_labels);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::try_parse_from(["debris-overlay", "records", "--risk", "high", "--stats"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Records {
                risk: Some(RiskBand::High),
                stats: true,
                ..
            }
        ));
    }

    #[test]
    fn test_annotate_writes_composite() {
        let dir = tempfile::TempDir::new().unwrap();
        let image_path = dir.path().join("shore.png");
        image::RgbaImage::from_pixel(1000, 500, image::Rgba([10, 20, 200, 255]))
            .save(&image_path)
            .unwrap();

        let mut config = AppConfig::default();
        config.overlay.debounce_ms = 5;
        let render = RenderArgs {
            out: Some(dir.path().join("out.png")),
            viewport: None,
            raw_labels: true,
        };
        let detections = vec![
            Detection::new("Fish_net", 1.0, 0)
                .with_box(vision::BoundingBox::new(100.0, 100.0, 300.0, 300.0)),
        ];

        let legend = annotate(&config, &image_path, detections, &render).unwrap();

        assert_eq!(legend.len(), 1);
        assert_eq!(legend[0].text, "Fish_net - 100.0%");
        let out = image::open(dir.path().join("out.png")).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (800, 400));
        // Box outline at (80, 80) in the displayed frame, drawn in the top risk color
        assert_eq!(*out.get_pixel(80, 120), image::Rgba([0xdc, 0x35, 0x45, 255]));
    }
}
