//! Livery CLI - place logos on a car model's UV map and bake a texture.
//!
//! Usage: livery [--config <FILE>] <COMMAND> [OPTIONS]
//!
//! Run `livery --help` for available commands. Set `RUST_LOG=info` (or
//! `debug`) for diagnostics.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use livery::bake::Progress;
use livery::config::Config;
use livery::editor::LogoFit;
use livery::io;
use livery::session::{LoadOutcome, Session};

#[derive(Parser)]
#[command(name = "livery")]
#[command(author, version, about = "Logo placement and texture baking for car models", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model identifier selecting the zone table
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List models and their zones
    Zones {
        /// Canvas size used to print pixel rectangles
        #[arg(short, long, default_value = "400")]
        size: u32,
    },

    /// Write the UV image of a model
    ExtractUv {
        /// Input model file (.gltf or .glb)
        input: PathBuf,

        /// Output PNG file
        output: PathBuf,
    },

    /// Render the editor canvas with zone outlines and logos
    Preview {
        /// Input model file
        input: PathBuf,

        /// Output PNG file
        output: PathBuf,

        /// Logo image to place
        #[arg(short, long, requires = "zones")]
        logo: Option<PathBuf>,

        /// Zone to place the logo into (repeatable)
        #[arg(short, long = "zone")]
        zones: Vec<String>,
    },

    /// Bake logos into a texture
    Bake {
        /// Input model file
        input: PathBuf,

        /// Logo image to place
        #[arg(short, long)]
        logo: PathBuf,

        /// Zone to place the logo into (repeatable)
        #[arg(short, long = "zone", required = true)]
        zones: Vec<String>,

        /// Output PNG file for the baked texture
        output: PathBuf,

        /// Also write the UV image
        #[arg(long)]
        uv_out: Option<PathBuf>,

        /// Write the editor state as JSON
        #[arg(long)]
        state_out: Option<PathBuf>,

        /// Output resolution (default from config)
        #[arg(short, long)]
        resolution: Option<u32>,

        /// How logos are scaled into zones
        #[arg(short, long, value_enum)]
        fit: Option<FitMode>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FitMode {
    /// Stretch logos over the whole zone
    Stretch,
    /// Keep aspect ratio and centre logos in the zone
    Contain,
}

impl From<FitMode> for LogoFit {
    fn from(mode: FitMode) -> Self {
        match mode {
            FitMode::Stretch => LogoFit::Stretch,
            FitMode::Contain => LogoFit::Contain,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(model) = cli.model {
        config.default_model = model;
    }

    match cli.command {
        Commands::Zones { size } => {
            cmd_zones(&config, size)?;
        }

        Commands::ExtractUv { input, output } => {
            cmd_extract_uv(config, &input, &output)?;
        }

        Commands::Preview {
            input,
            output,
            logo,
            zones,
        } => {
            cmd_preview(config, &input, &output, logo.as_deref(), &zones)?;
        }

        Commands::Bake {
            input,
            logo,
            zones,
            output,
            uv_out,
            state_out,
            resolution,
            fit,
            sequential,
        } => {
            if let Some(resolution) = resolution {
                config.bake.resolution = resolution;
            }
            if let Some(fit) = fit {
                config.bake.logo_fit = fit.into();
            }
            config.bake.parallel = config.bake.parallel && !sequential;

            cmd_bake(
                config,
                &input,
                &logo,
                &zones,
                &output,
                uv_out.as_deref(),
                state_out.as_deref(),
            )?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Rows finish out of order on worker threads; only move forward.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }
        let percent = raw_percent.max(previous);

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn load_session(config: Config, input: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = Session::new(config)?;
    if session.load_model(input) == LoadOutcome::Fallback {
        eprintln!("Warning: could not load {}, using placeholder model", input.display());
    }

    if let Some(scene) = session.scene() {
        println!(
            "Loaded: {} meshes, {} materials",
            scene.num_meshes(),
            scene.num_materials()
        );
    }
    Ok(session)
}

fn place_logo(
    session: &mut Session,
    logo: &Path,
    zones: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(logo)?;
    let name = logo
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("logo")
        .to_string();

    if session.upload_logo(&name, &bytes).is_none() {
        eprintln!("Warning: could not decode {}, no logo placed", logo.display());
        return Ok(());
    }
    for zone in zones {
        session.place_logo(zone)?;
        println!("Placed {} in {}", name, zone);
    }
    Ok(())
}

fn cmd_zones(config: &Config, size: u32) -> Result<(), Box<dyn std::error::Error>> {
    let registry = config.registry()?;

    for model_id in registry.model_ids() {
        let marker = if model_id == config.default_model { " (default)" } else { "" };
        println!("{}{}", model_id, marker);

        for zone in registry.zones(model_id)? {
            let rect = zone.pixel_rect(size);
            println!(
                "  {:<12} {:<8} uv=({:.3}, {:.3}, {:.3}, {:.3})  px@{}=({:.1}, {:.1}, {:.1}, {:.1})  {}",
                zone.id,
                zone.name,
                zone.x,
                zone.y,
                zone.width,
                zone.height,
                size,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                zone.color
            );
        }
    }

    Ok(())
}

fn cmd_extract_uv(
    config: Config,
    input: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = load_session(config, input)?;
    let uv = session.uv_image().ok_or("no UV image available")?;

    let source = if uv.is_placeholder() { "placeholder" } else { "model texture" };
    io::save_png(&uv.image, output)?;
    println!("Saved: {} ({}px, {})", output.display(), uv.size(), source);

    Ok(())
}

fn cmd_preview(
    config: Config,
    input: &Path,
    output: &Path,
    logo: Option<&Path>,
    zones: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = config.uv.filter;
    let mut session = load_session(config, input)?;
    if let Some(logo) = logo {
        place_logo(&mut session, logo, zones)?;
    }

    let base = session.uv_image().map(|uv| uv.image.as_ref());
    let preview = session.editor().render_preview(base, filter);
    io::save_png(&preview, output)?;
    println!("Saved: {} ({}px)", output.display(), preview.width());

    Ok(())
}

fn cmd_bake(
    config: Config,
    input: &Path,
    logo: &Path,
    zones: &[String],
    output: &Path,
    uv_out: Option<&Path>,
    state_out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = if config.bake.parallel { "parallel" } else { "sequential" };
    let resolution = config.bake.resolution;
    let mut session = load_session(config, input)?;

    if let (Some(path), Some(uv)) = (uv_out, session.uv_image()) {
        io::save_png(&uv.image, path)?;
        println!("Saved UV image: {}", path.display());
    }

    place_logo(&mut session, logo, zones)?;

    println!("Baking {}px texture ({})...", resolution, mode);
    let progress = create_progress();
    let start = Instant::now();
    let baked = session.bake_with_progress(&progress).clone();
    let elapsed = start.elapsed();

    baked.save(output)?;
    println!("Texture baked! Saved: {} ({:.2?})", output.display(), elapsed);

    if let Some(path) = state_out {
        std::fs::write(path, session.state().to_json()?)?;
        println!("Saved state: {}", path.display());
    }

    Ok(())
}
