use clap::{Parser, Subcommand};
use pic_stitch::gallery::DirectoryCatalog;
use pic_stitch::imaging::RustBackend;
use pic_stitch::selection::{
    DirectoryPicker, FsPermission, ImagePicker, MediaPermission, PathPicker,
};
use pic_stitch::stitch::{self, StitchOptions, Stitcher};
use pic_stitch::types::{Axis, Outcome};
use pic_stitch::{config, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Which images to stitch and along which axis.
#[derive(clap::Args, Clone)]
struct SelectionArgs {
    /// Stack images top to bottom
    #[arg(long, conflicts_with = "horizontal")]
    vertical: bool,

    /// Place images left to right
    #[arg(long)]
    horizontal: bool,

    /// Pick every supported image directly inside DIR (ordered by NNN- prefix, then name)
    #[arg(long, value_name = "DIR", conflicts_with = "images")]
    from_dir: Option<PathBuf>,

    /// Images to stitch, in order
    images: Vec<PathBuf>,
}

impl SelectionArgs {
    fn axis(&self, configured: Axis) -> Axis {
        if self.horizontal {
            Axis::Horizontal
        } else if self.vertical {
            Axis::Vertical
        } else {
            configured
        }
    }

    fn permission(&self) -> FsPermission {
        match &self.from_dir {
            Some(dir) => FsPermission::for_dir(dir),
            None => FsPermission::for_paths(&self.images),
        }
    }

    fn picker(&self) -> Box<dyn ImagePicker + Send> {
        match &self.from_dir {
            Some(dir) => Box::new(DirectoryPicker::new(dir)),
            None => Box::new(PathPicker::new(self.images.clone())),
        }
    }
}

#[derive(Parser)]
#[command(name = "pic-stitch")]
#[command(about = "Stitch several images into one strip and save it to a gallery")]
#[command(long_about = "\
Stitch several images into one strip and save it to a gallery

Images are joined unscaled along one axis. Vertical strips are as wide as the
widest image; horizontal strips are as tall as the tallest. Uncovered areas
stay transparent. The result is saved as a lossless PNG named
<prefix><unix-millis>.png in the gallery directory.

  pic-stitch stitch a.jpg b.png c.webp        # stacked top to bottom
  pic-stitch stitch --horizontal a.jpg b.jpg  # side by side
  pic-stitch stitch --from-dir shots/         # every image in shots/
  pic-stitch check --from-dir shots/          # show the layout, write nothing

Run 'pic-stitch gen-config' to generate a documented pic-stitch.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./pic-stitch.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gallery directory (overrides gallery.directory)
    #[arg(long, global = true)]
    gallery: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stitch the selected images and save the result to the gallery
    Stitch {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Print the outcome as JSON after the notices
        #[arg(long)]
        json: bool,
    },
    /// Decode the selection and show the planned layout without saving
    Check {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Print a stock pic-stitch.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let failed = match &cli.command {
        Command::Stitch { selection, json } => run_stitch(&cli, selection, *json)?,
        Command::Check { selection } => check(&cli, selection)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            false
        }
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Load the effective config and size the decode pool.
fn setup(cli: &Cli) -> Result<(config::StitchConfig, RustBackend), config::ConfigError> {
    let config = config::load_config(cli.config.as_deref(), Path::new("."))?;
    init_thread_pool(&config.processing);
    let backend = RustBackend::with_input_limit(config.limits.input_limit());
    Ok((config, backend))
}

/// Run one stitch on a worker thread while this thread prints its events.
/// Returns whether the run failed.
fn run_stitch(
    cli: &Cli,
    selection: &SelectionArgs,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let (config, backend) = setup(cli)?;
    let gallery = cli
        .gallery
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.gallery.directory));
    let options = StitchOptions {
        axis: selection.axis(config.layout.axis),
        save: config.save_options(),
        max_canvas_pixels: config.limits.canvas_limit(),
    };
    let stitcher = Stitcher::new(backend, DirectoryCatalog::new(gallery));
    let permission = selection.permission();
    let mut picker = selection.picker();

    let (tx, rx) = std::sync::mpsc::channel();
    let outcome = std::thread::scope(|s| {
        let worker = s.spawn(|| stitcher.run(&permission, picker.as_mut(), &options, Some(tx)));
        for event in rx {
            output::print_stitch_event(&event);
        }
        worker.join()
    })
    .map_err(|_| "stitch worker panicked")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(outcome.is_failure())
}

/// Dry run: permission, pick, decode, layout. Nothing is written.
/// Returns whether the selection would fail to stitch.
fn check(cli: &Cli, selection: &SelectionArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let (config, backend) = setup(cli)?;
    let permission = selection.permission();
    if !permission.is_granted() && !permission.request() {
        println!("{}", output::notice(&Outcome::PermissionDenied));
        return Ok(true);
    }

    let sources = selection.picker().pick()?;
    if sources.is_empty() {
        println!("{}", output::notice(&Outcome::NoSelection));
        return Ok(false);
    }

    let axis = selection.axis(config.layout.axis);
    match stitch::plan(&backend, &sources, axis, config.limits.canvas_limit()) {
        Ok(plan) => {
            output::print_plan(&plan);
            println!("==> Selection is valid");
            Ok(false)
        }
        Err(e) => {
            println!("{}", output::notice(&e.into_outcome()));
            Ok(true)
        }
    }
}

/// Diagnostics go to stderr so stdout stays clean for notices and `--json`.
///
/// `RUST_LOG` wins unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pic_stitch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
