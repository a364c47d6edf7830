//! Meshgrad command line: generate, share and export mesh gradients without
//! the editor UI.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use meshgrad_core::palette::is_hex_color;
use meshgrad_core::{CanvasUpdate, FiltersUpdate, MeshStore, Palette};
use meshgrad_io::{export, EditorSettings, ExportFormat, ExportOptions, GradientRecord, LocalStore};
use meshgrad_renderer::raster::to_data_url;

/// Headless mesh gradient generator and exporter
#[derive(Parser, Debug)]
#[command(name = "meshgrad")]
#[command(version)]
struct Cli {
    /// Load the session from this file and save it back afterwards
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Editor settings JSON; its storagePath persists the session when --state is absent
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a gradient and export it
    Render {
        #[command(flatten)]
        generate: GenerateArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Encode or decode share strings
    #[command(subcommand)]
    Share(ShareCommand),
}

#[derive(Subcommand, Debug)]
enum ShareCommand {
    /// Print the share string for a generated gradient
    Encode {
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Render a gradient from a share string
    Decode {
        share: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    #[arg(long)]
    seed: Option<String>,
    /// Number of shapes, clamped to 3..=10
    #[arg(long)]
    count: Option<usize>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Comma-separated hex colors; the first one is the background
    #[arg(long)]
    palette: Option<String>,
    #[arg(long)]
    blur: Option<f64>,
    /// Grain opacity 0..1; any value enables the overlay
    #[arg(long)]
    grain: Option<f64>,
}

#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// svg, png, webp or css (defaults to the settings file)
    #[arg(long)]
    format: Option<String>,
    #[arg(long)]
    scale: Option<f64>,
    /// Output file; stdout when omitted (rasters as data URLs)
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Also write the gallery record JSON here
    #[arg(long)]
    record: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let settings = match &cli.settings {
        Some(path) => EditorSettings::load(path).map_err(|e| e.to_string())?,
        None => EditorSettings::default(),
    };
    let config = settings.store_config();
    let local = session_path(cli.state.as_deref(), cli.settings.is_some(), &settings).map(LocalStore::new);
    let mut store = match &local {
        Some(local) => MeshStore::with_state(local.load_or_default(&config), config),
        None => MeshStore::new(config),
    };

    match cli.command {
        Command::Render { generate, output } => {
            apply(&mut store, &generate)?;
            emit(&store, &output, &settings)?;
        }
        Command::Share(ShareCommand::Encode { generate }) => {
            apply(&mut store, &generate)?;
            println!("{}", store.to_share_string().map_err(|e| e.to_string())?);
        }
        Command::Share(ShareCommand::Decode { share, output }) => {
            store.from_share_string(&share).map_err(|e| e.to_string())?;
            emit(&store, &output, &settings)?;
        }
    }

    if let Some(local) = &local {
        local.save(store.state()).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// `--state` wins; a settings file alone persists to its `storagePath`.
/// Without either the session is not persisted.
fn session_path<'a>(
    state: Option<&'a Path>,
    has_settings: bool,
    settings: &'a EditorSettings,
) -> Option<&'a Path> {
    state.or_else(|| has_settings.then_some(settings.storage_path.as_path()))
}

/// Apply generation flags as store actions. Palette and canvas go first so
/// regenerated shapes see them.
fn apply(store: &mut MeshStore, args: &GenerateArgs) -> Result<(), String> {
    if let Some(list) = &args.palette {
        store.set_palette(parse_palette(list)?);
    }
    if args.width.is_some() || args.height.is_some() {
        store.set_canvas(CanvasUpdate {
            width: args.width,
            height: args.height,
        });
    }
    if args.blur.is_some() || args.grain.is_some() {
        store.set_filters(FiltersUpdate {
            blur: args.blur,
            grain_enabled: args.grain.map(|_| true),
            grain: args.grain,
        });
    }
    if args.seed.is_some() || args.count.is_some() {
        store.randomize(args.seed.as_deref(), args.count);
    }
    Ok(())
}

fn parse_palette(list: &str) -> Result<Palette, String> {
    let values: Vec<&str> = list.split(',').map(str::trim).filter(|v| !v.is_empty()).collect();
    if values.is_empty() {
        return Err("palette needs at least one color".to_string());
    }
    if let Some(bad) = values.iter().find(|v| !is_hex_color(v)) {
        return Err(format!("not a hex color: {bad}"));
    }
    Ok(Palette::from_hex(&values))
}

fn emit(store: &MeshStore, output: &OutputArgs, settings: &EditorSettings) -> Result<(), String> {
    let format = match &output.format {
        Some(name) => ExportFormat::parse(name).ok_or_else(|| format!("unknown format: {name}"))?,
        None => settings.export_format,
    };
    let options = ExportOptions {
        scale: output.scale.unwrap_or(settings.export_scale),
        grain_tile_size: settings.grain_tile_size,
    };
    let artifact = export(store.state(), format, &options).map_err(|e| e.to_string())?;

    match &output.out {
        Some(path) => {
            let (dir, stem) = split_out_path(path);
            artifact.write_to(dir, &stem).map_err(|e| e.to_string())?;
        }
        None => {
            let text = match format.raster_format() {
                Some(raster) => to_data_url(&artifact.bytes, raster),
                None => String::from_utf8_lossy(&artifact.bytes).into_owned(),
            };
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{text}").map_err(|e| e.to_string())?;
        }
    }

    if let Some(path) = &output.record {
        let mut record = GradientRecord::from_store(store).map_err(|e| e.to_string())?;
        record.record_export(format);
        let json = record.to_json().map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// `out/gradient.png` → (`out`, `gradient`). The export supplies the extension.
fn split_out_path(path: &Path) -> (&Path, String) {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gradient".to_string());
    (dir, stem)
}
