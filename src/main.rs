use astro_mosaic::config::{self, LayoutMode, Parameters};
use astro_mosaic::layout::plan_layout;
use astro_mosaic::settings::SettingsStore;
use astro_mosaic::{Catalog, output, render};
use clap::{Parser, Subcommand};
use flexi_logger::Logger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "astro-mosaic")]
#[command(about = "Arrange an astronomical catalog's photographs into one mosaic")]
#[command(long_about = "\
Arrange an astronomical catalog's photographs into one mosaic

Every catalog item gets a grid cell, in catalog order. A few showpiece
objects get larger regions. Items without a photograph are drawn as
labelled placeholders, and a progress readout shows how far along the
catalog you are.

Images are matched by file name:

  photos/
  ├── M1.jpg           # Messier 1
  ├── M_31_wide.png    # Messier 31 (prefix, optional -, _ or space, number)
  ├── M 42.tif         # Messier 42
  ├── C-20.jpg         # Caldwell 20 (only read with --catalog caldwell)
  └── notes.txt        # ignored

Settings come from mosaic.toml (if present), layered on the catalog's
defaults; command-line flags override both. With --settings, the settings
saved by the last render of that catalog sit between the defaults and
mosaic.toml, and the last rendered catalog is used unless one is named.

Run 'astro-mosaic gen-config' to generate a documented mosaic.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE_NAME, global = true)]
    config: PathBuf,

    /// Catalog to lay out: messier or caldwell
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// JSON preferences file: read before mosaic.toml, updated after a render
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Flags that override the config file.
#[derive(clap::Args, Clone, Default)]
struct RenderArgs {
    /// Folder of catalog photographs
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Output image (.png, .jpg, .tif, .webp)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Title drawn above the grid
    #[arg(long)]
    title: Option<String>,

    /// Number of grid columns
    #[arg(long)]
    cols: Option<u32>,

    /// Multiplier for every pixel size (1.0 = 100px cells)
    #[arg(long)]
    scale: Option<f64>,

    /// TrueType/OpenType font file
    #[arg(long)]
    font: Option<PathBuf>,

    /// basic (every item one cell) or enhanced (special regions)
    #[arg(long, value_parser = parse_layout_mode)]
    layout_mode: Option<LayoutMode>,

    /// Don't draw the progress readout
    #[arg(long)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build the mosaic and save it
    Render {
        #[command(flatten)]
        args: RenderArgs,
    },
    /// Show where every item goes, without reading any images
    Plan {
        #[command(flatten)]
        args: RenderArgs,
    },
    /// Print the special-region layout in use
    Layout,
    /// Print a stock mosaic.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _logger = Logger::try_with_env_or_str("info")?
        .log_to_stderr()
        .start()?;

    let store = cli.settings.map(SettingsStore::new);
    let store = store.as_ref();

    match cli.command {
        Command::Render { args } => {
            let params = resolve(&cli.config, cli.catalog.as_deref(), store, &args)?;
            let mosaic = render::build_mosaic(&params)?;
            output::print_render_summary(&mosaic, params.catalog, &params.output_file);

            if let Some(store) = store {
                store.save_parameters(&params)?;
                store.save_catalog(params.catalog)?;
                log::info!("settings saved to {}", store.path().display());
            }
        }
        Command::Plan { args } => {
            let params = resolve(&cli.config, cli.catalog.as_deref(), store, &args)?;
            let plan = plan_layout(
                params.grid_cols,
                params.effective_layout(),
                params.catalog.count(),
            )?;
            output::print_layout_plan(&plan, params.catalog);
            let (w, h) = render::mosaic_dimensions(&params)?;
            println!("Output: {w}×{h}px, {}px cells", params.thumb_size());
        }
        Command::Layout => {
            let params = resolve(
                &cli.config,
                cli.catalog.as_deref(),
                store,
                &RenderArgs::default(),
            )?;
            output::print_layout(params.catalog, params.effective_layout());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Config file layered on catalog defaults (and stored settings, if any),
/// then command-line overrides.
fn resolve(
    config_path: &std::path::Path,
    catalog_flag: Option<&str>,
    store: Option<&SettingsStore>,
    args: &RenderArgs,
) -> Result<Parameters, config::ConfigError> {
    let mut overlay = config::load_raw_config(config_path)?;
    if overlay.is_some() {
        log::info!("using config {}", config_path.display());
    }
    if let Some(id) = catalog_flag {
        let table = overlay
            .get_or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        if let toml::Value::Table(t) = table {
            t.insert("catalog".into(), toml::Value::String(id.to_string()));
        }
    }
    let mut params = match store {
        Some(store) => store.resolve(overlay)?,
        None => config::resolve_parameters(Catalog::default(), overlay)?,
    };

    if let Some(input) = &args.input {
        params.input_folder = input.clone();
    }
    if let Some(output) = &args.output {
        params.output_file = output.clone();
    }
    if let Some(title) = &args.title {
        params.title = title.clone();
    }
    if let Some(cols) = args.cols {
        params.grid_cols = cols;
    }
    if let Some(scale) = args.scale {
        params.scale = scale;
    }
    if let Some(font) = &args.font {
        params.font_path = font.clone();
    }
    if let Some(mode) = args.layout_mode {
        params.layout_mode = mode;
    }
    if args.no_progress {
        params.show_progress = false;
    }

    params.validate()?;
    Ok(params)
}

fn parse_layout_mode(text: &str) -> Result<LayoutMode, String> {
    LayoutMode::parse(text).ok_or_else(|| format!("unknown layout mode '{text}' (basic, enhanced)"))
}
