mod script;

use std::fs;
use std::path::{Path, PathBuf};

use canvas::catalog::{STICKERS, Stamp};
use canvas::consts::DEFAULT_EXPORT_DENSITY;
use canvas::geom::CanvasSize;
use canvas::host::Sketchpad;
use canvas::input::Tool;
use canvas::render::{BackendKind, BackendStatus, EraseMode, RenderOptions, SurfaceSpec};
use canvas::templates::Template;
use clap::{Args, Parser, Subcommand};

use crate::script::SessionScript;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("unknown backend `{name}`; expected one of: {known}")]
    UnknownBackend { name: String, known: String },
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font {path}: {source}")]
    Font {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },
    #[error(transparent)]
    Script(#[from] script::ScriptError),
    #[error("{0} backend failed to start ({1:?})")]
    Backend(&'static str, BackendStatus),
    #[error("export produced no image")]
    Export,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sketchpad", about = "Replay sketchpad sessions and export PNG snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a session script and write the resulting PNG.
    Render(RenderArgs),
    /// Print the tool, sticker, stamp, template and backend catalogs.
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    script: PathBuf,

    #[arg(long, env = "SKETCHPAD_BACKEND", default_value = "raster")]
    backend: String,

    #[arg(long, short, default_value = "sketch.png")]
    out: PathBuf,

    #[arg(long, env = "SKETCHPAD_DENSITY", default_value_t = DEFAULT_EXPORT_DENSITY)]
    density: f64,

    /// TrueType/OpenType font for text and stickers.
    #[arg(long, env = "SKETCHPAD_FONT")]
    font: Option<PathBuf>,

    /// Erase to transparent instead of painting the background color.
    #[arg(long)]
    destructive_eraser: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Render(args) => run_render(args).await,
        Command::List { json } => run_list(json),
    };
    if let Err(e) = &result {
        tracing::error!(error = %e, "sketchpad failed");
    }
    result
}

async fn run_render(args: RenderArgs) -> Result<(), CliError> {
    let kind = BackendKind::from_name(&args.backend).ok_or_else(|| CliError::UnknownBackend {
        name: args.backend.clone(),
        known: BackendKind::names().join(", "),
    })?;
    let script = SessionScript::load(&args.script)?;

    let mut options = RenderOptions::default();
    if args.destructive_eraser {
        options.erase = EraseMode::Destructive;
    }
    if let Some(path) = &args.font {
        options.font = Some(load_font(path)?);
    }
    let spec = SurfaceSpec::new(CanvasSize::new(script.width, script.height)).with_options(options);

    let mut pad = Sketchpad::new(spec, kind.create());
    let status = pad.start().await;
    if status != BackendStatus::Ready {
        return Err(CliError::Backend(kind.name(), status));
    }

    let base_dir = args.script.parent().unwrap_or(Path::new("."));
    let steps = script::replay(&script, &mut pad, base_dir).await?;

    let png = pad.export_png(args.density).await.ok_or(CliError::Export)?;
    fs::write(&args.out, &png).map_err(|source| CliError::Io { path: args.out.clone(), source })?;
    tracing::info!(
        backend = kind.name(),
        steps,
        objects = pad.object_count(),
        bytes = png.len(),
        out = %args.out.display(),
        "snapshot written"
    );
    Ok(())
}

fn load_font(path: &Path) -> Result<ab_glyph::FontArc, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::Io { path: path.to_owned(), source })?;
    ab_glyph::FontArc::try_from_vec(bytes).map_err(|source| CliError::Font { path: path.to_owned(), source })
}

fn run_list(json: bool) -> Result<(), CliError> {
    let tools: Vec<&str> = Tool::ALL.iter().map(|t| t.name()).collect();
    let stamps: Vec<&str> = Stamp::ALL.iter().map(|s| s.name()).collect();
    let templates: Vec<&str> = Template::ALL.iter().map(|t| t.name()).collect();
    let backends = BackendKind::names();

    if json {
        let catalog = serde_json::json!({
            "tools": tools,
            "stickers": STICKERS,
            "stamps": stamps,
            "templates": templates,
            "backends": backends,
        });
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("tools:     {}", tools.join(" "));
    println!(
        "stickers:  {}",
        STICKERS.iter().map(|s| format!("{}={}", s.id, s.emoji)).collect::<Vec<_>>().join(" ")
    );
    println!("stamps:    {}", stamps.join(" "));
    println!("templates: {}", templates.join(" "));
    println!("backends:  {}", backends.join(" "));
    Ok(())
}
