//! Quire - a terminal editor for block-structured technical documents.
//!
//! # Usage
//!
//! ```bash
//! quire                          # browse the last directory
//! quire notes.quire              # open a document
//! quire --template "Academic Notes"
//! quire notes.quire --export pdf --output lecture-3
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quire::app::App;
use quire::config::{
    ConfigFlags, Preferences, ViewMode, clear_config_flags, global_config_path, load_layered,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use quire::document::{self, is_document_file};
use quire::export::{self, ExportFormat, Toolchain};
use quire::perf;
use quire::render::{MacroTable, NotationRenderer, RenderSettings};

/// A terminal editor for block-structured technical documents
#[derive(Parser, Debug)]
#[command(name = "quire", version, about, long_about = None)]
struct Cli {
    /// Document to open, or directory to browse
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Start a new document from a built-in template
    #[arg(long, value_name = "NAME", conflicts_with = "path")]
    template: Option<String>,

    /// Export PATH without starting the editor
    #[arg(long, value_enum, value_name = "FORMAT", requires = "path")]
    export: Option<ExportFormat>,

    /// Base name for --export (defaults to one derived from the first heading)
    #[arg(long, value_name = "NAME", requires = "export")]
    output: Option<String>,

    /// Color theme (default, gruvbox, nord, dracula)
    #[arg(long)]
    theme: Option<String>,

    /// Initial view mode
    #[arg(long, value_enum)]
    view: Option<ViewMode>,

    /// Editor share of the split view (0.2 to 0.8)
    #[arg(long, value_name = "RATIO")]
    split_ratio: Option<f32>,

    /// Show dotfiles in the file browser
    #[arg(long)]
    show_hidden: bool,

    /// Enable timing instrumentation
    #[arg(long)]
    perf: bool,

    /// Write detailed render/export debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

/// Export `path` to `format` and print the artifact path.
fn run_headless_export(path: &Path, format: ExportFormat, output: Option<&str>) -> Result<()> {
    let document = document::load(path)?;
    let mut renderer =
        NotationRenderer::new(Arc::new(MacroTable::builtin()), RenderSettings::default());
    let base = output.map_or_else(
        || export::smart_filename(&document.blocks, Some(path)),
        str::to_string,
    );
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let artifact = export::export(
        format,
        &document.blocks,
        &mut renderer,
        dir,
        &base,
        &Toolchain::default(),
    )
    .with_context(|| format!("Failed to export {}", path.display()))?;
    println!("{}", artifact.display());
    Ok(())
}

fn run(cli: Cli, raw_args: &[String]) -> Result<()> {
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        load_layered(&global_path, &local_path)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("QUIRE_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    if let (Some(format), Some(path)) = (cli.export, cli.path.as_deref()) {
        return run_headless_export(path, format, cli.output.as_deref());
    }

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut prefs = Preferences::resolve(&effective, &cwd);

    let mut app = match cli.path {
        Some(path) if path.is_dir() => {
            prefs.last_dir = path;
            App::new(prefs)
        }
        Some(path) if path.is_file() => {
            if !is_document_file(&path) {
                anyhow::bail!("Not a quire document: {}", path.display());
            }
            if let Some(parent) = path.parent().filter(|p| p.is_dir()) {
                prefs.last_dir = parent.to_path_buf();
            }
            App::new(prefs).with_document(path)
        }
        Some(path) => anyhow::bail!("File not found: {}", path.display()),
        None => match cli.template {
            Some(name) => App::new(prefs).with_template(name),
            None => App::new(prefs),
        },
    }
    .with_config(global_path, file_flags);

    info!("starting editor");
    app.run().context("Application error")
}

fn main() -> ExitCode {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.log_file.as_deref()) {
        eprintln!("quire: {err:#}");
        return ExitCode::FAILURE;
    }

    // The terminal is restored by ratatui's panic hook before unwinding
    // reaches this guard.
    match std::panic::catch_unwind(|| run(cli, &raw_args)) {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            eprintln!("quire: {err:#}");
            ExitCode::FAILURE
        }
        Err(_) => {
            eprintln!("quire: internal error; unsaved changes were not written");
            ExitCode::from(101)
        }
    }
}
