//! Document export.
//!
//! Four text targets are generated from the block list:
//! - [`ExportFormat::Pdf`]: typesetting markup, optionally compiled by the
//!   external [`Toolchain`] into a camera-ready file
//! - [`ExportFormat::Html`]: standalone page with client-side math
//! - [`ExportFormat::Unicode`]: plain text through the notation renderer
//! - [`ExportFormat::Markdown`]: portable markup
//!
//! Generation never mutates the document; only the Unicode target needs the
//! renderer (and therefore its cache).

mod emphasis;
mod html;
mod latex;
mod markdown;
mod toolchain;
mod unicode;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::document::{BlockKind, ContentBlock, PLACEHOLDER_TITLE};
use crate::render::NotationRenderer;

pub use toolchain::{AUXILIARY_SUFFIXES, DEFAULT_PROGRAM, Toolchain, ToolchainHandle};

/// Base name used when nothing better can be derived.
pub const DEFAULT_BASENAME: &str = "document";

const JOIN_CHAR: char = '-';

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Html,
    #[value(name = "txt")]
    Unicode,
    #[value(name = "md")]
    Markdown,
}

impl ExportFormat {
    pub const ALL: [Self; 4] = [Self::Pdf, Self::Html, Self::Unicode, Self::Markdown];

    /// Extension of the file this format writes directly.
    ///
    /// PDF writes typesetting markup first; the toolchain produces the
    /// `.pdf` next to it.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "tex",
            Self::Html => "html",
            Self::Unicode => "txt",
            Self::Markdown => "md",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF (via LaTeX)",
            Self::Html => "HTML",
            Self::Unicode => "Unicode text",
            Self::Markdown => "Markdown",
        }
    }

    pub const fn needs_toolchain(self) -> bool {
        matches!(self, Self::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} not found on PATH; LaTeX source saved as {}", intermediate.display())]
    ToolchainMissing {
        program: String,
        intermediate: PathBuf,
    },
    #[error("{program} failed ({status}); LaTeX source kept at {}", intermediate.display())]
    ToolchainFailed {
        program: String,
        status: std::process::ExitStatus,
        intermediate: PathBuf,
        output: String,
    },
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// The intermediate markup file, when one was written before failing.
    pub fn intermediate(&self) -> Option<&Path> {
        match self {
            Self::ToolchainMissing { intermediate, .. }
            | Self::ToolchainFailed { intermediate, .. } => Some(intermediate),
            Self::Write { .. } | Self::Launch { .. } => None,
        }
    }
}

/// Generate the text body of `format` for `blocks`.
pub fn generate(
    format: ExportFormat,
    blocks: &[ContentBlock],
    renderer: &mut NotationRenderer,
) -> String {
    match format {
        ExportFormat::Pdf => latex::generate(blocks),
        ExportFormat::Html => html::generate(blocks),
        ExportFormat::Unicode => unicode::generate(blocks, renderer),
        ExportFormat::Markdown => markdown::generate(blocks),
    }
}

/// Generate `format` and write it to `<dir>/<base>.<ext>`.
///
/// For PDF this writes only the markup; hand the returned path to a
/// [`Toolchain`] to compile it.
pub fn write(
    format: ExportFormat,
    blocks: &[ContentBlock],
    renderer: &mut NotationRenderer,
    dir: &Path,
    base: &str,
) -> Result<PathBuf, ExportError> {
    let _scope = crate::perf::scope("export.write");
    let path = dir.join(format!("{base}.{}", format.extension()));
    let body = generate(format, blocks, renderer);
    std::fs::write(&path, body).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    info!(format = ?format, path = %path.display(), "export written");
    Ok(path)
}

/// Write `format` and, for PDF, run the toolchain to completion.
///
/// Returns the final artifact path.
pub fn export(
    format: ExportFormat,
    blocks: &[ContentBlock],
    renderer: &mut NotationRenderer,
    dir: &Path,
    base: &str,
    toolchain: &Toolchain,
) -> Result<PathBuf, ExportError> {
    let written = write(format, blocks, renderer, dir, base)?;
    if format.needs_toolchain() {
        toolchain.compile(&written)
    } else {
        Ok(written)
    }
}

/// Derive an export base name from the document.
///
/// Uses the first heading whose normalized title is non-empty and is not
/// the template placeholder. Falls back to the stem of `saved_path`, then
/// to [`DEFAULT_BASENAME`].
pub fn smart_filename(blocks: &[ContentBlock], saved_path: Option<&Path>) -> String {
    blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Heading)
        .map(ContentBlock::heading_title)
        .filter(|title| !title.is_empty() && !title.eq_ignore_ascii_case(PLACEHOLDER_TITLE))
        .map(normalize_title)
        .find(|name| !name.is_empty())
        .or_else(|| saved_stem(saved_path?))
        .unwrap_or_else(|| DEFAULT_BASENAME.to_string())
}

fn normalize_title(title: &str) -> String {
    let name: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { JOIN_CHAR } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == JOIN_CHAR)
        .collect();
    name.trim_matches(JOIN_CHAR).to_string()
}

fn saved_stem(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| stem.to_string())
}
