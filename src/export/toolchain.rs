//! External typesetting toolchain.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, info, warn};

use super::ExportError;

pub const DEFAULT_PROGRAM: &str = "pdflatex";

/// Byproducts removed from the output directory after a run.
pub const AUXILIARY_SUFFIXES: &[&str] = &[
    ".aux",
    ".log",
    ".out",
    ".toc",
    ".fls",
    ".fdb_latexmk",
    ".synctex.gz",
];

/// Trailing output lines kept in a failure report.
const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    program: String,
}

impl Toolchain {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Compile the markup file at `source` and return the artifact path.
    ///
    /// Runs in the source file's directory. Auxiliary files are cleaned up
    /// whether or not the run succeeds; `source` itself is kept.
    pub fn compile(&self, source: &Path) -> Result<PathBuf, ExportError> {
        let resolved = which::which(&self.program).map_err(|_| {
            warn!(program = %self.program, "typesetting toolchain not found");
            ExportError::ToolchainMissing {
                program: self.program.clone(),
                intermediate: source.to_path_buf(),
            }
        })?;
        let dir = source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = source.file_name().unwrap_or(source.as_os_str());

        info!(program = %resolved.display(), source = %source.display(), "running toolchain");
        let output = Command::new(&resolved)
            .arg("-interaction=nonstopmode")
            .arg(file_name)
            .current_dir(dir)
            .output();
        clean_auxiliary(source);
        let output = output.map_err(|e| ExportError::Launch {
            program: self.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            let text = String::from_utf8_lossy(&output.stdout);
            let lines: Vec<&str> = text.lines().collect();
            let tail = lines[lines.len().saturating_sub(OUTPUT_TAIL_LINES)..].join("\n");
            warn!(status = %output.status, "toolchain failed");
            return Err(ExportError::ToolchainFailed {
                program: self.program.clone(),
                status: output.status,
                intermediate: source.to_path_buf(),
                output: tail,
            });
        }
        Ok(source.with_extension("pdf"))
    }

    /// Run [`compile`](Self::compile) on a worker thread.
    pub fn spawn(&self, source: PathBuf) -> ToolchainHandle {
        let (tx, rx) = mpsc::channel();
        let toolchain = self.clone();
        thread::spawn(move || {
            let result = toolchain.compile(&source);
            // The receiver is gone if the application exited first.
            let _ = tx.send(result);
        });
        ToolchainHandle { rx }
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// A toolchain run in progress.
#[derive(Debug)]
pub struct ToolchainHandle {
    rx: Receiver<Result<PathBuf, ExportError>>,
}

impl ToolchainHandle {
    /// Non-blocking check for completion.
    pub fn poll(&self) -> Option<Result<PathBuf, ExportError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                debug!("toolchain worker exited without a result");
                None
            }
        }
    }

    /// Block until the run finishes.
    pub fn wait(self) -> Option<Result<PathBuf, ExportError>> {
        self.rx.recv().ok()
    }
}

/// Remove `<stem><suffix>` for every auxiliary suffix next to `source`.
fn clean_auxiliary(source: &Path) {
    let Some(stem) = source.file_stem().and_then(|s| s.to_str()) else {
        return;
    };
    for suffix in AUXILIARY_SUFFIXES {
        let path = source.with_file_name(format!("{stem}{suffix}"));
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed auxiliary file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove auxiliary file"),
        }
    }
}
