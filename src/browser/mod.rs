//! Directory listing for the file browser screen.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Display name (file name or `..`)
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// Size in bytes; zero for directories.
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl DirEntry {
    pub fn is_parent(&self) -> bool {
        self.name == ".."
    }
}

/// List `dir`: a `..` entry (unless `dir` is a root), then directories,
/// then files, each group sorted case-insensitively.
///
/// Names starting with `.` are skipped unless `show_hidden` is set. Entries
/// whose metadata cannot be read are skipped rather than failing the
/// listing.
pub fn list(dir: &Path, show_hidden: bool) -> io::Result<Vec<DirEntry>> {
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !show_hidden && name.starts_with('.') {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            debug!(name, "skipping entry without metadata");
            continue;
        };
        let item = DirEntry {
            name,
            path: entry.path(),
            is_dir: meta.is_dir(),
            size: if meta.is_dir() { 0 } else { meta.len() },
            modified: meta.modified().ok(),
        };
        if item.is_dir {
            dirs.push(item);
        } else {
            files.push(item);
        }
    }

    dirs.sort_by_key(|e| e.name.to_lowercase());
    files.sort_by_key(|e| e.name.to_lowercase());

    let mut entries = Vec::with_capacity(dirs.len() + files.len() + 1);
    if let Some(parent) = dir.parent() {
        entries.push(DirEntry {
            name: "..".to_string(),
            path: parent.to_path_buf(),
            is_dir: true,
            size: 0,
            modified: None,
        });
    }
    entries.extend(dirs);
    entries.extend(files);
    Ok(entries)
}

/// Human-readable byte count for the listing.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "K", "M", "G"];
    let mut size = bytes;
    let mut unit = 0;
    while size >= 1024 && unit + 1 < UNITS.len() {
        size /= 1024;
        unit += 1;
    }
    format!("{size}{}", UNITS[unit])
}
