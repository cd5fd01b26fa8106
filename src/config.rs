use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Name of the directory and rc file used for stored preferences.
const APP_DIR: &str = "quire";
const LOCAL_RC: &str = ".quirerc";

pub const DEFAULT_THEME: &str = "default";
pub const DEFAULT_SPLIT_RATIO: f32 = 0.5;
pub const MIN_SPLIT_RATIO: f32 = 0.2;
pub const MAX_SPLIT_RATIO: f32 = 0.8;
pub const SPLIT_STEP: f32 = 0.1;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Editor and preview side by side
    #[default]
    Split,
    /// Editor only
    Editor,
    /// Preview only
    Preview,
}

impl ViewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Editor => "editor",
            Self::Preview => "preview",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "split" => Some(Self::Split),
            "editor" => Some(Self::Editor),
            "preview" => Some(Self::Preview),
            _ => None,
        }
    }
}

/// Flags as they appear on the command line or in an rc file.
///
/// Unset options are `None` so that layers can be merged with
/// [`union`](Self::union).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub theme: Option<String>,
    pub last_dir: Option<PathBuf>,
    pub split_ratio: Option<f32>,
    pub view: Option<ViewMode>,
    pub show_hidden: bool,
    pub perf: bool,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: `other`'s options win, booleans combine.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            theme: other.theme.clone().or_else(|| self.theme.clone()),
            last_dir: other.last_dir.clone().or_else(|| self.last_dir.clone()),
            split_ratio: other.split_ratio.or(self.split_ratio),
            view: other.view.or(self.view),
            show_hidden: self.show_hidden || other.show_hidden,
            perf: self.perf || other.perf,
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

/// Resolved preferences the application runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub theme: String,
    pub last_dir: PathBuf,
    pub split_ratio: f32,
    pub view: ViewMode,
    pub show_hidden: bool,
}

impl Preferences {
    /// Fill unset flags with defaults; `cwd` stands in for a missing or
    /// vanished last directory.
    pub fn resolve(flags: &ConfigFlags, cwd: &Path) -> Self {
        let last_dir = flags
            .last_dir
            .clone()
            .filter(|dir| dir.is_dir())
            .unwrap_or_else(|| cwd.to_path_buf());
        Self {
            theme: flags
                .theme
                .clone()
                .unwrap_or_else(|| DEFAULT_THEME.to_string()),
            last_dir,
            split_ratio: clamp_split_ratio(flags.split_ratio.unwrap_or(DEFAULT_SPLIT_RATIO)),
            view: flags.view.unwrap_or_default(),
            show_hidden: flags.show_hidden,
        }
    }

    /// The flags to persist: these preferences layered over `base`, which
    /// carries the settings not tracked at runtime.
    pub fn to_flags(&self, base: &ConfigFlags) -> ConfigFlags {
        ConfigFlags {
            theme: Some(self.theme.clone()),
            last_dir: Some(self.last_dir.clone()),
            split_ratio: Some(self.split_ratio),
            view: Some(self.view),
            show_hidden: self.show_hidden,
            ..base.clone()
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::resolve(&ConfigFlags::default(), Path::new("."))
    }
}

/// Clamp to the allowed range and snap to the step grid.
pub fn clamp_split_ratio(ratio: f32) -> f32 {
    let snapped = (ratio / SPLIT_STEP).round() * SPLIT_STEP;
    snapped.clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO)
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(LOCAL_RC)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_RC)
}

/// Read an rc file. A missing file yields empty flags.
///
/// Each non-comment line holds one flag, optionally followed by its value;
/// the value runs to the end of the line so paths may contain spaces.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| match line.split_once(char::is_whitespace) {
            Some((flag, value)) => vec![flag.to_string(), value.trim().to_string()],
            None => vec![line.to_string()],
        })
        .collect::<Vec<_>>();
    debug!(path = %path.display(), "loaded config");
    Ok(parse_flag_tokens(&tokens))
}

/// Load the global file and the local override, falling back to defaults
/// with a warning when either cannot be read.
pub fn load_layered(global: &Path, local: &Path) -> ConfigFlags {
    let read = |path: &Path| {
        load_config_flags(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            ConfigFlags::default()
        })
    };
    read(global).union(&read(local))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# quire preferences".to_string());
    if let Some(theme) = &flags.theme {
        lines.push(format!("--theme {theme}"));
    }
    if let Some(view) = flags.view {
        lines.push(format!("--view {}", view.as_str()));
    }
    if let Some(ratio) = flags.split_ratio {
        lines.push(format!("--split-ratio {ratio:.1}"));
    }
    if let Some(dir) = &flags.last_dir {
        lines.push(format!("--last-dir {}", dir.display()));
    }
    if flags.show_hidden {
        lines.push("--show-hidden".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from argv-style tokens; anything else is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--show-hidden" => flags.show_hidden = true,
            "--perf" => flags.perf = true,
            "--theme" => flags.theme = value(),
            "--view" => flags.view = value().as_deref().and_then(ViewMode::parse),
            "--split-ratio" => {
                flags.split_ratio = value().and_then(|v| v.parse().ok()).map(clamp_split_ratio);
            }
            "--last-dir" => flags.last_dir = value().map(PathBuf::from),
            "--render-debug-log" => flags.render_debug_log = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&args(&[
            "quire",
            "--show-hidden",
            "--theme",
            "nord",
            "--view=preview",
            "--split-ratio",
            "0.7",
            "--render-debug-log=render.log",
            "notes.quire",
        ]));
        assert!(flags.show_hidden);
        assert_eq!(flags.theme.as_deref(), Some("nord"));
        assert_eq!(flags.view, Some(ViewMode::Preview));
        assert!((flags.split_ratio.unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
    }

    #[test]
    fn test_split_ratio_is_clamped_and_snapped() {
        assert!((clamp_split_ratio(0.05) - MIN_SPLIT_RATIO).abs() < 1e-6);
        assert!((clamp_split_ratio(0.95) - MAX_SPLIT_RATIO).abs() < 1e-6);
        assert!((clamp_split_ratio(0.44) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            show_hidden: true,
            theme: Some("gruvbox".into()),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            perf: true,
            theme: Some("nord".into()),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.show_hidden);
        assert!(merged.perf);
        assert_eq!(merged.theme.as_deref(), Some("nord"));
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::resolve(
            &ConfigFlags {
                last_dir: Some(dir.path().join("missing")),
                ..ConfigFlags::default()
            },
            dir.path(),
        );
        assert_eq!(prefs.theme, DEFAULT_THEME);
        assert_eq!(prefs.last_dir, dir.path());
        assert_eq!(prefs.view, ViewMode::Split);
        assert!((prefs.split_ratio - DEFAULT_SPLIT_RATIO).abs() < 1e-6);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("config");
        let last = dir.path().join("my notes");
        let prefs = Preferences {
            theme: "dracula".into(),
            last_dir: last.clone(),
            split_ratio: 0.3,
            view: ViewMode::Editor,
            show_hidden: true,
        };
        let base = ConfigFlags {
            perf: true,
            ..ConfigFlags::default()
        };

        save_config_flags(&path, &prefs.to_flags(&base)).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded.theme.as_deref(), Some("dracula"));
        assert_eq!(loaded.last_dir, Some(last));
        assert_eq!(loaded.view, Some(ViewMode::Editor));
        assert!((loaded.split_ratio.unwrap() - 0.3).abs() < 1e-6);
        assert!(loaded.show_hidden);
        assert!(loaded.perf);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_load_layered_tolerates_unreadable_file() {
        let dir = tempdir().unwrap();
        let local = dir.path().join(".quirerc");
        std::fs::write(&local, "--view editor\n").unwrap();
        // A directory cannot be read as a file.
        let flags = load_layered(dir.path(), &local);
        assert_eq!(flags.view, Some(ViewMode::Editor));
    }
}
