use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::browser::{self, DirEntry};
use crate::complete::{CompletionCandidate, CompletionEngine, trigger_token};
use crate::config::Preferences;
use crate::document::{self, BlockStore, DOCUMENT_EXTENSION, Document, TemplateSet};
use crate::editor::EditorBuffer;
use crate::export::{ExportFormat, smart_filename};
use crate::render::{Diagnostic, MacroTable, NotationRenderer, RenderSettings};
use crate::ui::style::Theme;

const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Files,
    Templates,
    Document,
    Export,
}

/// State of the block editor on the document screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Moving between blocks and changing their types.
    #[default]
    Browsing,
    /// Capturing text for the current block.
    Editing,
}

/// The open completion popover. Its presence is the completion sub-state
/// of [`Mode::Editing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPopover {
    pub candidates: Vec<CompletionCandidate>,
    pub selected: usize,
    /// Chars of the trigger token an accepted candidate replaces.
    pub(super) trigger_len: usize,
}

impl CompletionPopover {
    pub fn current(&self) -> Option<&CompletionCandidate> {
        self.candidates.get(self.selected)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportDialog {
    /// Index into [`ExportFormat::ALL`].
    pub selected: usize,
    /// Base name typed by the user; blank means derive one.
    pub filename: String,
}

impl ExportDialog {
    pub fn format(&self) -> ExportFormat {
        ExportFormat::ALL[self.selected.min(ExportFormat::ALL.len() - 1)]
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state. The macro table and
/// template registry are shared, immutable, and built once at startup.
pub struct Model {
    pub screen: Screen,
    pub mode: Mode,
    pub store: BlockStore,
    /// Where the open document was loaded from or last saved to
    pub doc_path: Option<PathBuf>,
    /// In-progress text of the current block while editing
    pub editor: EditorBuffer,
    pub completion: Option<CompletionPopover>,
    /// Findings for the current block as of its last commit or selection
    pub diagnostics: Vec<Diagnostic>,
    pub renderer: NotationRenderer,
    completions: CompletionEngine,
    pub templates: Arc<TemplateSet>,
    pub template_selected: usize,
    pub browse_dir: PathBuf,
    pub browse_entries: Vec<DirEntry>,
    pub browse_selected: usize,
    pub prefs: Preferences,
    pub theme: &'static Theme,
    pub export: ExportDialog,
    /// A typesetting run is in flight
    pub export_pending: bool,
    pub help_visible: bool,
    /// Preferences file shown in help
    pub config_path: Option<PathBuf>,
    toast: Option<Toast>,
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("screen", &self.screen)
            .field("mode", &self.mode)
            .field("doc_path", &self.doc_path)
            .field("blocks", &self.store.len())
            .field("current", &self.store.current_index())
            .field("completion", &self.completion.is_some())
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn new(prefs: Preferences, macros: Arc<MacroTable>, templates: Arc<TemplateSet>) -> Self {
        let completions = CompletionEngine::new(&macros);
        let theme = Theme::by_id(&prefs.theme);
        Self {
            screen: Screen::Files,
            mode: Mode::Browsing,
            store: BlockStore::new(Document::new("", Vec::new())),
            doc_path: None,
            editor: EditorBuffer::empty(),
            completion: None,
            diagnostics: Vec::new(),
            renderer: NotationRenderer::new(macros, RenderSettings::default()),
            completions,
            templates,
            template_selected: 0,
            browse_dir: prefs.last_dir.clone(),
            browse_entries: Vec::new(),
            browse_selected: 0,
            prefs,
            theme,
            export: ExportDialog::default(),
            export_pending: false,
            help_visible: false,
            config_path: None,
            toast: None,
            should_quit: false,
        }
    }

    /// List `dir` into the file browser.
    ///
    /// On failure the previous listing is kept.
    pub fn load_directory(&mut self, dir: &Path) -> Result<()> {
        let entries = browser::list(dir, self.prefs.show_hidden)
            .with_context(|| format!("cannot list {}", dir.display()))?;
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        debug!(dir = %dir.display(), entries = entries.len(), "directory listed");
        if dir != self.browse_dir {
            self.browse_selected = 0;
        }
        self.browse_entries = entries;
        self.browse_selected = self
            .browse_selected
            .min(self.browse_entries.len().saturating_sub(1));
        self.prefs.last_dir.clone_from(&dir);
        self.browse_dir = dir;
        Ok(())
    }

    /// Replace the open document and switch to the document screen.
    pub fn open_document(&mut self, document: Document, path: Option<PathBuf>) {
        self.store = BlockStore::new(document);
        self.doc_path = path;
        self.screen = Screen::Document;
        self.mode = Mode::Browsing;
        self.editor = EditorBuffer::empty();
        self.completion = None;
        self.refresh_diagnostics();
    }

    /// Load a persisted document. A failed load leaves the current
    /// document untouched.
    pub fn load_document(&mut self, path: &Path) -> Result<()> {
        let document = document::load(path)?;
        self.open_document(document, Some(path.to_path_buf()));
        Ok(())
    }

    /// Where `s` saves: the document's own path, or a derived name in the
    /// browsed directory.
    pub fn save_path(&self) -> PathBuf {
        self.doc_path.clone().unwrap_or_else(|| {
            let base = smart_filename(self.store.blocks(), None);
            self.browse_dir.join(format!("{base}.{DOCUMENT_EXTENSION}"))
        })
    }

    /// Directory exports are written to.
    pub fn export_dir(&self) -> PathBuf {
        self.doc_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| self.browse_dir.clone(), Path::to_path_buf)
    }

    /// Base name for the next export: the typed name, else a derived one.
    pub fn export_basename(&self) -> String {
        let typed = self.export.filename.trim();
        if typed.is_empty() {
            smart_filename(self.store.blocks(), self.doc_path.as_deref())
        } else {
            typed.to_string()
        }
    }

    pub(super) fn begin_edit(&mut self) {
        self.editor = EditorBuffer::from_text(&self.store.current().content);
        self.completion = None;
        self.mode = Mode::Editing;
    }

    /// Write the buffer into the current block, refresh its preview and
    /// diagnostics, and return to browsing.
    pub(super) fn commit_edit(&mut self) {
        let index = self.store.current_index();
        let text = std::mem::take(&mut self.editor).text();
        let rendered = self.renderer.render(&text);
        // The index is the store's own cursor, so both calls succeed.
        let _ = self.store.set_content(index, text);
        let _ = self.store.set_rendered(index, rendered.text);
        info!(
            index,
            diagnostics = rendered.diagnostics.len(),
            "block committed"
        );
        self.diagnostics = rendered.diagnostics;
        self.completion = None;
        self.mode = Mode::Browsing;
    }

    pub(super) fn refresh_diagnostics(&mut self) {
        let content = &self.store.current().content;
        self.diagnostics = self.renderer.render(content).diagnostics;
    }

    /// Re-run completion on the text before the cursor. Keeps the selected
    /// candidate when it survives the new filter.
    pub(super) fn refresh_completions(&mut self) {
        let before = self.editor.text_before_cursor();
        let candidates = self.completions.complete(&before);
        if candidates.is_empty() {
            self.completion = None;
            return;
        }
        let trigger_len = trigger_token(&before).map_or(0, |t| t.chars().count());
        let previous = self
            .completion
            .as_ref()
            .and_then(CompletionPopover::current)
            .map(|c| c.name);
        let selected = previous
            .and_then(|name| candidates.iter().position(|c| c.name == name))
            .unwrap_or(0);
        self.completion = Some(CompletionPopover {
            candidates,
            selected,
            trigger_len,
        });
    }

    pub(super) fn accept_completion(&mut self) {
        let Some(popover) = self.completion.take() else {
            return;
        };
        if let Some(candidate) = popover.current() {
            self.editor
                .replace_before_cursor(popover.trigger_len, candidate.insert);
        }
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Filename shown in the status bar.
    pub fn display_name(&self) -> String {
        self.doc_path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(
                || "untitled".to_string(),
                |s| s.to_string_lossy().to_string(),
            )
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(
            Preferences::default(),
            Arc::new(MacroTable::builtin()),
            Arc::new(TemplateSet::builtin()),
        )
    }
}
