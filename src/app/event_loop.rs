use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use crate::app::{App, Message, Model, Start, ToastLevel, update};
use crate::document::TemplateSet;
use crate::export::ToolchainHandle;
use crate::render::MacroTable;

const IDLE_POLL: Duration = Duration::from_millis(250);
const BUSY_POLL: Duration = Duration::from_millis(50);

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let mut model = self.initial_model();

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - quire requires an interactive terminal")?;
        drop(init_scope);

        let result = self.event_loop(&mut terminal, &mut model);

        ratatui::restore();
        crate::perf::report_render_cache(model.renderer.cache());
        self.save_preferences(&model);
        info!("editor closed");
        result
    }

    /// Build the startup model: registries, directory listing, and the
    /// requested document or template.
    pub(super) fn initial_model(&self) -> Model {
        let macros = Arc::new(MacroTable::builtin());
        let templates = Arc::new(TemplateSet::builtin());
        let mut model = Model::new(self.prefs.clone(), macros, templates);
        model.config_path.clone_from(&self.config_path);

        let dir = model.browse_dir.clone();
        if let Err(err) = model.load_directory(&dir) {
            model.show_toast(ToastLevel::Warning, format!("Browse failed: {err:#}"));
        }

        match &self.start {
            Start::Browser => {}
            Start::Document(path) => {
                if let Err(err) = model.load_document(path) {
                    warn!(path = %path.display(), "startup document failed: {err:#}");
                    model.show_toast(ToastLevel::Error, format!("Open failed: {err:#}"));
                }
            }
            Start::Template(name) => match model.templates.find(name).copied() {
                Some(template) => model.open_document(template.instantiate(), None),
                None => {
                    model.show_toast(ToastLevel::Warning, format!("Unknown template: {name}"));
                }
            },
        }
        model
    }

    fn event_loop(&self, terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut pending: Option<ToolchainHandle> = None;
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if let Some(result) = pending.as_ref().and_then(ToolchainHandle::poll) {
                pending = None;
                let msg = Message::ExportFinished(result.map_err(|err| err.to_string()));
                crate::perf::log_event("export.finished", format!("frame={frame_idx} msg={msg:?}"));
                *model = update(std::mem::take(model), msg);
                needs_render = true;
            }

            let poll = if needs_render {
                Duration::ZERO
            } else if pending.is_some() {
                BUSY_POLL
            } else {
                IDLE_POLL
            };
            if event::poll(poll)? {
                // Coalesce key repeat bursts into a single render.
                loop {
                    if let Some(msg) = Self::handle_event(&event::read()?, model) {
                        crate::perf::log_event(
                            "event.message",
                            format!("frame={frame_idx} msg={msg:?}"),
                        );
                        let side_msg = msg.clone();
                        *model = update(std::mem::take(model), msg);
                        self.handle_message_side_effects(model, &mut pending, &side_msg);
                        needs_render = true;
                    }
                    if model.should_quit || !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| Self::view(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        if pending.is_some() {
            info!("exiting with a typesetting run in flight");
        }
        Ok(())
    }
}
