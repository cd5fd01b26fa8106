//! Timing scopes, render cache statistics, and the debug event log.
//!
//! [`scope`] guards report their elapsed time through `tracing` when timing
//! is enabled (`--perf`). The debug event log (`--render-debug-log`) is a
//! plain text file of timestamped events, independent of the tracing filter.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::render::RenderCache;

static TIMING: AtomicBool = AtomicBool::new(false);
static EVENT_LOG: Mutex<Option<EventLog>> = Mutex::new(None);

struct EventLog {
    opened: Instant,
    out: BufWriter<File>,
}

fn event_log() -> MutexGuard<'static, Option<EventLog>> {
    EVENT_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Timing guard returned by [`scope`].
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(target: "quire::perf", scope = self.name, elapsed_ms, "timing");
        log_event(self.name, format!("{elapsed_ms:.3} ms"));
    }
}

pub fn set_enabled(enabled: bool) {
    TIMING.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    TIMING.load(Ordering::Relaxed)
}

/// Start a timing scope; the time is reported when the guard drops.
pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Open (or with `None`, close) the debug event log.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let mut log = event_log();
    *log = match path {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            writeln!(out, "quire debug log start")?;
            out.flush()?;
            Some(EventLog {
                opened: Instant::now(),
                out,
            })
        }
        None => None,
    };
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    event_log().is_some()
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let mut log = event_log();
    let Some(log) = log.as_mut() else {
        return;
    };
    let at_ms = log.opened.elapsed().as_secs_f64() * 1000.0;
    let _ = writeln!(log.out, "[{at_ms:>10.3} ms] {name}: {}", detail.as_ref());
    let _ = log.out.flush();
}

/// Percentage of lookups served from the cache; `None` before the first lookup.
#[allow(clippy::cast_precision_loss)]
pub fn hit_ratio(hits: u64, misses: u64) -> Option<f64> {
    let lookups = hits + misses;
    (lookups > 0).then(|| hits as f64 * 100.0 / lookups as f64)
}

/// One-line summary of a render cache's counters.
pub fn cache_summary(cache: &RenderCache) -> String {
    let ratio = hit_ratio(cache.hits(), cache.misses())
        .map_or_else(|| "n/a".to_string(), |r| format!("{r:.1}%"));
    format!(
        "hits={} misses={} entries={}/{} hit_ratio={ratio}",
        cache.hits(),
        cache.misses(),
        cache.len(),
        cache.capacity()
    )
}

/// Report render cache effectiveness when timing or the event log is on.
pub fn report_render_cache(cache: &RenderCache) {
    if !is_enabled() && !is_debug_log_enabled() {
        return;
    }
    let summary = cache_summary(cache);
    tracing::debug!(target: "quire::perf", %summary, "render cache");
    log_event("render.cache", summary);
}
