//! Notation renderer: raw block markup to a Unicode preview.
//!
//! Rendering runs three substitution passes in a fixed order:
//! 1. [`macros`]: macro names to glyphs, longest name first
//! 2. [`scripts`]: `_c` / `^c` pairs to sub/superscript glyphs
//! 3. [`inline`]: formatting commands to emphasis markers
//!
//! [`diagnostics`] are computed from the raw input, independently of the
//! passes, and never stop rendering.
//!
//! Results are memoized in a bounded LRU keyed by content plus a coarse
//! wall-clock bucket: an entry is served for the rest of its bucket window
//! and recomputed afterwards even if the content is unchanged.

mod cache;
mod diagnostics;
mod inline;
mod macros;
mod scripts;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::trace;

pub use cache::{CacheKey, RenderCache};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity, check};
pub use macros::{MACRO_ESCAPE, MacroTable};

/// Output of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub capacity: NonZeroUsize,
    /// Length of one cache validity window.
    pub bucket: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(50).unwrap_or(NonZeroUsize::MIN),
            bucket: Duration::from_secs(60),
        }
    }
}

pub struct NotationRenderer {
    macros: Arc<MacroTable>,
    cache: RenderCache,
    bucket_secs: u64,
}

impl NotationRenderer {
    pub fn new(macros: Arc<MacroTable>, settings: RenderSettings) -> Self {
        Self {
            macros,
            cache: RenderCache::new(settings.capacity),
            bucket_secs: settings.bucket.as_secs().max(1),
        }
    }

    /// Render through the cache using the current wall clock.
    pub fn render(&mut self, content: &str) -> Rendered {
        self.render_at(content, SystemTime::now())
    }

    /// Render through the cache as if the clock read `now`.
    pub fn render_at(&mut self, content: &str, now: SystemTime) -> Rendered {
        let key = CacheKey {
            content: content.to_string(),
            bucket: self.bucket_of(now),
        };
        if let Some(hit) = self.cache.get(&key) {
            trace!(bucket = key.bucket, "render cache hit");
            return hit.clone();
        }
        let _scope = crate::perf::scope("render.miss");
        let rendered = self.render_uncached(content);
        if let Some(evicted) = self.cache.put(key, rendered.clone()) {
            trace!(bucket = evicted.bucket, "render cache evicted entry");
        }
        rendered
    }

    /// Run the passes without consulting or filling the cache.
    pub fn render_uncached(&self, content: &str) -> Rendered {
        let text = self.macros.substitute(content);
        let text = scripts::translate(&text);
        let text = inline::apply(&text);
        Rendered {
            text,
            diagnostics: check(content),
        }
    }

    pub const fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    fn bucket_of(&self, now: SystemTime) -> u64 {
        now.duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() / self.bucket_secs)
    }
}

impl std::fmt::Debug for NotationRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotationRenderer")
            .field("macros", &self.macros.len())
            .field("cache", &self.cache)
            .field("bucket_secs", &self.bucket_secs)
            .finish()
    }
}

impl Default for NotationRenderer {
    fn default() -> Self {
        Self::new(Arc::new(MacroTable::builtin()), RenderSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(capacity: usize) -> NotationRenderer {
        NotationRenderer::new(
            Arc::new(MacroTable::builtin()),
            RenderSettings {
                capacity: NonZeroUsize::new(capacity).unwrap(),
                bucket: Duration::from_secs(60),
            },
        )
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_full_pipeline() {
        let r = renderer(4).render_uncached("\\textbf{\\alpha^2} \\in S_1");
        assert_eq!(r.text, "**α²** ∈ S₁");
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn test_formatting_runs_after_substitution() {
        let r = renderer(4).render_uncached("\\emph{\\pi r^2}");
        assert_eq!(r.text, "*π r²*");
    }

    #[test]
    fn test_diagnostics_use_raw_content() {
        let r = renderer(4).render_uncached("\\textbf{bold");
        assert_eq!(r.text, "**bold");
        assert_eq!(r.diagnostics.len(), 1);
        assert_eq!(r.diagnostics[0].kind, DiagnosticKind::UnmatchedOpeningBrace);
        assert_eq!(r.diagnostics[0].column, 12);
        assert!(r.has_errors());
    }

    #[test]
    fn test_same_bucket_is_cache_hit_with_identical_output() {
        let mut r = renderer(4);
        let first = r.render_at("$x^2$ {", at(120));
        let second = r.render_at("$x^2$ {", at(179));
        assert_eq!(first, second);
        assert_eq!(r.cache().hits(), 1);
        assert_eq!(r.cache().len(), 1);
    }

    #[test]
    fn test_new_bucket_recomputes() {
        let mut r = renderer(4);
        let first = r.render_at("\\beta", at(120));
        let second = r.render_at("\\beta", at(180));
        assert_eq!(first, second);
        assert_eq!(r.cache().hits(), 0);
        assert_eq!(r.cache().len(), 2);
    }

    #[test]
    fn test_cached_equals_fresh_render() {
        let mut r = renderer(4);
        let cached = r.render_at("\\sum_0 x^n", at(5));
        let cached_again = r.render_at("\\sum_0 x^n", at(5));
        assert_eq!(cached_again, r.render_uncached("\\sum_0 x^n"));
        assert_eq!(cached, cached_again);
    }

    #[test]
    fn test_cache_is_bounded() {
        let mut r = renderer(3);
        for n in 0..10 {
            r.render_at(&format!("block {n}"), at(0));
        }
        assert_eq!(r.cache().len(), 3);
    }
}
