//! A host page with its clocks: the surface hosting applications talk to.

use crate::catalog::Catalog;
use crate::dom::{Document, NodeId};
use crate::error::{ClockResult, Warning};
use crate::registry::{DestroyOptions, IntersectionEntry, LazyObserver, Rect, RefreshReport, Registry};
use crate::scheduler::Visibility;
use crate::settings::{LazyOptions, Settings};
use std::collections::VecDeque;

/// How many refresh times [`PageStats`] remembers.
pub const RECENT_REFRESHES: usize = 32;

/// Counters kept across refresh passes. Their size does not grow with the
/// number of ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStats {
    pub refreshes: usize,
    pub updates: usize,
    pub failures: usize,
    pub last_refresh_ms: Option<i64>,
    /// Times of the most recent refreshes, Unix milliseconds, oldest first.
    pub refresh_times: VecDeque<i64>,
}

impl PageStats {
    fn record(&mut self, now_ms: i64, report: RefreshReport) {
        self.refreshes += 1;
        self.updates += report.updated;
        self.failures += report.failed;
        self.last_refresh_ms = Some(now_ms);
        if self.refresh_times.len() == RECENT_REFRESHES {
            self.refresh_times.pop_front();
        }
        self.refresh_times.push_back(now_ms);
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub document: Document,
    pub registry: Registry,
    visibility: Visibility,
    stats: PageStats,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self::with_registry(document, Registry::default())
    }

    pub fn with_registry(document: Document, registry: Registry) -> Self {
        Page {
            document,
            registry,
            visibility: Visibility::Visible,
            stats: PageStats::default(),
        }
    }

    /// Parse XHTML markup into a page using the built-in catalog.
    pub fn parse(markup: &str, settings: Settings) -> ClockResult<Page> {
        settings.validate()?;
        let document = Document::parse(markup)?;
        let registry = Registry::new(Catalog::builtin().clone(), settings);
        Ok(Self::with_registry(document, registry))
    }

    pub fn root(&self) -> NodeId {
        self.document.root()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn stats(&self) -> &PageStats {
        &self.stats
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        self.registry.take_warnings()
    }

    pub fn initialize(&mut self, root: NodeId, now_ms: i64) -> ClockResult<Vec<NodeId>> {
        self.registry.initialize(&mut self.document, root, now_ms)
    }

    pub fn initialize_all(&mut self, now_ms: i64) -> ClockResult<Vec<NodeId>> {
        let root = self.root();
        self.initialize(root, now_ms)
    }

    pub fn destroy(&mut self, root: NodeId, options: DestroyOptions) -> ClockResult<usize> {
        self.registry.destroy(&mut self.document, root, options)
    }

    /// Begin observing hosts under `root` for deferred initialization.
    pub fn initialize_lazy(&self, root: NodeId, options: &LazyOptions) -> ClockResult<LazyObserver> {
        LazyObserver::observe(&self.registry, &self.document, root, options)
    }

    /// Feed host positions to a lazy observer.
    pub fn report_intersections(
        &mut self,
        observer: &mut LazyObserver,
        viewport: Rect,
        entries: &[IntersectionEntry],
        now_ms: i64,
    ) -> Vec<NodeId> {
        observer.process(&mut self.registry, &mut self.document, viewport, entries, now_ms)
    }

    /// Start the shared tick if the page is visible, refreshing right away.
    pub fn start(&mut self, now_ms: i64) {
        if self.visibility == Visibility::Hidden {
            return;
        }
        let report = self.registry.start(&mut self.document, now_ms);
        self.stats.record(now_ms, report);
    }

    pub fn stop(&mut self) {
        self.registry.stop();
    }

    pub fn is_running(&self) -> bool {
        self.registry.scheduler().is_running()
    }

    /// Milliseconds until the next scheduled refresh; `None` while stopped.
    pub fn delay_until_next(&self, now_ms: i64) -> Option<u64> {
        self.registry.scheduler().delay_until_next(now_ms)
    }

    /// Run the refresh that is due at `now_ms`, if any.
    pub fn tick(&mut self, now_ms: i64) -> Option<RefreshReport> {
        let report = self.registry.tick(&mut self.document, now_ms)?;
        self.stats.record(now_ms, report);
        Some(report)
    }

    pub fn set_visibility(&mut self, visibility: Visibility, now_ms: i64) -> Option<RefreshReport> {
        self.visibility = visibility;
        let report = self.registry.set_visibility(&mut self.document, visibility, now_ms)?;
        self.stats.record(now_ms, report);
        Some(report)
    }

    pub fn to_html(&self) -> String {
        self.document.to_html(self.document.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = r#"<div><span class="internetTime" data-style="circle-small"></span></div>"#;

    #[test]
    fn test_parse_initialize_render() {
        let mut page = Page::parse(MARKUP, Settings::default()).unwrap();
        let created = page.initialize_all(0).unwrap();
        assert_eq!(created.len(), 1);
        let html = page.to_html();
        assert!(html.contains("clockframe clockframe--stacked"));
        assert!(html.contains(r#"<span class="time">041</span>"#));
    }

    #[test]
    fn test_parse_rejects_bad_settings() {
        let settings = Settings {
            tick_interval_ms: 0,
            ..Settings::default()
        };
        assert!(Page::parse(MARKUP, settings).is_err());
    }

    #[test]
    fn test_hidden_page_does_not_start() {
        let mut page = Page::parse(MARKUP, Settings::default()).unwrap();
        page.initialize_all(0).unwrap();
        assert!(page.set_visibility(Visibility::Hidden, 100).is_none());
        page.start(200);
        assert!(!page.is_running());
        assert_eq!(page.stats().refreshes, 0);

        assert!(page.set_visibility(Visibility::Visible, 300).is_some());
        assert!(page.is_running());
        assert_eq!(page.stats().refresh_times, vec![300]);
    }

    #[test]
    fn test_long_run_keeps_bounded_state() {
        let mut page = Page::parse(
            r#"<div class="internetTime" data-style="rectangle-small"></div>"#,
            Settings::default(),
        )
        .unwrap();
        let host = page.initialize_all(0).unwrap()[0];
        page.document.clear_children(host).unwrap();

        page.start(0);
        for s in 1..=3_600 {
            assert!(page.tick(s * 1_000).is_some());
        }
        let stats = page.stats();
        assert_eq!(stats.refreshes, 3_601);
        assert_eq!(stats.failures, 3_601);
        assert_eq!(stats.last_refresh_ms, Some(3_600_000));
        assert_eq!(stats.refresh_times.len(), RECENT_REFRESHES);
        assert_eq!(stats.refresh_times.front(), Some(&3_569_000));
        assert_eq!(page.take_warnings().len(), 1);
    }

    #[test]
    fn test_custom_marker_class() {
        let settings = Settings {
            marker_class: "beatClock".to_string(),
            ..Settings::default()
        };
        let markup = r#"<p class="beatClock"></p><p class="internetTime"></p>"#;
        let mut page = Page::parse(markup, settings).unwrap();
        assert_eq!(page.initialize_all(0).unwrap().len(), 1);
    }
}
