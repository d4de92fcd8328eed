//! Live clock instances, keyed by host element.

use crate::attributes::{resolve, ClockConfig};
use crate::beats::Beats;
use crate::catalog::Catalog;
use crate::dom::{Document, NodeId};
use crate::error::{ClockError, ClockResult, Warning};
use crate::normalize::normalize_named;
use crate::render::{self, ClockView};
use crate::scheduler::{TickScheduler, Visibility};
use crate::settings::{LazyOptions, Settings};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// One clock bound to one host element. Its configuration is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    host: NodeId,
    config: ClockConfig,
    view: ClockView,
    destroyed: bool,
}

impl Instance {
    pub fn host(&self) -> NodeId {
        self.host
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn view(&self) -> &ClockView {
        &self.view
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Show `beats` in this clock.
    pub fn update(&self, doc: &mut Document, beats: Beats) -> ClockResult<()> {
        if self.destroyed {
            return Err(ClockError::InstanceDestroyed { host: self.host });
        }
        render::update(doc, &self.view, self.config.display_options(), beats)
    }

    /// Mark the instance destroyed. Calling it again does nothing.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Also clear the rendered content of each host.
    pub remove_dom: bool,
}

/// Outcome of one refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub updated: usize,
    pub failed: usize,
    /// Instances dropped because their host left the document.
    pub removed: usize,
}

/// Warnings kept until drained; older ones are dropped first.
pub const MAX_PENDING_WARNINGS: usize = 256;

#[derive(Debug, Clone)]
pub struct Registry {
    catalog: Catalog,
    settings: Settings,
    scheduler: TickScheduler,
    instances: BTreeMap<NodeId, Instance>,
    warnings: Vec<Warning>,
    /// Hosts whose last update failed. A host is reported once until it recovers.
    failing: BTreeSet<NodeId>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Catalog::builtin().clone(), Settings::default())
    }
}

impl Registry {
    pub fn new(catalog: Catalog, settings: Settings) -> Self {
        let scheduler = TickScheduler::new(settings.tick_interval_ms);
        Registry {
            catalog,
            settings,
            scheduler,
            instances: BTreeMap::new(),
            warnings: Vec::new(),
            failing: BTreeSet::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instance(&self, host: NodeId) -> Option<&Instance> {
        self.instances.get(&host)
    }

    pub fn is_initialized(&self, host: NodeId) -> bool {
        self.instances.contains_key(&host)
    }

    /// Hosts with a live clock, in document creation order.
    pub fn hosts(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.instances.keys().copied()
    }

    /// Warnings recorded since the last drain, oldest first. At most
    /// [`MAX_PENDING_WARNINGS`] are kept.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "clock warning");
        self.warnings.push(warning);
        if self.warnings.len() > MAX_PENDING_WARNINGS {
            let excess = self.warnings.len() - MAX_PENDING_WARNINGS;
            self.warnings.drain(..excess);
            tracing::debug!(dropped = excess, "warning buffer full");
        }
    }

    /// Record an update failure unless the host is already known to be failing.
    fn update_failed(&mut self, host: NodeId, error: ClockError) {
        if self.failing.insert(host) {
            self.warn(Warning::UpdateFailed { host, error });
        }
    }

    /// Resolve the final configuration of a host from its style and attributes.
    pub fn resolve_host(&mut self, doc: &Document, host: NodeId) -> ClockConfig {
        let style = doc
            .attribute(host, &self.settings.style_attribute)
            .map(str::trim)
            .unwrap_or("")
            .to_string();
        if !style.is_empty() && !self.catalog.contains(&style) {
            self.warn(Warning::UnknownStyle {
                host: Some(host),
                style: style.clone(),
            });
        }
        let base = normalize_named(&self.catalog, &style);
        let resolution = resolve(&doc.data_attributes(host), &base);
        for warning in resolution.warnings {
            self.warn(warning);
        }
        resolution.config
    }

    /// Build a clock under every uninitialized host at or below `root`, showing
    /// the time at `now_ms` right away. Returns the newly initialized hosts.
    ///
    /// A host that fails to build is reported as a warning and skipped.
    #[tracing::instrument(skip(self, doc))]
    pub fn initialize(&mut self, doc: &mut Document, root: NodeId, now_ms: i64) -> ClockResult<Vec<NodeId>> {
        if !doc.contains(root) {
            return Err(ClockError::NodeNotFound { node: root });
        }
        let beats = Beats::from_unix_millis(now_ms);
        let mut created = Vec::new();
        for host in doc.find_by_class(root, &self.settings.marker_class) {
            if self.instances.contains_key(&host) {
                continue;
            }
            let config = self.resolve_host(doc, host);
            let view = match render::construct(doc, host, &config) {
                Ok(view) => view,
                Err(error) => {
                    self.warn(Warning::ConstructFailed { host, error });
                    continue;
                }
            };
            let instance = Instance {
                host,
                config,
                view,
                destroyed: false,
            };
            if let Err(error) = instance.update(doc, beats) {
                self.update_failed(host, error);
            }
            tracing::debug!(host = %host, "clock initialized");
            self.instances.insert(host, instance);
            created.push(host);
        }
        Ok(created)
    }

    /// Tear down every clock at or below `root`. Returns how many were destroyed;
    /// running it again on the same subtree destroys nothing.
    #[tracing::instrument(skip(self, doc))]
    pub fn destroy(&mut self, doc: &mut Document, root: NodeId, options: DestroyOptions) -> ClockResult<usize> {
        if !doc.contains(root) {
            return Err(ClockError::NodeNotFound { node: root });
        }
        let subtree: HashSet<NodeId> = doc.descendants(root).into_iter().collect();
        let hosts: Vec<NodeId> = self
            .instances
            .keys()
            .filter(|h| subtree.contains(*h))
            .copied()
            .collect();
        for host in &hosts {
            if let Some(mut instance) = self.instances.remove(host) {
                instance.destroy();
            }
            self.failing.remove(host);
            if options.remove_dom {
                doc.clear_children(*host)?;
            }
            tracing::debug!(host = %host, "clock destroyed");
        }
        Ok(hosts.len())
    }

    /// Update every live clock to `now_ms`. One clock failing does not stop the
    /// others. Clocks whose host has left the document are dropped.
    pub fn refresh(&mut self, doc: &mut Document, now_ms: i64) -> RefreshReport {
        let beats = Beats::from_unix_millis(now_ms);
        let mut report = RefreshReport::default();
        let mut failures = Vec::new();
        let mut recovered = Vec::new();
        let mut gone = Vec::new();

        for (host, instance) in &self.instances {
            if !doc.contains(*host) {
                gone.push(*host);
                continue;
            }
            match instance.update(doc, beats) {
                Ok(()) => {
                    report.updated += 1;
                    recovered.push(*host);
                }
                Err(error) => {
                    report.failed += 1;
                    failures.push((*host, error));
                }
            }
        }

        for host in recovered {
            self.failing.remove(&host);
        }
        for (host, error) in failures {
            self.update_failed(host, error);
        }
        for host in gone {
            if let Some(mut instance) = self.instances.remove(&host) {
                instance.destroy();
            }
            self.failing.remove(&host);
            report.removed += 1;
            self.warn(Warning::HostRemoved { host });
        }
        report
    }

    /// Start the shared tick and refresh immediately.
    pub fn start(&mut self, doc: &mut Document, now_ms: i64) -> RefreshReport {
        self.scheduler.start(now_ms);
        self.refresh(doc, now_ms)
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Refresh if a tick is due at `now_ms`.
    pub fn tick(&mut self, doc: &mut Document, now_ms: i64) -> Option<RefreshReport> {
        self.scheduler.take_due(now_ms)?;
        Some(self.refresh(doc, now_ms))
    }

    /// Pause on hide; on show, re-align and refresh at once.
    pub fn set_visibility(
        &mut self,
        doc: &mut Document,
        visibility: Visibility,
        now_ms: i64,
    ) -> Option<RefreshReport> {
        if self.scheduler.set_visibility(visibility, now_ms) {
            Some(self.refresh(doc, now_ms))
        } else {
            None
        }
    }
}

/// Axis-aligned box in page pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Grown by `margin` on every side. Negative margins shrink it.
    pub fn expand(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: (self.width + 2.0 * margin).max(0.0),
            height: (self.height + 2.0 * margin).max(0.0),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Where one observed host currently sits on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub bounds: Rect,
}

/// Defers initialization of hosts until they come near the viewport.
///
/// The host application reports host positions through [`LazyObserver::process`];
/// dropping the observer or calling [`LazyObserver::disconnect`] stops observation.
#[derive(Debug, Clone)]
pub struct LazyObserver {
    margin_px: f64,
    threshold: f64,
    pending: BTreeSet<NodeId>,
}

impl LazyObserver {
    /// Observe every uninitialized host at or below `root`.
    pub fn observe(
        registry: &Registry,
        doc: &Document,
        root: NodeId,
        options: &LazyOptions,
    ) -> ClockResult<LazyObserver> {
        options.validate()?;
        if !doc.contains(root) {
            return Err(ClockError::NodeNotFound { node: root });
        }
        let pending = doc
            .find_by_class(root, &registry.settings().marker_class)
            .into_iter()
            .filter(|host| !registry.is_initialized(*host))
            .collect();
        Ok(LazyObserver {
            margin_px: options.root_margin_px()?,
            threshold: options.threshold,
            pending,
        })
    }

    /// Hosts still waiting to be initialized.
    pub fn pending(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pending.iter().copied()
    }

    pub fn is_connected(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Does `bounds` count as visible inside `viewport`?
    pub fn intersects(&self, viewport: &Rect, bounds: &Rect) -> bool {
        let area = viewport.expand(self.margin_px);
        let Some(overlap) = area.intersection(bounds) else {
            return false;
        };
        if bounds.area() == 0.0 {
            return true;
        }
        let ratio = overlap.area() / bounds.area();
        ratio > 0.0 && ratio >= self.threshold
    }

    /// Initialize every pending host whose entry intersects `viewport`, then stop
    /// observing it. Returns the hosts that got a clock.
    pub fn process(
        &mut self,
        registry: &mut Registry,
        doc: &mut Document,
        viewport: Rect,
        entries: &[IntersectionEntry],
        now_ms: i64,
    ) -> Vec<NodeId> {
        let mut created = Vec::new();
        for entry in entries {
            if !self.pending.contains(&entry.target) || !self.intersects(&viewport, &entry.bounds) {
                continue;
            }
            self.pending.remove(&entry.target);
            if registry.is_initialized(entry.target) {
                continue;
            }
            match registry.initialize(doc, entry.target, now_ms) {
                Ok(hosts) => created.extend(hosts),
                Err(err) => tracing::warn!(host = %entry.target, %err, "lazy clock initialization failed"),
            }
        }
        created
    }

    /// Stop observing all remaining hosts.
    pub fn disconnect(&mut self) {
        self.pending.clear();
    }
}
