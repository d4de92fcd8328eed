use crate::error::{ClockError, ClockResult};
use crate::scheduler::DEFAULT_TICK_INTERVAL_MS;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKER_CLASS: &str = "internetTime";

/// Library settings. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Class that marks an element as a clock host.
    pub marker_class: String,
    /// Attribute naming the catalog preset of a host.
    pub style_attribute: String,
    pub tick_interval_ms: u64,
    pub lazy: LazyOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            style_attribute: crate::attributes::ATTR_STYLE.to_string(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            lazy: LazyOptions::default(),
        }
    }
}

/// Options for deferred initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LazyOptions {
    /// Margin grown around the viewport, CSS style (`"200px"`).
    pub root_margin: String,
    /// Fraction of a host that must be visible, within `[0, 1]`.
    pub threshold: f64,
}

impl Default for LazyOptions {
    fn default() -> Self {
        LazyOptions {
            root_margin: "200px".to_string(),
            threshold: 0.01,
        }
    }
}

impl LazyOptions {
    /// Root margin in pixels. Only a single length is supported.
    pub fn root_margin_px(&self) -> ClockResult<f64> {
        let raw = self.root_margin.trim();
        let number = raw.strip_suffix("px").unwrap_or(raw).trim();
        number
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid("lazy.rootMargin", format!("'{}' is not a pixel length", raw)))
    }

    pub fn validate(&self) -> ClockResult<()> {
        self.root_margin_px()?;
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(invalid(
                "lazy.threshold",
                format!("{} is outside [0, 1]", self.threshold),
            ));
        }
        Ok(())
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> ClockResult<Settings> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> ClockResult<()> {
        if self.marker_class.trim().is_empty() || self.marker_class.contains(char::is_whitespace) {
            return Err(invalid("markerClass", "must be a single class name"));
        }
        if !self.style_attribute.starts_with("data-") {
            return Err(invalid("styleAttribute", "must be a data-* attribute"));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tickIntervalMs", "must be greater than zero"));
        }
        self.lazy.validate()
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ClockError {
    ClockError::InvalidSettings {
        field: field.to_string(),
        reason: reason.into(),
    }
}
