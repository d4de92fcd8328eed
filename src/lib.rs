//! # Swatch Internet Time clocks
//!
//! Embeddable clock widgets showing Internet Time (beats, `@000.00`–`@999.99`).
//!
//! ## Features
//! - Built-in catalog of named presets, loadable from YAML
//! - Normalization of nested and legacy preset objects into one flat configuration
//! - Per-host `data-*` attribute overrides with border consistency repair
//! - One shared tick aligned to second boundaries, paused while the page is hidden
//! - Lazy initialization of hosts as they approach the viewport
//!
//! ## Example
//! ```ignore
//! use swatch_clocks::{Page, Settings};
//!
//! let xml = r#"<div class="internetTime" data-style="pill-medium" data-add-beats="true"></div>"#;
//! let mut page = Page::parse(xml, Settings::default())?;
//! page.initialize_all(chrono::Utc::now().timestamp_millis())?;
//! println!("{}", page.to_html());
//! ```

pub mod attributes;
pub mod beats;
pub mod catalog;
pub mod dom;
pub mod embed;
pub mod error;
pub mod normalize;
pub mod page;
pub mod preset;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod settings;

// --- Core types ---
pub use attributes::{resolve, AttributeResolution, ClockConfig};
pub use beats::{Beats, DisplayOptions};
pub use catalog::Catalog;
pub use dom::{DataAttributes, Document, NodeId};
pub use embed::{embed_markup, embed_snippet};
pub use error::{ClockError, ClockResult, Warning};
pub use normalize::{normalize, normalize_named, normalize_source, BorderRadius, NormalizedConfig};
pub use page::Page;
pub use preset::{
    BorderStyle, LegacyFlatConfig, NestedConfig, PresetConfig, PresetSource, RadiusToken,
};
pub use registry::{DestroyOptions, Instance, LazyObserver, Registry};
pub use scheduler::{TickScheduler, Visibility};
pub use settings::{LazyOptions, Settings};

use std::collections::BTreeMap;

/// Owned copy of a built-in preset.
pub fn get_preset(name: &str) -> Option<PresetConfig> {
    Catalog::builtin().get_preset(name)
}

/// Owned copy of the whole built-in catalog.
pub fn get_presets() -> BTreeMap<String, PresetConfig> {
    Catalog::builtin().get_presets()
}

/// Flat configuration of a built-in preset, `None` for unknown names.
pub fn get_normalized_preset(name: &str) -> Option<NormalizedConfig> {
    Catalog::builtin().normalized(name)
}
