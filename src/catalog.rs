use crate::error::ClockResult;
use crate::normalize::{normalize, NormalizedConfig};
use crate::preset::{NestedConfig, PresetConfig};
use std::collections::BTreeMap;
use std::sync::OnceLock;

const BUILTIN_PRESETS: &str = include_str!("presets.yaml");

/// Named default configurations. Read-only once shared; every accessor that hands
/// out a preset hands out an owned copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    presets: BTreeMap<String, PresetConfig>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from a YAML mapping of name to `{frame, clock}`.
    pub fn from_yaml(yaml: &str) -> ClockResult<Catalog> {
        let presets: BTreeMap<String, PresetConfig> = serde_yaml::from_str(yaml)?;
        Ok(Catalog { presets })
    }

    /// The catalog shipped with the library.
    pub fn builtin() -> &'static Catalog {
        static BUILTIN: OnceLock<Catalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Catalog::from_yaml(BUILTIN_PRESETS).unwrap_or_else(|err| {
                tracing::error!(%err, "built-in preset catalog failed to parse");
                Catalog::default()
            })
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, preset: PresetConfig) -> Option<PresetConfig> {
        self.presets.insert(name.into(), preset)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(|k| k.as_str())
    }

    /// Owned copy of one preset.
    pub fn get_preset(&self, name: &str) -> Option<PresetConfig> {
        self.presets.get(name).cloned()
    }

    /// Owned copy of the whole catalog.
    pub fn get_presets(&self) -> BTreeMap<String, PresetConfig> {
        self.presets.clone()
    }

    /// Nested form of one preset, as fed to the normalizer.
    pub fn nested(&self, name: &str) -> Option<NestedConfig> {
        self.presets.get(name).map(NestedConfig::from)
    }

    /// Flat configuration for a preset; `None` for unknown names.
    pub fn normalized(&self, name: &str) -> Option<NormalizedConfig> {
        self.nested(name).map(|nested| normalize(&nested))
    }
}
