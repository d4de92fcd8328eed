//! Per-host attribute overrides.
//!
//! Hosts declare overrides as `data-*` attributes (`data-width="120"`,
//! `data-frame-padding="2 4"`, ...). [`resolve`] layers them over a normalized
//! base and then repairs the border fields so visibility and width agree.

use crate::beats::DisplayOptions;
use crate::dom::DataAttributes;
use crate::error::Warning;
use crate::normalize::{
    clamp_border_width, first_integer, resolve_radius, BorderRadius, NormalizedConfig,
    DEFAULT_BG_COLOR,
};
use crate::preset::{BorderStyle, Padding, RadiusToken};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const ATTR_STYLE: &str = "data-style";
pub const ATTR_WIDTH: &str = "data-width";
pub const ATTR_HEIGHT: &str = "data-height";
pub const ATTR_BG_COLOR: &str = "data-bg-color";
/// `false` turns a transparent background back to its declared color.
pub const ATTR_TRANSPARENT_BG: &str = "data-transparent-bg";
pub const ATTR_FONT_COLOR: &str = "data-font-color";
pub const ATTR_FONT_SIZE: &str = "data-font-size";
pub const ATTR_BORDER_STYLE: &str = "data-border-style";
pub const ATTR_BORDER_WIDTH: &str = "data-border-width";
pub const ATTR_HIDE_CENTIBEATS: &str = "data-hide-centibeats";
pub const ATTR_HIDE_AT: &str = "data-hide-at";
pub const ATTR_ADD_BEATS: &str = "data-add-beats";
pub const ATTR_SHOW_LOGO: &str = "data-show-logo";
pub const ATTR_FRAME_PADDING: &str = "data-frame-padding";
pub const ATTR_FRAME_BORDER_COLOR: &str = "data-frame-border-color";
pub const ATTR_FRAME_BORDER_RADIUS: &str = "data-frame-border-radius";
pub const ATTR_FRAME_SHOW_BORDER: &str = "data-frame-show-border";
/// Older spelling of [`ATTR_FRAME_SHOW_BORDER`], read only when that one is absent.
pub const ATTR_SHOW_BORDER: &str = "data-show-border";
pub const ATTR_AT_SIGN_LEFT_MARGIN: &str = "data-clock-at-sign-left-margin";
pub const ATTR_BEATS_LABEL_LEFT_MARGIN: &str = "data-clock-beats-label-left-margin";
pub const ATTR_CLOCK_TITLE: &str = "data-clock-title";

pub const DEFAULT_BORDER_COLOR: &str = "black";

/// Final, renderer-ready configuration of one clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockConfig {
    pub width: i64,
    pub height: i64,
    pub bg_color: String,
    pub font_color: String,
    pub font_size: i64,
    pub border_style: BorderStyle,
    pub border_width: u8,
    pub border_radius: BorderRadius,
    pub show_border: bool,
    pub border_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_sign_left_margin: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beats_label_left_margin: Option<i64>,
    pub hide_centibeats: bool,
    pub hide_at: bool,
    pub add_beats: bool,
    pub show_logo: bool,
    pub clock_title: String,
}

impl ClockConfig {
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            hide_at: self.hide_at,
            hide_centibeats: self.hide_centibeats,
            add_beats: self.add_beats,
        }
    }
}

impl From<&NormalizedConfig> for ClockConfig {
    /// The base before any attribute is applied.
    fn from(n: &NormalizedConfig) -> Self {
        ClockConfig {
            width: n.width,
            height: n.height,
            bg_color: n.bg_color.clone(),
            font_color: n.font_color.clone(),
            font_size: n.font_size,
            border_style: n.border_style,
            border_width: n.border_width,
            border_radius: n.border_radius,
            show_border: n.border_width > 0,
            border_color: n
                .frame
                .border_color
                .clone()
                .unwrap_or_else(|| DEFAULT_BORDER_COLOR.to_string()),
            padding: n.frame.padding.clone(),
            at_sign_left_margin: n.clock.at_sign_left_margin.as_ref().and_then(|m| m.px()),
            beats_label_left_margin: n
                .clock
                .beats_label_left_margin
                .as_ref()
                .and_then(|m| m.px()),
            hide_centibeats: n.hide_centibeats,
            hide_at: n.hide_at,
            add_beats: n.add_beats,
            show_logo: n.show_logo,
            clock_title: n.clock_title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeResolution {
    pub config: ClockConfig,
    pub warnings: Vec<Warning>,
}

/// Leading integer of an attribute value: `"12px"` is 12, `"px12"` is not a number.
pub fn parse_int_attribute(value: &str) -> Option<i64> {
    static INT_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = INT_PREFIX_REGEX.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());
    re.captures(value).and_then(|c| c[1].parse::<i64>().ok())
}

/// Whitespace-separated padding list. Tokens without a number become 0.
pub fn parse_padding(value: &str) -> Option<Padding> {
    let values: Vec<i64> = value
        .split_whitespace()
        .map(|tok| first_integer(tok).unwrap_or(0))
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(Padding(values))
    }
}

/// Layers host attributes over `base`.
///
/// Empty values fall back to the base. Integers that do not parse keep the
/// base value and add a [`Warning::MalformedAttribute`]. Booleans are true only
/// for the literal `"true"`.
pub fn resolve(attrs: &DataAttributes, base: &NormalizedConfig) -> AttributeResolution {
    let mut reader = Reader {
        attrs,
        warnings: Vec::new(),
    };
    let mut config = ClockConfig::from(base);

    if let Some(w) = reader.int(ATTR_WIDTH) {
        config.width = w.max(1);
    }
    if let Some(h) = reader.int(ATTR_HEIGHT) {
        config.height = h.max(1);
    }
    if let Some(size) = reader.int(ATTR_FONT_SIZE) {
        config.font_size = size.max(1);
    }
    match reader.flag(ATTR_TRANSPARENT_BG) {
        Some(true) => config.bg_color = "transparent".to_string(),
        Some(false) if config.bg_color == "transparent" => {
            config.bg_color = base
                .clock
                .bg_color
                .clone()
                .unwrap_or_else(|| DEFAULT_BG_COLOR.to_string());
        }
        _ => {}
    }
    if let Some(color) = reader.text(ATTR_BG_COLOR) {
        config.bg_color = color.to_string();
    }
    if let Some(color) = reader.text(ATTR_FONT_COLOR) {
        config.font_color = color.to_string();
    }
    if let Some(color) = reader.text(ATTR_FRAME_BORDER_COLOR) {
        config.border_color = color.to_string();
    }
    if let Some(title) = reader.text(ATTR_CLOCK_TITLE) {
        config.clock_title = title.to_string();
    }
    if let Some(raw) = reader.text(ATTR_BORDER_STYLE) {
        match BorderStyle::parse(raw) {
            Some(style) => config.border_style = style,
            None => reader.malformed(ATTR_BORDER_STYLE, raw),
        }
    }

    let width_override = reader.int(ATTR_BORDER_WIDTH);
    if let Some(w) = width_override {
        config.border_width = clamp_border_width(w);
    }

    if let Some(v) = reader.flag(ATTR_HIDE_CENTIBEATS) {
        config.hide_centibeats = v;
    }
    if let Some(v) = reader.flag(ATTR_HIDE_AT) {
        config.hide_at = v;
    }
    if let Some(v) = reader.flag(ATTR_ADD_BEATS) {
        config.add_beats = v;
    }
    if let Some(v) = reader.flag(ATTR_SHOW_LOGO) {
        config.show_logo = v;
    }

    if let Some(raw) = reader.text(ATTR_FRAME_PADDING) {
        config.padding = parse_padding(raw);
    }
    if let Some(m) = reader.int(ATTR_AT_SIGN_LEFT_MARGIN) {
        config.at_sign_left_margin = Some(m);
    }
    if let Some(m) = reader.int(ATTR_BEATS_LABEL_LEFT_MARGIN) {
        config.beats_label_left_margin = Some(m);
    }

    let geometry_changed = [ATTR_BORDER_STYLE, ATTR_WIDTH, ATTR_HEIGHT]
        .iter()
        .any(|a| reader.text(a).is_some());
    match reader.text(ATTR_FRAME_BORDER_RADIUS) {
        Some(raw) => {
            config.border_radius = resolve_radius(
                config.border_style,
                Some(&RadiusToken::from(raw)),
                config.width,
                config.height,
            );
        }
        None if geometry_changed => {
            config.border_radius = resolve_radius(
                config.border_style,
                base.frame.border_radius.as_ref(),
                config.width,
                config.height,
            );
        }
        None => {}
    }

    let show_override = reader
        .flag(ATTR_FRAME_SHOW_BORDER)
        .or_else(|| reader.flag(ATTR_SHOW_BORDER));
    repair_border(&mut config, show_override, width_override, base.frame.show_border);

    AttributeResolution {
        config,
        warnings: reader.warnings,
    }
}

/// Make `show_border` and `border_width` agree.
///
/// Visibility is decided by the first of: a show-border attribute, a
/// border-width attribute (positive shows, zero hides), the `showBorder` the
/// configuration object declared, the final width.
fn repair_border(
    config: &mut ClockConfig,
    show_override: Option<bool>,
    width_override: Option<i64>,
    declared_show: Option<bool>,
) {
    let show = show_override
        .or_else(|| width_override.map(|w| w > 0))
        .or(declared_show);
    match show {
        Some(true) => {
            config.show_border = true;
            if config.border_width == 0 {
                config.border_width = 1;
            }
        }
        Some(false) => {
            config.show_border = false;
            config.border_width = 0;
        }
        None => config.show_border = config.border_width > 0,
    }
}

struct Reader<'a> {
    attrs: &'a DataAttributes,
    warnings: Vec<Warning>,
}

impl<'a> Reader<'a> {
    /// Trimmed value, `None` when absent or blank.
    fn text(&self, name: &str) -> Option<&'a str> {
        self.attrs
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn int(&mut self, name: &str) -> Option<i64> {
        let raw = self.text(name)?;
        let parsed = parse_int_attribute(raw);
        if parsed.is_none() {
            self.malformed(name, raw);
        }
        parsed
    }

    fn flag(&self, name: &str) -> Option<bool> {
        self.text(name).map(|v| v == "true")
    }

    fn malformed(&mut self, name: &str, value: &str) {
        self.warnings.push(Warning::MalformedAttribute {
            attribute: name.to_string(),
            value: value.to_string(),
        });
    }
}
