//! Flattens nested or legacy configuration objects into one renderer-ready record.

use crate::catalog::Catalog;
use crate::preset::*;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::sync::OnceLock;

pub const DEFAULT_WIDTH: i64 = 95;
pub const DEFAULT_HEIGHT: i64 = 30;
pub const DEFAULT_BG_COLOR: &str = "#778899";
pub const DEFAULT_FONT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_FONT_SIZE: i64 = 24;
pub const DEFAULT_BORDER_WIDTH: u8 = 1;
pub const MAX_BORDER_WIDTH: u8 = 5;
pub const DEFAULT_CLOCK_TITLE: &str = "Swatch Internet Time";

/// `rounded-N` radius as a fraction of the frame's shorter side.
const ROUNDED_FACTORS: [(u32, f64); 4] = [(1, 0.08), (2, 0.12), (3, 0.18), (4, 0.25)];
const DEFAULT_ROUNDED_FACTOR: f64 = 0.12;

/// A concrete CSS border radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderRadius {
    Px(i64),
    Percent(u32),
}

impl BorderRadius {
    pub const CIRCLE: BorderRadius = BorderRadius::Percent(50);
}

impl std::fmt::Display for BorderRadius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BorderRadius::Px(n) => write!(f, "{}px", n),
            BorderRadius::Percent(p) => write!(f, "{}%", p),
        }
    }
}

impl Serialize for BorderRadius {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Flat configuration derived from a preset or caller object.
///
/// The raw `frame`/`clock` groups are kept next to the flattened fields so the
/// renderer can read values that flattening does not cover (padding, border
/// color, margins, explicit border visibility).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedConfig {
    pub width: i64,
    pub height: i64,
    pub bg_color: String,
    pub font_color: String,
    pub font_size: i64,
    pub border_style: BorderStyle,
    pub border_width: u8,
    pub border_radius: BorderRadius,
    pub hide_centibeats: bool,
    pub hide_at: bool,
    pub add_beats: bool,
    pub show_logo: bool,
    pub clock_title: String,
    pub frame: FrameOverrides,
    pub clock: ClockOverrides,
}

impl NormalizedConfig {
    /// Nested form carrying the flattened values, so it can be normalized again.
    pub fn to_nested(&self) -> NestedConfig {
        let transparent = self.bg_color == "transparent";
        NestedConfig {
            frame: FrameOverrides {
                width: Some(Numeric::Int(self.width)),
                height: Some(Numeric::Int(self.height)),
                border_style: Some(self.border_style),
                border_width: Some(Numeric::Int(self.border_width.into())),
                border_radius: Some(RadiusToken::Keyword(self.border_radius.to_string())),
                ..self.frame.clone()
            },
            clock: ClockOverrides {
                transparent_bg: Some(transparent),
                bg_color: if transparent {
                    self.clock.bg_color.clone()
                } else {
                    Some(self.bg_color.clone())
                },
                font_color: Some(self.font_color.clone()),
                font_size: Some(Numeric::Int(self.font_size)),
                show_logo: Some(self.show_logo),
                show_at_sign: Some(!self.hide_at),
                centi_beats: Some(!self.hide_centibeats),
                show_beats_label: Some(self.add_beats),
                clock_title: Some(self.clock_title.clone()),
                hide_centibeats: None,
                hide_at: None,
                add_beats: None,
                ..self.clock.clone()
            },
        }
    }
}

/// First integer embedded anywhere in `s` (`"12px"` -> 12, `"w-3"` -> -3).
pub fn first_integer(s: &str) -> Option<i64> {
    static FIRST_INT_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = FIRST_INT_REGEX.get_or_init(|| Regex::new(r"-?\d+").unwrap());
    re.find(s).and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Pixel value of an optional field, or `fallback`.
pub fn px_or(value: Option<&Numeric>, fallback: i64) -> i64 {
    value.and_then(Numeric::px).unwrap_or(fallback)
}

/// Clamp any requested border width into the supported range.
pub fn clamp_border_width(width: i64) -> u8 {
    width.clamp(0, MAX_BORDER_WIDTH.into()) as u8
}

/// The one border-width policy: an explicit width wins (0 included), otherwise
/// the visibility flag decides, otherwise 1px. Always clamped.
pub fn resolve_border_width(explicit: Option<i64>, show_border: Option<bool>) -> u8 {
    match (explicit, show_border) {
        (Some(w), _) => clamp_border_width(w),
        (None, Some(true)) => 1,
        (None, Some(false)) => 0,
        (None, None) => DEFAULT_BORDER_WIDTH,
    }
}

/// Radius for a frame. Rectangles and squares take the declared token (`N%` stays a
/// percentage). Circles are always `50%` and pills always half their height,
/// whatever token was declared.
pub fn resolve_radius(
    style: BorderStyle,
    token: Option<&RadiusToken>,
    width: i64,
    height: i64,
) -> BorderRadius {
    match style {
        BorderStyle::Circle => BorderRadius::CIRCLE,
        BorderStyle::Pill => BorderRadius::Px(half(height)),
        BorderStyle::Rectangle | BorderStyle::Square => match token {
            None => BorderRadius::Px(0),
            Some(RadiusToken::Pixels(n)) => BorderRadius::Px(*n),
            Some(RadiusToken::Keyword(k)) => keyword_radius(k, width, height),
        },
    }
}

fn keyword_radius(keyword: &str, width: i64, height: i64) -> BorderRadius {
    static ROUNDED_REGEX: OnceLock<Regex> = OnceLock::new();
    static PERCENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let rounded = ROUNDED_REGEX.get_or_init(|| Regex::new(r"^rounded-(\d+)$").unwrap());
    let percent = PERCENT_REGEX.get_or_init(|| Regex::new(r"^(\d+)\s*%$").unwrap());

    let k = keyword.trim().to_ascii_lowercase();
    match k.as_str() {
        "" | "none" => return BorderRadius::Px(0),
        "full" => return BorderRadius::Px(half(height)),
        _ => {}
    }
    if let Some(p) = percent
        .captures(&k)
        .and_then(|caps| caps[1].parse::<u32>().ok())
    {
        return BorderRadius::Percent(p);
    }
    if let Some(caps) = rounded.captures(&k) {
        let n = caps[1].parse::<u32>().ok();
        let factor = ROUNDED_FACTORS
            .iter()
            .find(|(level, _)| Some(*level) == n)
            .map(|(_, f)| *f)
            .unwrap_or(DEFAULT_ROUNDED_FACTOR);
        let px = (width.min(height) as f64 * factor).round() as i64;
        return BorderRadius::Px(px.max(0));
    }
    BorderRadius::Px(first_integer(&k).unwrap_or(0))
}

fn half(height: i64) -> i64 {
    (height as f64 / 2.0).round() as i64
}

/// Normalize a nested configuration object.
pub fn normalize(config: &NestedConfig) -> NormalizedConfig {
    let frame = &config.frame;
    let clock = &config.clock;

    let width = px_or(frame.width.as_ref(), DEFAULT_WIDTH).max(1);
    let height = px_or(frame.height.as_ref(), DEFAULT_HEIGHT).max(1);
    let border_style = frame.border_style.unwrap_or_default();
    let border_width = resolve_border_width(
        frame.border_width.as_ref().and_then(Numeric::px),
        frame.show_border,
    );
    let border_radius = resolve_radius(border_style, frame.border_radius.as_ref(), width, height);

    let bg_color = if clock.transparent_bg == Some(true) {
        "transparent".to_string()
    } else {
        clock
            .bg_color
            .clone()
            .unwrap_or_else(|| DEFAULT_BG_COLOR.to_string())
    };

    NormalizedConfig {
        width,
        height,
        bg_color,
        font_color: clock
            .font_color
            .clone()
            .unwrap_or_else(|| DEFAULT_FONT_COLOR.to_string()),
        font_size: px_or(clock.font_size.as_ref(), DEFAULT_FONT_SIZE).max(1),
        border_style,
        border_width,
        border_radius,
        hide_centibeats: clock.centi_beats == Some(false) || clock.hide_centibeats == Some(true),
        hide_at: clock.show_at_sign == Some(false) || clock.hide_at == Some(true),
        add_beats: clock.show_beats_label == Some(true) || clock.add_beats == Some(true),
        show_logo: clock.show_logo == Some(true),
        clock_title: clock
            .clock_title
            .clone()
            .unwrap_or_else(|| DEFAULT_CLOCK_TITLE.to_string()),
        frame: frame.clone(),
        clock: clock.clone(),
    }
}

/// Normalize a caller object of either shape.
pub fn normalize_source(source: PresetSource) -> NormalizedConfig {
    normalize(&source.into_nested())
}

/// Normalize a catalog entry by name. Unknown names normalize an empty object,
/// so every default applies.
pub fn normalize_named(catalog: &Catalog, name: &str) -> NormalizedConfig {
    catalog
        .normalized(name)
        .unwrap_or_else(|| normalize(&NestedConfig::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(style: BorderStyle, radius: RadiusToken, width: i64, height: i64) -> NestedConfig {
        NestedConfig {
            frame: FrameOverrides {
                width: Some(Numeric::Int(width)),
                height: Some(Numeric::Int(height)),
                border_style: Some(style),
                border_radius: Some(radius),
                ..FrameOverrides::default()
            },
            ..NestedConfig::default()
        }
    }

    #[test]
    fn test_defaults_for_empty_object() {
        let n = normalize(&NestedConfig::default());
        assert_eq!(n.width, 95);
        assert_eq!(n.height, 30);
        assert_eq!(n.bg_color, "#778899");
        assert_eq!(n.font_color, "#FFFFFF");
        assert_eq!(n.font_size, 24);
        assert_eq!(n.border_style, BorderStyle::Rectangle);
        assert_eq!(n.border_width, 1);
        assert_eq!(n.border_radius, BorderRadius::Px(0));
        assert!(!n.hide_centibeats);
        assert!(!n.hide_at);
        assert!(!n.add_beats);
        assert!(!n.show_logo);
        assert_eq!(n.clock_title, "Swatch Internet Time");
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("12px"), Some(12));
        assert_eq!(first_integer("  7 "), Some(7));
        assert_eq!(first_integer("-4px"), Some(-4));
        assert_eq!(first_integer("px"), None);
        assert_eq!(first_integer(""), None);
    }

    #[test]
    fn test_border_width_policy() {
        assert_eq!(resolve_border_width(Some(0), Some(true)), 0);
        assert_eq!(resolve_border_width(Some(3), Some(false)), 3);
        assert_eq!(resolve_border_width(Some(12), None), 5);
        assert_eq!(resolve_border_width(Some(-2), None), 0);
        assert_eq!(resolve_border_width(None, Some(true)), 1);
        assert_eq!(resolve_border_width(None, Some(false)), 0);
        assert_eq!(resolve_border_width(None, None), 1);
    }

    #[test]
    fn test_border_width_from_text() {
        let mut cfg = NestedConfig::default();
        cfg.frame.border_width = Some(Numeric::from("3px"));
        assert_eq!(normalize(&cfg).border_width, 3);

        cfg.frame.border_width = Some(Numeric::from("thick"));
        cfg.frame.show_border = Some(false);
        assert_eq!(normalize(&cfg).border_width, 0);
    }

    #[test]
    fn test_radius_keywords() {
        // shorter side drives the radius: 30 * 0.12
        let n = normalize(&frame(BorderStyle::Rectangle, "rounded-2".into(), 100, 30));
        assert_eq!(n.border_radius.to_string(), "4px");

        let n = normalize(&frame(BorderStyle::Rectangle, "rounded-2".into(), 100, 100));
        assert_eq!(n.border_radius.to_string(), "12px");

        let n = normalize(&frame(BorderStyle::Rectangle, "full".into(), 100, 40));
        assert_eq!(n.border_radius.to_string(), "20px");

        let n = normalize(&frame(BorderStyle::Rectangle, "none".into(), 100, 40));
        assert_eq!(n.border_radius.to_string(), "0px");

        let n = normalize(&frame(BorderStyle::Rectangle, "rounded-4".into(), 100, 40));
        assert_eq!(n.border_radius, BorderRadius::Px(10));

        let n = normalize(&frame(BorderStyle::Rectangle, "rounded-9".into(), 100, 50));
        assert_eq!(n.border_radius, BorderRadius::Px(6));

        let n = normalize(&frame(BorderStyle::Square, RadiusToken::Pixels(8), 75, 75));
        assert_eq!(n.border_radius, BorderRadius::Px(8));

        let n = normalize(&frame(BorderStyle::Rectangle, "14px".into(), 75, 75));
        assert_eq!(n.border_radius, BorderRadius::Px(14));

        let n = normalize(&frame(BorderStyle::Rectangle, "bevelled".into(), 75, 75));
        assert_eq!(n.border_radius, BorderRadius::Px(0));

        let n = normalize(&frame(BorderStyle::Square, "25%".into(), 75, 75));
        assert_eq!(n.border_radius, BorderRadius::Percent(25));
    }

    #[test]
    fn test_circle_and_pill_force_radius() {
        let n = normalize(&frame(BorderStyle::Circle, "rounded-1".into(), 42, 42));
        assert_eq!(n.border_radius.to_string(), "50%");

        let n = normalize(&frame(BorderStyle::Pill, RadiusToken::Pixels(3), 88, 23));
        assert_eq!(n.border_radius, BorderRadius::Px(12));
    }

    #[test]
    fn test_transparent_background_wins() {
        let mut cfg = NestedConfig::default();
        cfg.clock.bg_color = Some("#123456".to_string());
        cfg.clock.transparent_bg = Some(true);
        assert_eq!(normalize(&cfg).bg_color, "transparent");

        cfg.clock.transparent_bg = Some(false);
        assert_eq!(normalize(&cfg).bg_color, "#123456");
    }

    #[test]
    fn test_polarity_aliases() {
        let mut cfg = NestedConfig::default();
        cfg.clock.centi_beats = Some(true);
        cfg.clock.hide_centibeats = Some(true);
        cfg.clock.show_at_sign = Some(false);
        cfg.clock.add_beats = Some(true);
        let n = normalize(&cfg);
        assert!(n.hide_centibeats);
        assert!(n.hide_at);
        assert!(n.add_beats);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let catalog = Catalog::builtin();
        for name in catalog.names() {
            let once = normalize_named(catalog, name);
            let twice = normalize(&once.to_nested());
            assert_eq!(once.border_width, twice.border_width, "{}", name);
            assert_eq!(once.border_radius, twice.border_radius, "{}", name);
            assert_eq!(once.bg_color, twice.bg_color, "{}", name);
            assert_eq!(once.hide_centibeats, twice.hide_centibeats, "{}", name);
        }
    }

    fn flat(n: &NormalizedConfig) -> NormalizedConfig {
        NormalizedConfig {
            frame: FrameOverrides::default(),
            clock: ClockOverrides::default(),
            ..n.clone()
        }
    }

    #[test]
    fn test_normalize_is_idempotent_for_odd_inputs() {
        let mut cases = Vec::new();
        for (width, radius) in [
            (Numeric::from("12px"), "rounded-9"),
            (Numeric::Int(-3), "25%"),
            (Numeric::from("thick"), "full"),
            (Numeric::Float(2.6), "  ROUNDED-2 "),
            (Numeric::Int(0), "-8px"),
        ] {
            for style in [BorderStyle::Rectangle, BorderStyle::Square, BorderStyle::Pill] {
                let mut cfg = frame(style, radius.into(), 100, 30);
                cfg.frame.border_width = Some(width.clone());
                cases.push(cfg);
            }
        }
        let mut cfg = NestedConfig::default();
        cfg.frame.width = Some(Numeric::Int(-20));
        cfg.frame.height = Some(Numeric::from("0px"));
        cfg.frame.show_border = Some(false);
        cfg.clock.font_size = Some(Numeric::from("huge"));
        cfg.clock.transparent_bg = Some(true);
        cfg.clock.bg_color = Some("#010203".to_string());
        cases.push(cfg);

        for cfg in cases {
            let once = normalize(&cfg);
            let twice = normalize(&once.to_nested());
            assert_eq!(flat(&once), flat(&twice), "{:?}", cfg.frame);
            assert!(once.border_width <= MAX_BORDER_WIDTH);
            assert!(once.width >= 1 && once.height >= 1);
        }
    }

    #[test]
    fn test_unknown_name_uses_defaults() {
        let n = normalize_named(Catalog::builtin(), "does-not-exist");
        assert_eq!(n, normalize(&NestedConfig::default()));
    }
}
