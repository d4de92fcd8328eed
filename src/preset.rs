use serde::{Deserialize, Serialize};

/// Frame shape. `circle` and `square` stack their content vertically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Rectangle,
    Pill,
    Square,
    Circle,
}

impl BorderStyle {
    /// Case-insensitive lookup used for host attributes.
    pub fn parse(s: &str) -> Option<BorderStyle> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangle" => Some(BorderStyle::Rectangle),
            "pill" => Some(BorderStyle::Pill),
            "square" => Some(BorderStyle::Square),
            "circle" => Some(BorderStyle::Circle),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BorderStyle::Rectangle => "rectangle",
            BorderStyle::Pill => "pill",
            BorderStyle::Square => "square",
            BorderStyle::Circle => "circle",
        }
    }

    pub fn is_stacked(&self) -> bool {
        matches!(self, BorderStyle::Square | BorderStyle::Circle)
    }
}

/// A pixel quantity as callers write it: `12`, `12.0` or `"12px"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    /// Integer pixel value, or `None` when nothing numeric can be extracted.
    pub fn px(&self) -> Option<i64> {
        match self {
            Numeric::Int(n) => Some(*n),
            Numeric::Float(f) if f.is_finite() => Some(f.round() as i64),
            Numeric::Float(_) => None,
            Numeric::Text(s) => crate::normalize::first_integer(s),
        }
    }
}

impl From<i64> for Numeric {
    fn from(n: i64) -> Self {
        Numeric::Int(n)
    }
}

impl From<&str> for Numeric {
    fn from(s: &str) -> Self {
        Numeric::Text(s.to_string())
    }
}

/// Border radius as declared: a pixel count or a keyword
/// (`none`, `full`, `rounded-1`..`rounded-4`, `"12px"`, `"50%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RadiusToken {
    Pixels(i64),
    Keyword(String),
}

impl From<&str> for RadiusToken {
    fn from(s: &str) -> Self {
        RadiusToken::Keyword(s.to_string())
    }
}

impl std::fmt::Display for RadiusToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RadiusToken::Pixels(n) => write!(f, "{}", n),
            RadiusToken::Keyword(k) => f.write_str(k),
        }
    }
}

/// Frame padding in pixels: one value for every edge, or one per edge (top right bottom left).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PaddingRepr", into = "Vec<i64>")]
pub struct Padding(pub Vec<i64>);

#[derive(Deserialize)]
#[serde(untagged)]
enum PaddingRepr {
    One(i64),
    Many(Vec<i64>),
}

impl From<PaddingRepr> for Padding {
    fn from(repr: PaddingRepr) -> Self {
        match repr {
            PaddingRepr::One(v) => Padding(vec![v]),
            PaddingRepr::Many(v) => Padding(v),
        }
    }
}

impl From<Padding> for Vec<i64> {
    fn from(p: Padding) -> Self {
        p.0
    }
}

impl Padding {
    pub fn uniform(v: i64) -> Self {
        Padding(vec![v])
    }

    pub fn edges(top: i64, right: i64, bottom: i64, left: i64) -> Self {
        Padding(vec![top, right, bottom, left])
    }

    /// CSS shorthand, e.g. `2px 4px 2px 6px`. Negative entries render as `0px`.
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|v| format!("{}px", (*v).max(0)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Space-separated form used by the `data-frame-padding` attribute.
    pub fn to_attribute(&self) -> String {
        self.0
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Frame geometry and border of a catalog preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSpec {
    pub width: u32,
    pub height: u32,
    pub show_border: bool,
    pub border_style: BorderStyle,
    pub border_radius: RadiusToken,
    pub border_color: String,
    pub border_width: u8,
    pub padding: Padding,
}

/// Colors, typography and element toggles of a catalog preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockSpec {
    pub transparent_bg: bool,
    pub bg_color: String,
    pub font_color: String,
    pub font_size: u32,
    pub show_logo: bool,
    pub show_at_sign: bool,
    pub at_sign_left_margin: i64,
    pub centi_beats: bool,
    pub show_beats_label: bool,
    pub beats_label_left_margin: i64,
    pub clock_title: String,
}

/// A complete catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub frame: FrameSpec,
    pub clock: ClockSpec,
}

/// Caller-supplied frame fields. Anything left `None` falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_border: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_style: Option<BorderStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<RadiusToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
}

/// Caller-supplied clock fields, including the legacy negative-polarity aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClockOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparent_bg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_logo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_at_sign: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_sign_left_margin: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centi_beats: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_beats_label: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beats_label_left_margin: Option<Numeric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_centibeats: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_at: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_beats: Option<bool>,
}

/// The grouped `{frame, clock}` representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestedConfig {
    pub frame: FrameOverrides,
    pub clock: ClockOverrides,
}

impl From<&PresetConfig> for NestedConfig {
    fn from(p: &PresetConfig) -> Self {
        let f = &p.frame;
        let c = &p.clock;
        NestedConfig {
            frame: FrameOverrides {
                width: Some(Numeric::Int(f.width.into())),
                height: Some(Numeric::Int(f.height.into())),
                show_border: Some(f.show_border),
                border_style: Some(f.border_style),
                border_radius: Some(f.border_radius.clone()),
                border_color: Some(f.border_color.clone()),
                border_width: Some(Numeric::Int(f.border_width.into())),
                padding: Some(f.padding.clone()),
            },
            clock: ClockOverrides {
                transparent_bg: Some(c.transparent_bg),
                bg_color: Some(c.bg_color.clone()),
                font_color: Some(c.font_color.clone()),
                font_size: Some(Numeric::Int(c.font_size.into())),
                show_logo: Some(c.show_logo),
                show_at_sign: Some(c.show_at_sign),
                at_sign_left_margin: Some(Numeric::Int(c.at_sign_left_margin)),
                centi_beats: Some(c.centi_beats),
                show_beats_label: Some(c.show_beats_label),
                beats_label_left_margin: Some(Numeric::Int(c.beats_label_left_margin)),
                clock_title: Some(c.clock_title.clone()),
                ..ClockOverrides::default()
            },
        }
    }
}

/// The older single-level shape, recognized by a top-level `width` or `fontSize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyFlatConfig {
    pub width: Option<Numeric>,
    pub height: Option<Numeric>,
    pub border_style: Option<BorderStyle>,
    pub border_width: Option<Numeric>,
    pub border_color: Option<String>,
    pub bg_color: Option<String>,
    pub font_color: Option<String>,
    pub font_size: Option<Numeric>,
    pub show_logo: Option<bool>,
    pub hide_at: Option<bool>,
    pub hide_centibeats: Option<bool>,
    pub add_beats: Option<bool>,
}

impl LegacyFlatConfig {
    pub fn into_nested(self) -> NestedConfig {
        NestedConfig {
            frame: FrameOverrides {
                width: self.width,
                height: self.height,
                border_style: Some(self.border_style.unwrap_or_default()),
                border_width: self.border_width,
                border_color: Some(self.border_color.unwrap_or_else(|| "#000".to_string())),
                ..FrameOverrides::default()
            },
            clock: ClockOverrides {
                bg_color: self.bg_color,
                font_color: self.font_color,
                font_size: self.font_size,
                show_logo: Some(self.show_logo.unwrap_or(false)),
                show_at_sign: Some(!self.hide_at.unwrap_or(false)),
                centi_beats: Some(!self.hide_centibeats.unwrap_or(false)),
                show_beats_label: Some(self.add_beats.unwrap_or(false)),
                ..ClockOverrides::default()
            },
        }
    }
}

/// A configuration object as supplied by a caller, tagged by shape when deserialized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPreset")]
pub enum PresetSource {
    Nested(NestedConfig),
    LegacyFlat(LegacyFlatConfig),
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawPreset {
    frame: Option<FrameOverrides>,
    clock: Option<ClockOverrides>,
    #[serde(flatten)]
    legacy: LegacyFlatConfig,
}

impl From<RawPreset> for PresetSource {
    fn from(raw: RawPreset) -> Self {
        if raw.legacy.width.is_some() || raw.legacy.font_size.is_some() {
            PresetSource::LegacyFlat(raw.legacy)
        } else {
            PresetSource::Nested(NestedConfig {
                frame: raw.frame.unwrap_or_default(),
                clock: raw.clock.unwrap_or_default(),
            })
        }
    }
}

impl PresetSource {
    pub fn into_nested(self) -> NestedConfig {
        match self {
            PresetSource::Nested(n) => n,
            PresetSource::LegacyFlat(l) => l.into_nested(),
        }
    }
}

impl From<NestedConfig> for PresetSource {
    fn from(n: NestedConfig) -> Self {
        PresetSource::Nested(n)
    }
}

impl From<LegacyFlatConfig> for PresetSource {
    fn from(l: LegacyFlatConfig) -> Self {
        PresetSource::LegacyFlat(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_px() {
        assert_eq!(Numeric::Int(12).px(), Some(12));
        assert_eq!(Numeric::Float(11.6).px(), Some(12));
        assert_eq!(Numeric::from("12px").px(), Some(12));
        assert_eq!(Numeric::from("width: -3px").px(), Some(-3));
        assert_eq!(Numeric::from("wide").px(), None);
        assert_eq!(Numeric::Float(f64::NAN).px(), None);
    }

    #[test]
    fn test_border_style_parse() {
        assert_eq!(BorderStyle::parse("Circle"), Some(BorderStyle::Circle));
        assert_eq!(BorderStyle::parse(" pill "), Some(BorderStyle::Pill));
        assert_eq!(BorderStyle::parse("hexagon"), None);
        assert!(BorderStyle::Square.is_stacked());
        assert!(!BorderStyle::Pill.is_stacked());
    }

    #[test]
    fn test_padding_accepts_scalar_and_list() {
        let one: Padding = serde_yaml::from_str("5").unwrap();
        assert_eq!(one, Padding::uniform(5));
        let four: Padding = serde_yaml::from_str("[2, 4, 2, 6]").unwrap();
        assert_eq!(four, Padding::edges(2, 4, 2, 6));
        assert_eq!(four.to_css(), "2px 4px 2px 6px");
        assert_eq!(four.to_attribute(), "2 4 2 6");
    }

    #[test]
    fn test_source_detects_legacy_shape() {
        let src: PresetSource = serde_yaml::from_str("width: 120\nheight: 40\nhideAt: true").unwrap();
        assert!(matches!(src, PresetSource::LegacyFlat(_)));

        let nested = src.into_nested();
        assert_eq!(nested.frame.width, Some(Numeric::Int(120)));
        assert_eq!(nested.frame.border_style, Some(BorderStyle::Rectangle));
        assert_eq!(nested.frame.border_color.as_deref(), Some("#000"));
        assert_eq!(nested.clock.show_at_sign, Some(false));
        assert_eq!(nested.clock.centi_beats, Some(true));
    }

    #[test]
    fn test_source_nested_shape() {
        let yaml = "frame:\n  width: \"80px\"\n  borderRadius: rounded-2\nclock:\n  fontSize: 14";
        let src: PresetSource = serde_yaml::from_str(yaml).unwrap();
        let PresetSource::Nested(nested) = src else {
            panic!("expected nested shape");
        };
        assert_eq!(nested.frame.width, Some(Numeric::from("80px")));
        assert_eq!(nested.frame.border_radius, Some(RadiusToken::from("rounded-2")));
        assert_eq!(nested.clock.font_size, Some(Numeric::Int(14)));
    }

    #[test]
    fn test_legacy_border_width_zero_is_kept() {
        let legacy = LegacyFlatConfig {
            width: Some(Numeric::Int(90)),
            border_width: Some(Numeric::Int(0)),
            ..LegacyFlatConfig::default()
        };
        let nested = legacy.into_nested();
        assert_eq!(nested.frame.border_width, Some(Numeric::Int(0)));
    }
}
