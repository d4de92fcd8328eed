//! Host markup for embedding a clock in another page.

use crate::attributes::*;
use crate::dom::escape_html;
use crate::preset::{NestedConfig, Numeric};
use crate::settings::DEFAULT_MARKER_CLASS;

/// Minimal host element for a catalog style.
pub fn embed_snippet(style: &str) -> String {
    format!(
        "<div class=\"{}\" {}=\"{}\"></div>",
        DEFAULT_MARKER_CLASS,
        ATTR_STYLE,
        escape_html(style)
    )
}

fn push_px(attrs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<&Numeric>) {
    if let Some(px) = value.and_then(Numeric::px) {
        attrs.push((name, px.to_string()));
    }
}

/// `data-*` attributes carrying every override in `overrides`, in a stable order.
pub fn embed_attributes(overrides: &NestedConfig) -> Vec<(&'static str, String)> {
    let frame = &overrides.frame;
    let clock = &overrides.clock;
    let mut attrs = Vec::new();

    push_px(&mut attrs, ATTR_WIDTH, frame.width.as_ref());
    push_px(&mut attrs, ATTR_HEIGHT, frame.height.as_ref());

    match (clock.transparent_bg, &clock.bg_color) {
        (Some(true), _) => attrs.push((ATTR_BG_COLOR, "transparent".to_string())),
        (Some(false), color) => {
            attrs.push((ATTR_TRANSPARENT_BG, "false".to_string()));
            if let Some(color) = color {
                attrs.push((ATTR_BG_COLOR, color.clone()));
            }
        }
        (None, Some(color)) => attrs.push((ATTR_BG_COLOR, color.clone())),
        (None, None) => {}
    }
    if let Some(color) = &clock.font_color {
        attrs.push((ATTR_FONT_COLOR, color.clone()));
    }
    push_px(&mut attrs, ATTR_FONT_SIZE, clock.font_size.as_ref());

    if let Some(style) = frame.border_style {
        attrs.push((ATTR_BORDER_STYLE, style.as_str().to_string()));
    }
    push_px(&mut attrs, ATTR_BORDER_WIDTH, frame.border_width.as_ref());

    let hide_centibeats = match (clock.centi_beats, clock.hide_centibeats) {
        (None, None) => None,
        (centi, hide) => Some(centi == Some(false) || hide == Some(true)),
    };
    let hide_at = match (clock.show_at_sign, clock.hide_at) {
        (None, None) => None,
        (show, hide) => Some(show == Some(false) || hide == Some(true)),
    };
    let add_beats = match (clock.show_beats_label, clock.add_beats) {
        (None, None) => None,
        (show, add) => Some(show == Some(true) || add == Some(true)),
    };
    for (name, flag) in [
        (ATTR_HIDE_CENTIBEATS, hide_centibeats),
        (ATTR_HIDE_AT, hide_at),
        (ATTR_ADD_BEATS, add_beats),
        (ATTR_SHOW_LOGO, clock.show_logo),
    ] {
        if let Some(flag) = flag {
            attrs.push((name, flag.to_string()));
        }
    }

    if let Some(padding) = &frame.padding {
        attrs.push((ATTR_FRAME_PADDING, padding.to_attribute()));
    }
    if let Some(color) = &frame.border_color {
        attrs.push((ATTR_FRAME_BORDER_COLOR, color.clone()));
    }
    if let Some(radius) = &frame.border_radius {
        attrs.push((ATTR_FRAME_BORDER_RADIUS, radius.to_string()));
    }
    if let Some(show) = frame.show_border {
        attrs.push((ATTR_FRAME_SHOW_BORDER, show.to_string()));
    }
    push_px(&mut attrs, ATTR_AT_SIGN_LEFT_MARGIN, clock.at_sign_left_margin.as_ref());
    push_px(
        &mut attrs,
        ATTR_BEATS_LABEL_LEFT_MARGIN,
        clock.beats_label_left_margin.as_ref(),
    );
    if let Some(title) = &clock.clock_title {
        attrs.push((ATTR_CLOCK_TITLE, title.clone()));
    }
    attrs
}

/// Host element for `style` with `overrides` spelled out as attributes.
/// Initializing it yields the preset with the overrides applied.
pub fn embed_markup(style: &str, overrides: &NestedConfig) -> String {
    let mut out = format!(
        "<div class=\"{}\" {}=\"{}\"",
        DEFAULT_MARKER_CLASS,
        ATTR_STYLE,
        escape_html(style)
    );
    for (name, value) in embed_attributes(overrides) {
        out.push_str(&format!(" {}=\"{}\"", name, escape_html(&value)));
    }
    out.push_str("></div>");
    out
}
