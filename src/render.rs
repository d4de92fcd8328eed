//! Builds a clock under its host element and rewrites its digits on each tick.

use crate::attributes::ClockConfig;
use crate::beats::{Beats, BeatsText, DisplayOptions};
use crate::dom::{Document, NodeId};
use crate::error::{ClockError, ClockResult};

/// Swiss flag, sized by the clock's font size.
const FLAG_SVG: &str = r##"<svg version="1.1" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 512 512" preserveAspectRatio="xMidYMid meet" style="height:{size}px"><path d="M0 0 C168.96 0 337.92 0 512 0 C512 168.96 512 337.92 512 512 C343.04 512 174.08 512 0 512 C0 343.04 0 174.08 0 0 Z" fill="#D90021"/><path d="M0 0 C42.9 0 85.8 0 130 0 C130 51.15 130 102.3 130 155 C181.81 155 233.62 155 287 155 C287 198.56 287 242.12 287 287 C235.19 287 183.38 287 130 287 C130 339.47 130 391.94 130 446 C87.1 446 44.2 446 0 446 C0 393.53 0 341.06 0 287 C-52.47 287 -104.94 287 -159 287 C-159 243.44 -159 199.88 -159 155 C-106.53 155 -54.06 155 0 155 C0 103.85 0 52.7 0 0 Z" fill="#FFFFFF" transform="translate(190,33)"/></svg>"##;

pub const CLASS_FRAME: &str = "clockframe";
pub const CLASS_STACKED: &str = "clockframe--stacked";
pub const CLASS_CLOCK: &str = "clock";
pub const CLASS_LOGO: &str = "logo";
pub const CLASS_SIGNTIME: &str = "signtime";
pub const CLASS_ATSIGN: &str = "atsign";
pub const CLASS_TIMEWRAP: &str = "timewrap";
pub const CLASS_TIME: &str = "time";
pub const CLASS_CENTIBEATS: &str = "centibeats";
pub const CLASS_BEATS: &str = "beats";

/// Handles to the nodes a clock rewrites on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockView {
    pub host: NodeId,
    pub frame: NodeId,
    pub at_sign: NodeId,
    pub time: NodeId,
    pub centibeats: NodeId,
    pub beats: NodeId,
}

/// Inline style of the outer frame.
pub fn frame_css(config: &ClockConfig) -> String {
    let mut css = String::new();
    css.push_str(&format!("width:{}px;", config.width));
    css.push_str(&format!("height:{}px;", config.height));
    css.push_str(&format!("background-color:{};", config.bg_color));
    if config.show_border {
        css.push_str(&format!(
            "border:{}px solid {};",
            config.border_width, config.border_color
        ));
    } else {
        css.push_str("border:none;");
    }
    css.push_str(&format!("border-radius:{};", config.border_radius));
    css.push_str("box-sizing:border-box;");
    match &config.padding {
        Some(p) => css.push_str(&format!("padding:{};", p.to_css())),
        None => {
            let (v, h) = auto_padding(config.font_size);
            css.push_str(&format!("padding:{}px {}px;", v, h));
        }
    }
    css.push_str("overflow:hidden;");
    css
}

/// Vertical and horizontal padding derived from the font size.
fn auto_padding(font_size: i64) -> (i64, i64) {
    let size = font_size as f64;
    let v = ((size * 0.08).round() as i64).max(2);
    let h = ((size * 0.125).round() as i64).max(3);
    (v, h)
}

fn margin_css(margin: Option<i64>) -> Option<String> {
    margin.map(|m| format!("margin-left:{}px;", m))
}

/// Replace whatever the host holds with a fresh clock structure.
pub fn construct(doc: &mut Document, host: NodeId, config: &ClockConfig) -> ClockResult<ClockView> {
    if doc.element(host).is_none() {
        return Err(if doc.contains(host) {
            ClockError::NotAnElement { node: host }
        } else {
            ClockError::NodeNotFound { node: host }
        });
    }
    doc.clear_children(host)?;

    let frame = doc.create_element(host, "div")?;
    let frame_class = if config.border_style.is_stacked() {
        format!("{} {}", CLASS_FRAME, CLASS_STACKED)
    } else {
        CLASS_FRAME.to_string()
    };
    doc.set_attribute(frame, "class", frame_class)?;
    doc.set_attribute(frame, "title", config.clock_title.as_str())?;
    doc.set_attribute(frame, "style", frame_css(config))?;

    let clock = doc.create_element(frame, "div")?;
    doc.set_attribute(clock, "class", CLASS_CLOCK)?;
    doc.set_attribute(
        clock,
        "style",
        format!("color:{};font-size:{}px;", config.font_color, config.font_size),
    )?;

    if config.show_logo {
        let logo = doc.create_element(clock, "span")?;
        doc.set_attribute(logo, "class", CLASS_LOGO)?;
        doc.append_raw(logo, &FLAG_SVG.replace("{size}", &config.font_size.to_string()))?;
    }

    let sign_time = doc.create_element(clock, "span")?;
    doc.set_attribute(sign_time, "class", CLASS_SIGNTIME)?;

    let at_sign = doc.create_element(sign_time, "span")?;
    doc.set_attribute(at_sign, "class", CLASS_ATSIGN)?;
    if let Some(css) = margin_css(config.at_sign_left_margin) {
        doc.set_attribute(at_sign, "style", css)?;
    }
    doc.append_text(at_sign, "@")?;

    let time_wrap = doc.create_element(sign_time, "span")?;
    doc.set_attribute(time_wrap, "class", CLASS_TIMEWRAP)?;
    let time = doc.create_element(time_wrap, "span")?;
    doc.set_attribute(time, "class", CLASS_TIME)?;
    doc.append_text(time, "000")?;
    let centibeats = doc.create_element(time_wrap, "span")?;
    doc.set_attribute(centibeats, "class", CLASS_CENTIBEATS)?;
    doc.append_text(centibeats, ".00")?;

    let beats = doc.create_element(clock, "span")?;
    doc.set_attribute(beats, "class", CLASS_BEATS)?;
    if let Some(css) = margin_css(config.beats_label_left_margin) {
        doc.set_attribute(beats, "style", css)?;
    }
    doc.append_text(beats, "beats")?;

    Ok(ClockView {
        host,
        frame,
        at_sign,
        time,
        centibeats,
        beats,
    })
}

/// Rewrite the text of an existing clock. Structure is left untouched.
pub fn update(
    doc: &mut Document,
    view: &ClockView,
    options: DisplayOptions,
    beats: Beats,
) -> ClockResult<()> {
    let text = BeatsText::new(beats, options);
    let parts = [
        (view.at_sign, CLASS_ATSIGN, text.at_sign),
        (view.time, CLASS_TIME, text.whole.as_str()),
        (view.centibeats, CLASS_CENTIBEATS, text.centibeats.as_str()),
        (view.beats, CLASS_BEATS, text.label),
    ];
    for (node, part, value) in parts {
        if !doc.contains(node) {
            return Err(ClockError::MissingViewNode {
                host: view.host,
                part,
            });
        }
        doc.set_text(node, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::resolve;
    use crate::catalog::Catalog;
    use crate::dom::DataAttributes;
    use crate::normalize::normalize_named;

    fn config(name: &str) -> ClockConfig {
        resolve(&DataAttributes::new(), &normalize_named(Catalog::builtin(), name)).config
    }

    fn host_doc() -> (Document, NodeId) {
        let doc = Document::parse(r#"<div class="internetTime">placeholder</div>"#).unwrap();
        let host = doc.first_by_class(doc.root(), "internetTime").unwrap();
        (doc, host)
    }

    #[test]
    fn test_construct_structure() {
        let (mut doc, host) = host_doc();
        let view = construct(&mut doc, host, &config("rectangle-medium")).unwrap();

        assert_eq!(doc.children(host), &[view.frame]);
        assert_eq!(doc.attribute(view.frame, "class"), Some("clockframe"));
        assert_eq!(doc.attribute(view.frame, "title"), Some("Swatch Internet Time"));
        assert!(doc.first_by_class(host, "logo").is_some());
        assert_eq!(doc.text_content(view.time), "000");
        assert_eq!(doc.text_content(view.centibeats), ".00");
        assert_eq!(doc.text_content(host), "@000.00beats");
        assert!(!doc.text_content(host).contains("placeholder"));
    }

    #[test]
    fn test_frame_css() {
        let css = frame_css(&config("rectangle-medium"));
        assert_eq!(
            css,
            "width:100px;height:30px;background-color:#FFFFFF;border:1px solid #000000;\
border-radius:0px;box-sizing:border-box;padding:4px 6px 4px 10px;overflow:hidden;"
        );

        let css = frame_css(&config("minimal-plain-small"));
        assert!(css.contains("border:none;"));
        assert!(css.contains("background-color:transparent;"));
    }

    #[test]
    fn test_auto_padding() {
        let mut c = config("rectangle-small");
        c.padding = None;
        c.font_size = 24;
        assert!(frame_css(&c).contains("padding:2px 3px;"));
        c.font_size = 48;
        assert!(frame_css(&c).contains("padding:4px 6px;"));
    }

    #[test]
    fn test_stacked_modifier() {
        let (mut doc, host) = host_doc();
        let view = construct(&mut doc, host, &config("circle-small")).unwrap();
        assert!(doc.has_class(view.frame, CLASS_STACKED));
        let css = doc.attribute(view.frame, "style").unwrap();
        assert!(css.contains("border-radius:50%;"));
    }

    #[test]
    fn test_margins_rendered() {
        let (mut doc, host) = host_doc();
        let view = construct(&mut doc, host, &config("pill-medium")).unwrap();
        assert_eq!(doc.attribute(view.at_sign, "style"), Some("margin-left:2px;"));
        assert_eq!(doc.attribute(view.beats, "style"), Some("margin-left:6px;"));
    }

    #[test]
    fn test_update_rewrites_text_only() {
        let (mut doc, host) = host_doc();
        let cfg = config("rectangle-small");
        let view = construct(&mut doc, host, &cfg).unwrap();
        let nodes = doc.live_nodes();

        for ms in (0..86_400_000).step_by(3_600_000) {
            update(&mut doc, &view, cfg.display_options(), Beats::from_unix_millis(ms)).unwrap();
        }
        assert_eq!(doc.live_nodes(), nodes);

        update(&mut doc, &view, cfg.display_options(), Beats::from_unix_millis(0)).unwrap();
        assert_eq!(doc.text_content(view.time), "041");
        assert_eq!(doc.text_content(view.centibeats), ".67");
        assert_eq!(doc.text_content(view.beats), "");
    }

    #[test]
    fn test_update_hidden_parts() {
        let (mut doc, host) = host_doc();
        let view = construct(&mut doc, host, &config("rectangle-small")).unwrap();
        let options = DisplayOptions {
            hide_at: true,
            hide_centibeats: true,
            add_beats: true,
        };
        update(&mut doc, &view, options, Beats::from_unix_millis(0)).unwrap();
        assert_eq!(doc.text_content(view.at_sign), "");
        assert_eq!(doc.text_content(view.centibeats), "");
        assert_eq!(doc.text_content(view.beats), "beats");
    }

    #[test]
    fn test_update_after_removal_fails() {
        let (mut doc, host) = host_doc();
        let view = construct(&mut doc, host, &config("rectangle-small")).unwrap();
        doc.clear_children(host).unwrap();
        let err = update(&mut doc, &view, DisplayOptions::default(), Beats::now()).unwrap_err();
        assert_eq!(
            err,
            ClockError::MissingViewNode {
                host,
                part: CLASS_ATSIGN
            }
        );
    }

    #[test]
    fn test_construct_on_missing_host() {
        let (mut doc, host) = host_doc();
        doc.remove(host).unwrap();
        assert_eq!(
            construct(&mut doc, host, &config("rectangle-small")),
            Err(ClockError::NodeNotFound { node: host })
        );
    }
}
