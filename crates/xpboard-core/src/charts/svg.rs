//! SVG serialization of a [`Scene`]

use std::fmt::Write;

use super::geometry::num;
use super::primitives::{Anchor, Node, Scene, Shape, Style};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn style_attrs(style: &Style) -> String {
    let mut attrs = String::new();
    if let Some(fill) = &style.fill {
        let _ = write!(attrs, r#" fill="{}""#, escape(fill));
    }
    if let Some(stroke) = &style.stroke {
        let _ = write!(attrs, r#" stroke="{}""#, escape(stroke));
    }
    if let Some(width) = style.stroke_width {
        let _ = write!(attrs, r#" stroke-width="{}""#, num(width));
    }
    if let Some(opacity) = style.opacity {
        let _ = write!(attrs, r#" opacity="{}""#, num(opacity));
    }
    if let Some(dash) = &style.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{}""#, escape(dash));
    }
    if style.round_cap {
        attrs.push_str(r#" stroke-linecap="round""#);
    }
    attrs
}

/// Append one element (groups recurse) at `depth`
fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    let style = style_attrs(&node.style);
    let title = node
        .tooltip
        .as_deref()
        .map(|t| format!("<title>{}</title>", escape(t)));

    let (tag, attrs, text) = match &node.shape {
        Shape::Line { x1, y1, x2, y2 } => (
            "line",
            format!(
                r#"x1="{}" y1="{}" x2="{}" y2="{}""#,
                num(*x1),
                num(*y1),
                num(*x2),
                num(*y2)
            ),
            None,
        ),
        Shape::Path { d } => ("path", format!(r#"d="{}""#, escape(d)), None),
        Shape::Circle { cx, cy, r } => (
            "circle",
            format!(r#"cx="{}" cy="{}" r="{}""#, num(*cx), num(*cy), num(*r)),
            None,
        ),
        Shape::Rect {
            x,
            y,
            width,
            height,
            rx,
        } => {
            let mut attrs = format!(
                r#"x="{}" y="{}" width="{}" height="{}""#,
                num(*x),
                num(*y),
                num(*width),
                num(*height)
            );
            if *rx > 0.0 {
                let _ = write!(attrs, r#" rx="{}""#, num(*rx));
            }
            ("rect", attrs, None)
        }
        Shape::Polygon { points } => {
            let list: Vec<String> = points
                .iter()
                .map(|(x, y)| format!("{},{}", num(*x), num(*y)))
                .collect();
            ("polygon", format!(r#"points="{}""#, list.join(" ")), None)
        }
        Shape::Text(ts) => {
            let anchor = match ts.anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
                Anchor::End => "end",
            };
            let mut attrs = format!(
                r#"x="{}" y="{}" text-anchor="{}" font-size="{}""#,
                num(ts.x),
                num(ts.y),
                anchor,
                num(ts.font_size)
            );
            if ts.bold {
                attrs.push_str(r#" font-weight="bold""#);
            }
            if ts.middle_baseline {
                attrs.push_str(r#" dominant-baseline="middle""#);
            }
            if let Some(deg) = ts.rotation {
                let _ = write!(
                    attrs,
                    r#" transform="rotate({} {} {})""#,
                    num(deg),
                    num(ts.x),
                    num(ts.y)
                );
            }
            ("text", attrs, Some(escape(&ts.content)))
        }
        Shape::Group { dx, dy, children } => {
            let _ = writeln!(
                out,
                r#"{}<g transform="translate({}, {})"{}>"#,
                indent,
                num(*dx),
                num(*dy),
                style
            );
            if let Some(title) = &title {
                let _ = writeln!(out, "{}  {}", indent, title);
            }
            for child in children {
                write_node(out, child, depth + 1);
            }
            let _ = writeln!(out, "{}</g>", indent);
            return;
        }
    };

    match (text, title) {
        (None, None) => {
            let _ = writeln!(out, "{}<{} {}{}/>", indent, tag, attrs, style);
        }
        (text, title) => {
            let _ = writeln!(
                out,
                "{}<{} {}{}>{}{}</{}>",
                indent,
                tag,
                attrs,
                style,
                title.unwrap_or_default(),
                text.unwrap_or_default(),
                tag
            );
        }
    }
}

/// Standalone SVG document for a scene
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="Inter, Segoe UI, Arial, sans-serif">"#,
        w = num(scene.width),
        h = num(scene.height)
    );
    for node in &scene.nodes {
        write_node(&mut out, node, 1);
    }
    out.push_str("</svg>\n");
    out
}
