//! Declarative scene tree produced by the chart routines
//!
//! Coordinates are logical canvas units. A scene is independent of any
//! output format; see `svg` for serialization.

use serde::Serialize;

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Paint attributes shared by every shape
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub dash: Option<String>,
    pub round_cap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSpec {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font_size: f64,
    pub anchor: Anchor,
    pub bold: bool,
    /// Vertically centered on `y` instead of sitting on the baseline
    pub middle_baseline: bool,
    /// Degrees, rotated around (x, y)
    pub rotation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Path { d: String },
    Circle { cx: f64, cy: f64, r: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64, rx: f64 },
    Polygon { points: Vec<(f64, f64)> },
    Text(TextSpec),
    Group { dx: f64, dy: f64, children: Vec<Node> },
}

/// A positioned shape with its style and hover text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub shape: Shape,
    pub style: Style,
    pub tooltip: Option<String>,
}

impl Node {
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            style: Style::default(),
            tooltip: None,
        }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Shape::Line { x1, y1, x2, y2 })
    }

    pub fn path(d: impl Into<String>) -> Self {
        Self::new(Shape::Path { d: d.into() })
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::new(Shape::Circle { cx, cy, r })
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Shape::Rect {
            x,
            y,
            width,
            height,
            rx: 0.0,
        })
    }

    pub fn polygon(points: Vec<(f64, f64)>) -> Self {
        Self::new(Shape::Polygon { points })
    }

    pub fn text(x: f64, y: f64, content: impl Into<String>, font_size: f64) -> Self {
        Self::new(Shape::Text(TextSpec {
            x,
            y,
            content: content.into(),
            font_size,
            anchor: Anchor::Middle,
            bold: false,
            middle_baseline: false,
            rotation: None,
        }))
    }

    /// Group whose children are offset by (dx, dy)
    pub fn group(dx: f64, dy: f64, children: Vec<Node>) -> Self {
        Self::new(Shape::Group { dx, dy, children })
    }

    pub fn fill(mut self, color: impl Into<String>) -> Self {
        self.style.fill = Some(color.into());
        self
    }

    pub fn stroke(mut self, color: impl Into<String>, width: f64) -> Self {
        self.style.stroke = Some(color.into());
        self.style.stroke_width = Some(width);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.style.opacity = Some(opacity);
        self
    }

    pub fn dashed(mut self, pattern: impl Into<String>) -> Self {
        self.style.dash = Some(pattern.into());
        self
    }

    pub fn round_cap(mut self) -> Self {
        self.style.round_cap = true;
        self
    }

    pub fn tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip = Some(text.into());
        self
    }

    /// Corner radius (rects only)
    pub fn rounded(mut self, radius: f64) -> Self {
        if let Shape::Rect { rx, .. } = &mut self.shape {
            *rx = radius;
        }
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        if let Shape::Text(ts) = &mut self.shape {
            ts.anchor = anchor;
        }
        self
    }

    pub fn bold(mut self) -> Self {
        if let Shape::Text(ts) = &mut self.shape {
            ts.bold = true;
        }
        self
    }

    pub fn middle_baseline(mut self) -> Self {
        if let Shape::Text(ts) = &mut self.shape {
            ts.middle_baseline = true;
        }
        self
    }

    pub fn rotate(mut self, degrees: f64) -> Self {
        if let Shape::Text(ts) = &mut self.shape {
            ts.rotation = Some(degrees);
        }
        self
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Node>) {
        out.push(self);
        if let Shape::Group { children, .. } = &self.shape {
            for child in children {
                child.walk(out);
            }
        }
    }
}

/// What a scene represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SceneKind {
    Chart,
    /// "No data" placeholder
    Empty,
    /// Failure placeholder
    Error,
}

/// Complete output of one chart routine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub kind: SceneKind,
    pub title: Option<String>,
    pub nodes: Vec<Node>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            kind: SceneKind::Chart,
            title: None,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind != SceneKind::Chart
    }

    /// Every node, groups flattened depth-first
    pub fn all_nodes(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.walk(&mut out);
        }
        out
    }

    pub fn texts(&self) -> Vec<&str> {
        self.all_nodes()
            .into_iter()
            .filter_map(|n| match &n.shape {
                Shape::Text(ts) => Some(ts.content.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn tooltips(&self) -> Vec<&str> {
        self.all_nodes()
            .into_iter()
            .filter_map(|n| n.tooltip.as_deref())
            .collect()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.all_nodes()
            .into_iter()
            .filter_map(|n| match &n.shape {
                Shape::Path { d } => Some(d.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Count of nodes matching a predicate
    pub fn count(&self, pred: impl Fn(&Shape) -> bool) -> usize {
        self.all_nodes().into_iter().filter(|n| pred(&n.shape)).count()
    }
}
