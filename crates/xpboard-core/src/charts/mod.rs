//! Chart renderer
//!
//! One routine per chart kind, each mapping a series onto a fixed logical
//! canvas and returning a [`Scene`]. Routines never fail: empty or all-zero
//! input yields a centered "no data" placeholder.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{CategoricalSeries, PointSeries, StackedSeries};

pub mod bar;
pub mod cumulative;
pub mod geometry;
pub mod histogram;
pub mod line;
pub mod palette;
pub mod pie;
pub mod primitives;
pub mod radar;
pub mod svg;

pub use palette::Palette;
pub use primitives::{Anchor, Node, Scene, SceneKind, Shape, Style, TextSpec};
pub use svg::to_svg;

/// Logical drawing area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Dashboard chart positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSlot {
    XpProgress,
    CumulativeXp,
    SuccessFailure,
    AuditGivenReceived,
    TopProjects,
    TopSkills,
    LevelHistogram,
    AuditPoints,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 8] = [
        ChartSlot::XpProgress,
        ChartSlot::CumulativeXp,
        ChartSlot::SuccessFailure,
        ChartSlot::AuditGivenReceived,
        ChartSlot::TopProjects,
        ChartSlot::TopSkills,
        ChartSlot::LevelHistogram,
        ChartSlot::AuditPoints,
    ];

    /// Stable identifier, also used as the output file stem
    pub fn id(&self) -> &'static str {
        match self {
            ChartSlot::XpProgress => "xp_progress",
            ChartSlot::CumulativeXp => "cumulative_xp",
            ChartSlot::SuccessFailure => "success_failure",
            ChartSlot::AuditGivenReceived => "audit_given_received",
            ChartSlot::TopProjects => "top_projects",
            ChartSlot::TopSkills => "top_skills",
            ChartSlot::LevelHistogram => "level_histogram",
            ChartSlot::AuditPoints => "audit_points",
        }
    }

    pub fn default_canvas(&self) -> Canvas {
        match self {
            ChartSlot::CumulativeXp => Canvas::new(900.0, 480.0),
            ChartSlot::TopSkills => Canvas::new(500.0, 350.0),
            ChartSlot::LevelHistogram => Canvas::new(500.0, 320.0),
            ChartSlot::AuditPoints => Canvas::new(500.0, 200.0),
            _ => Canvas::new(500.0, 260.0),
        }
    }

    pub fn labels(&self) -> ChartLabels {
        match self {
            ChartSlot::XpProgress => {
                ChartLabels::new("XP Progress Over Time", "No XP data available").with_suffix(" XP")
            }
            ChartSlot::CumulativeXp => {
                ChartLabels::new("Cumulative XP by Project", "No XP data available")
            }
            ChartSlot::SuccessFailure => {
                ChartLabels::new("Project Success Rate", "No success data available")
            }
            ChartSlot::AuditGivenReceived => {
                ChartLabels::new("Audit Distribution", "No audit data available")
                    .with_caption("Audits")
            }
            ChartSlot::TopProjects => {
                ChartLabels::new("XP Distribution by Projects", "No project XP data available")
                    .with_suffix(" XP")
            }
            ChartSlot::TopSkills => {
                ChartLabels::new("Top 6 Skills (Best Score)", "No skills data available")
            }
            ChartSlot::LevelHistogram => {
                ChartLabels::new("Level Distribution", "No level distribution data available")
            }
            ChartSlot::AuditPoints => ChartLabels::new("Audits Points", "No audit points available"),
        }
    }
}

impl fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Text a chart routine needs beyond its data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartLabels {
    pub title: String,
    pub empty_message: String,
    /// Appended to values in tooltips (" XP")
    pub value_suffix: Option<String>,
    /// Text at the center of a donut
    pub caption: Option<String>,
}

impl ChartLabels {
    pub fn new(title: impl Into<String>, empty_message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            empty_message: empty_message.into(),
            ..Default::default()
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.value_suffix = Some(suffix.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub(crate) fn suffix(&self) -> &str {
        self.value_suffix.as_deref().unwrap_or("")
    }
}

/// Centered bold title at the top of the canvas (skipped when blank)
pub(crate) fn add_title(scene: &mut Scene, palette: &Palette, title: &str) {
    if title.trim().is_empty() {
        return;
    }
    scene.title = Some(title.to_string());
    scene.push(
        Node::text(scene.width / 2.0, 15.0, title, 16.0)
            .bold()
            .fill(&palette.text),
    );
}

/// Centered "no data" message
pub fn no_data(canvas: Canvas, palette: &Palette, message: &str) -> Scene {
    let mut scene = Scene::new(canvas.width, canvas.height);
    scene.kind = SceneKind::Empty;
    scene.push(
        Node::text(canvas.width / 2.0, canvas.height / 2.0, message, 16.0).fill(&palette.placeholder),
    );
    scene
}

/// Placeholder for a chart whose preparation failed
pub fn error_placeholder(canvas: Canvas, palette: &Palette, message: &str) -> Scene {
    let mut scene = Scene::new(canvas.width, canvas.height);
    scene.kind = SceneKind::Error;
    let (cx, cy) = (canvas.width / 2.0, canvas.height / 2.0);
    scene.push(
        Node::text(cx, cy - 10.0, "Chart unavailable", 16.0)
            .bold()
            .fill(&palette.error),
    );
    scene.push(Node::text(cx, cy + 14.0, message, 12.0).fill(&palette.muted));
    scene
}

/// Chart routines bound to one palette
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    palette: Palette,
}

impl ChartRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn render_line(&self, series: &PointSeries, canvas: Canvas, labels: &ChartLabels) -> Scene {
        line::render_line(series, canvas, &self.palette, labels)
    }

    pub fn render_pie(
        &self,
        series: &CategoricalSeries,
        canvas: Canvas,
        labels: &ChartLabels,
    ) -> Scene {
        pie::render_pie(series, canvas, &self.palette, labels)
    }

    pub fn render_donut(
        &self,
        series: &CategoricalSeries,
        canvas: Canvas,
        labels: &ChartLabels,
    ) -> Scene {
        pie::render_donut(series, canvas, &self.palette, labels)
    }

    pub fn render_bars(
        &self,
        series: &CategoricalSeries,
        canvas: Canvas,
        labels: &ChartLabels,
    ) -> Scene {
        bar::render_bars(series, canvas, &self.palette, labels)
    }

    pub fn render_horizontal_bars(
        &self,
        series: &CategoricalSeries,
        canvas: Canvas,
        labels: &ChartLabels,
    ) -> Scene {
        bar::render_horizontal_bars(series, canvas, &self.palette, labels)
    }

    pub fn render_radar(
        &self,
        series: &CategoricalSeries,
        canvas: Canvas,
        labels: &ChartLabels,
    ) -> Scene {
        radar::render_radar(series, canvas, &self.palette, labels)
    }

    pub fn render_level_histogram(
        &self,
        series: &StackedSeries,
        user_level: Option<i64>,
        canvas: Canvas,
        labels: &ChartLabels,
    ) -> Scene {
        histogram::render_level_histogram(series, user_level, canvas, &self.palette, labels)
    }

    pub fn render_cumulative_xp(
        &self,
        series: &PointSeries,
        canvas: Canvas,
        labels: &ChartLabels,
    ) -> Scene {
        cumulative::render_cumulative_xp(series, canvas, &self.palette, labels)
    }

    pub fn render_error(&self, canvas: Canvas, message: &str) -> Scene {
        error_placeholder(canvas, &self.palette, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_ids_unique() {
        let mut ids: Vec<&str> = ChartSlot::ALL.iter().map(ChartSlot::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ChartSlot::ALL.len());
        assert_eq!(ChartSlot::TopSkills.to_string(), "top_skills");
    }

    #[test]
    fn test_placeholders() {
        let palette = Palette::default();
        let empty = no_data(Canvas::new(500.0, 260.0), &palette, "No XP data available");
        assert_eq!(empty.kind, SceneKind::Empty);
        assert!(empty.title.is_none());

        let failed = error_placeholder(Canvas::new(500.0, 260.0), &palette, "boom");
        assert_eq!(failed.kind, SceneKind::Error);
        assert_eq!(failed.texts(), vec!["Chart unavailable", "boom"]);
    }

    #[test]
    fn test_every_slot_has_title_and_message() {
        for slot in ChartSlot::ALL {
            let labels = slot.labels();
            assert!(!labels.title.is_empty(), "{} has no title", slot);
            assert!(!labels.empty_message.is_empty());
        }
    }
}
