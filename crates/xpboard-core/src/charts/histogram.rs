//! Stacked level histogram with the "Your Level" annotation

use super::geometry::Margin;
use super::primitives::{Anchor, Node, Scene};
use super::{add_title, no_data, Canvas, ChartLabels, Palette};
use crate::format::format_number;
use crate::models::StackedSeries;

const MARGIN: Margin = Margin::new(50.0, 30.0, 40.0, 60.0);
const MAX_BAR_WIDTH: f64 = 28.0;
const Y_STEPS: usize = 5;
const LEGEND_STEP: f64 = 100.0;
const CALLOUT_WIDTH: f64 = 60.0;
const CALLOUT_HEIGHT: f64 = 18.0;

pub fn render_level_histogram(
    series: &StackedSeries,
    user_level: Option<i64>,
    canvas: Canvas,
    palette: &Palette,
    labels: &ChartLabels,
) -> Scene {
    let max_total = series.max_total();
    if series.is_empty() || max_total == 0 {
        return no_data(canvas, palette, &labels.empty_message);
    }

    let chart_width = MARGIN.inner_width(canvas.width);
    let chart_height = MARGIN.inner_height(canvas.height);
    let max_total = max_total as f64;
    let n = series.rows.len() as f64;
    let bar_width = (chart_width / n * 0.7).min(MAX_BAR_WIDTH);
    let bar_gap = bar_width * 0.3;
    let offset = (chart_width - n * (bar_width + bar_gap)) / 2.0;

    let mut children = Vec::new();

    for step in 0..=Y_STEPS {
        let fraction = step as f64 / Y_STEPS as f64;
        let y = fraction * chart_height;
        children.push(Node::line(0.0, y, chart_width, y).stroke(&palette.grid, 1.0));
        children.push(
            Node::text(
                -10.0,
                y,
                format_number((max_total - fraction * max_total).round() as i64),
                10.0,
            )
            .anchor(Anchor::End)
            .middle_baseline()
            .fill(&palette.muted),
        );
    }

    let mut user_bar_x = None;

    for (i, row) in series.rows.iter().enumerate() {
        let x = i as f64 * (bar_width + bar_gap) + offset;
        let is_user_level = user_level == Some(row.category);
        if is_user_level {
            user_bar_x = Some(x + bar_width / 2.0);
        }

        let mut y = chart_height;
        for (sub, &count) in series.subcategories.iter().zip(&row.counts) {
            if count == 0 {
                continue;
            }
            let height = count as f64 / max_total * chart_height;
            y -= height;
            let mut segment = Node::rect(x, y, bar_width, height)
                .rounded(3.0)
                .fill(&sub.color)
                .tooltip(format!(
                    "Level {} ({}): {} users",
                    row.category,
                    sub.name,
                    format_number(count as i64)
                ));
            if is_user_level {
                segment = segment.stroke(&palette.primary, 2.0);
            }
            children.push(segment);
        }

        children.push(
            Node::text(x + bar_width / 2.0, y - 4.0, format_number(row.total() as i64), 11.0)
                .fill(&palette.muted),
        );
        children.push(
            Node::text(
                x + bar_width / 2.0,
                chart_height + 16.0,
                row.category.to_string(),
                10.0,
            )
            .fill(&palette.muted),
        );
    }

    if let Some(ux) = user_bar_x {
        children.push(
            Node::line(ux, 0.0, ux, chart_height + 10.0)
                .stroke(&palette.highlight, 3.0)
                .dashed("6,3")
                .opacity(0.85),
        );
        children.push(
            Node::rect(
                ux - CALLOUT_WIDTH / 2.0,
                -CALLOUT_HEIGHT - 6.0,
                CALLOUT_WIDTH,
                CALLOUT_HEIGHT,
            )
            .rounded(8.0)
            .fill(&palette.highlight)
            .stroke(&palette.background, 1.0),
        );
        children.push(
            Node::text(ux, -CALLOUT_HEIGHT / 2.0 - 2.0, "Your Level", 11.0)
                .bold()
                .fill(&palette.background),
        );
    }

    let legend = series
        .subcategories
        .iter()
        .enumerate()
        .flat_map(|(i, sub)| {
            let lx = i as f64 * LEGEND_STEP;
            [
                Node::rect(lx, 0.0, 18.0, 18.0).rounded(4.0).fill(&sub.color),
                Node::text(lx + 24.0, 13.0, &sub.name, 13.0)
                    .anchor(Anchor::Start)
                    .fill(&palette.text),
            ]
        })
        .collect();
    children.push(Node::group(0.0, -24.0, legend));

    children.push(
        Node::text(chart_width / 2.0, chart_height + 36.0, "Levels", 15.0)
            .bold()
            .fill(&palette.muted),
    );
    children.push(
        Node::text(-38.0, chart_height / 2.0, "Number of users", 15.0)
            .bold()
            .rotate(-90.0)
            .fill(&palette.muted),
    );

    let mut scene = Scene::new(canvas.width, canvas.height);
    scene.push(Node::group(MARGIN.left, MARGIN.top, children));
    add_title(&mut scene, palette, &labels.title);
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::primitives::{SceneKind, Shape};
    use crate::models::{StackedRow, Subcategory};

    fn histogram() -> StackedSeries {
        StackedSeries {
            subcategories: vec![
                Subcategory {
                    name: "Cohort 1".to_string(),
                    color: "#6366f1".to_string(),
                },
                Subcategory {
                    name: "Cohort 2".to_string(),
                    color: "#a78bfa".to_string(),
                },
            ],
            rows: vec![
                StackedRow {
                    category: 3,
                    counts: vec![1, 1],
                    unknown: 5,
                },
                StackedRow {
                    category: 8,
                    counts: vec![4, 0],
                    unknown: 0,
                },
            ],
        }
    }

    fn labels() -> ChartLabels {
        ChartLabels::new("Level Distribution", "No level distribution data available")
    }

    fn segment_heights(scene: &Scene) -> Vec<f64> {
        scene
            .all_nodes()
            .into_iter()
            .filter(|n| n.tooltip.is_some())
            .filter_map(|n| match n.shape {
                Shape::Rect { height, .. } => Some(height),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_segments_proportional_to_global_max() {
        let scene = render_level_histogram(
            &histogram(),
            None,
            Canvas::new(500.0, 320.0),
            &Palette::default(),
            &labels(),
        );

        // chart height 230, max stacked total 4 (unknown bucket ignored)
        assert_eq!(segment_heights(&scene), vec![57.5, 57.5, 230.0]);
        assert!(scene.tooltips().contains(&"Level 3 (Cohort 2): 1 users"));
        assert!(!scene.texts().contains(&"Your Level"));
        assert!(scene.texts().contains(&"Number of users"));
    }

    #[test]
    fn test_user_level_annotation() {
        let scene = render_level_histogram(
            &histogram(),
            Some(8),
            Canvas::new(500.0, 320.0),
            &Palette::default(),
            &labels(),
        );

        assert!(scene.texts().contains(&"Your Level"));
        let dashed = scene
            .all_nodes()
            .into_iter()
            .filter(|n| n.style.dash.as_deref() == Some("6,3"))
            .count();
        assert_eq!(dashed, 1);
    }

    #[test]
    fn test_unknown_level_has_no_annotation() {
        let scene = render_level_histogram(
            &histogram(),
            Some(42),
            Canvas::new(500.0, 320.0),
            &Palette::default(),
            &labels(),
        );
        assert!(!scene.texts().contains(&"Your Level"));
    }

    #[test]
    fn test_empty_histogram_placeholder() {
        let scene = render_level_histogram(
            &StackedSeries::default(),
            None,
            Canvas::new(500.0, 320.0),
            &Palette::default(),
            &labels(),
        );
        assert_eq!(scene.kind, SceneKind::Empty);
    }
}
