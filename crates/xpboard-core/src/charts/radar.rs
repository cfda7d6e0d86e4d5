//! Radar (spider) chart for percentage scores

use std::f64::consts::PI;

use super::geometry::Margin;
use super::primitives::{Node, Scene};
use super::{add_title, no_data, Canvas, ChartLabels, Palette};
use crate::format::format_value;
use crate::models::CategoricalSeries;

const MARGIN: Margin = Margin::new(30.0, 30.0, 60.0, 60.0);
const GRID_STEPS: usize = 5;
const LABEL_OFFSET: f64 = 28.0;

/// Spoke angle: 12 o'clock first, then clockwise
fn spoke_angle(index: usize, count: usize) -> f64 {
    PI / 2.0 - 2.0 * PI * index as f64 / count as f64
}

/// Screen point at `r` along spoke `angle` (y grows downward)
fn spoke_point(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.cos(), cy - r * angle.sin())
}

pub fn render_radar(
    series: &CategoricalSeries,
    canvas: Canvas,
    palette: &Palette,
    labels: &ChartLabels,
) -> Scene {
    if series.is_empty() || series.is_all_zero() {
        return no_data(canvas, palette, &labels.empty_message);
    }

    let chart_width = MARGIN.inner_width(canvas.width);
    let chart_height = MARGIN.inner_height(canvas.height);
    let cx = MARGIN.left + chart_width / 2.0;
    let cy = MARGIN.top + chart_height / 2.0 + 10.0;
    let radius = (chart_width.min(chart_height) / 2.0 - 30.0).max(0.0);
    let n = series.len();

    let mut scene = Scene::new(canvas.width, canvas.height);

    for step in 1..=GRID_STEPS {
        let r = radius * step as f64 / GRID_STEPS as f64;
        let ring = (0..n)
            .map(|i| spoke_point(cx, cy, r, spoke_angle(i, n)))
            .collect();
        scene.push(Node::polygon(ring).fill("none").stroke(&palette.grid, 1.0));
    }

    for i in 0..n {
        let (x, y) = spoke_point(cx, cy, radius, spoke_angle(i, n));
        scene.push(Node::line(cx, cy, x, y).stroke(&palette.grid, 1.0));
    }

    let points: Vec<(f64, f64)> = series
        .items
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let r = (c.value / 100.0).clamp(0.0, 1.0) * radius;
            spoke_point(cx, cy, r, spoke_angle(i, n))
        })
        .collect();

    scene.push(
        Node::polygon(points.clone())
            .fill(&palette.radar)
            .opacity(0.3),
    );
    scene.push(
        Node::polygon(points.clone())
            .fill("none")
            .stroke(&palette.radar, 2.0),
    );

    for (category, (x, y)) in series.items.iter().zip(&points) {
        scene.push(
            Node::circle(*x, *y, 5.0)
                .fill(&palette.radar)
                .stroke(&palette.radar, 2.0)
                .tooltip(format!("{}: {}%", category.label, format_value(category.value))),
        );
    }

    for (i, category) in series.items.iter().enumerate() {
        let (lx, ly) = spoke_point(cx, cy, radius + LABEL_OFFSET, spoke_angle(i, n));
        let label = Node::text(lx, ly + 6.0, category.label.to_lowercase(), 15.0);
        scene.push(if i == 0 {
            label.bold().fill(&palette.text)
        } else {
            label.fill(&palette.muted)
        });
    }

    add_title(&mut scene, palette, &labels.title);
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::primitives::Shape;
    use crate::models::Category;

    fn skills() -> CategoricalSeries {
        ["Go", "JS", "HTML", "SQL"]
            .iter()
            .zip([65.0, 50.0, 100.0, 0.0])
            .map(|(name, v)| Category::new(*name, v, "#133E82"))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_grid_and_markers() {
        let scene = render_radar(
            &skills(),
            Canvas::new(500.0, 350.0),
            &Palette::default(),
            &ChartLabels::new("Top 6 Skills (Best Score)", "No skills data"),
        );

        // 5 grid rings + fill + border
        assert_eq!(scene.count(|s| matches!(s, Shape::Polygon { .. })), 7);
        assert_eq!(scene.count(|s| matches!(s, Shape::Line { .. })), 4);
        assert_eq!(scene.tooltips(), vec!["Go: 65%", "JS: 50%", "HTML: 100%", "SQL: 0%"]);
        assert!(scene.texts().contains(&"go"));
    }

    #[test]
    fn test_first_spoke_points_up() {
        let scene = render_radar(
            &skills(),
            Canvas::new(500.0, 350.0),
            &Palette::default(),
            &ChartLabels::new("", "none"),
        );
        let first_marker = scene
            .all_nodes()
            .into_iter()
            .find_map(|n| match n.shape {
                Shape::Circle { cx, cy, .. } => Some((cx, cy)),
                _ => None,
            })
            .unwrap();

        // chart 410x260, center (265, 170), radius 100, score 65
        assert!((first_marker.0 - 265.0).abs() < 1e-9);
        assert!((first_marker.1 - 105.0).abs() < 1e-9);
    }
}
