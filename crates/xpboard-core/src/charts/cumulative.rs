//! Smoothed cumulative XP curve, one point per project

use super::geometry::{num, Margin};
use super::primitives::{Anchor, Node, Scene};
use super::{add_title, no_data, Canvas, ChartLabels, Palette};
use crate::format::{format_number, format_value};
use crate::models::PointSeries;

const MARGIN: Margin = Margin::new(50.0, 40.0, 120.0, 110.0);
const Y_STEPS: usize = 5;

/// Path of quadratic segments through `points`
///
/// Each control point sits at the horizontal midpoint, at the previous
/// point's height.
pub fn smooth_path(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            d.push_str(&format!("M{},{}", num(x), num(y)));
        } else {
            let (prev_x, prev_y) = points[i - 1];
            let cpx = (prev_x + x) / 2.0;
            d.push_str(&format!(" Q{},{} {},{}", num(cpx), num(prev_y), num(x), num(y)));
        }
    }
    d
}

pub fn render_cumulative_xp(
    series: &PointSeries,
    canvas: Canvas,
    palette: &Palette,
    labels: &ChartLabels,
) -> Scene {
    if series.is_empty() || series.values().all(|v| v == 0.0) {
        return no_data(canvas, palette, &labels.empty_message);
    }

    let chart_width = MARGIN.inner_width(canvas.width);
    let chart_height = MARGIN.inner_height(canvas.height);

    let max = series.values().fold(f64::NEG_INFINITY, f64::max);
    let min = series.values().fold(f64::INFINITY, f64::min);
    let span = if max - min == 0.0 { 1.0 } else { max - min };
    let x_step = chart_width / (series.len().saturating_sub(1).max(1)) as f64;
    let y_scale = |v: f64| chart_height - (v - min) / span * chart_height;

    let mut children = Vec::new();

    for step in 0..=Y_STEPS {
        let fraction = step as f64 / Y_STEPS as f64;
        let y = fraction * chart_height;
        children.push(Node::line(0.0, y, chart_width, y).stroke(&palette.grid, 1.0));
        children.push(
            Node::text(
                -10.0,
                y,
                format_number((max - fraction * (max - min)).round() as i64),
                11.0,
            )
            .anchor(Anchor::End)
            .middle_baseline()
            .fill(&palette.muted),
        );
    }

    for i in 0..series.len() {
        let x = i as f64 * x_step;
        children.push(
            Node::line(x, 0.0, x, chart_height)
                .stroke(&palette.grid, 1.0)
                .opacity(0.5),
        );
    }

    let coords: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64 * x_step, y_scale(p.y)))
        .collect();

    children.push(
        Node::path(smooth_path(&coords))
            .fill("none")
            .stroke(&palette.accent, 4.0)
            .round_cap(),
    );

    for (point, &(x, y)) in series.points.iter().zip(&coords) {
        children.push(
            Node::circle(x, y, 5.0)
                .fill(&palette.accent)
                .stroke(&palette.background, 2.0)
                .tooltip(format!("{}: {}", point.label, format_value(point.y))),
        );
    }

    for (i, point) in series.points.iter().enumerate() {
        let x = i as f64 * x_step;
        let y = chart_height + 35.0 + if i % 2 == 0 { 0.0 } else { 15.0 };
        children.push(
            Node::text(x, y, &point.label, 11.0)
                .anchor(Anchor::End)
                .rotate(-60.0)
                .fill(&palette.muted),
        );
    }

    let mut scene = Scene::new(canvas.width, canvas.height);
    scene.push(Node::group(MARGIN.left, MARGIN.top, children));
    scene.push(
        Node::text(MARGIN.left + chart_width / 2.0, canvas.height, "Projects", 16.0)
            .bold()
            .fill(&palette.muted),
    );
    scene.push(
        Node::text(25.0, MARGIN.top + chart_height / 2.0, "Cumulative XP", 16.0)
            .bold()
            .rotate(-90.0)
            .fill(&palette.muted),
    );
    add_title(&mut scene, palette, &labels.title);
    scene
}
