//! Vertical and horizontal bar charts

use super::geometry::Margin;
use super::primitives::{Anchor, Node, Scene};
use super::{add_title, no_data, Canvas, ChartLabels, Palette};
use crate::format::{format_value, truncate_label};
use crate::models::CategoricalSeries;

const VERTICAL_MARGIN: Margin = Margin::new(20.0, 30.0, 80.0, 60.0);
const HORIZONTAL_MARGIN: Margin = Margin::new(30.0, 60.0, 30.0, 110.0);
const NAME_MAX_CHARS: usize = 15;
/// Bars narrower than this get their value label outside
const INSIDE_LABEL_MIN_LENGTH: f64 = 60.0;

pub fn render_bars(
    series: &CategoricalSeries,
    canvas: Canvas,
    palette: &Palette,
    labels: &ChartLabels,
) -> Scene {
    if series.is_empty() || series.is_all_zero() {
        return no_data(canvas, palette, &labels.empty_message);
    }

    let chart_width = VERTICAL_MARGIN.inner_width(canvas.width);
    let chart_height = VERTICAL_MARGIN.inner_height(canvas.height);
    let max_value = series.items.iter().map(|c| c.value).fold(0.0, f64::max);
    if max_value <= 0.0 {
        return no_data(canvas, palette, &labels.empty_message);
    }
    let slot = chart_width / series.len() as f64;
    let bar_width = slot * 0.8;
    let bar_spacing = slot * 0.2;

    let mut children = Vec::new();
    for (i, category) in series.items.iter().enumerate() {
        let bar_height = (category.value.max(0.0) / max_value) * chart_height;
        let x = i as f64 * (bar_width + bar_spacing);
        let y = chart_height - bar_height;
        let center = x + bar_width / 2.0;

        children.push(
            Node::rect(x, y, bar_width, bar_height)
                .fill(&category.color)
                .tooltip(format!(
                    "{}: {}{}",
                    category.label,
                    format_value(category.value),
                    labels.suffix()
                )),
        );
        children.push(Node::text(center, y - 5.0, format_value(category.value), 12.0).fill(&palette.text));
        children.push(
            Node::text(
                center,
                chart_height + 15.0,
                truncate_label(&category.label, NAME_MAX_CHARS),
                10.0,
            )
            .rotate(45.0)
            .fill(&palette.text),
        );
    }

    let mut scene = Scene::new(canvas.width, canvas.height);
    scene.push(Node::group(VERTICAL_MARGIN.left, VERTICAL_MARGIN.top, children));
    add_title(&mut scene, palette, &labels.title);
    scene
}

pub fn render_horizontal_bars(
    series: &CategoricalSeries,
    canvas: Canvas,
    palette: &Palette,
    labels: &ChartLabels,
) -> Scene {
    if series.is_empty() || series.is_all_zero() {
        return no_data(canvas, palette, &labels.empty_message);
    }

    let chart_width = HORIZONTAL_MARGIN.inner_width(canvas.width);
    let chart_height = HORIZONTAL_MARGIN.inner_height(canvas.height);
    let max_value = series.items.iter().map(|c| c.value).fold(1.0, f64::max);
    // Gaps are 1.5 bars wide; rows plus gaps leave one bar of slack at the bottom
    let rows = series.len().max(2) as f64;
    let bar_height = chart_height / (2.5 * rows - 1.0);
    let bar_spacing = bar_height * 1.5;

    let mut children = Vec::new();
    for (i, category) in series.items.iter().enumerate() {
        let length = (category.value.max(0.0) / max_value) * chart_width;
        let y = i as f64 * (bar_height + bar_spacing);
        let text_y = y + bar_height / 2.0 + 6.0;

        children.push(
            Node::rect(0.0, y, length, bar_height)
                .fill(&category.color)
                .tooltip(format!(
                    "{}: {}{}",
                    category.label,
                    format_value(category.value),
                    labels.suffix()
                )),
        );

        let value = format_value(category.value);
        let value_label = if length > INSIDE_LABEL_MIN_LENGTH {
            Node::text(length - 10.0, text_y, value, 16.0)
                .anchor(Anchor::End)
                .fill(&palette.background)
        } else {
            Node::text(length + 10.0, text_y, value, 16.0)
                .anchor(Anchor::Start)
                .fill(&palette.text)
        };
        children.push(value_label.bold());
        children.push(
            Node::text(-15.0, text_y, &category.label, 16.0)
                .anchor(Anchor::End)
                .fill(&palette.text),
        );
    }

    let mut scene = Scene::new(canvas.width, canvas.height);
    scene.push(Node::group(HORIZONTAL_MARGIN.left, HORIZONTAL_MARGIN.top, children));
    add_title(&mut scene, palette, &labels.title);
    scene
}
