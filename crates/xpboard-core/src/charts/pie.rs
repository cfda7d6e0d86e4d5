//! Pie and donut charts over a categorical series

use std::f64::consts::PI;

use super::geometry::{large_arc, num, polar};
use super::primitives::{Anchor, Node, Scene};
use super::{add_title, no_data, Canvas, ChartLabels, Palette};
use crate::format::format_value;
use crate::models::{CategoricalSeries, Category};

const START_ANGLE: f64 = -PI / 2.0;
const DONUT_INNER_RATIO: f64 = 0.6;

struct Slice<'a> {
    category: &'a Category,
    start: f64,
    end: f64,
    percent: f64,
}

/// Positive-valued slices clockwise from 12 o'clock, plus the total
fn slices(series: &CategoricalSeries) -> (Vec<Slice<'_>>, f64) {
    let total: f64 = series.items.iter().map(|c| c.value.max(0.0)).sum();
    let mut angle = START_ANGLE;
    let mut out = Vec::new();

    if total <= 0.0 {
        return (out, total);
    }

    for category in series.items.iter().filter(|c| c.value > 0.0) {
        let sweep = category.value / total * 2.0 * PI;
        out.push(Slice {
            category,
            start: angle,
            end: angle + sweep,
            percent: category.value / total * 100.0,
        });
        angle += sweep;
    }
    (out, total)
}

fn outer_radius(canvas: Canvas) -> f64 {
    (canvas.width.min(canvas.height) / 2.0 - 40.0).max(0.0)
}

fn share_label(category: &Category, total: f64) -> String {
    let percent = if total > 0.0 {
        (category.value.max(0.0) / total * 100.0).round()
    } else {
        0.0
    };
    format!("{}: {} ({}%)", category.label, format_value(category.value), percent)
}

fn legend(series: &CategoricalSeries, palette: &Palette) -> Node {
    let entries = series
        .items
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            let y = i as f64 * 22.0;
            [
                Node::circle(9.0, y + 9.0, 9.0)
                    .fill(&c.color)
                    .stroke(&palette.background, 2.0),
                Node::text(24.0, y + 14.0, &c.label, 13.0)
                    .anchor(Anchor::Start)
                    .bold()
                    .fill(&palette.text),
            ]
        })
        .collect();
    Node::group(10.0, 30.0, entries)
}

pub fn render_pie(
    series: &CategoricalSeries,
    canvas: Canvas,
    palette: &Palette,
    labels: &ChartLabels,
) -> Scene {
    let (slices, total) = slices(series);
    if slices.is_empty() {
        return no_data(canvas, palette, &labels.empty_message);
    }

    let radius = outer_radius(canvas);
    let (cx, cy) = (canvas.width / 2.0, canvas.height / 2.0);
    let mut scene = Scene::new(canvas.width, canvas.height);

    if let [only] = slices.as_slice() {
        scene.push(
            Node::circle(cx, cy, radius)
                .fill(&only.category.color)
                .stroke(&palette.background, 4.0)
                .tooltip(format!(
                    "{}: {} (100%)",
                    only.category.label,
                    format_value(only.category.value)
                )),
        );
        for (i, category) in series.items.iter().enumerate() {
            scene.push(
                Node::text(cx, cy - 10.0 + i as f64 * 28.0, share_label(category, total), 18.0)
                    .bold()
                    .fill(&palette.text),
            );
        }
    } else {
        for slice in &slices {
            let (x1, y1) = polar(cx, cy, radius, slice.start);
            let (x2, y2) = polar(cx, cy, radius, slice.end);
            let d = format!(
                "M {} {} L {} {} A {} {} 0 {} 1 {} {} Z",
                num(cx),
                num(cy),
                num(x1),
                num(y1),
                num(radius),
                num(radius),
                large_arc(slice.end - slice.start),
                num(x2),
                num(y2)
            );
            scene.push(
                Node::path(d)
                    .fill(&slice.category.color)
                    .stroke(&palette.background, 4.0)
                    .tooltip(format!(
                        "{}: {} ({}%)",
                        slice.category.label,
                        format_value(slice.category.value),
                        slice.percent.round()
                    )),
            );

            let mid = (slice.start + slice.end) / 2.0;
            let (lx, ly) = polar(cx, cy, radius + 30.0, mid);
            scene.push(
                Node::text(
                    lx,
                    ly,
                    format!("{}: {}", slice.category.label, format_value(slice.category.value)),
                    12.0,
                )
                .bold()
                .fill(&slice.category.color),
            );
        }
    }

    scene.push(legend(series, palette));
    add_title(&mut scene, palette, &labels.title);
    scene
}

pub fn render_donut(
    series: &CategoricalSeries,
    canvas: Canvas,
    palette: &Palette,
    labels: &ChartLabels,
) -> Scene {
    let (slices, total) = slices(series);
    if slices.is_empty() {
        return no_data(canvas, palette, &labels.empty_message);
    }

    let outer = outer_radius(canvas);
    let inner = outer * DONUT_INNER_RATIO;
    let (cx, cy) = (canvas.width / 2.0, canvas.height / 2.0);
    let mut scene = Scene::new(canvas.width, canvas.height);

    if let [only] = slices.as_slice() {
        scene.push(
            Node::circle(cx, cy, (outer + inner) / 2.0)
                .fill("none")
                .stroke(&only.category.color, outer - inner)
                .tooltip(share_label(only.category, total)),
        );
    } else {
        for slice in &slices {
            let (ox1, oy1) = polar(cx, cy, outer, slice.start);
            let (ox2, oy2) = polar(cx, cy, outer, slice.end);
            let (ix1, iy1) = polar(cx, cy, inner, slice.end);
            let (ix2, iy2) = polar(cx, cy, inner, slice.start);
            let flag = large_arc(slice.end - slice.start);
            let d = format!(
                "M {} {} A {} {} 0 {} 1 {} {} L {} {} A {} {} 0 {} 0 {} {} Z",
                num(ox1),
                num(oy1),
                num(outer),
                num(outer),
                flag,
                num(ox2),
                num(oy2),
                num(ix1),
                num(iy1),
                num(inner),
                num(inner),
                flag,
                num(ix2),
                num(iy2)
            );
            scene.push(
                Node::path(d)
                    .fill(&slice.category.color)
                    .stroke(&palette.background, 2.0)
                    .tooltip(format!(
                        "{}: {}",
                        slice.category.label,
                        format_value(slice.category.value)
                    )),
            );
        }
    }

    if let Some(caption) = &labels.caption {
        scene.push(
            Node::text(cx, cy, caption, 16.0)
                .bold()
                .middle_baseline()
                .fill(&palette.text),
        );
    }
    scene.push(legend(series, palette));
    add_title(&mut scene, palette, &labels.title);
    scene
}
