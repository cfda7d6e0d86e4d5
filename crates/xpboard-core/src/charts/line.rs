//! Line chart over a point series

use super::geometry::{num, LinearScale, Margin};
use super::{add_title, no_data, Canvas, ChartLabels, Palette};
use super::primitives::{Node, Scene};
use crate::format::format_value;
use crate::models::{PointKey, PointSeries};

const MARGIN: Margin = Margin::new(20.0, 30.0, 40.0, 60.0);
const MARKER_RADIUS: f64 = 4.0;

/// Time points scale by timestamp, category points by position
fn x_position(key: &PointKey, index: usize) -> f64 {
    match key {
        PointKey::Time(ts) => ts.timestamp_millis() as f64,
        PointKey::Category(_) => index as f64,
    }
}

pub fn render_line(
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

    let x_scale = LinearScale::fit(
        series
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| x_position(&p.x, i)),
        (0.0, chart_width),
    );
    let y_scale = LinearScale::fit(series.values(), (chart_height, 0.0));

    let coords: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (x_scale.apply(x_position(&p.x, i)), y_scale.apply(p.y)))
        .collect();

    let mut d = String::new();
    for (i, (x, y)) in coords.iter().enumerate() {
        let command = if i == 0 { "M" } else { " L" };
        d.push_str(&format!("{} {} {}", command, num(*x), num(*y)));
    }

    let mut children = vec![Node::path(d)
        .fill("none")
        .stroke(&palette.primary, 3.0)];

    for (point, (x, y)) in series.points.iter().zip(&coords) {
        children.push(
            Node::circle(*x, *y, MARKER_RADIUS)
                .fill(&palette.primary)
                .tooltip(format!(
                    "{}: {}{}",
                    point.label,
                    format_value(point.y),
                    labels.suffix()
                )),
        );
    }

    let mut scene = Scene::new(canvas.width, canvas.height);
    scene.push(Node::group(MARGIN.left, MARGIN.top, children));
    add_title(&mut scene, palette, &labels.title);
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::primitives::{SceneKind, Shape};
    use crate::models::SeriesPoint;
    use chrono::{TimeZone, Utc};

    fn point(day: u32, y: f64) -> SeriesPoint {
        let ts = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        SeriesPoint {
            x: PointKey::Time(ts),
            y,
            delta: y,
            label: crate::format::format_date(ts),
        }
    }

    fn labels() -> ChartLabels {
        ChartLabels::new("XP Progress Over Time", "No XP data available").with_suffix(" XP")
    }

    #[test]
    fn test_line_markers_and_tooltips() {
        let series = PointSeries {
            points: vec![point(1, 100.0), point(2, 1350.0), point(5, 1400.0)],
        };
        let scene = render_line(&series, Canvas::new(500.0, 260.0), &Palette::default(), &labels());

        assert_eq!(scene.kind, SceneKind::Chart);
        assert_eq!(scene.count(|s| matches!(s, Shape::Circle { .. })), 3);
        assert_eq!(scene.tooltips()[1], "Jan 2, 2024: 1,350 XP");
        assert!(scene.paths()[0].starts_with("M 0 200"));
        assert_eq!(scene.title.as_deref(), Some("XP Progress Over Time"));
    }

    #[test]
    fn test_single_point_collapses_to_midpoint() {
        let series = PointSeries {
            points: vec![point(1, 500.0)],
        };
        let scene = render_line(&series, Canvas::new(500.0, 260.0), &Palette::default(), &labels());
        assert_eq!(scene.paths()[0], "M 205 100");
    }

    #[test]
    fn test_empty_series_is_placeholder() {
        let scene = render_line(
            &PointSeries::default(),
            Canvas::new(500.0, 260.0),
            &Palette::default(),
            &labels(),
        );
        assert_eq!(scene.kind, SceneKind::Empty);
        assert_eq!(scene.texts(), vec!["No XP data available"]);
    }
}
