//! Chart-ready series shapes
//!
//! Derived and ephemeral: rebuilt from the snapshot on every cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// X coordinate of a point: a timestamp or an ordinal category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PointKey {
    Time(DateTime<Utc>),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: PointKey,
    /// Running value (cumulative XP)
    pub y: f64,
    /// Contribution of this point
    pub delta: f64,
    pub label: String,
}

/// Ordered sequence of points
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointSeries {
    pub points: Vec<SeriesPoint>,
}

impl PointSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Last running value (0 when empty)
    pub fn final_value(&self) -> f64 {
        self.points.last().map(|p| p.y).unwrap_or(0.0)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.y)
    }
}

/// One labelled value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub label: String,
    pub value: f64,
    pub color: String,
}

impl Category {
    pub fn new(label: impl Into<String>, value: f64, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            color: color.into(),
        }
    }
}

/// Ordered sequence of labelled values
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoricalSeries {
    pub items: Vec<Category>,
}

impl CategoricalSeries {
    pub fn new(items: Vec<Category>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when empty or every value is zero
    pub fn is_all_zero(&self) -> bool {
        self.items.iter().all(|c| c.value == 0.0)
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|c| c.value).sum()
    }

    pub fn get(&self, label: &str) -> Option<&Category> {
        self.items.iter().find(|c| c.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|c| c.label.as_str()).collect()
    }
}

impl From<Vec<Category>> for CategoricalSeries {
    fn from(items: Vec<Category>) -> Self {
        Self { items }
    }
}

/// Stacked sub-category with its color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subcategory {
    pub name: String,
    pub color: String,
}

/// One stacked bar: counts aligned with `StackedSeries::subcategories`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedRow {
    pub category: i64,
    pub counts: Vec<u64>,
    /// Records that mapped to no known sub-category (not stacked)
    pub unknown: u64,
}

impl StackedRow {
    /// Height of the stack (unknown bucket excluded)
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Ordered stacked bars sharing one sub-category axis
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StackedSeries {
    pub subcategories: Vec<Subcategory>,
    pub rows: Vec<StackedRow>,
}

impl StackedSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest stacked total across all rows
    pub fn max_total(&self) -> u64 {
        self.rows.iter().map(StackedRow::total).max().unwrap_or(0)
    }

    pub fn row(&self, category: i64) -> Option<&StackedRow> {
        self.rows.iter().find(|r| r.category == category)
    }
}
