//! Sweep rows and prediction curve types

use serde::{Deserialize, Serialize};

use super::course::{CourseType, InstructionalLevel};

/// Declared type of a model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Real,
    Integer,
}

/// Model input columns, in the order the artifact was built against.
pub const MODEL_COLUMNS: [(&str, ColumnType); 10] = [
    ("course_type", ColumnType::Text),
    ("subcategory", ColumnType::Text),
    ("instructional_level", ColumnType::Text),
    ("total_hours", ColumnType::Real),
    ("num_published_lectures", ColumnType::Integer),
    ("amount", ColumnType::Real),
    ("title", ColumnType::Text),
    ("headline", ColumnType::Text),
    ("rating", ColumnType::Real),
    ("num_reviews", ColumnType::Integer),
];

/// Column names only.
pub fn model_column_names() -> Vec<&'static str> {
    MODEL_COLUMNS.iter().map(|(name, _)| *name).collect()
}

/// A single cell read out of a [`PriceSweepRow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Text(&'a str),
    Number(f64),
}

/// One model input row: the course description with a concrete price.
///
/// Serialized field names and order match [`MODEL_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSweepRow {
    #[serde(rename = "course_type")]
    pub category: CourseType,
    pub subcategory: String,
    #[serde(rename = "instructional_level")]
    pub level: InstructionalLevel,
    pub total_hours: f64,
    #[serde(rename = "num_published_lectures")]
    pub lecture_count: u32,
    #[serde(rename = "amount")]
    pub price: f64,
    pub title: String,
    pub headline: String,
    pub rating: f64,
    #[serde(rename = "num_reviews")]
    pub review_count: u64,
}

impl PriceSweepRow {
    /// Read a cell by model column name.
    #[allow(clippy::cast_precision_loss)]
    pub fn column(&self, name: &str) -> Option<ColumnValue<'_>> {
        let value = match name {
            "course_type" => ColumnValue::Text(self.category.as_str()),
            "subcategory" => ColumnValue::Text(&self.subcategory),
            "instructional_level" => ColumnValue::Text(self.level.as_str()),
            "total_hours" => ColumnValue::Number(self.total_hours),
            "num_published_lectures" => ColumnValue::Number(f64::from(self.lecture_count)),
            "amount" => ColumnValue::Number(self.price),
            "title" => ColumnValue::Text(&self.title),
            "headline" => ColumnValue::Text(&self.headline),
            "rating" => ColumnValue::Number(self.rating),
            "num_reviews" => ColumnValue::Number(self.review_count as f64),
            _ => return None,
        };
        Some(value)
    }
}

/// A (price, revenue) pair on the simulated curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub price: f64,
    pub revenue: f64,
}

/// The revenue-maximizing point of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalPoint {
    /// Position in the curve
    pub index: usize,
    pub price: f64,
    pub revenue: f64,
}

/// Predicted revenue per swept price, in sweep (ascending price) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionCurve {
    points: Vec<CurvePoint>,
}

impl PredictionCurve {
    pub fn new(points: Vec<CurvePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum-revenue point. Ties keep the first occurrence, which is the
    /// lowest price because the sweep ascends. `None` for an empty curve.
    pub fn optimum(&self) -> Option<OptimalPoint> {
        let mut best: Option<OptimalPoint> = None;
        for (index, p) in self.points.iter().enumerate() {
            let better = match best {
                None => true,
                Some(b) => p.revenue > b.revenue,
            };
            if better {
                best = Some(OptimalPoint {
                    index,
                    price: p.price,
                    revenue: p.revenue,
                });
            }
        }
        best
    }
}

/// Output of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub curve: PredictionCurve,
    pub optimum: OptimalPoint,
}
