//! Price-sweep revenue simulation
//!
//! Holds every course attribute fixed, sweeps price across a fixed range,
//! runs one batch prediction and reports the revenue-maximizing price.
//!
//! ## Algorithm
//! 1. Generate the price sweep (default 50 points, 10..=200)
//! 2. Copy the course into one row per price; only price differs
//! 3. One batch call to the model, bounded by a timeout
//! 4. Map each log1p prediction back with `exp(x) - 1`
//! 5. Zip prices and revenues into the curve, in sweep order
//! 6. Pick the maximum revenue, first occurrence on ties

pub mod sweep;

pub use sweep::{InvalidSweep, PriceSweep};

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{InferenceError, RevenueModel};
use crate::types::{
    CourseDescription, CurvePoint, PredictionCurve, PriceSweepRow, SelectedAttributes, Simulation,
};

#[derive(Debug, Error)]
pub enum SimulationError {
    /// Category, subcategory or level still on the placeholder
    #[error("Selection incomplete: missing {}", missing.join(", "))]
    SelectionIncomplete { missing: Vec<&'static str> },

    /// The model call failed
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// The model call did not finish in time
    #[error("Model inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("Price sweep produced no points")]
    EmptyCurve,
}

impl SimulationError {
    pub const fn is_selection_incomplete(&self) -> bool {
        matches!(self, Self::SelectionIncomplete { .. })
    }
}

/// Inverse of the log1p target transform.
pub fn revenue_from_log(log_revenue: f64) -> f64 {
    log_revenue.exp_m1()
}

/// One row per price; every other field is copied from the course.
pub fn build_rows(
    selected: SelectedAttributes<'_>,
    course: &CourseDescription,
    prices: &[f64],
) -> Vec<PriceSweepRow> {
    prices
        .iter()
        .map(|&price| PriceSweepRow {
            category: selected.category,
            subcategory: selected.subcategory.to_string(),
            level: selected.level,
            total_hours: course.total_hours,
            lecture_count: course.lecture_count,
            price,
            title: course.title.clone(),
            headline: course.headline.clone(),
            rating: course.rating,
            review_count: course.review_count,
        })
        .collect()
}

/// Runs simulations against a fixed sweep.
#[derive(Debug, Clone)]
pub struct RevenueSimulator {
    sweep: PriceSweep,
    timeout: Duration,
}

impl RevenueSimulator {
    pub const fn new(sweep: PriceSweep, timeout: Duration) -> Self {
        Self { sweep, timeout }
    }

    pub const fn sweep(&self) -> &PriceSweep {
        &self.sweep
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Simulate revenue across the price sweep.
    ///
    /// Returns `SelectionIncomplete` without touching the model when any
    /// select box is unset. Model failures are returned unchanged.
    pub async fn simulate(
        &self,
        course: &CourseDescription,
        model: &dyn RevenueModel,
    ) -> Result<Simulation, SimulationError> {
        let selected = course
            .selected()
            .map_err(|missing| SimulationError::SelectionIncomplete { missing })?;

        let prices = self.sweep.prices();
        let rows = build_rows(selected, course, &prices);

        let log_revenue = match tokio::time::timeout(self.timeout, model.predict(&rows)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    backend = model.backend_name(),
                    timeout = ?self.timeout,
                    "Batch inference timed out"
                );
                return Err(SimulationError::Timeout(self.timeout));
            }
        };

        if log_revenue.len() != rows.len() {
            return Err(InferenceError::OutputLength {
                expected: rows.len(),
                got: log_revenue.len(),
            }
            .into());
        }
        if let Some((row, &value)) = log_revenue.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(InferenceError::NonFinite { row, value }.into());
        }

        let mut points = Vec::with_capacity(prices.len());
        for (row, (&price, &log)) in prices.iter().zip(&log_revenue).enumerate() {
            let revenue = revenue_from_log(log);
            if !revenue.is_finite() {
                return Err(InferenceError::RevenueOverflow { row, value: log }.into());
            }
            points.push(CurvePoint { price, revenue });
        }
        let curve = PredictionCurve::new(points);
        let optimum = curve.optimum().ok_or(SimulationError::EmptyCurve)?;

        debug!(
            backend = model.backend_name(),
            category = %selected.category,
            subcategory = selected.subcategory,
            level = %selected.level,
            points = curve.len(),
            best_price = optimum.price,
            best_revenue = optimum.revenue,
            "Simulation complete"
        );

        Ok(Simulation { curve, optimum })
    }
}

impl Default for RevenueSimulator {
    fn default() -> Self {
        Self::new(
            PriceSweep::default(),
            Duration::from_secs(crate::config::defaults::MODEL_TIMEOUT_SECS),
        )
    }
}
