//! Price sweep generation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults::{SWEEP_MAX_PRICE, SWEEP_MIN_PRICE, SWEEP_NUM_POINTS};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid price sweep: {0}")]
pub struct InvalidSweep(pub String);

/// Evenly spaced, ascending, inclusive price range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSweep {
    min_price: f64,
    max_price: f64,
    num_points: usize,
}

impl Default for PriceSweep {
    fn default() -> Self {
        Self {
            min_price: SWEEP_MIN_PRICE,
            max_price: SWEEP_MAX_PRICE,
            num_points: SWEEP_NUM_POINTS,
        }
    }
}

impl PriceSweep {
    /// Requires finite `0 <= min_price < max_price` and at least two points.
    pub fn new(min_price: f64, max_price: f64, num_points: usize) -> Result<Self, InvalidSweep> {
        if !min_price.is_finite() || !max_price.is_finite() {
            return Err(InvalidSweep(format!(
                "bounds must be finite (got {min_price}..{max_price})"
            )));
        }
        if min_price < 0.0 {
            return Err(InvalidSweep(format!("min_price must be >= 0 (got {min_price})")));
        }
        if min_price >= max_price {
            return Err(InvalidSweep(format!(
                "min_price ({min_price}) must be < max_price ({max_price})"
            )));
        }
        if num_points < 2 {
            return Err(InvalidSweep(format!("num_points must be >= 2 (got {num_points})")));
        }
        Ok(Self {
            min_price,
            max_price,
            num_points,
        })
    }

    pub const fn min_price(&self) -> f64 {
        self.min_price
    }

    pub const fn max_price(&self) -> f64 {
        self.max_price
    }

    pub const fn num_points(&self) -> usize {
        self.num_points
    }

    /// Distance between consecutive prices.
    #[allow(clippy::cast_precision_loss)]
    pub fn step(&self) -> f64 {
        (self.max_price - self.min_price) / (self.num_points - 1) as f64
    }

    /// The swept prices. The last value is exactly `max_price`.
    #[allow(clippy::cast_precision_loss)]
    pub fn prices(&self) -> Vec<f64> {
        let step = self.step();
        let last = self.num_points - 1;
        (0..self.num_points)
            .map(|i| {
                if i == last {
                    self.max_price
                } else {
                    (i as f64).mul_add(step, self.min_price)
                }
            })
            .collect()
    }
}
