//! Course Revenue Simulator
//!
//! Predicts how total revenue of an online course responds to its price.
//! The course's fixed attributes are swept across a price grid, scored by a
//! pre-trained regression model in a single batch, and the revenue-maximizing
//! price is reported.
//!
//! ## Architecture
//!
//! - **Catalog**: category to subcategory options for the form
//! - **Model**: pre-trained revenue model behind the [`model::RevenueModel`] trait
//! - **Simulator**: price sweep, batch inference, inverse log transform, arg-max
//! - **Render**: SVG chart and summary text
//! - **API**: axum router serving the form page and JSON endpoints

pub mod api;
pub mod catalog;
pub mod config;
pub mod context;
pub mod model;
pub mod render;
pub mod simulator;
pub mod types;

pub use catalog::Catalog;
pub use config::SimulatorConfig;
pub use context::{RunError, SimulatorContext, StartupError};
pub use model::{ArtifactModel, FnModel, InferenceError, ModelLoadError, RemoteModel, RevenueModel};
pub use simulator::{PriceSweep, RevenueSimulator, SimulationError};
pub use types::{
    CourseDescription, CourseForm, CourseType, CurvePoint, FormError, InstructionalLevel,
    OptimalPoint, PredictionCurve, PriceSweepRow, Selection, Simulation,
};
