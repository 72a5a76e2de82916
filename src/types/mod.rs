//! Shared data structures for the revenue simulator
//!
//! - `course`: form-level course attributes and the `Selection` sum type
//! - `form`: raw form submission and its resolution into a course
//! - `simulation`: model input rows, prediction curve and optimum

mod course;
mod form;
mod simulation;

pub use course::*;
pub use form::*;
pub use simulation::*;
