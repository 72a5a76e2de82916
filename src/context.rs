//! Simulator context: everything a request needs, built once at startup
//!
//! Holds the loaded model and catalog behind `Arc`s so handlers can clone
//! the context cheaply. Nothing in here is mutated after construction.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::catalog::{Catalog, CatalogError};
use crate::config::{DisplayConfig, ModelBackendKind, SimulatorConfig};
use crate::model::{ArtifactModel, ModelLoadError, RemoteModel, RevenueModel};
use crate::simulator::{InvalidSweep, RevenueSimulator, SimulationError};
use crate::types::{CourseDescription, FormError, Simulation};

/// Startup failure. Fatal: the service cannot answer any request.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Model load failed: {0}")]
    Model(#[from] ModelLoadError),

    #[error("Catalog load failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Sweep(#[from] InvalidSweep),
}

/// Outcome of validating and simulating one form submission.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

#[derive(Clone)]
pub struct SimulatorContext {
    pub model: Arc<dyn RevenueModel>,
    pub catalog: Arc<Catalog>,
    pub simulator: RevenueSimulator,
    pub display: DisplayConfig,
}

impl std::fmt::Debug for SimulatorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatorContext")
            .field("model", &self.model.backend_name())
            .field("catalog_entries", &self.catalog.len())
            .field("simulator", &self.simulator)
            .field("display", &self.display)
            .finish()
    }
}

impl SimulatorContext {
    pub fn new(
        model: Arc<dyn RevenueModel>,
        catalog: Catalog,
        simulator: RevenueSimulator,
        display: DisplayConfig,
    ) -> Self {
        Self {
            model,
            catalog: Arc::new(catalog),
            simulator,
            display,
        }
    }

    /// Load the catalog and model named by the config.
    pub fn from_config(config: &SimulatorConfig) -> Result<Self, StartupError> {
        let catalog = Catalog::load(&config.catalog.path)?;

        let model: Arc<dyn RevenueModel> = match config.model.backend {
            ModelBackendKind::Artifact => Arc::new(ArtifactModel::load(&config.model.artifact_path)?),
            ModelBackendKind::Remote => {
                let url = config.model.remote_url.as_deref().ok_or_else(|| {
                    ModelLoadError::Incompatible("remote backend selected without model.remote_url".to_string())
                })?;
                let remote = RemoteModel::new(url, config.model_timeout())?;
                info!(url = %remote.url(), "Using remote model backend");
                Arc::new(remote)
            }
        };

        let simulator = RevenueSimulator::new(config.price_sweep()?, config.model_timeout());
        info!(
            backend = model.backend_name(),
            min_price = simulator.sweep().min_price(),
            max_price = simulator.sweep().max_price(),
            points = simulator.sweep().num_points(),
            "Simulator context ready"
        );

        Ok(Self::new(model, catalog, simulator, config.display.clone()))
    }

    /// Validate the course at the boundary, then simulate.
    ///
    /// An incomplete selection wins over other validation problems so the
    /// user first sees the "please select" guidance.
    pub async fn run(&self, course: &CourseDescription) -> Result<Simulation, RunError> {
        let missing = course.missing_selections();
        if !missing.is_empty() {
            return Err(SimulationError::SelectionIncomplete { missing }.into());
        }
        course.validate(&self.catalog)?;
        Ok(self.simulator.simulate(course, self.model.as_ref()).await?)
    }
}
