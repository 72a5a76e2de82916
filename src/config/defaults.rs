//! System-wide default constants.
//!
//! Grouped by subsystem. Every `Default` impl in the config module reads
//! from here.

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "REVSIM_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "simulator.toml";

// ============================================================================
// Server
// ============================================================================

pub const SERVER_ADDR: &str = "0.0.0.0:8080";

/// Comma-separated list of allowed CORS origins.
pub const CORS_ORIGINS_ENV_VAR: &str = "REVSIM_CORS_ORIGINS";

// ============================================================================
// Model & Catalog
// ============================================================================

/// Relative to the working directory; the bundled demo model lives here.
pub const MODEL_ARTIFACT_PATH: &str = "data/pipeline_lgb.json";

/// Upper bound on one batch inference call (seconds).
pub const MODEL_TIMEOUT_SECS: u64 = 10;

pub const CATALOG_PATH: &str = "data/course_mapping.json";

// ============================================================================
// Price Sweep
// ============================================================================

pub const SWEEP_MIN_PRICE: f64 = 10.0;
pub const SWEEP_MAX_PRICE: f64 = 200.0;
pub const SWEEP_NUM_POINTS: usize = 50;

// ============================================================================
// Display
// ============================================================================

pub const CURRENCY: &str = "RM";
pub const PAGE_TITLE: &str = "Udemy Revenue Simulator";

// ============================================================================
// Form Defaults
// ============================================================================

pub const FORM_TOTAL_HOURS: f64 = 10.0;
pub const FORM_LECTURE_COUNT: u32 = 20;
pub const FORM_TITLE: &str = "Master Python Fast";
pub const FORM_HEADLINE: &str = "Build real-world apps with Python";
pub const FORM_RATING: f64 = 4.0;
pub const FORM_REVIEW_COUNT: u64 = 100;
