//! # agrismart-runtime
//!
//! Request handling around the deterministic engine in `agrismart-core`.
//!
//! This crate provides:
//! - [`AdviceOrchestrator`]: validate, advise, classify, forecast, compose
//! - [`RuntimeConfig`]: YAML configuration with environment overrides
//! - [`FsImageStore`]: collision-safe upload storage
//!
//! ## Example
//!
//! ```rust,no_run
//! use agrismart_core::RawSoilInput;
//! use agrismart_runtime::{AdviceOrchestrator, AdviceRequest, RuntimeConfig};
//!
//! let config = RuntimeConfig::load(None)?;
//! std::fs::create_dir_all(&config.upload.dir)?;
//! let orchestrator = AdviceOrchestrator::builder(config).build();
//!
//! let input = RawSoilInput {
//!     soil_type: Some("loamy".into()),
//!     ph: Some(6.5.into()),
//!     nitrogen: Some(55.0.into()),
//!     phosphorus: Some(30.0.into()),
//!     potassium: Some(20.0.into()),
//!     location: Some("Nakuru".into()),
//! };
//!
//! let report = orchestrator.advise(&AdviceRequest::new(input))?;
//! println!("{}", report.recommended_crop);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod orchestrator;
pub mod storage;

pub use config::{
    ConfigError, ForecastConfig, RuntimeConfig, UploadConfig, DEFAULT_MAX_UPLOAD_BYTES,
    ENV_FORECAST_SEED, ENV_UPLOAD_DIR,
};
pub use orchestrator::{
    AdviceError, AdviceOrchestrator, AdviceOrchestratorBuilder, AdviceRequest, RequestState,
    RequestTrace,
};
pub use storage::{sanitize_filename, FsImageStore, ImageStore, StorageError, StoredImage};
