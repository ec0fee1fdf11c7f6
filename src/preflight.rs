//! Preflight checks.
//!
//! Verifies the container engine is on PATH before anything is downloaded,
//! so a missing docker install fails with a hint instead of a spawn error
//! halfway through a run.
//!
//! # Example
//!
//! ```rust
//! use kernel_builder::preflight::check_engine;
//!
//! if check_engine("podman").is_err() {
//!     println!("podman not installed");
//! }
//! ```

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Locate the configured engine binary.
pub fn check_engine(engine: &str) -> Result<PathBuf> {
    which::which(engine).map_err(|_| Error::EngineNotFound {
        engine: engine.to_string(),
    })
}
