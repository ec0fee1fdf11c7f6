//! Containerized kernel SRPM builds.
//!
//! Resolves an SRPM (local path or URL), prepares the host directories,
//! builds the builder image and runs it with the SRPM, the output directory
//! and optionally a patches directory bind-mounted at fixed paths.
//!
//! # Architecture
//!
//! ```text
//! kernel-builder / patch-srpm (bins)
//!     │  cli: flags -> InvocationConfig, settings -> BuilderSettings
//!     ▼
//! workflow::run
//!     ├── preflight   engine on PATH
//!     ├── directories output created, patches checked
//!     ├── source      download to scoped temp file, or absolute local path
//!     ├── container   <engine> build, then <engine> run
//!     └── artifacts   RPMs left in the output directory
//! ```
//!
//! The builder image is a black box: it reads `/src/kernel.src.rpm`, optionally
//! `/patches`, and writes to `/home/kernelbuilder/output`.

pub mod arch;
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod container;
pub mod directories;
pub mod error;
pub mod preflight;
pub mod process;
pub mod source;
pub mod workflow;

pub use config::{BuilderSettings, InvocationConfig, Mode};
pub use error::{Error, Result};
pub use workflow::{execute, run, RunSummary};
