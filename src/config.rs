//! Run configuration.
//!
//! [`InvocationConfig`] is what the user asked for on the command line.
//! [`BuilderSettings`] describes the container side: which engine binary to
//! call, which image tag to build, and which directory holds the Dockerfile.
//! Settings come from built-in defaults, an optional `kernel-builder.toml`,
//! then `KERNEL_BUILDER_*` environment variables, in that order.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "kernel-builder.toml";

pub const DEFAULT_ENGINE: &str = "docker";
pub const DEFAULT_IMAGE: &str = "kernel-builder";

pub const ENV_ENGINE: &str = "KERNEL_BUILDER_ENGINE";
pub const ENV_IMAGE: &str = "KERNEL_BUILDER_IMAGE";
pub const ENV_CONTEXT: &str = "KERNEL_BUILDER_CONTEXT";

/// What the builder image is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full RPM build from the SRPM.
    Build,
    /// Apply `/patches` to the SRPM and emit a new SRPM.
    PatchOnly,
}

/// One requested run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    pub srpm_source: String,
    pub output_dir: PathBuf,
    pub patches_dir: Option<PathBuf>,
    pub arch: String,
    pub mode: Mode,
    /// Expected SHA-256 of the SRPM, hex.
    pub sha256: Option<String>,
}

impl InvocationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.srpm_source.trim().is_empty() {
            return Err(Error::InvalidArguments("--srpm is required".into()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::InvalidArguments("--out is required".into()));
        }
        if self.arch.trim().is_empty() {
            return Err(Error::InvalidArguments("--arch must not be empty".into()));
        }
        if self.mode == Mode::PatchOnly && self.patches_dir.is_none() {
            return Err(Error::InvalidArguments(
                "--patches is required in patch-only mode".into(),
            ));
        }
        if let Some(patches) = &self.patches_dir {
            if patches.as_os_str().is_empty() {
                return Err(Error::InvalidArguments("--patches must not be empty".into()));
            }
        }
        if let Some(digest) = &self.sha256 {
            let digest = digest.trim();
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::InvalidArguments(format!(
                    "--sha256 must be 64 hex characters, got '{}'",
                    digest
                )));
            }
        }
        Ok(())
    }
}

/// Container engine side of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderSettings {
    pub engine: String,
    pub image: String,
    pub context_dir: PathBuf,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            context_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    engine: Option<String>,
    image: Option<String>,
    context_dir: Option<PathBuf>,
}

impl BuilderSettings {
    /// Load settings for this process.
    ///
    /// An explicit `config_path` must exist. Without one, the default file in
    /// the working directory is used only if present.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut settings = Self::default();

        match config_path {
            Some(path) => settings.apply_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    settings.apply_file(default)?;
                }
            }
        }

        settings.apply_overrides(|key| env::var(key).ok())?;
        Ok(settings)
    }

    /// Merge a TOML settings file.
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("reading settings '{}': {}", path.display(), e))
        })?;
        self.apply_toml(&raw)
            .map_err(|e| Error::Config(format!("settings '{}': {}", path.display(), e)))
    }

    fn apply_toml(&mut self, raw: &str) -> Result<()> {
        let parsed: SettingsToml =
            toml::from_str(raw).map_err(|e| Error::Config(e.message().to_string()))?;

        if let Some(engine) = parsed.engine {
            self.engine = non_empty("engine", engine)?;
        }
        if let Some(image) = parsed.image {
            self.image = non_empty("image", image)?;
        }
        if let Some(context_dir) = parsed.context_dir {
            if context_dir.as_os_str().is_empty() {
                return Err(Error::Config("context_dir must not be empty".into()));
            }
            self.context_dir = context_dir;
        }
        Ok(())
    }

    /// Apply `KERNEL_BUILDER_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(engine) = lookup(ENV_ENGINE) {
            self.engine = non_empty(ENV_ENGINE, engine)?;
        }
        if let Some(image) = lookup(ENV_IMAGE) {
            self.image = non_empty(ENV_IMAGE, image)?;
        }
        if let Some(context) = lookup(ENV_CONTEXT) {
            self.context_dir = PathBuf::from(non_empty(ENV_CONTEXT, context)?);
        }
        Ok(())
    }

    /// `--engine` from the command line wins over everything else.
    pub fn with_engine(mut self, engine: Option<String>) -> Result<Self> {
        if let Some(engine) = engine {
            self.engine = non_empty("--engine", engine)?;
        }
        Ok(self)
    }
}

fn non_empty(field: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(Error::Config(format!("{field} must not be empty")));
    }
    Ok(value)
}
