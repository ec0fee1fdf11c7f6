//! One end-to-end run: resolve inputs, build the image, run it.
//!
//! Strictly sequential. The downloaded SRPM (if any) lives on the stack of
//! [`execute`] and is removed when it returns, whichever way it returns.

use std::path::PathBuf;

use crate::arch::platform;
use crate::artifacts::{self, RpmArtifact};
use crate::config::{BuilderSettings, InvocationConfig, Mode};
use crate::container::{ContainerInvocation, Invoker};
use crate::directories::{check_patches_dir, display_path, ensure_output_dir};
use crate::error::Result;
use crate::preflight::check_engine;
use crate::process::{CommandRunner, SystemRunner};
use crate::source::{self, absolute_path};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub rpms: Vec<RpmArtifact>,
}

/// Preflight the engine, then run against the host.
pub fn run(config: &InvocationConfig, settings: &BuilderSettings) -> Result<RunSummary> {
    let engine = check_engine(&settings.engine)?;
    log::debug!("using container engine {}", engine.display());
    execute(config, settings, &mut SystemRunner)
}

/// The run itself, with commands going through `runner`.
pub fn execute<R: CommandRunner>(
    config: &InvocationConfig,
    settings: &BuilderSettings,
    runner: &mut R,
) -> Result<RunSummary> {
    config.validate()?;
    log::info!(">>> Using Architecture: {}", platform(&config.arch));

    ensure_output_dir(&config.output_dir)?;
    let patches_dir = match &config.patches_dir {
        Some(dir) => {
            check_patches_dir(dir)?;
            Some(absolute_path(dir)?)
        }
        None => None,
    };

    let srpm = source::resolve(&config.srpm_source)?;
    if let Some(expected) = &config.sha256 {
        source::verify_sha256(srpm.path(), expected)?;
        log::info!(">>> SRPM checksum verified");
    }

    let mut invoker = Invoker::new(settings, runner);
    invoker.build_image(&config.arch)?;

    let output_dir = absolute_path(&config.output_dir)?;
    let mut invocation =
        ContainerInvocation::build(&settings.image, &config.arch, srpm.path(), &output_dir);
    if let Some(patches) = &patches_dir {
        log::info!(">>> Using patches from: {}", patches.display());
        invocation = invocation.patch_only(patches);
    }
    invoker.run_container(&invocation)?;

    let shown = display_path(&config.output_dir);
    match config.mode {
        Mode::Build => log::info!(">>> Build complete. RPMs are in: {}", shown.display()),
        Mode::PatchOnly => log::info!(
            ">>> Build complete. The patched SRPM is in: {}",
            shown.display()
        ),
    }
    let rpms = artifacts::report(&output_dir);

    Ok(RunSummary { output_dir, rpms })
}
