//! Command-line flags for `kernel-builder` and `patch-srpm`.
//!
//! Both tools share the flag-based convention; `patch-srpm` adds
//! `--patches` and gives `--out` a default.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::arch::host_arch;
use crate::config::{InvocationConfig, Mode};

/// Output folder used by `patch-srpm` when `--out` is not given.
pub const DEFAULT_PATCH_OUT: &str = "src_out";

/// Flags shared by both tools.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to SRPM file or URL
    #[arg(long, value_name = "PATH|URL")]
    pub srpm: String,

    /// Target architecture (e.g., amd64, arm64)
    #[arg(long, default_value = host_arch())]
    pub arch: String,

    /// Expected SHA-256 of the SRPM
    #[arg(long, value_name = "HEX")]
    pub sha256: Option<String>,

    /// Settings file (defaults to ./kernel-builder.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Container engine binary (overrides settings and KERNEL_BUILDER_ENGINE)
    #[arg(long)]
    pub engine: Option<String>,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Build kernel RPMs from an SRPM inside the builder container.
#[derive(Parser, Debug)]
#[command(name = "kernel-builder", version)]
pub struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output folder for built RPMs
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,
}

impl BuildArgs {
    pub fn invocation(&self) -> InvocationConfig {
        InvocationConfig {
            srpm_source: self.common.srpm.clone(),
            output_dir: self.out.clone(),
            patches_dir: None,
            arch: self.common.arch.clone(),
            mode: Mode::Build,
            sha256: self.common.sha256.clone(),
        }
    }
}

/// Apply a directory of patches to an SRPM inside the builder container.
#[derive(Parser, Debug)]
#[command(name = "patch-srpm", version)]
pub struct PatchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output folder for the patched SRPM
    #[arg(long, value_name = "DIR", default_value = DEFAULT_PATCH_OUT)]
    pub out: PathBuf,

    /// Directory containing patch files to apply
    #[arg(long, value_name = "DIR")]
    pub patches: PathBuf,
}

impl PatchArgs {
    pub fn invocation(&self) -> InvocationConfig {
        InvocationConfig {
            srpm_source: self.common.srpm.clone(),
            output_dir: self.out.clone(),
            patches_dir: Some(self.patches.clone()),
            arch: self.common.arch.clone(),
            mode: Mode::PatchOnly,
            sha256: self.common.sha256.clone(),
        }
    }
}

/// Exit status for a failed parse: 1 for usage errors, 0 for `--help`
/// and `--version`.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Parse `std::env::args`, exiting with [`usage_exit_code`] on failure.
pub fn parse_args<P: Parser>() -> P {
    P::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        std::process::exit(usage_exit_code(&err));
    })
}

/// Initialise `env_logger`. `RUST_LOG` applies unless `--verbose` is set.
pub fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
        .format_timestamp(None)
        .format_target(false)
        .target(env_logger::Target::Stdout)
        .init();
}
