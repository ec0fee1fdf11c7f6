//! Builder image build and run.
//!
//! The image itself is opaque. Its contract is the three mount points below
//! and the optional `--patchonly` entrypoint flag.

use std::path::{Path, PathBuf};

use crate::arch::platform;
use crate::config::BuilderSettings;
use crate::error::{Error, Result};
use crate::process::{Cmd, CommandRunner};

/// Where the SRPM appears inside the container.
pub const CONTAINER_SRPM_PATH: &str = "/src/kernel.src.rpm";
/// Where the image writes its RPMs.
pub const CONTAINER_OUTPUT_PATH: &str = "/home/kernelbuilder/output";
/// Where patches are read from in patch-only mode.
pub const CONTAINER_PATCHES_PATH: &str = "/patches";
/// Entrypoint flag selecting patch-only mode.
pub const PATCH_ONLY_FLAG: &str = "--patchonly";

/// One `-v host:container[:ro]` bind mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub host: PathBuf,
    pub container: &'static str,
    pub read_only: bool,
}

impl Mount {
    pub fn read_only(host: &Path, container: &'static str) -> Self {
        Self {
            host: host.to_path_buf(),
            container,
            read_only: true,
        }
    }

    pub fn read_write(host: &Path, container: &'static str) -> Self {
        Self {
            host: host.to_path_buf(),
            container,
            read_only: false,
        }
    }

    /// Value for `-v`.
    pub fn volume_spec(&self) -> String {
        let mut spec = format!("{}:{}", self.host.display(), self.container);
        if self.read_only {
            spec.push_str(":ro");
        }
        spec
    }
}

/// Everything needed for one `run` of the builder image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInvocation {
    pub image: String,
    pub platform: String,
    pub mounts: Vec<Mount>,
    pub extra_args: Vec<String>,
    pub interactive: bool,
}

impl ContainerInvocation {
    /// Mounts for a full build: SRPM read-only, output read-write.
    pub fn build(image: &str, arch: &str, srpm: &Path, output_dir: &Path) -> Self {
        Self {
            image: image.to_string(),
            platform: platform(arch),
            mounts: vec![
                Mount::read_only(srpm, CONTAINER_SRPM_PATH),
                Mount::read_write(output_dir, CONTAINER_OUTPUT_PATH),
            ],
            extra_args: Vec::new(),
            interactive: false,
        }
    }

    /// Adds the patches mount and `--patchonly`; stdin is passed through.
    pub fn patch_only(mut self, patches_dir: &Path) -> Self {
        self.mounts
            .push(Mount::read_only(patches_dir, CONTAINER_PATCHES_PATH));
        self.extra_args.push(PATCH_ONLY_FLAG.to_string());
        self.interactive = true;
        self
    }

    /// `<engine> run --rm --platform ... -v ... <image> [extra]`
    pub fn run_command(&self, engine: &str) -> Cmd {
        let mut cmd = Cmd::new(engine)
            .arg("run")
            .arg("--rm")
            .args(["--platform", self.platform.as_str()]);
        for mount in &self.mounts {
            cmd = cmd.arg("-v").arg(mount.volume_spec());
        }
        cmd = cmd.arg(self.image.as_str()).args(&self.extra_args);
        if self.interactive {
            cmd = cmd.with_stdin();
        }
        cmd
    }
}

/// `<engine> build --platform linux/<arch> -t <image> <context>`
pub fn build_command(settings: &BuilderSettings, arch: &str) -> Cmd {
    Cmd::new(settings.engine.as_str())
        .arg("build")
        .args(["--platform".to_string(), platform(arch)])
        .args(["-t", settings.image.as_str()])
        .arg_path(&settings.context_dir)
}

/// Drives the engine through a [`CommandRunner`].
pub struct Invoker<'a, R: CommandRunner> {
    settings: &'a BuilderSettings,
    runner: &'a mut R,
}

impl<'a, R: CommandRunner> Invoker<'a, R> {
    pub fn new(settings: &'a BuilderSettings, runner: &'a mut R) -> Self {
        Self { settings, runner }
    }

    pub fn build_image(&mut self, arch: &str) -> Result<()> {
        log::info!(">>> Building Docker Image...");
        let cmd = build_command(self.settings, arch);
        log::debug!("{}", cmd.display());

        let status = self.runner.run(&cmd)?;
        if !status.success() {
            return Err(Error::ImageBuild { status });
        }
        Ok(())
    }

    pub fn run_container(&mut self, invocation: &ContainerInvocation) -> Result<()> {
        log::info!(">>> Running Docker Container...");
        let cmd = invocation.run_command(&self.settings.engine);
        log::debug!("{}", cmd.display());

        let status = self.runner.run(&cmd)?;
        if !status.success() {
            return Err(Error::ContainerRun { status });
        }
        Ok(())
    }
}
