//! Subprocess helpers.
//!
//! [`Cmd`] is a small builder over [`std::process::Command`] that records its
//! argv so callers can log it and tests can inspect it without spawning
//! anything. Execution goes through [`CommandRunner`] so the container flow
//! can be driven by a recording double.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{Error, Result};

/// A command line waiting to be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    stdin: bool,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn arg_path(self, path: &Path) -> Self {
        self.arg(path.as_os_str().to_os_string())
    }

    /// Connect the child's stdin to ours as well as stdout/stderr.
    pub fn with_stdin(mut self) -> Self {
        self.stdin = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn passes_stdin(&self) -> bool {
        self.stdin
    }

    /// Args as lossy strings, for logging and assertions.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Shell-ish rendering for log lines. Not meant to be re-parsed.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in self.arg_strings() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }

    /// Run with stdout/stderr inherited so the user sees progress live.
    pub fn run_interactive(&self) -> Result<ExitStatus> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if self.stdin {
            command.stdin(Stdio::inherit());
        } else {
            command.stdin(Stdio::null());
        }

        command.status().map_err(|source| Error::CommandSpawn {
            program: self.program.clone(),
            source,
        })
    }
}

/// Executes commands on behalf of the container invoker.
pub trait CommandRunner {
    fn run(&mut self, cmd: &Cmd) -> Result<ExitStatus>;
}

/// Runs commands on the host with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &Cmd) -> Result<ExitStatus> {
        log::debug!("exec: {}", cmd.display());
        cmd.run_interactive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    /// Records every command and answers with scripted exit codes.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingRunner {
        pub(crate) commands: Vec<Cmd>,
        pub(crate) exit_codes: Vec<i32>,
    }

    impl RecordingRunner {
        pub(crate) fn with_exit_codes(codes: &[i32]) -> Self {
            Self {
                commands: Vec::new(),
                exit_codes: codes.to_vec(),
            }
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&mut self, cmd: &Cmd) -> Result<ExitStatus> {
            let code = self
                .exit_codes
                .get(self.commands.len())
                .copied()
                .unwrap_or(0);
            self.commands.push(cmd.clone());
            Ok(ExitStatus::from_raw(code << 8))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_argument_order() {
        let cmd = Cmd::new("docker")
            .arg("build")
            .args(["--platform", "linux/amd64"])
            .arg_path(Path::new("/tmp/ctx"));

        assert_eq!(cmd.program(), "docker");
        assert_eq!(
            cmd.arg_strings(),
            vec!["build", "--platform", "linux/amd64", "/tmp/ctx"]
        );
        assert_eq!(cmd.display(), "docker build --platform linux/amd64 /tmp/ctx");
        assert!(!cmd.passes_stdin());
    }

    #[test]
    fn run_interactive_reports_exit_status() {
        let ok = Cmd::new("true").run_interactive().unwrap();
        assert!(ok.success());

        let failed = Cmd::new("false").run_interactive().unwrap();
        assert_eq!(failed.code(), Some(1));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = Cmd::new("definitely_not_a_real_command_12345")
            .run_interactive()
            .unwrap_err();
        assert!(matches!(err, Error::CommandSpawn { .. }));
    }

    #[test]
    fn recording_runner_scripts_exit_codes() {
        let mut runner = testing::RecordingRunner::with_exit_codes(&[0, 3]);
        let first = runner.run(&Cmd::new("a")).unwrap();
        let second = runner.run(&Cmd::new("b")).unwrap();
        assert!(first.success());
        assert_eq!(second.code(), Some(3));
        assert_eq!(runner.commands.len(), 2);
    }
}
