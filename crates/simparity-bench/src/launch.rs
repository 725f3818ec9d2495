//! Running a simulation binary and capturing its text output.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::env::LaunchEnv;
use crate::error::{BenchError, Result};

/// One fully specified run of a binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: LaunchEnv,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, env: LaunchEnv) -> Self {
        Self { program: program.into(), args, env, cwd: None }
    }

    /// `<program> -s <size> -i <iterations>`
    pub fn simulation(program: &Path, size: u32, iterations: u32, env: LaunchEnv) -> Self {
        let args = vec!["-s".into(), size.to_string(), "-i".into(), iterations.to_string()];
        Self::new(program, args, env)
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    /// Space-joined command line for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs invocations and returns their combined output text.
pub trait Launcher {
    fn launch(&self, invocation: &Invocation) -> Result<String>;
}

/// [`Launcher`] backed by real child processes.
///
/// The child sees only the variables in [`Invocation::env`]. Output is
/// stdout followed by stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, invocation: &Invocation) -> Result<String> {
        debug!(command = %invocation.command_line(), "launching");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).env_clear().envs(invocation.env.iter());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let output = command
            .output()
            .map_err(|source| BenchError::Spawn { program: invocation.program.clone(), source })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(BenchError::CommandFailed {
                command: invocation.command_line(),
                status: output.status.to_string(),
                output: text,
            });
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_args() {
        let inv = Invocation::simulation(Path::new("/opt/sim"), 30, 100, LaunchEnv::default());
        assert_eq!(inv.args, vec!["-s", "30", "-i", "100"]);
        assert_eq!(inv.command_line(), "/opt/sim -s 30 -i 100");
        assert_eq!(inv.cwd, None);
    }

    #[cfg(unix)]
    fn sh(script: &str, env: LaunchEnv) -> Invocation {
        Invocation::new("/bin/sh", vec!["-c".into(), script.into()], env)
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_then_stderr() {
        let out =
            ProcessLauncher.launch(&sh("echo out; echo err 1>&2", LaunchEnv::default())).unwrap();
        assert_eq!(out, "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn child_sees_only_launch_env() {
        let env = LaunchEnv::default().with_var("SIMPARITY_CHILD_VAR", "42");
        let out = ProcessLauncher.launch(&sh("echo ${SIMPARITY_CHILD_VAR}:${HOME}", env)).unwrap();
        assert_eq!(out.trim(), "42:");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_command_failed() {
        let err =
            ProcessLauncher.launch(&sh("echo boom; exit 3", LaunchEnv::default())).unwrap_err();
        match err {
            BenchError::CommandFailed { output, .. } => assert_eq!(output, "boom\n"),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let inv = Invocation::new("/definitely/not/a/binary", vec![], LaunchEnv::default());
        assert!(matches!(ProcessLauncher.launch(&inv), Err(BenchError::Spawn { .. })));
    }
}
