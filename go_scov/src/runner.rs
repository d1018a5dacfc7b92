//! External process execution.
//!
//! The runner never fails: every outcome, including a command that cannot be
//! found, is reported as an exit code.

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, warn};

/// Exit code reported when a command cannot be resolved or spawned.
pub const UNSTARTABLE_EXIT_CODE: i32 = 1;

/// Runs an external command to completion and reports its exit code.
pub trait ProcessRunner {
    fn run(&self, command: &str, args: &[String]) -> i32;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    working_dir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run children in `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Run `command` with explicit destinations for its output streams.
    pub fn run_with(&self, command: &str, args: &[String], stdout: Stdio, stderr: Stdio) -> i32 {
        let program = match which::which(command) {
            Ok(path) => path,
            Err(err) => {
                warn!(command, error = %err, "Command not found");
                return UNSTARTABLE_EXIT_CODE;
            }
        };

        let mut cmd = Command::new(&program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(stderr);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        debug!(program = %program.display(), ?args, "Spawning command");

        match cmd.status() {
            Ok(status) => {
                let code = exit_code(status);
                debug!(program = %program.display(), code, "Command finished");
                code
            }
            Err(err) => {
                warn!(program = %program.display(), error = %err, "Failed to start command");
                UNSTARTABLE_EXIT_CODE
            }
        }
    }
}

impl ProcessRunner for SystemRunner {
    /// Output of the child goes straight to this process's stdout and stderr.
    fn run(&self, command: &str, args: &[String]) -> i32 {
        self.run_with(command, args, Stdio::inherit(), Stdio::inherit())
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    // Killed by a signal: report it the way a shell would.
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNSTARTABLE_EXIT_CODE
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// Run through file-backed stdout and stderr; returns the code and both streams.
    fn run_captured_all(
        runner: &SystemRunner,
        command: &str,
        argv: &[&str],
    ) -> (i32, String, String) {
        let out = NamedTempFile::new().expect("tempfile");
        let err = NamedTempFile::new().expect("tempfile");
        let code = runner.run_with(
            command,
            &args(argv),
            Stdio::from(out.reopen().expect("reopen stdout file")),
            Stdio::from(err.reopen().expect("reopen stderr file")),
        );
        let stdout = fs::read_to_string(out.path()).expect("read captured stdout");
        let stderr = fs::read_to_string(err.path()).expect("read captured stderr");
        (code, stdout, stderr)
    }

    fn run_captured(runner: &SystemRunner, command: &str, argv: &[&str]) -> (i32, String) {
        let (code, stdout, _) = run_captured_all(runner, command, argv);
        (code, stdout)
    }

    #[test]
    fn run_with__echo__then_forwards_output_and_succeeds() {
        let (code, output) = run_captured(&SystemRunner::new(), "echo", &["123"]);
        assert_eq!(code, 0);
        assert_eq!(output, "123\n");
    }

    #[test]
    fn run_with__missing_command__then_falls_back_to_one_without_output() {
        let (code, output) =
            run_captured(&SystemRunner::new(), "go-scov-no-such-command", &["--nope"]);
        assert_eq!(code, UNSTARTABLE_EXIT_CODE);
        assert_eq!(output, "");
    }

    #[cfg(unix)]
    #[test]
    fn run_with__command_writing_stderr__then_forwards_both_streams_unchanged() {
        let (code, stdout, stderr) = run_captured_all(
            &SystemRunner::new(),
            "sh",
            &["-c", "echo out-line; echo err-line >&2"],
        );
        assert_eq!(code, 0);
        assert_eq!(stdout, "out-line\n");
        assert_eq!(stderr, "err-line\n");
    }

    #[cfg(unix)]
    #[test]
    fn run_with__failing_command__then_propagates_exit_code() {
        let (code, output) = run_captured(&SystemRunner::new(), "sh", &["-c", "exit 15"]);
        assert_eq!(code, 15);
        assert_eq!(output, "");
    }

    #[cfg(unix)]
    #[test]
    fn run_with__killed_by_signal__then_reports_shell_style_code() {
        let (code, _) = run_captured(&SystemRunner::new(), "sh", &["-c", "kill -9 $$"]);
        assert_eq!(code, 128 + 9);
    }

    #[cfg(unix)]
    #[test]
    fn run_with__working_dir__then_child_runs_there() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = SystemRunner::new().with_working_dir(dir.path());

        let (code, _) = run_captured(&runner, "sh", &["-c", "touch marker"]);
        assert_eq!(code, 0);
        assert!(dir.path().join("marker").exists());
    }

    #[cfg(unix)]
    #[test]
    fn run__successful_command__then_returns_zero() {
        assert_eq!(SystemRunner::new().run("true", &[]), 0);
    }
}
