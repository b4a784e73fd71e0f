//! Child-process execution for external media tools

use std::ffi::OsStr;
use std::io;
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished child process
#[derive(Debug)]
pub struct ProcessOutput {
    /// Fully materialized stdout text
    pub stdout: String,
    /// Fully materialized stderr text
    pub stderr: String,
    /// Exit status of the process
    pub status: ExitStatus,
}

impl ProcessOutput {
    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Runs external tools to completion, capturing both output pipes.
///
/// A non-zero exit is not an error here; callers inspect the status and
/// stderr to decide failure semantics. One invocation attempt per call,
/// and the child is always awaited so no process handle leaks.
pub struct ProcessRunner;

impl ProcessRunner {
    /// Execute `program` with `args` and wait for it to exit
    pub async fn run<I, S>(program: &str, args: I) -> io::Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new(program).args(args).output().await?;

        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status,
        };

        debug!(program, status = ?result.status, "media tool finished");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_status() {
        let output = ProcessRunner::run("sh", ["-c", "echo hello"])
            .await
            .expect("failed to spawn sh");

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn nonzero_exit_is_not_an_error() {
        let output = ProcessRunner::run("sh", ["-c", "echo oops >&2; exit 3"])
            .await
            .expect("failed to spawn sh");

        assert!(!output.success());
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let result = ProcessRunner::run("definitely-not-a-real-tool", ["x"]).await;
        assert!(result.is_err());
    }
}
