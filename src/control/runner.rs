use super::events::EventSink;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const TIMEOUT_MESSAGE: &str = "command timed out";

/// Result of one external command execution. Failures never escape as
/// errors; they are folded into the outcome.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub succeeded: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ExecOutcome {
    pub fn exit(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            succeeded: code == 0,
            exit_code: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
            timed_out: false,
        }
    }

    pub fn timeout() -> Self {
        Self {
            succeeded: false,
            exit_code: None,
            stdout: String::new(),
            stderr: TIMEOUT_MESSAGE.to_string(),
            timed_out: true,
        }
    }

    pub fn launch_failure(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            exit_code: None,
            stdout: String::new(),
            stderr: reason.into(),
            timed_out: false,
        }
    }
}

/// Uniform execution seam. The orchestration layers only ever talk to this
/// trait, so tests can substitute a scripted fake for the real runner.
#[async_trait]
pub trait CommandExecute: Send + Sync {
    /// Run `argv` with a bounded timeout. `quiet` suppresses the
    /// operator-facing log lines (used for low-noise polling).
    async fn execute(&self, argv: &[String], timeout: Duration, quiet: bool) -> ExecOutcome;
}

/// Executes external commands and reports each invocation to the event log.
pub struct CommandRunner {
    events: EventSink,
}

impl CommandRunner {
    pub fn new(events: EventSink) -> Self {
        Self { events }
    }
}

#[async_trait]
impl CommandExecute for CommandRunner {
    async fn execute(&self, argv: &[String], timeout: Duration, quiet: bool) -> ExecOutcome {
        let Some((program, args)) = argv.split_first() else {
            return ExecOutcome::launch_failure("empty command line");
        };

        if !quiet {
            self.events.log(format!("Running: {}", argv.join(" ")));
        }
        debug!(command = %argv.join(" "), ?timeout, "executing");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let outcome = match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                ExecOutcome {
                    succeeded: output.status.success(),
                    exit_code: output.status.code(),
                    stdout,
                    stderr,
                    timed_out: false,
                }
            }
            Ok(Err(e)) => {
                if !quiet {
                    self.events.log(format!("Error running command: {e}"));
                }
                ExecOutcome::launch_failure(e.to_string())
            }
            Err(_) => {
                if !quiet {
                    self.events.log("Command timed out");
                }
                ExecOutcome::timeout()
            }
        };

        if !quiet {
            if !outcome.stdout.trim().is_empty() {
                self.events.log(format!("Output: {}", outcome.stdout.trim()));
            }
            if !outcome.stderr.trim().is_empty() && !outcome.timed_out {
                self.events.log(format!("Error: {}", outcome.stderr.trim()));
            }
        }
        debug!(
            succeeded = outcome.succeeded,
            exit_code = ?outcome.exit_code,
            timed_out = outcome.timed_out,
            "command finished"
        );

        outcome
    }
}
