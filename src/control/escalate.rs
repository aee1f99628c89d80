use super::events::EventSink;
use super::runner::{CommandExecute, ExecOutcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const EXHAUSTED_MESSAGE: &str = "all escalation methods failed";

/// One way of invoking the control script. Tried in [`FALLBACK_ORDER`]
/// until an attempt exits 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Plain invocation, no elevation.
    Direct,
    /// `sudo -n`: uses a cached credential or fails at once, never prompts.
    NonInteractive,
    /// `pkexec`: may raise a polkit prompt for the operator.
    Interactive,
    /// `sudo` capped to the probe timeout, so a prompt nobody can answer
    /// fails fast instead of hanging the action.
    BoundedWait,
}

const FALLBACK_ORDER: [Strategy; 4] = [
    Strategy::Direct,
    Strategy::NonInteractive,
    Strategy::Interactive,
    Strategy::BoundedWait,
];

impl Strategy {
    fn argv(self, script: &Path, action: &str) -> Vec<String> {
        let script = script.to_string_lossy().into_owned();
        let action = action.to_string();
        match self {
            Strategy::Direct => vec![script, action],
            Strategy::NonInteractive => vec!["sudo".to_string(), "-n".to_string(), script, action],
            Strategy::Interactive => vec!["pkexec".to_string(), script, action],
            Strategy::BoundedWait => vec!["sudo".to_string(), script, action],
        }
    }

    fn timeout(self, command_timeout: Duration, probe_timeout: Duration) -> Duration {
        match self {
            Strategy::BoundedWait => probe_timeout,
            _ => command_timeout,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Strategy::Direct => "direct execution",
            Strategy::NonInteractive => "non-interactive sudo",
            Strategy::Interactive => "pkexec prompt",
            Strategy::BoundedWait => "bounded-wait sudo",
        }
    }
}

/// Final outcome of an action after the chain has run.
#[derive(Debug, Clone)]
pub struct ChainResult {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Drives a control-script action through the ordered escalation fallback
/// list. Different hosts expose different elevation tooling, so every
/// strategy is always tried in order regardless of what detection reported.
pub struct EscalationChain {
    script: PathBuf,
    command_timeout: Duration,
    probe_timeout: Duration,
    runner: Arc<dyn CommandExecute>,
    events: EventSink,
}

impl EscalationChain {
    pub fn new(
        script: PathBuf,
        command_timeout: Duration,
        probe_timeout: Duration,
        runner: Arc<dyn CommandExecute>,
        events: EventSink,
    ) -> Self {
        Self {
            script,
            command_timeout,
            probe_timeout,
            runner,
            events,
        }
    }

    /// Run `action` with the default per-command timeout.
    pub async fn run(&self, action: &str) -> ChainResult {
        self.run_with_timeout(action, self.command_timeout).await
    }

    /// Run `action` with an explicit timeout (bulk operations use a larger
    /// bound). The bounded-wait strategy keeps its short cap either way.
    pub async fn run_with_timeout(&self, action: &str, timeout: Duration) -> ChainResult {
        let mut last: Option<ExecOutcome> = None;

        for (index, strategy) in FALLBACK_ORDER.into_iter().enumerate() {
            let argv = strategy.argv(&self.script, action);
            let attempt_timeout = strategy.timeout(timeout, self.probe_timeout);
            let outcome = self.runner.execute(&argv, attempt_timeout, false).await;

            if outcome.succeeded {
                return ChainResult {
                    succeeded: true,
                    stdout: outcome.stdout,
                    stderr: outcome.stderr,
                };
            }

            self.events.log(format!(
                "Method {} ({}) failed",
                index + 1,
                strategy.describe()
            ));
            last = Some(outcome);
        }

        let (stdout, stderr) = match last {
            Some(outcome) => {
                let stderr = if outcome.stderr.trim().is_empty() {
                    EXHAUSTED_MESSAGE.to_string()
                } else {
                    outcome.stderr
                };
                (outcome.stdout, stderr)
            }
            None => (String::new(), EXHAUSTED_MESSAGE.to_string()),
        };

        ChainResult {
            succeeded: false,
            stdout,
            stderr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::testing::FakeRunner;

    fn chain(
        runner: Arc<FakeRunner>,
    ) -> (
        EscalationChain,
        tokio::sync::mpsc::UnboundedReceiver<crate::control::ControlEvent>,
    ) {
        let (events, rx) = EventSink::channel();
        (
            EscalationChain::new(
                PathBuf::from("/opt/lampp/lampp"),
                Duration::from_secs(30),
                Duration::from_secs(1),
                runner,
                events,
            ),
            rx,
        )
    }

    #[tokio::test]
    async fn stops_at_first_successful_candidate() {
        let runner = Arc::new(FakeRunner::new());
        runner.push(ExecOutcome::exit(1, "", "not permitted"));
        runner.push(ExecOutcome::exit(1, "", "sudo: a password is required"));
        runner.push(ExecOutcome::exit(0, "apache started", ""));
        let (chain, _rx) = chain(Arc::clone(&runner));

        let result = chain.run("startapache").await;

        assert!(result.succeeded);
        assert_eq!(result.stdout, "apache started");

        let calls = runner.calls();
        assert_eq!(calls.len(), 3, "fourth candidate must never run");
        assert_eq!(calls[0], ["/opt/lampp/lampp", "startapache"]);
        assert_eq!(calls[1], ["sudo", "-n", "/opt/lampp/lampp", "startapache"]);
        assert_eq!(calls[2], ["pkexec", "/opt/lampp/lampp", "startapache"]);
    }

    #[tokio::test]
    async fn exhausted_chain_reports_last_stderr() {
        let runner = Arc::new(FakeRunner::new());
        for _ in 0..3 {
            runner.push(ExecOutcome::exit(1, "", "denied"));
        }
        runner.push(ExecOutcome::exit(1, "", "sudo timed out waiting for input"));
        let (chain, _rx) = chain(Arc::clone(&runner));

        let result = chain.run("stopmysql").await;

        assert!(!result.succeeded);
        assert_eq!(result.stderr, "sudo timed out waiting for input");
        assert_eq!(runner.calls().len(), 4);
        assert_eq!(
            runner.calls()[3],
            ["sudo", "/opt/lampp/lampp", "stopmysql"]
        );
    }

    #[tokio::test]
    async fn exhausted_chain_with_silent_failures_synthesizes_message() {
        let runner = Arc::new(FakeRunner::new());
        for _ in 0..4 {
            runner.push(ExecOutcome::exit(1, "", ""));
        }
        let (chain, _rx) = chain(runner);

        let result = chain.run("start").await;

        assert!(!result.succeeded);
        assert_eq!(result.stderr, "all escalation methods failed");
    }

    #[tokio::test]
    async fn bounded_wait_candidate_uses_probe_timeout() {
        let runner = Arc::new(FakeRunner::new());
        for _ in 0..4 {
            runner.push(ExecOutcome::exit(1, "", "no"));
        }
        let (chain, _rx) = chain(Arc::clone(&runner));

        chain.run("reload").await;

        let timeouts = runner.timeouts();
        assert_eq!(
            timeouts,
            vec![
                Duration::from_secs(30),
                Duration::from_secs(30),
                Duration::from_secs(30),
                Duration::from_secs(1),
            ]
        );
    }

    #[tokio::test]
    async fn bulk_timeout_applies_to_all_but_bounded_wait() {
        let runner = Arc::new(FakeRunner::new());
        for _ in 0..4 {
            runner.push(ExecOutcome::exit(1, "", "no"));
        }
        let (chain, _rx) = chain(Arc::clone(&runner));

        chain
            .run_with_timeout("restart", Duration::from_secs(60))
            .await;

        let timeouts = runner.timeouts();
        assert_eq!(timeouts[0], Duration::from_secs(60));
        assert_eq!(timeouts[3], Duration::from_secs(1));
    }
}
