//! Scripted [`CommandExecute`] fake shared by the control-layer tests.

use super::runner::{CommandExecute, ExecOutcome};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Replays queued outcomes for escalation calls and answers `pgrep` probes
/// from a per-matcher liveness table. Every call is recorded.
pub(crate) struct FakeRunner {
    queue: Mutex<VecDeque<ExecOutcome>>,
    probe_failure: Mutex<Option<ExecOutcome>>,
    running: Mutex<HashMap<String, bool>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Mutex<Duration>,
}

struct RecordedCall {
    argv: Vec<String>,
    timeout: Duration,
}

impl FakeRunner {
    /// Fake where every escalation call succeeds with exit 0 and every
    /// probe reports "not running" until told otherwise.
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            probe_failure: Mutex::new(None),
            running: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    /// Queue the outcome for the next non-probe call. When the queue is
    /// empty, calls succeed with exit 0.
    pub(crate) fn push(&self, outcome: ExecOutcome) {
        self.queue.lock().expect("queue lock poisoned").push_back(outcome);
    }

    /// Make every `pgrep` call return this outcome instead of consulting
    /// the liveness table.
    pub(crate) fn fail_probes_with(&self, outcome: ExecOutcome) {
        *self.probe_failure.lock().expect("probe lock poisoned") = Some(outcome);
    }

    /// Set the liveness answer for a process matcher.
    pub(crate) fn set_running(&self, matcher: &str, running: bool) {
        self.running
            .lock()
            .expect("running lock poisoned")
            .insert(matcher.to_string(), running);
    }

    /// Make every call suspend for `delay` first, so concurrent callers
    /// genuinely overlap.
    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().expect("delay lock poisoned") = delay;
    }

    /// All recorded argvs, probes included, in call order.
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .iter()
            .map(|c| c.argv.clone())
            .collect()
    }

    /// Recorded non-probe argvs only.
    pub(crate) fn action_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|argv| argv.first().map(String::as_str) != Some("pgrep"))
            .collect()
    }

    /// Timeouts passed with each recorded call, in call order.
    pub(crate) fn timeouts(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .iter()
            .map(|c| c.timeout)
            .collect()
    }
}

#[async_trait]
impl CommandExecute for FakeRunner {
    async fn execute(&self, argv: &[String], timeout: Duration, _quiet: bool) -> ExecOutcome {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(RecordedCall {
                argv: argv.to_vec(),
                timeout,
            });

        let delay = *self.delay.lock().expect("delay lock poisoned");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if argv.first().map(String::as_str) == Some("pgrep") {
            if let Some(outcome) = self.probe_failure.lock().expect("probe lock poisoned").clone() {
                return outcome;
            }
            let matcher = argv.get(2).cloned().unwrap_or_default();
            let running = self
                .running
                .lock()
                .expect("running lock poisoned")
                .get(&matcher)
                .copied()
                .unwrap_or(false);
            return if running {
                ExecOutcome::exit(0, "4242\n", "")
            } else {
                ExecOutcome::exit(1, "", "")
            };
        }

        self.queue
            .lock()
            .expect("queue lock poisoned")
            .pop_front()
            .unwrap_or_else(|| ExecOutcome::exit(0, "", ""))
    }
}
