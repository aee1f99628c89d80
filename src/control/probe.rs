use super::orchestrator::Service;
use super::runner::CommandExecute;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Ground-truth liveness check against the OS process table.
///
/// The probe is the only writer of observed state: a control-script command
/// can "succeed" while the daemon it targets never comes up (or takes a
/// moment to exit), so running state is always re-measured instead of
/// inferred from command outcomes.
pub struct ProcessStatusProbe {
    runner: Arc<dyn CommandExecute>,
    timeout: Duration,
}

impl ProcessStatusProbe {
    pub fn new(runner: Arc<dyn CommandExecute>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// True when any process command line matches the service's matcher.
    /// Probe errors (pgrep missing, enumeration denied, timeout) count as
    /// "not running": absence of positive evidence.
    pub async fn is_running(&self, service: &Service) -> bool {
        let argv = vec![
            "pgrep".to_string(),
            "-f".to_string(),
            service.process_matcher.clone(),
        ];
        let outcome = self.runner.execute(&argv, self.timeout, true).await;
        trace!(
            service = %service.key,
            matcher = %service.process_matcher,
            running = outcome.succeeded,
            "process probe"
        );
        outcome.succeeded
    }
}
