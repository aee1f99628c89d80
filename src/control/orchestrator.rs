use super::escalate::EscalationChain;
use super::events::EventSink;
use super::probe::ProcessStatusProbe;
use super::runner::CommandExecute;
use crate::config::StackConfig;
use crate::error::{ControlError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Immutable descriptor of one managed service.
#[derive(Debug, Clone)]
pub struct Service {
    /// Control-script suffix (`startapache`, `stopftp`, ...)
    pub key: String,
    /// Operator-facing name
    pub display_name: String,
    /// Process-table match string for the backing daemon
    pub process_matcher: String,
}

/// The fixed set of services managed by a stock install.
pub fn builtin_stack() -> Vec<Service> {
    [
        ("apache", "Apache", "httpd"),
        ("mysql", "MySQL", "mysqld"),
        ("ftp", "ProFTPD", "proftpd"),
    ]
    .into_iter()
    .map(|(key, name, matcher)| Service {
        key: key.to_string(),
        display_name: name.to_string(),
        process_matcher: matcher.to_string(),
    })
    .collect()
}

/// Last probed running state. `Unknown` until the first probe; only ever
/// overwritten with probe results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedState {
    Unknown,
    Running,
    Stopped,
}

impl ObservedState {
    pub fn is_running(self) -> bool {
        matches!(self, ObservedState::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObservedState::Unknown => "unknown",
            ObservedState::Running => "running",
            ObservedState::Stopped => "stopped",
        }
    }
}

/// How an orchestrator operation ended. `Rejected` means another operation
/// already held the service (or the bulk flag) and this request was
/// dropped, not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    Rejected,
}

/// Point-in-time view of one service for the presentation layer.
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub service: Service,
    pub observed: ObservedState,
    pub busy: bool,
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Stop,
    Restart,
}

#[derive(Debug, Clone, Copy)]
enum ServiceVerb {
    Start,
    Stop,
}

impl ServiceVerb {
    fn verb(self) -> &'static str {
        match self {
            ServiceVerb::Start => "start",
            ServiceVerb::Stop => "stop",
        }
    }

    fn done(self) -> &'static str {
        match self {
            ServiceVerb::Start => "started",
            ServiceVerb::Stop => "stopped",
        }
    }
}

struct ServiceSlot {
    service: Service,
    observed: Mutex<ObservedState>,
    busy: AtomicBool,
}

/// Top-level state machine over the managed services.
///
/// Owns all per-service state. Mutating operations are single-flight per
/// service: a request for a service that is already busy is rejected and
/// logged, never queued. Whole-stack operations are serialized against each
/// other by one global flag, independent of the per-service flags. After
/// every mutating operation the running state is re-probed; command
/// outcomes are never trusted as state.
pub struct ServiceOrchestrator {
    slots: Vec<ServiceSlot>,
    bulk_in_flight: AtomicBool,
    bulk_timeout: Duration,
    chain: EscalationChain,
    probe: ProcessStatusProbe,
    events: EventSink,
}

impl ServiceOrchestrator {
    pub fn new(config: &StackConfig, runner: Arc<dyn CommandExecute>, events: EventSink) -> Self {
        Self::with_services(config, builtin_stack(), runner, events)
    }

    pub fn with_services(
        config: &StackConfig,
        services: Vec<Service>,
        runner: Arc<dyn CommandExecute>,
        events: EventSink,
    ) -> Self {
        let chain = EscalationChain::new(
            config.control_script(),
            config.command_timeout(),
            config.probe_timeout(),
            Arc::clone(&runner),
            events.clone(),
        );
        let probe = ProcessStatusProbe::new(runner, config.probe_timeout());
        let slots = services
            .into_iter()
            .map(|service| ServiceSlot {
                service,
                observed: Mutex::new(ObservedState::Unknown),
                busy: AtomicBool::new(false),
            })
            .collect();

        Self {
            slots,
            bulk_in_flight: AtomicBool::new(false),
            bulk_timeout: config.bulk_timeout(),
            chain,
            probe,
            events,
        }
    }

    pub fn statuses(&self) -> Vec<ServiceStatus> {
        self.slots
            .iter()
            .map(|slot| ServiceStatus {
                service: slot.service.clone(),
                observed: *slot.observed.lock().expect("state lock poisoned"),
                busy: slot.busy.load(Ordering::Acquire),
            })
            .collect()
    }

    pub fn observed(&self, key: &str) -> Result<ObservedState> {
        let idx = self.index_of(key)?;
        Ok(*self.slots[idx].observed.lock().expect("state lock poisoned"))
    }

    pub async fn start(&self, key: &str) -> Result<Outcome> {
        let idx = self.index_of(key)?;
        Ok(self.guarded_op(idx, Op::Start).await)
    }

    pub async fn stop(&self, key: &str) -> Result<Outcome> {
        let idx = self.index_of(key)?;
        Ok(self.guarded_op(idx, Op::Stop).await)
    }

    pub async fn restart(&self, key: &str) -> Result<Outcome> {
        let idx = self.index_of(key)?;
        Ok(self.guarded_op(idx, Op::Restart).await)
    }

    /// Start the service when it is not observed running, stop it when it
    /// is. Convenience composition over the two primitives.
    pub async fn toggle(&self, key: &str) -> Result<Outcome> {
        let idx = self.index_of(key)?;
        let running = self.slots[idx]
            .observed
            .lock()
            .expect("state lock poisoned")
            .is_running();
        let op = if running { Op::Stop } else { Op::Start };
        Ok(self.guarded_op(idx, op).await)
    }

    pub async fn start_all(&self) -> Outcome {
        self.bulk_op(
            "start",
            "All services started successfully",
            "Failed to start all services",
        )
        .await
    }

    pub async fn stop_all(&self) -> Outcome {
        self.bulk_op(
            "stop",
            "All services stopped successfully",
            "Failed to stop all services",
        )
        .await
    }

    pub async fn restart_all(&self) -> Outcome {
        self.bulk_op(
            "restart",
            "All services restarted successfully",
            "Failed to restart all services",
        )
        .await
    }

    pub async fn reload(&self) -> Outcome {
        self.bulk_op(
            "reload",
            "Stack configuration reloaded",
            "Failed to reload stack configuration",
        )
        .await
    }

    /// Re-probe one service and overwrite its observed state.
    pub async fn refresh_status(&self, key: &str) -> Result<bool> {
        let idx = self.index_of(key)?;
        Ok(self.refresh_slot(idx).await)
    }

    /// Re-probe every service.
    pub async fn refresh_all(&self) {
        for idx in 0..self.slots.len() {
            self.refresh_slot(idx).await;
        }
    }

    fn index_of(&self, key: &str) -> Result<usize> {
        self.slots
            .iter()
            .position(|slot| slot.service.key == key)
            .ok_or_else(|| ControlError::UnknownService(key.to_string()))
    }

    async fn guarded_op(&self, idx: usize, op: Op) -> Outcome {
        let slot = &self.slots[idx];
        let service = &slot.service;

        if slot
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(service = %service.key, "operation already in flight, rejecting");
            self.events.log(format!(
                "An operation is already in progress for {}, ignoring request",
                service.display_name
            ));
            return Outcome::Rejected;
        }
        self.events.busy_changed(&service.key, true);

        let outcome = match op {
            Op::Start => self.run_service_action(service, ServiceVerb::Start).await,
            Op::Stop => self.run_service_action(service, ServiceVerb::Stop).await,
            Op::Restart => self.run_restart(service).await,
        };

        // State is always re-observed before the service is released, so a
        // caller never sees the busy flag clear against stale state.
        self.refresh_slot(idx).await;
        slot.busy.store(false, Ordering::Release);
        self.events.busy_changed(&service.key, false);

        outcome
    }

    async fn run_service_action(&self, service: &Service, verb: ServiceVerb) -> Outcome {
        let action = format!("{}{}", verb.verb(), service.key);
        let result = self.chain.run(&action).await;

        if result.succeeded {
            info!(service = %service.key, action = %action, "action succeeded");
            self.events.log(format!(
                "{} {} successfully",
                service.display_name,
                verb.done()
            ));
            Outcome::Succeeded
        } else {
            warn!(service = %service.key, action = %action, "action failed");
            self.events.log(format!(
                "Failed to {} {}",
                verb.verb(),
                service.display_name
            ));
            Outcome::Failed
        }
    }

    async fn run_restart(&self, service: &Service) -> Outcome {
        self.events
            .log(format!("Restarting {}...", service.display_name));

        let stopped = self.chain.run(&format!("stop{}", service.key)).await;
        let started = self.chain.run(&format!("start{}", service.key)).await;

        if stopped.succeeded && started.succeeded {
            self.events
                .log(format!("{} restarted", service.display_name));
            Outcome::Succeeded
        } else {
            self.events
                .log(format!("Failed to restart {}", service.display_name));
            Outcome::Failed
        }
    }

    async fn bulk_op(&self, action: &str, ok_message: &str, fail_message: &str) -> Outcome {
        if self
            .bulk_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(action, "bulk operation already in flight, rejecting");
            self.events
                .log("A whole-stack operation is already in progress, ignoring request");
            return Outcome::Rejected;
        }

        let result = self.chain.run_with_timeout(action, self.bulk_timeout).await;
        let outcome = if result.succeeded {
            self.events.log(ok_message);
            Outcome::Succeeded
        } else {
            self.events.log(fail_message);
            Outcome::Failed
        };

        self.refresh_all().await;
        self.bulk_in_flight.store(false, Ordering::Release);

        outcome
    }

    async fn refresh_slot(&self, idx: usize) -> bool {
        let slot = &self.slots[idx];
        let running = self.probe.is_running(&slot.service).await;
        let next = if running {
            ObservedState::Running
        } else {
            ObservedState::Stopped
        };

        let changed = {
            let mut observed = slot.observed.lock().expect("state lock poisoned");
            let changed = *observed != next;
            *observed = next;
            changed
        };

        if changed {
            self.events.status_changed(&slot.service.key, running);
        }
        running
    }
}
