//! Service orchestration and privilege-escalation engine.
//!
//! Drives a fixed set of local services (Apache, MySQL, ProFTPD) through a
//! single privileged control script:
//! - per-service and whole-stack start/stop/restart/reload
//! - ordered escalation fallback (direct, `sudo -n`, `pkexec`, bounded
//!   `sudo`) so one of the host's elevation mechanisms gets through
//! - ground-truth status from the process table, never from command
//!   outcomes
//! - single-flight serialization per service
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │              ServiceOrchestrator               │
//! │     (per-service state, busy flags, events)    │
//! ├───────────────────────┬────────────────────────┤
//! │    EscalationChain    │   ProcessStatusProbe   │
//! │  (ordered fallback)   │      (pgrep -f)        │
//! ├───────────────────────┴────────────────────────┤
//! │          CommandRunner (bounded exec)          │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Every component reports over the [`EventSink`] channel; the presentation
//! layer owns the receiving end.

pub mod auth;
pub mod escalate;
pub mod events;
pub mod orchestrator;
pub mod probe;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthMethod, AuthMethodDetector};
pub use escalate::{ChainResult, EscalationChain};
pub use events::{ControlEvent, EventSink, LogEvent};
pub use orchestrator::{
    builtin_stack, ObservedState, Outcome, Service, ServiceOrchestrator, ServiceStatus,
};
pub use probe::ProcessStatusProbe;
pub use runner::{CommandExecute, CommandRunner, ExecOutcome};
