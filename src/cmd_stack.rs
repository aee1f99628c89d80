use anyhow::Result;
use lampctl::config::StackConfig;
use lampctl::control::{
    AuthMethodDetector, CommandExecute, CommandRunner, ControlEvent, EventSink, Outcome,
    ServiceOrchestrator,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Clone, Copy)]
pub(crate) enum ServiceAction {
    Start,
    Stop,
    Restart,
    Toggle,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum BulkAction {
    StartAll,
    StopAll,
    RestartAll,
    Reload,
}

pub(crate) async fn cmd_service(
    config: StackConfig,
    action: ServiceAction,
    service: &str,
) -> Result<()> {
    config.ensure_control_script()?;

    let (events, rx) = EventSink::channel();
    let printer = tokio::spawn(print_events(rx));

    let runner: Arc<dyn CommandExecute> = Arc::new(CommandRunner::new(events.clone()));
    announce_auth_method(&config, &runner, &events).await;
    let orchestrator = ServiceOrchestrator::new(&config, runner, events.clone());

    // Establish current state first so toggle has something to read.
    orchestrator.refresh_status(service).await?;

    let outcome = match action {
        ServiceAction::Start => orchestrator.start(service).await?,
        ServiceAction::Stop => orchestrator.stop(service).await?,
        ServiceAction::Restart => orchestrator.restart(service).await?,
        ServiceAction::Toggle => orchestrator.toggle(service).await?,
    };

    finish(orchestrator, events, printer).await?;
    exit_on_failure(outcome);
    Ok(())
}

pub(crate) async fn cmd_bulk(config: StackConfig, action: BulkAction) -> Result<()> {
    config.ensure_control_script()?;

    let (events, rx) = EventSink::channel();
    let printer = tokio::spawn(print_events(rx));

    let runner: Arc<dyn CommandExecute> = Arc::new(CommandRunner::new(events.clone()));
    announce_auth_method(&config, &runner, &events).await;
    let orchestrator = ServiceOrchestrator::new(&config, runner, events.clone());

    let outcome = match action {
        BulkAction::StartAll => orchestrator.start_all().await,
        BulkAction::StopAll => orchestrator.stop_all().await,
        BulkAction::RestartAll => orchestrator.restart_all().await,
        BulkAction::Reload => orchestrator.reload().await,
    };

    finish(orchestrator, events, printer).await?;
    exit_on_failure(outcome);
    Ok(())
}

pub(crate) async fn cmd_status(config: StackConfig, json: bool) -> Result<()> {
    config.ensure_control_script()?;

    let (events, _rx) = EventSink::channel();
    let runner: Arc<dyn CommandExecute> = Arc::new(CommandRunner::new(events.clone()));
    let orchestrator = ServiceOrchestrator::new(&config, runner, events);

    orchestrator.refresh_all().await;
    let statuses = orchestrator.statuses();

    if json {
        #[derive(Serialize)]
        struct Row<'a> {
            service: &'a str,
            display_name: &'a str,
            state: &'a str,
        }

        let rows: Vec<Row> = statuses
            .iter()
            .map(|status| Row {
                service: &status.service.key,
                display_name: &status.service.display_name,
                state: status.observed.as_str(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for status in &statuses {
            println!(
                "{:<10} {}",
                status.service.display_name,
                status.observed.as_str()
            );
        }
    }

    Ok(())
}

async fn announce_auth_method(
    config: &StackConfig,
    runner: &Arc<dyn CommandExecute>,
    events: &EventSink,
) {
    let detector = AuthMethodDetector::new(
        config.control_script(),
        Arc::clone(runner),
        config.probe_timeout(),
    );
    let method = detector.detect().await;
    events.log(format!("Using authentication method: {method}"));
}

/// Close the event channel and wait for the printer to drain it.
async fn finish(
    orchestrator: ServiceOrchestrator,
    events: EventSink,
    printer: tokio::task::JoinHandle<()>,
) -> Result<()> {
    drop(orchestrator);
    drop(events);
    printer.await?;
    Ok(())
}

fn exit_on_failure(outcome: Outcome) {
    if outcome != Outcome::Succeeded {
        std::process::exit(1);
    }
}

async fn print_events(mut rx: UnboundedReceiver<ControlEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ControlEvent::Log(ev) => {
                println!("[{}] {}", ev.timestamp.format("%H:%M:%S"), ev.text);
            }
            ControlEvent::StatusChanged { service, running } => {
                println!(
                    "{} is now {}",
                    service,
                    if running { "running" } else { "stopped" }
                );
            }
            // Busy transitions are interesting to a GUI, noise on a terminal.
            ControlEvent::BusyChanged { .. } => {}
        }
    }
}
