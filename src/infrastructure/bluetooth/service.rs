//! Discovery worker.
//!
//! Owns the active [`DiscoveryBackend`] on its own thread and bounds every
//! session by the requested duration.

use crate::domain::models::{AppEvent, MessageSeverity, ScanCommand, StatusMessage};
use crate::domain::settings::ScanSettings;
use crate::infrastructure::bluetooth::{default_backend, parse_service_uuid, DiscoveryBackend};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{error, info};

pub struct ScanService {
    backend: Box<dyn DiscoveryBackend>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    deadline: Option<Instant>,
    session: u64,
}

impl ScanService {
    pub fn new(
        backend: Box<dyn DiscoveryBackend>,
        event_sender: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            backend,
            event_sender,
            deadline: None,
            session: 0,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn handle(&mut self, command: ScanCommand) {
        match command {
            ScanCommand::Start {
                session,
                duration,
                service_uuid,
            } => {
                self.session = session;
                self.start(duration, service_uuid.as_deref());
            }
            ScanCommand::Stop => {
                if self.is_scanning() || self.backend.is_scanning() {
                    self.finish();
                }
            }
        }
    }

    fn start(&mut self, duration: Duration, service_uuid: Option<&str>) {
        if let Some(uuid) = service_uuid {
            if let Err(e) = parse_service_uuid(uuid) {
                error!("Rejected scan filter: {}", e);
                self.deadline = None;
                self.notify(MessageSeverity::Error, format!("Failed to start scan: {}", e));
                self.send_finished();
                return;
            }
        }

        match self.backend.start(service_uuid) {
            Ok(()) => {
                info!(
                    session = self.session,
                    "Scan started with {} for {:?}",
                    self.backend.name(),
                    duration
                );
                self.deadline = Some(Instant::now() + duration);
                self.notify(MessageSeverity::Info, "Scanning for BLE devices...");
            }
            Err(e) => {
                error!("Failed to start scan: {}", e);
                self.deadline = None;
                self.notify(MessageSeverity::Error, format!("Failed to start scan: {}", e));
                self.send_finished();
            }
        }
    }

    /// Ends the current session and tells the UI.
    pub fn finish(&mut self) {
        self.deadline = None;
        if let Err(e) = self.backend.stop() {
            error!("Failed to stop scan: {}", e);
        }
        self.notify(MessageSeverity::Info, "Scan stopped.");
        self.send_finished();
    }

    fn send_finished(&self) {
        let _ = self.event_sender.send(AppEvent::ScanFinished {
            session: self.session,
        });
    }

    fn notify(&self, severity: MessageSeverity, message: impl Into<String>) {
        let _ = self
            .event_sender
            .send(AppEvent::LogMessage(StatusMessage::new(severity, message)));
    }

    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<ScanCommand>) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = sleep_until(deadline) => {
                    info!("Scan window elapsed");
                    self.finish();
                }
            }
        }
        let _ = self.backend.stop();
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Starts the worker thread and returns its command channel.
pub fn spawn_scan_worker(
    settings: &ScanSettings,
    event_sender: mpsc::UnboundedSender<AppEvent>,
) -> mpsc::UnboundedSender<ScanCommand> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let simulate = settings.simulate;

    let spawned = std::thread::Builder::new()
        .name("ble-scan".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime for scanning: {}", e);
                    return;
                }
            };

            rt.block_on(async move {
                let backend = default_backend(simulate, event_sender.clone());
                ScanService::new(backend, event_sender).run(command_rx).await;
            });
        });

    if let Err(e) = spawned {
        error!("Failed to spawn scan worker: {}", e);
    }
    command_tx
}
