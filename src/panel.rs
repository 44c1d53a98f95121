//! Panel event loop.
//!
//! One task owns the controller and both pollers and reacts to four sources:
//! user commands, backend-pushed events, completions of bridge requests and
//! the two poll timers. After each message the full [`PanelView`] is
//! republished on a watch channel for the front-end.

use std::ops::ControlFlow;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::bridge::{Bridge, BridgeEvent};
use crate::config::Config;
use crate::controller::{
    ControlLayout, Notice, ReceiverState, SessionCompletion, TransferSessionController,
};
use crate::logger::Logger;
use crate::poller::{ConnectivityPoller, DeviceStatusPoller, PollCompletion};
use crate::session::SessionState;
use crate::status::{ConnectivitySnapshot, DeviceStatusSnapshot, StatusField};
use crate::types::PanelError;

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 256;

/// Result of a bridge request, routed back into the loop.
#[derive(Debug)]
pub enum Completion {
    Session(SessionCompletion),
    Poll(PollCompletion),
}

/// User action coming from the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    Browse,
    SelectFile(String),
    StartTransfer,
    CancelTransfer,
    SendText(String),
    RefreshSerialPort,
    DismissNotice,
    Shutdown,
}

impl PanelCommand {
    /// Parses one line of the text front-end.
    pub fn parse(line: &str) -> Result<Self, PanelError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "browse" => Ok(Self::Browse),
            "select" => Ok(Self::SelectFile(rest.to_string())),
            "start" => Ok(Self::StartTransfer),
            "cancel" => Ok(Self::CancelTransfer),
            "text" => Ok(Self::SendText(rest.to_string())),
            "serial" => Ok(Self::RefreshSerialPort),
            "dismiss" => Ok(Self::DismissNotice),
            "quit" | "exit" => Ok(Self::Shutdown),
            other => Err(PanelError::InvalidArgument(format!(
                "unknown command: {other}"
            ))),
        }
    }
}

/// Everything the front-end renders.
#[derive(Debug, Serialize, Clone, Default)]
pub struct PanelView {
    pub session_state: SessionState,
    pub selected_file: Option<String>,
    pub file_label: String,
    pub progress_percent: u8,
    pub progress_label: String,
    pub packets: String,
    pub bytes: String,
    pub controls: ControlLayout,
    pub emitter: StatusField,
    pub receiver: StatusField,
    pub receiver_state: ReceiverState,
    pub connectivity: ConnectivitySnapshot,
    pub device_status: DeviceStatusSnapshot,
    pub notices: Vec<Notice>,
    pub text_input: String,
    pub log: Arc<Vec<String>>,
    pub log_scroll: Option<usize>,
}

/// Front-end side of a running panel.
pub struct PanelHandle {
    commands: mpsc::Sender<PanelCommand>,
    events: mpsc::Sender<BridgeEvent>,
    view: watch::Receiver<PanelView>,
}

impl PanelHandle {
    pub async fn send(&self, command: PanelCommand) -> Result<(), PanelError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PanelError::ChannelClosed)
    }

    /// Sender for backend-pushed events.
    pub fn events(&self) -> mpsc::Sender<BridgeEvent> {
        self.events.clone()
    }

    pub fn view(&self) -> watch::Receiver<PanelView> {
        self.view.clone()
    }
}

pub struct Panel {
    controller: TransferSessionController,
    connectivity: ConnectivityPoller,
    device_status: DeviceStatusPoller,
    log: Logger,
    commands: mpsc::Receiver<PanelCommand>,
    events: mpsc::Receiver<BridgeEvent>,
    completions: mpsc::UnboundedReceiver<Completion>,
    view: watch::Sender<PanelView>,
    log_cache: Option<(u64, Arc<Vec<String>>)>,
}

impl Panel {
    pub fn new(bridge: Arc<dyn Bridge>, config: &Config) -> (Self, PanelHandle) {
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(PanelView::default());
        let log = Logger::with_capacity(config.log_capacity);

        let controller = TransferSessionController::new(
            Arc::clone(&bridge),
            completion_tx.clone(),
            log.clone(),
            config.receiver_revert_delay(),
        );
        let connectivity = ConnectivityPoller::new(
            Arc::clone(&bridge),
            completion_tx.clone(),
            log.clone(),
            config.connectivity_interval(),
            config.skip_overlapping_polls,
        );
        let device_status = DeviceStatusPoller::new(
            bridge,
            completion_tx,
            log.clone(),
            config.device_status_interval(),
            config.skip_overlapping_polls,
        );

        let mut panel = Self {
            controller,
            connectivity,
            device_status,
            log,
            commands,
            events,
            completions,
            view: view_tx,
            log_cache: None,
        };
        panel.publish();

        let handle = PanelHandle {
            commands: command_tx,
            events: event_tx,
            view: view_rx,
        };
        (panel, handle)
    }

    pub fn view(&mut self) -> PanelView {
        let log = self.log_lines();
        let session = self.controller.session();
        let frames = session.frames();
        PanelView {
            session_state: session.state(),
            selected_file: session.selected_file().map(str::to_string),
            file_label: self.controller.file_label().to_string(),
            progress_percent: session.progress(),
            progress_label: format!("{}%", session.progress()),
            packets: frames.packets_label(),
            bytes: frames.bytes_label(),
            controls: self.controller.controls(),
            emitter: self.controller.emitter().clone(),
            receiver: self.controller.receiver().clone(),
            receiver_state: self.controller.receiver_state(),
            connectivity: self.connectivity.snapshot().clone(),
            device_status: self.device_status.snapshot().clone(),
            notices: self.controller.notices().cloned().collect(),
            text_input: self.controller.text_input().to_string(),
            log,
            log_scroll: self.log.scroll_position(),
        }
    }

    pub fn handle_command(&mut self, command: PanelCommand) -> ControlFlow<()> {
        debug!(?command, "Panel command");
        match command {
            PanelCommand::Browse => self.controller.browse_file(),
            PanelCommand::SelectFile(path) => {
                let _ = self.controller.select_file(&path);
            }
            PanelCommand::StartTransfer => {
                let _ = self.controller.start_transfer();
            }
            PanelCommand::CancelTransfer => {
                let _ = self.controller.cancel_transfer();
            }
            PanelCommand::SendText(text) => {
                self.controller.set_text_input(text.as_str());
                let _ = self.controller.send_text_message(&text);
            }
            PanelCommand::RefreshSerialPort => self.connectivity.refresh_serial_port(),
            PanelCommand::DismissNotice => {
                self.controller.dismiss_notice();
            }
            PanelCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    pub fn handle_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Progress { percent } => self.controller.on_progress(percent),
            BridgeEvent::FrameSummary {
                frame_count,
                total_bytes,
            } => self.controller.on_frame_summary(frame_count, total_bytes),
            BridgeEvent::TransferFinished { status, message } => {
                self.controller.on_transfer_finished(status, &message)
            }
            BridgeEvent::FileReceived {
                status,
                file_name,
                message,
            } => self
                .controller
                .on_file_received(status, &file_name, &message),
        }
    }

    pub fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Session(completion) => self.controller.apply(completion),
            Completion::Poll(PollCompletion::Connectivity(result)) => {
                self.connectivity.apply(result)
            }
            Completion::Poll(PollCompletion::DeviceStatus(result)) => {
                self.device_status.apply(result)
            }
            Completion::Poll(PollCompletion::SerialPort(result)) => {
                self.connectivity.apply_serial_port(result)
            }
        }
    }

    /// Runs until a `Shutdown` command arrives or every command sender is gone.
    pub async fn run(mut self) {
        let mut connectivity_tick = interval(self.connectivity.interval());
        connectivity_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut device_tick = interval(self.device_status.interval());
        device_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Panel started");
        self.log.log("Painel pronto.");
        self.publish();

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    if self.handle_command(command).is_break() {
                        break;
                    }
                }
                Some(event) = self.events.recv() => self.handle_event(event),
                Some(completion) = self.completions.recv() => self.handle_completion(completion),
                _ = connectivity_tick.tick() => {
                    self.connectivity.tick();
                }
                _ = device_tick.tick() => {
                    self.device_status.tick();
                }
            }
            self.publish();
        }

        info!("Panel stopped");
    }

    fn publish(&mut self) {
        let view = self.view();
        self.view.send_replace(view);
    }

    /// Reformats the log only when it changed since the last view.
    fn log_lines(&mut self) -> Arc<Vec<String>> {
        if let Some((revision, lines)) = &self.log_cache {
            if *revision == self.log.revision() {
                return Arc::clone(lines);
            }
        }
        let (revision, lines) = self.log.lines_with_revision();
        let lines = Arc::new(lines);
        self.log_cache = Some((revision, Arc::clone(&lines)));
        lines
    }
}
