//! Transfer session controller.
//!
//! Owns the [`TransferSession`] plus the display fields tied to it (emitter
//! and receiver cards, control layout, file label, text input, notices).
//! Bridge requests run as spawned tasks and report back through the panel's
//! completion channel, so every mutation happens on the panel loop between
//! two awaited responses.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::bridge::{Ack, Bridge, FinishStatus, ReceptionStatus};
use crate::logger::Logger;
use crate::panel::Completion;
use crate::session::{Rejection, TransferSession};
use crate::status::StatusField;
use crate::types::PanelError;

pub const EMITTER_IDLE: &str = "Parado";
pub const EMITTER_SENDING: &str = "Enviando";
pub const EMITTER_DONE: &str = "Concluído!";
pub const RECEIVER_WAITING: &str = "Aguardando...";
pub const RECEIVER_RECEIVED: &str = "Recebido!";
pub const RECEIVER_FAILED: &str = "Erro na Recepção!";
pub const NO_FILE_LABEL: &str = "Nenhum ficheiro selecionado";

/// Which transfer button the panel shows.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControlLayout {
    #[default]
    Start,
    Cancel,
}

/// Semantic state of the inbound receiver card.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverState {
    #[default]
    Waiting,
    Received,
    Failed,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Modal-style message shown until the user dismisses it.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Result of a bridge request issued by the controller.
#[derive(Debug)]
pub enum SessionCompletion {
    FileDialog(Result<Option<String>, PanelError>),
    TransferBegun(Result<Ack, PanelError>),
    CancelRequested(Result<Ack, PanelError>),
    TextSent(Result<Ack, PanelError>),
    ReceiverRevert,
}

pub struct TransferSessionController {
    bridge: Arc<dyn Bridge>,
    completions: UnboundedSender<Completion>,
    log: Logger,
    session: TransferSession,
    emitter: StatusField,
    receiver: StatusField,
    receiver_state: ReceiverState,
    controls: ControlLayout,
    file_label: String,
    text_input: String,
    notices: VecDeque<Notice>,
    receiver_revert: Duration,
}

impl TransferSessionController {
    pub fn new(
        bridge: Arc<dyn Bridge>,
        completions: UnboundedSender<Completion>,
        log: Logger,
        receiver_revert: Duration,
    ) -> Self {
        Self {
            bridge,
            completions,
            log,
            session: TransferSession::new(),
            emitter: StatusField::new(EMITTER_IDLE),
            receiver: StatusField::new(RECEIVER_WAITING),
            receiver_state: ReceiverState::Waiting,
            controls: ControlLayout::Start,
            file_label: NO_FILE_LABEL.to_string(),
            text_input: String::new(),
            notices: VecDeque::new(),
            receiver_revert,
        }
    }

    pub fn session(&self) -> &TransferSession {
        &self.session
    }

    pub fn emitter(&self) -> &StatusField {
        &self.emitter
    }

    pub fn receiver(&self) -> &StatusField {
        &self.receiver
    }

    pub fn receiver_state(&self) -> ReceiverState {
        self.receiver_state
    }

    pub fn controls(&self) -> ControlLayout {
        self.controls
    }

    pub fn file_label(&self) -> &str {
        &self.file_label
    }

    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn set_text_input(&mut self, text: impl Into<String>) {
        self.text_input = text.into();
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    /// Asks the backend to show the OS file dialog.
    pub fn browse_file(&mut self) {
        if self.session.is_sending() {
            self.log
                .log("Já existe uma transferência em andamento. Cancele-a primeiro.");
            return;
        }
        let bridge = Arc::clone(&self.bridge);
        self.spawn_request(async move {
            SessionCompletion::FileDialog(bridge.open_file_dialog().await)
        });
    }

    /// An empty path means the dialog was closed without a choice, which
    /// drops the current selection unless a transfer is running.
    pub fn select_file(&mut self, path: &str) -> Result<(), PanelError> {
        if path.is_empty() {
            self.log.log("Seleção de arquivo cancelada.");
            if self.session.clear_selection().is_ok() {
                self.file_label = NO_FILE_LABEL.to_string();
            }
            return Err(PanelError::InvalidArgument(
                "no file path given".to_string(),
            ));
        }
        if let Err(rejection) = self.session.select(path) {
            self.log.log(rejection.to_string());
            return Err(rejection.into());
        }

        self.log.clear();
        self.file_label = format!("Arquivo selecionado: {}", file_name(path));
        self.controls = ControlLayout::Start;
        self.emitter = StatusField::new(EMITTER_IDLE);
        self.log.log(format!("Arquivo selecionado: {path}"));
        self.log.log("Interface reiniciada para nova transferência.");
        Ok(())
    }

    /// Starts sending the selected file. At most one transfer runs at a time.
    pub fn start_transfer(&mut self) -> Result<(), Rejection> {
        let path = match self.session.begin() {
            Ok(path) => path,
            Err(rejection) => {
                self.log.log(rejection.to_string());
                return Err(rejection);
            }
        };

        self.controls = ControlLayout::Cancel;
        self.emitter = StatusField::new(EMITTER_SENDING);
        self.log.log("Iniciando transferência do arquivo...");
        debug!(path = %path, "Requesting transfer start");

        let bridge = Arc::clone(&self.bridge);
        self.spawn_request(async move {
            SessionCompletion::TransferBegun(bridge.begin_transfer(&path).await)
        });
        Ok(())
    }

    /// Requests a cooperative cancel. The session stays `Sending` until the
    /// backend reports the transfer finished.
    pub fn cancel_transfer(&mut self) -> Result<(), Rejection> {
        if let Err(rejection) = self.session.request_cancel() {
            self.log.log(rejection.to_string());
            return Err(rejection);
        }

        self.log.log("Solicitando cancelamento da transferência...");
        let bridge = Arc::clone(&self.bridge);
        self.spawn_request(async move {
            SessionCompletion::CancelRequested(bridge.cancel_transfer().await)
        });
        Ok(())
    }

    /// Independent of the transfer session.
    pub fn send_text_message(&mut self, text: &str) -> Result<(), PanelError> {
        if text.is_empty() {
            self.log.log("Digite uma mensagem para enviar.");
            return Err(PanelError::InvalidArgument("empty text message".to_string()));
        }

        self.log.log(format!("Enviando mensagem de texto: \"{text}\""));
        let bridge = Arc::clone(&self.bridge);
        let text = text.to_string();
        self.spawn_request(async move {
            SessionCompletion::TextSent(bridge.send_text_message(&text).await)
        });
        Ok(())
    }

    pub fn on_progress(&mut self, percent: f64) {
        self.session.set_progress(percent);
    }

    pub fn on_frame_summary(&mut self, frame_count: u64, total_bytes: u64) {
        self.session.set_frames(frame_count, total_bytes);
    }

    pub fn on_transfer_finished(&mut self, status: FinishStatus, message: &str) {
        if let Err(rejection) = self.session.finish(status) {
            warn!(?status, "Finish event without a transfer in progress");
            self.log
                .log(format!("Evento de finalização ignorado ({message}): {rejection}"));
            return;
        }

        self.controls = ControlLayout::Start;
        match status {
            FinishStatus::Success => {
                self.emitter = StatusField::new(EMITTER_DONE);
                self.log.log(format!("Transferência finalizada: {message}"));
            }
            FinishStatus::Cancelled => {
                self.emitter = StatusField::new(EMITTER_IDLE);
                self.log.log(format!("Transferência cancelada: {message}"));
            }
            FinishStatus::Error => {
                self.emitter = StatusField::new(EMITTER_IDLE);
                self.log.log(format!("Erro na transferência: {message}"));
            }
        }
    }

    /// Inbound file event. The receiver card reverts to waiting after the
    /// configured delay no matter what happens in between.
    pub fn on_file_received(&mut self, status: ReceptionStatus, file_name: &str, message: &str) {
        self.log.log(format!(
            "Recepção de arquivo: [{}] {file_name} - {message}",
            status.as_str().to_uppercase()
        ));

        let notice = match status {
            ReceptionStatus::Success => {
                self.receiver = StatusField::new(RECEIVER_RECEIVED);
                self.receiver_state = ReceiverState::Received;
                Notice {
                    level: NoticeLevel::Success,
                    message: format!(
                        "Arquivo \"{file_name}\" recebido com sucesso!\nDetalhes: {message}"
                    ),
                }
            }
            ReceptionStatus::Error => {
                self.receiver = StatusField::new(RECEIVER_FAILED);
                self.receiver_state = ReceiverState::Failed;
                Notice {
                    level: NoticeLevel::Error,
                    message: format!("Erro ao receber arquivo \"{file_name}\":\n{message}"),
                }
            }
        };
        self.notices.push_back(notice);

        let deadline = Instant::now() + self.receiver_revert;
        let completions = self.completions.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            let _ = completions.send(Completion::Session(SessionCompletion::ReceiverRevert));
        });
    }

    pub fn apply(&mut self, completion: SessionCompletion) {
        match completion {
            SessionCompletion::FileDialog(Ok(Some(path))) => {
                let _ = self.select_file(&path);
            }
            SessionCompletion::FileDialog(Ok(None)) => {
                let _ = self.select_file("");
            }
            SessionCompletion::FileDialog(Err(err)) => {
                self.log
                    .log(format!("Falha ao abrir o seletor de arquivos: {err}"));
            }
            SessionCompletion::TransferBegun(Ok(ack)) => {
                self.log.log(format!(
                    "Status da solicitação de envio: {} - {}",
                    ack.status, ack.message
                ));
            }
            SessionCompletion::TransferBegun(Err(err)) => {
                self.log.log("Falha ao iniciar a transferência.");
                self.on_transfer_finished(FinishStatus::Error, &err.to_string());
            }
            SessionCompletion::CancelRequested(Ok(_)) => {
                self.log
                    .log("Cancelamento solicitado. Aguardando confirmação do backend...");
            }
            SessionCompletion::CancelRequested(Err(err)) => {
                self.log.log("Falha ao solicitar o cancelamento.");
                self.on_transfer_finished(FinishStatus::Error, &err.to_string());
            }
            SessionCompletion::TextSent(Ok(ack)) if ack.is_success() => {
                self.log.log("Mensagem de texto enviada.");
                self.text_input.clear();
            }
            SessionCompletion::TextSent(Ok(ack)) => {
                self.log
                    .log(format!("Falha ao enviar mensagem de texto: {}", ack.message));
            }
            SessionCompletion::TextSent(Err(err)) => {
                self.log
                    .log(format!("Erro na chamada de envio de texto: {err}"));
            }
            SessionCompletion::ReceiverRevert => {
                self.receiver = StatusField::new(RECEIVER_WAITING);
                self.receiver_state = ReceiverState::Waiting;
            }
        }
    }

    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = SessionCompletion> + Send + 'static,
    {
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let completion = request.await;
            let _ = completions.send(Completion::Session(completion));
        });
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}
