use serde::Serialize;
use thiserror::Error;

use crate::bridge::FinishStatus;

/// Lifecycle of the single outbound transfer.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    FileSelected,
    Sending,
    Completed,
    /// Last transfer ended in error. The selection is kept and may be retried.
    Failed,
}

/// Frame/byte counters reported by the backend while sending.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameSummary {
    #[default]
    NotApplicable,
    Counted {
        frame_count: u64,
        total_bytes: u64,
    },
}

impl FrameSummary {
    pub fn packets_label(&self) -> String {
        match self {
            FrameSummary::NotApplicable => "Pacotes: N/A".to_string(),
            FrameSummary::Counted { frame_count, .. } => format!("Pacotes: {frame_count}"),
        }
    }

    pub fn bytes_label(&self) -> String {
        match self {
            FrameSummary::NotApplicable => "N/A bytes".to_string(),
            FrameSummary::Counted { total_bytes, .. } => format!("{total_bytes} bytes"),
        }
    }
}

/// Why a session operation was refused. The text is what the panel logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Por favor, selecione um arquivo primeiro.")]
    NoFileSelected,
    #[error("Já existe uma transferência em andamento.")]
    AlreadySending,
    #[error("Nenhuma transferência em andamento para cancelar.")]
    NotSending,
}

/// The one transfer session owned by the controller. All fields change only
/// through the methods below.
#[derive(Debug, Clone, Default)]
pub struct TransferSession {
    state: SessionState,
    selected_file: Option<String>,
    progress: u8,
    frames: FrameSummary,
    cancel_requested: bool,
}

impl TransferSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn frames(&self) -> FrameSummary {
        self.frames
    }

    pub fn is_sending(&self) -> bool {
        self.state == SessionState::Sending
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// Selects a new file and clears the counters of any previous transfer.
    pub fn select(&mut self, path: impl Into<String>) -> Result<(), Rejection> {
        if self.is_sending() {
            return Err(Rejection::AlreadySending);
        }
        self.selected_file = Some(path.into());
        self.state = SessionState::FileSelected;
        self.reset_counters();
        Ok(())
    }

    /// Drops the selection after the user dismissed the file dialog.
    pub fn clear_selection(&mut self) -> Result<(), Rejection> {
        if self.is_sending() {
            return Err(Rejection::AlreadySending);
        }
        self.selected_file = None;
        self.state = SessionState::Idle;
        self.reset_counters();
        Ok(())
    }

    /// Single-flight guard: enters `Sending` and returns the path to send.
    pub fn begin(&mut self) -> Result<String, Rejection> {
        let Some(path) = self.selected_file.clone() else {
            return Err(Rejection::NoFileSelected);
        };
        match self.state {
            SessionState::Sending => Err(Rejection::AlreadySending),
            SessionState::Idle => Err(Rejection::NoFileSelected),
            SessionState::FileSelected | SessionState::Completed | SessionState::Failed => {
                self.state = SessionState::Sending;
                self.cancel_requested = false;
                self.reset_counters();
                Ok(path)
            }
        }
    }

    /// Marks a cooperative cancel. The session stays `Sending` until `finish`.
    pub fn request_cancel(&mut self) -> Result<(), Rejection> {
        if !self.is_sending() {
            return Err(Rejection::NotSending);
        }
        self.cancel_requested = true;
        Ok(())
    }

    /// Clamps to 0..=100 and returns the stored value.
    pub fn set_progress(&mut self, percent: f64) -> u8 {
        self.progress = if percent.is_nan() {
            0
        } else {
            percent.clamp(0.0, 100.0).round() as u8
        };
        self.progress
    }

    pub fn set_frames(&mut self, frame_count: u64, total_bytes: u64) {
        self.frames = FrameSummary::Counted {
            frame_count,
            total_bytes,
        };
    }

    /// Applies the backend's terminal status and releases the guard.
    pub fn finish(&mut self, status: FinishStatus) -> Result<(), Rejection> {
        if !self.is_sending() {
            return Err(Rejection::NotSending);
        }
        self.cancel_requested = false;
        match status {
            FinishStatus::Success => {
                self.state = SessionState::Completed;
                self.progress = 100;
            }
            FinishStatus::Cancelled => {
                self.state = if self.selected_file.is_some() {
                    SessionState::FileSelected
                } else {
                    SessionState::Idle
                };
                self.reset_counters();
            }
            FinishStatus::Error => {
                self.state = SessionState::Failed;
                self.reset_counters();
            }
        }
        Ok(())
    }

    fn reset_counters(&mut self) {
        self.progress = 0;
        self.frames = FrameSummary::NotApplicable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Select,
        Clear,
        Begin,
        Cancel,
        Finish(FinishStatus),
    }

    const OPS: [Op; 7] = [
        Op::Select,
        Op::Clear,
        Op::Begin,
        Op::Cancel,
        Op::Finish(FinishStatus::Success),
        Op::Finish(FinishStatus::Cancelled),
        Op::Finish(FinishStatus::Error),
    ];

    fn apply(session: &mut TransferSession, op: Op) {
        let _ = match op {
            Op::Select => session.select("/tmp/f.bin"),
            Op::Clear => session.clear_selection(),
            Op::Begin => session.begin().map(|_| ()),
            Op::Cancel => session.request_cancel(),
            Op::Finish(status) => session.finish(status),
        };
    }

    #[test]
    fn test_starts_idle() {
        let session = TransferSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.selected_file(), None);
        assert_eq!(session.progress(), 0);
        assert_eq!(session.frames(), FrameSummary::NotApplicable);
    }

    #[test]
    fn test_begin_without_file_is_rejected() {
        let mut session = TransferSession::new();
        assert_eq!(session.begin(), Err(Rejection::NoFileSelected));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_begin_twice_is_rejected() {
        let mut session = TransferSession::new();
        session.select("/tmp/a").unwrap();
        assert_eq!(session.begin().unwrap(), "/tmp/a");
        assert_eq!(session.begin(), Err(Rejection::AlreadySending));
        assert_eq!(session.select("/tmp/b"), Err(Rejection::AlreadySending));
        assert_eq!(session.selected_file(), Some("/tmp/a"));
    }

    #[test]
    fn test_sending_only_entered_through_begin_from_a_ready_state() {
        // Exhaustive over every op sequence of length 5.
        let mut stack: Vec<Vec<Op>> = vec![Vec::new()];
        while let Some(prefix) = stack.pop() {
            if prefix.len() == 5 {
                continue;
            }
            for op in OPS {
                let mut seq = prefix.clone();
                seq.push(op);

                let mut session = TransferSession::new();
                for step in &prefix {
                    apply(&mut session, *step);
                }
                let before = session.state();
                apply(&mut session, op);
                let after = session.state();

                if after == SessionState::Sending && before != SessionState::Sending {
                    assert!(matches!(op, Op::Begin), "entered Sending via {op:?}");
                    assert!(
                        matches!(
                            before,
                            SessionState::FileSelected
                                | SessionState::Completed
                                | SessionState::Failed
                        ),
                        "entered Sending from {before:?}"
                    );
                    assert!(session.selected_file().is_some());
                }
                stack.push(seq);
            }
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut session = TransferSession::new();
        assert_eq!(session.set_progress(150.0), 100);
        assert_eq!(session.set_progress(-5.0), 0);
        assert_eq!(session.set_progress(42.0), 42);
        assert_eq!(session.set_progress(f64::NAN), 0);
    }

    #[test]
    fn test_success_forces_full_progress() {
        let mut session = TransferSession::new();
        session.select("/tmp/a").unwrap();
        session.begin().unwrap();
        session.set_progress(17.0);
        session.finish(FinishStatus::Success).unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.progress(), 100);
        assert_eq!(session.selected_file(), Some("/tmp/a"));
    }

    #[test]
    fn test_restart_after_success_resets_counters() {
        let mut session = TransferSession::new();
        session.select("/tmp/a").unwrap();
        session.begin().unwrap();
        session.set_frames(4, 128);
        session.finish(FinishStatus::Success).unwrap();

        assert_eq!(session.begin().unwrap(), "/tmp/a");
        assert_eq!(session.state(), SessionState::Sending);
        assert_eq!(session.progress(), 0);
        assert_eq!(session.frames(), FrameSummary::NotApplicable);
    }

    #[test]
    fn test_clear_selection_returns_to_idle() {
        let mut session = TransferSession::new();
        session.select("/tmp/a").unwrap();
        session.clear_selection().unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.selected_file(), None);
        assert_eq!(session.begin(), Err(Rejection::NoFileSelected));

        session.select("/tmp/b").unwrap();
        session.begin().unwrap();
        assert_eq!(session.clear_selection(), Err(Rejection::AlreadySending));
        assert_eq!(session.selected_file(), Some("/tmp/b"));
    }

    #[test]
    fn test_cancel_and_error_reset_and_release_guard() {
        for status in [FinishStatus::Cancelled, FinishStatus::Error] {
            let mut session = TransferSession::new();
            session.select("/tmp/a").unwrap();
            session.begin().unwrap();
            session.set_progress(60.0);
            session.set_frames(12, 4096);
            session.request_cancel().unwrap();
            assert!(session.is_sending());

            session.finish(status).unwrap();
            assert_eq!(session.progress(), 0);
            assert_eq!(session.frames(), FrameSummary::NotApplicable);
            assert!(!session.cancel_requested());
            assert!(session.begin().is_ok(), "guard still held after {status:?}");
        }
    }

    #[test]
    fn test_finish_outside_sending_is_rejected() {
        let mut session = TransferSession::new();
        session.select("/tmp/a").unwrap();
        assert_eq!(
            session.finish(FinishStatus::Success),
            Err(Rejection::NotSending)
        );
        assert_eq!(session.state(), SessionState::FileSelected);
    }

    #[test]
    fn test_frame_labels() {
        assert_eq!(FrameSummary::NotApplicable.packets_label(), "Pacotes: N/A");
        let counted = FrameSummary::Counted {
            frame_count: 3,
            total_bytes: 96,
        };
        assert_eq!(counted.packets_label(), "Pacotes: 3");
        assert_eq!(counted.bytes_label(), "96 bytes");
    }
}
