use std::time::{Duration, Instant};

use crate::message::validate_text;

/// How long the "sent" confirmation stays up before the form returns.
pub const CONFIRMATION_DURATION: Duration = Duration::from_secs(3);

/// Where the guest form currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestPhase {
    Idle,
    Sending,
    Success { until: Instant },
}

/// Guest submission state machine.
///
/// `idle -> sending -> success -> idle` on the happy path; a failed send goes
/// straight back to idle with the draft untouched so the guest can resubmit.
/// Time is passed in, never read, so the machine is deterministic.
#[derive(Debug, Clone)]
pub struct GuestForm {
    draft: String,
    phase: GuestPhase,
    confirmation: Duration,
}

impl GuestForm {
    pub fn new() -> Self {
        Self::with_confirmation(CONFIRMATION_DURATION)
    }

    pub fn with_confirmation(confirmation: Duration) -> Self {
        GuestForm {
            draft: String::new(),
            phase: GuestPhase::Idle,
            confirmation,
        }
    }

    pub fn phase(&self) -> GuestPhase {
        self.phase
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether the input form (rather than the confirmation) is showing.
    pub fn shows_input(&self) -> bool {
        !matches!(self.phase, GuestPhase::Success { .. })
    }

    /// Start sending the current draft.
    ///
    /// Returns the text to write, or `None` when there is nothing to send:
    /// the draft is blank, or a send or confirmation is already in progress.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.phase != GuestPhase::Idle || validate_text(&self.draft).is_err() {
            return None;
        }
        self.phase = GuestPhase::Sending;
        Some(self.draft.clone())
    }

    /// The write was accepted: clear the draft and show the confirmation.
    pub fn complete(&mut self, now: Instant) {
        if self.phase == GuestPhase::Sending {
            self.draft.clear();
            self.phase = GuestPhase::Success {
                until: now + self.confirmation,
            };
        }
    }

    /// The write failed: back to the form, draft kept.
    pub fn fail(&mut self) {
        if self.phase == GuestPhase::Sending {
            self.phase = GuestPhase::Idle;
        }
    }

    /// Advance the clock; expires the confirmation once its time is up.
    pub fn tick(&mut self, now: Instant) -> GuestPhase {
        if let GuestPhase::Success { until } = self.phase {
            if now >= until {
                self.phase = GuestPhase::Idle;
            }
        }
        self.phase
    }
}

impl Default for GuestForm {
    fn default() -> Self {
        Self::new()
    }
}
