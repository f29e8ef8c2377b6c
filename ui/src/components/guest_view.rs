use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use wishwall_common::error::Result;
use wishwall_common::guest::{GuestForm, GuestPhase};
use wishwall_common::message::MessageId;
use wishwall_store::MessageStore;

pub const TITLE: &str = "Send a Wish";
pub const PLACEHOLDER: &str = "Type your wish here...";
pub const CONFIRMATION: &str = "Sent to Santa!";

/// The guest submission screen.
pub struct GuestScreen {
    store: Arc<dyn MessageStore>,
    form: GuestForm,
}

impl GuestScreen {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self::with_form(store, GuestForm::new())
    }

    pub fn with_form(store: Arc<dyn MessageStore>, form: GuestForm) -> Self {
        GuestScreen { store, form }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.form.set_draft(text);
    }

    pub fn draft(&self) -> &str {
        self.form.draft()
    }

    pub fn phase(&self) -> GuestPhase {
        self.form.phase()
    }

    pub fn shows_input(&self) -> bool {
        self.form.shows_input()
    }

    /// Label of the send button in the current phase.
    pub fn button_label(&self) -> &'static str {
        match self.form.phase() {
            GuestPhase::Sending => "Sending...",
            _ => "Send to Screen",
        }
    }

    /// Send the draft as a new pending message.
    ///
    /// `Ok(None)` when nothing was sent: the draft is blank or a previous send
    /// has not finished. On failure the form returns to idle with the draft
    /// kept, and the error is returned for display.
    pub async fn submit(&mut self) -> Result<Option<MessageId>> {
        let Some(text) = self.form.begin_submit() else {
            return Ok(None);
        };
        match self.store.submit(&text).await {
            Ok(id) => {
                info!(%id, "Wish sent");
                self.form.complete(Instant::now());
                Ok(Some(id))
            }
            Err(e) => {
                error!(error = %e, "Failed to send wish");
                self.form.fail();
                Err(e)
            }
        }
    }

    /// Advance the confirmation timer.
    pub fn tick(&mut self, now: Instant) -> GuestPhase {
        self.form.tick(now)
    }
}
