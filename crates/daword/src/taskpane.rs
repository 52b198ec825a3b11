//! Task-pane sign-in state machine.
//!
//! ```text
//! Unauthenticated --connect--> AwaitingDialog --Succeeded--> Authenticated
//!        ^                          |  Failed / Malformed: alert, close, stay
//!        |                          |  Dismissed / HostError: no effect
//!        +------- change_server ----+------------------------------+
//! ```
//!
//! A stored session record moves the pane straight to `Authenticated` on
//! load without asking the backend. The host performs the returned
//! [`Effect`]s (UI updates, closing the dialog).

use crate::dialog::DialogEvent;
use crate::error::{Error, Result};
use crate::session::{SessionRecord, SessionStore};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Server offered when the user leaves the server field empty.
pub const DEFAULT_SERVER: &str = "https://localhost:8444";

/// Path of the login dialog page on the edge proxy.
pub const AUTH_DIALOG_PATH: &str = "/office-auth-dialog";

/// Sign-in state of one task-pane instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneState {
    Unauthenticated,
    AwaitingDialog,
    Authenticated { server: String },
}

/// Work for the host to carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CloseDialog,
    Alert(String),
    ShowServerForm,
    ShowAuthenticated { server: String },
}

/// One task pane and its session context.
#[derive(Debug)]
pub struct TaskPane<S: SessionStore> {
    store: S,
    state: PaneState,
    pending_server: Option<String>,
}

impl<S: SessionStore> TaskPane<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: PaneState::Unauthenticated,
            pending_server: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &PaneState {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restore a stored sign-in, if there is one.
    pub fn load(&mut self) -> Vec<Effect> {
        match self.store.load() {
            Some(record) => {
                info!("Found existing server connection: {}", record.server);
                self.state = PaneState::Authenticated {
                    server: record.server.clone(),
                };
                vec![Effect::ShowAuthenticated {
                    server: record.server,
                }]
            }
            None => {
                debug!("No server connection found");
                self.state = PaneState::Unauthenticated;
                vec![Effect::ShowServerForm]
            }
        }
    }

    /// Start sign-in against `server_input` and return the dialog URL to open.
    pub fn connect(&mut self, server_input: &str) -> Result<String> {
        if let PaneState::Authenticated { server } = &self.state {
            return Err(Error::Dialog(format!("already connected to {}", server)));
        }

        let server = match server_input.trim() {
            "" => DEFAULT_SERVER,
            s => s,
        }
        .trim_end_matches('/')
        .to_string();

        let url = format!("{}{}", server, AUTH_DIALOG_PATH);
        info!("Opening authentication dialog: {}", url);
        self.pending_server = Some(server);
        self.state = PaneState::AwaitingDialog;
        Ok(url)
    }

    /// The host could not open the dialog at all.
    pub fn dialog_open_failed(&mut self, message: &str) -> Vec<Effect> {
        warn!("Failed to open authentication dialog: {}", message);
        self.pending_server = None;
        self.state = PaneState::Unauthenticated;
        vec![Effect::Alert(format!(
            "Failed to open authentication dialog: {}",
            message
        ))]
    }

    /// Handle a dialog event.
    pub fn dispatch(&mut self, event: DialogEvent) -> Vec<Effect> {
        self.dispatch_at(event, Utc::now())
    }

    /// Handle a dialog event as of `now`.
    pub fn dispatch_at(&mut self, event: DialogEvent, now: DateTime<Utc>) -> Vec<Effect> {
        if self.state != PaneState::AwaitingDialog {
            debug!("Ignoring dialog event outside sign-in: {:?}", event);
            return Vec::new();
        }

        match event {
            DialogEvent::Succeeded { server } => {
                let server = server
                    .filter(|s| !s.trim().is_empty())
                    .or_else(|| self.pending_server.take())
                    .unwrap_or_else(|| DEFAULT_SERVER.to_string());
                info!("Authentication successful for {}", server);

                self.store
                    .save(SessionRecord::new(server.clone()), now + SessionRecord::lifetime());
                self.pending_server = None;
                self.state = PaneState::Authenticated {
                    server: server.clone(),
                };
                vec![Effect::CloseDialog, Effect::ShowAuthenticated { server }]
            }
            DialogEvent::Failed { error } => {
                let error = error.unwrap_or_else(|| "Unknown error".to_string());
                warn!("Authentication failed: {}", error);
                vec![
                    Effect::Alert(format!("Authentication failed: {}", error)),
                    Effect::CloseDialog,
                ]
            }
            DialogEvent::Malformed { detail } => {
                warn!("Error parsing dialog message: {}", detail);
                vec![
                    Effect::Alert("Error processing authentication response".to_string()),
                    Effect::CloseDialog,
                ]
            }
            DialogEvent::Dismissed => {
                info!("User closed authentication dialog");
                Vec::new()
            }
            DialogEvent::HostError { code } => {
                warn!("Dialog error: {}", code);
                Vec::new()
            }
        }
    }

    /// Forget the stored server and show the server form again.
    pub fn change_server(&mut self) -> Vec<Effect> {
        info!("Clearing stored server connection");
        self.store.clear();
        self.pending_server = None;
        self.state = PaneState::Unauthenticated;
        vec![Effect::ShowServerForm]
    }
}
