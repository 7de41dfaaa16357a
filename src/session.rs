//! Sessions and routing.
//!
//! A [`Session`] ties one document to one navigator and its effects. All
//! inbound traffic is serialized through it: change notifications are drained
//! before each command, so a burst of mutations costs one rebuild.
//!
//! A [`Router`] holds several sessions (one per tab) and relays commands to
//! the active one.

use std::collections::HashMap;

use crate::command::{Command, Counts, PanelRequest, PanelResponse, PanelStatus};
use crate::config::NavConfig;
use crate::document::{ChangeFeed, Document};
use crate::effects::Effects;
use crate::error::{Error, Result};
use crate::navigator::Navigator;
use crate::outline::Category;

pub struct Session<D: Document> {
    document: D,
    navigator: Navigator<D::Node>,
    effects: Effects<D::Node>,
}

impl<D: Document + ChangeFeed> Session<D> {
    /// Build the navigator and classify the document once.
    pub fn new(mut document: D, config: &NavConfig, effects: Effects<D::Node>) -> Result<Self> {
        let mut navigator = Navigator::new(config)?;
        document.take_changes();
        navigator.rebuild(&document);
        Ok(Self {
            document,
            navigator,
            effects,
        })
    }

    /// Announce the greeting.
    pub fn start(&mut self) {
        self.navigator.greet(&mut self.effects);
    }

    /// Rebuild if the document changed since the last sync. Returns whether a
    /// rebuild happened.
    pub fn sync(&mut self) -> bool {
        let changes = self.document.take_changes();
        if changes == 0 {
            return false;
        }
        tracing::trace!("coalescing {changes} document changes into one rebuild");
        self.navigator.rebuild(&self.document);
        true
    }

    pub fn dispatch(&mut self, command: Command) {
        self.sync();
        let (doc, nav, fx) = (&self.document, &mut self.navigator, &mut self.effects);
        match command {
            Command::Move(category, direction) => nav.move_cursor(doc, fx, category, direction),
            Command::ReadCurrent => nav.read_current(doc, fx),
            Command::ScopeLatestResponse => nav.scope_to_latest_response(doc, fx),
            Command::ClearScope => nav.clear_scope(doc, fx),
            Command::Body => nav.body_command(doc, fx),
            Command::ToggleSpeech => nav.toggle_speech(fx),
        }
    }

    /// Dispatch a command-channel name. Unknown names are ignored.
    pub fn dispatch_name(&mut self, name: &str) -> bool {
        match Command::from_channel(name) {
            Some(command) => {
                self.dispatch(command);
                true
            }
            None => {
                tracing::trace!("ignoring unknown command {name:?}");
                false
            }
        }
    }

    /// Handle a control-surface request.
    pub fn panel(&mut self, request: PanelRequest) -> PanelResponse {
        match request {
            PanelRequest::Command { cmd } => {
                match cmd.to_command() {
                    Some(command) => self.dispatch(command),
                    None => tracing::trace!("ignoring unknown panel command"),
                }
                PanelResponse::ok()
            }
            PanelRequest::Query => {
                self.sync();
                PanelResponse::Status(self.status())
            }
        }
    }

    pub fn status(&self) -> PanelStatus {
        let outline = self.navigator.outline();
        PanelStatus {
            scoped: self.navigator.is_scoped(),
            counts: Counts {
                responses: outline.len(Category::Response),
                headings: outline.len(Category::Heading),
                topics: outline.len(Category::Topic),
            },
            tts: self.navigator.speech_enabled(),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access for the host. Changes are picked up on the next sync.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn navigator(&self) -> &Navigator<D::Node> {
        &self.navigator
    }
}

/// Relays commands to the session of the active tab.
pub struct Router<D: Document> {
    sessions: HashMap<u32, Session<D>>,
    active: Option<u32>,
}

impl<D: Document> Default for Router<D> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            active: None,
        }
    }
}

impl<D: Document + ChangeFeed> Router<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under `tab`, replacing any previous one.
    pub fn open(&mut self, tab: u32, session: Session<D>) {
        self.sessions.insert(tab, session);
    }

    pub fn activate(&mut self, tab: u32) -> Result<()> {
        if !self.sessions.contains_key(&tab) {
            return Err(Error::UnknownTarget(tab));
        }
        self.active = Some(tab);
        Ok(())
    }

    /// Drop the session of `tab`. Closing the active tab leaves no target.
    pub fn close(&mut self, tab: u32) -> Option<Session<D>> {
        if self.active == Some(tab) {
            self.active = None;
        }
        self.sessions.remove(&tab)
    }

    pub fn active(&mut self) -> Option<&mut Session<D>> {
        let tab = self.active?;
        self.sessions.get_mut(&tab)
    }

    pub fn session(&mut self, tab: u32) -> Option<&mut Session<D>> {
        self.sessions.get_mut(&tab)
    }

    /// Relay a command-channel name. Without an active tab it is dropped.
    pub fn command(&mut self, name: &str) {
        match self.active() {
            Some(session) => {
                session.dispatch_name(name);
            }
            None => tracing::trace!("no active tab for command {name:?}"),
        }
    }

    pub fn panel(&mut self, request: PanelRequest) -> Result<PanelResponse> {
        let session = self.active().ok_or(Error::NoActiveTarget)?;
        Ok(session.panel(request))
    }

    /// Handle a JSON request, answering with JSON. Every failure, including
    /// malformed input, becomes an error response.
    pub fn panel_json(&mut self, request: &str) -> String {
        let response = serde_json::from_str::<PanelRequest>(request)
            .map_err(Error::from)
            .and_then(|request| self.panel(request))
            .unwrap_or_else(PanelResponse::error);
        serde_json::to_string(&response).unwrap_or_else(|e| {
            tracing::debug!("failed to encode panel response: {e}");
            String::from(r#"{"error":"internal error"}"#)
        })
    }
}
