//! Inbound commands and the control-surface wire format.
//!
//! Two channels reach a session: named keyboard commands
//! (`next_heading`, `body`, ...) and JSON requests from a control panel:
//!
//! ```json
//! {"type": "PANEL_CMD", "cmd": "nextHeading"}
//! {"type": "PANEL_QUERY"}
//! ```

use serde::{Deserialize, Serialize};

use crate::outline::{Category, Direction};

/// One navigator operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Category, Direction),
    ReadCurrent,
    ScopeLatestResponse,
    ClearScope,
    Body,
    ToggleSpeech,
}

impl Command {
    /// Map a command-channel name. Unknown names yield `None`.
    pub fn from_channel(name: &str) -> Option<Self> {
        use Category::*;
        use Direction::*;

        let command = match name {
            "next_landmark" => Command::Move(Landmark, Next),
            "prev_landmark" => Command::Move(Landmark, Prev),
            "next_heading" => Command::Move(Heading, Next),
            "prev_heading" => Command::Move(Heading, Prev),
            "jump_topics" | "next_topic" => Command::Move(Topic, Next),
            "prev_topic" => Command::Move(Topic, Prev),
            "next_response" => Command::Move(Response, Next),
            "prev_response" => Command::Move(Response, Prev),
            "read_current" => Command::ReadCurrent,
            "scope_current_response" => Command::ScopeLatestResponse,
            "clear_scope" => Command::ClearScope,
            "body" => Command::Body,
            "toggle_speech" => Command::ToggleSpeech,
            _ => return None,
        };
        Some(command)
    }
}

/// Commands a control panel may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelCommand {
    #[serde(rename = "scopeLatest")]
    ScopeLatest,
    #[serde(rename = "clearScope")]
    ClearScope,
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "nextHeading")]
    NextHeading,
    #[serde(rename = "prevHeading")]
    PrevHeading,
    #[serde(rename = "nextResp")]
    NextResponse,
    #[serde(rename = "prevResp")]
    PrevResponse,
    #[serde(rename = "toggleTTS")]
    ToggleSpeech,
    /// Anything else; accepted and ignored.
    #[serde(other)]
    Unknown,
}

impl PanelCommand {
    pub fn to_command(self) -> Option<Command> {
        let command = match self {
            PanelCommand::ScopeLatest => Command::ScopeLatestResponse,
            PanelCommand::ClearScope => Command::ClearScope,
            PanelCommand::Read => Command::ReadCurrent,
            PanelCommand::NextHeading => Command::Move(Category::Heading, Direction::Next),
            PanelCommand::PrevHeading => Command::Move(Category::Heading, Direction::Prev),
            PanelCommand::NextResponse => Command::Move(Category::Response, Direction::Next),
            PanelCommand::PrevResponse => Command::Move(Category::Response, Direction::Prev),
            PanelCommand::ToggleSpeech => Command::ToggleSpeech,
            PanelCommand::Unknown => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PanelRequest {
    #[serde(rename = "PANEL_CMD")]
    Command { cmd: PanelCommand },
    #[serde(rename = "PANEL_QUERY")]
    Query,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub responses: usize,
    pub headings: usize,
    pub topics: usize,
}

/// Summary returned for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelStatus {
    pub scoped: bool,
    pub counts: Counts,
    pub tts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelResponse {
    Status(PanelStatus),
    Ack { ok: bool },
    Error { error: String },
}

impl PanelResponse {
    pub fn ok() -> Self {
        PanelResponse::Ack { ok: true }
    }

    pub fn error(error: impl ToString) -> Self {
        PanelResponse::Error {
            error: error.to_string(),
        }
    }
}
