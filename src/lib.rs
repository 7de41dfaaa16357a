//! # semnav
//!
//! Keyboard navigation of a live HTML document by meaning rather than by tab
//! order.
//!
//! ## Features
//!
//! - Four categories: landmarks, headings, topics and assistant responses
//! - Wrap-around next/previous cursors that survive document mutation
//! - Scoping headings and topics to one response
//! - Body mode: step through the content under one heading
//! - Announcements through a pluggable live region and speech synthesizer
//!
//! ## Quick Start
//!
//! ```
//! use semnav::{Effects, FocusTracker, HtmlDocument, LiveRegion, NavConfig, Session};
//!
//! let doc = HtmlDocument::parse("<main><h1>Intro</h1><p>Hello.</p><h1>Usage</h1></main>");
//! let region = LiveRegion::new();
//! let effects = Effects::recording(region.clone(), FocusTracker::new());
//! let mut session = Session::new(doc, &NavConfig::default(), effects).unwrap();
//!
//! session.dispatch_name("next_heading");
//! assert_eq!(region.last().as_deref(), Some("heading 2 of 2: Usage"));
//!
//! session.dispatch_name("prev_heading");
//! session.dispatch_name("body");
//! assert_eq!(region.last().as_deref(), Some("Body item 1 of 1: Hello."));
//! ```
//!
//! ## Other documents
//!
//! The engine only sees a tree through the [`Document`] trait. Implement it
//! (and [`ChangeFeed`]) to drive the navigator from another tree, such as a
//! browser DOM.

pub mod command;
pub mod config;
pub mod document;
pub mod dom;
pub mod effects;
pub mod error;
pub mod navigator;
pub mod outline;
pub mod session;
pub(crate) mod util;

pub use command::{Command, PanelCommand, PanelRequest, PanelResponse, PanelStatus};
pub use config::NavConfig;
pub use document::{ChangeFeed, Document, Rect, VisualKey};
pub use dom::{HtmlDocument, NodeId};
pub use effects::{
    Announcer, CommandSpeech, Effects, FocusTracker, LiveRegion, LogReveal, Reveal, Silent, Speech,
};
pub use error::{EffectError, Error, Result};
pub use navigator::Navigator;
pub use outline::{Category, Direction, HeadingLevel, Outline, OutlineEntry};
pub use session::{Router, Session};
