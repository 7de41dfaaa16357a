//! Side effects the navigator triggers but does not own.
//!
//! Revealing a node and announcing text are best-effort: a failed focus or a
//! missing speech synthesizer is logged and swallowed, and the announcement
//! text is still published.

use std::cell::RefCell;
use std::fmt::Debug;
use std::process::{Child, Command, Stdio};
use std::rc::Rc;

use crate::config::SpeechConfig;
use crate::error::EffectError;

/// Moves the user's attention to a node.
pub trait Reveal<N> {
    fn make_focusable(&mut self, node: N) -> Result<(), EffectError>;
    fn focus(&mut self, node: N) -> Result<(), EffectError>;
    /// Scroll so the node is centered in the viewport.
    fn scroll_into_view(&mut self, node: N) -> Result<(), EffectError>;
}

/// The announcement surface read by assistive technology.
pub trait Announcer {
    fn clear(&mut self);
    fn publish(&mut self, text: &str);
}

pub trait Speech {
    /// Cancel any utterance in progress.
    fn stop(&mut self) -> Result<(), EffectError>;
    fn speak(&mut self, text: &str, rate: f32) -> Result<(), EffectError>;
}

/// The collaborators one navigator talks to.
pub struct Effects<N> {
    reveal: Box<dyn Reveal<N>>,
    announcer: Box<dyn Announcer>,
    speech: Box<dyn Speech>,
}

impl<N: Copy + Debug + 'static> Effects<N> {
    pub fn new(
        reveal: Box<dyn Reveal<N>>,
        announcer: Box<dyn Announcer>,
        speech: Box<dyn Speech>,
    ) -> Self {
        Self {
            reveal,
            announcer,
            speech,
        }
    }

    /// Effects that record into a live region and never speak.
    pub fn recording(region: LiveRegion, focus: FocusTracker<N>) -> Self
    where
        N: PartialEq,
    {
        Self::new(Box::new(focus), Box::new(region), Box::new(Silent))
    }

    /// Make `node` focusable, focus it and scroll to it. Each step is
    /// attempted even when an earlier one fails.
    pub fn reveal(&mut self, node: N) {
        if let Err(e) = self.reveal.make_focusable(node) {
            tracing::debug!("make_focusable({node:?}) failed: {e}");
        }
        if let Err(e) = self.reveal.focus(node) {
            tracing::debug!("focus({node:?}) failed: {e}");
        }
        if let Err(e) = self.reveal.scroll_into_view(node) {
            tracing::debug!("scroll_into_view({node:?}) failed: {e}");
        }
    }

    /// Publish `text`, and speak it when `speak` is set.
    pub fn announce(&mut self, text: &str, speak: bool, rate: f32) {
        // Clearing first makes a repeated message count as a new one.
        self.announcer.clear();
        self.announcer.publish(text);
        if !speak {
            return;
        }
        if let Err(e) = self.speech.stop() {
            tracing::debug!("speech stop failed: {e}");
        }
        if let Err(e) = self.speech.speak(text, rate) {
            tracing::debug!("speech failed: {e}");
        }
    }
}

#[derive(Debug, Default)]
struct LiveState {
    current: String,
    history: Vec<String>,
}

/// In-memory announcement surface.
///
/// Clones share the same surface, so a host can keep one handle and give
/// another to [`Effects`].
#[derive(Debug, Clone, Default)]
pub struct LiveRegion {
    state: Rc<RefCell<LiveState>>,
}

impl LiveRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently shown.
    pub fn current(&self) -> String {
        self.state.borrow().current.clone()
    }

    /// Every published message, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }

    pub fn last(&self) -> Option<String> {
        self.state.borrow().history.last().cloned()
    }

    /// Remove and return the history.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut self.state.borrow_mut().history)
    }
}

impl Announcer for LiveRegion {
    fn clear(&mut self) {
        self.state.borrow_mut().current.clear();
    }

    fn publish(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.current = text.to_string();
        state.history.push(text.to_string());
    }
}

#[derive(Debug)]
struct FocusState<N> {
    focusable: Vec<N>,
    focused: Option<N>,
    scrolled: Vec<N>,
}

/// Records reveal requests instead of acting on them.
#[derive(Debug)]
pub struct FocusTracker<N> {
    state: Rc<RefCell<FocusState<N>>>,
}

impl<N> Clone for FocusTracker<N> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<N> Default for FocusTracker<N> {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(FocusState {
                focusable: Vec::new(),
                focused: None,
                scrolled: Vec::new(),
            })),
        }
    }
}

impl<N: Copy> FocusTracker<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<N> {
        self.state.borrow().focused
    }

    pub fn scrolled(&self) -> Vec<N> {
        self.state.borrow().scrolled.clone()
    }

    /// Nodes marked focusable, in request order.
    pub fn focusable(&self) -> Vec<N> {
        self.state.borrow().focusable.clone()
    }
}

impl<N: Copy + PartialEq> Reveal<N> for FocusTracker<N> {
    fn make_focusable(&mut self, node: N) -> Result<(), EffectError> {
        let mut state = self.state.borrow_mut();
        if !state.focusable.contains(&node) {
            state.focusable.push(node);
        }
        Ok(())
    }

    fn focus(&mut self, node: N) -> Result<(), EffectError> {
        self.state.borrow_mut().focused = Some(node);
        Ok(())
    }

    fn scroll_into_view(&mut self, node: N) -> Result<(), EffectError> {
        self.state.borrow_mut().scrolled.push(node);
        Ok(())
    }
}

/// Reveal for hosts without a viewport: requests are logged, nothing is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReveal;

impl<N: Debug> Reveal<N> for LogReveal {
    fn make_focusable(&mut self, _node: N) -> Result<(), EffectError> {
        Ok(())
    }

    fn focus(&mut self, node: N) -> Result<(), EffectError> {
        tracing::trace!("focus {node:?}");
        Ok(())
    }

    fn scroll_into_view(&mut self, _node: N) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Speech that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Speech for Silent {
    fn stop(&mut self) -> Result<(), EffectError> {
        Ok(())
    }

    fn speak(&mut self, _text: &str, _rate: f32) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Speaks through an external program such as `espeak` or `say`.
///
/// The text is passed as the last argument. Any argument equal to `{rate}` is
/// replaced with the speech rate.
#[derive(Debug)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// The configured synthesizer, if a command is set.
    ///
    /// `enabled` is not consulted: it only seeds the navigator's speech toggle,
    /// which gates each utterance.
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        config
            .command
            .as_ref()
            .map(|program| Self::new(program.clone(), config.args.clone()))
    }

    fn command_args(&self, text: &str, rate: f32) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                if arg == "{rate}" {
                    rate.to_string()
                } else {
                    arg.clone()
                }
            })
            .chain(std::iter::once(text.to_string()))
            .collect()
    }
}

impl Speech for CommandSpeech {
    fn stop(&mut self) -> Result<(), EffectError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if child.try_wait()?.is_none() {
            child.kill()?;
        }
        child.wait()?;
        Ok(())
    }

    fn speak(&mut self, text: &str, rate: f32) -> Result<(), EffectError> {
        let child = Command::new(&self.program)
            .args(self.command_args(text, rate))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EffectError::Speech(format!("{}: {e}", self.program)))?;
        self.child = Some(child);
        Ok(())
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
