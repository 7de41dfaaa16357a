//! The navigation engine.
//!
//! [`Navigator`] is the single state record behind every command: the four
//! category lists, their cursors, the scope root and body mode. Operations
//! take the document and the effects by reference, so the navigator never
//! owns the tree it walks.

mod body;
mod scope;

pub use body::{BodyState, collect_body};

use std::fmt::Debug;
use std::hash::Hash;

use crate::config::{MessageConfig, NavConfig};
use crate::document::Document;
use crate::effects::Effects;
use crate::error::Result;
use crate::outline::{Category, Classifiers, CursorSet, Direction, Outline};

pub struct Navigator<N> {
    classifiers: Classifiers,
    messages: MessageConfig,
    outline: Outline<N>,
    cursors: CursorSet,
    scope: Option<N>,
    body: BodyState<N>,
    speech_enabled: bool,
    speech_rate: f32,
}

impl<N> Navigator<N>
where
    N: Copy + Eq + Hash + Debug + 'static,
{
    /// A navigator with empty lists. Call [`rebuild`](Self::rebuild) before use.
    pub fn new(config: &NavConfig) -> Result<Self> {
        Ok(Self {
            classifiers: Classifiers::new(config)?,
            messages: config.messages.clone(),
            outline: Outline::default(),
            cursors: CursorSet::default(),
            scope: None,
            body: BodyState::default(),
            speech_enabled: config.speech.enabled,
            speech_rate: config.speech.rate,
        })
    }

    /// Recompute all four lists, clamp every cursor and leave body mode.
    ///
    /// Calling this twice without a document change in between is a no-op.
    pub fn rebuild<D: Document<Node = N>>(&mut self, doc: &D) {
        self.outline = Outline::build(doc, &self.classifiers, self.scope);
        for category in Category::ALL {
            self.cursors.clamp(category, self.outline.len(category));
        }
        self.body.reset();
        tracing::debug!(
            landmarks = self.outline.len(Category::Landmark),
            headings = self.outline.len(Category::Heading),
            topics = self.outline.len(Category::Topic),
            responses = self.outline.len(Category::Response),
            scoped = self.scope.is_some(),
            "outline rebuilt"
        );
    }

    /// Step the cursor of `category` with wrap-around and announce the item.
    ///
    /// Moving among headings leaves body mode. Moving among responses scopes
    /// headings and topics to the new response.
    pub fn move_cursor<D: Document<Node = N>>(
        &mut self,
        doc: &D,
        fx: &mut Effects<N>,
        category: Category,
        direction: Direction,
    ) {
        let len = self.outline.len(category);
        let Some(index) = self.cursors.step(category, direction, len) else {
            self.say(fx, &format!("No {} found.", category.plural()));
            return;
        };
        let Some(entry) = self.outline.get(category, index) else {
            return;
        };
        let (node, label) = (entry.node, entry.label.clone());

        if category == Category::Heading {
            self.body.reset();
        }
        fx.reveal(node);
        self.say(fx, &format!("{category} {} of {len}: {label}", index + 1));

        if category == Category::Response {
            let preface = format!("Scoped to response {} of {len}.", index + 1);
            self.set_scope(doc, fx, node, &preface);
        }
    }

    /// Read the most specific current thing: the body item, else the scope
    /// root, else the current topic, landmark or heading.
    pub fn read_current<D: Document<Node = N>>(&mut self, doc: &D, fx: &mut Effects<N>) {
        if let Some(item) = self.body.current() {
            let text = doc.text(item.node);
            if !text.is_empty() {
                self.say(fx, &text);
                return;
            }
        }
        if let Some(scope) = self.scope {
            let text = doc.text(scope);
            let text = if text.is_empty() {
                "Nothing readable in scoped response.".to_string()
            } else {
                text
            };
            self.say(fx, &text);
            return;
        }
        let category = [Category::Topic, Category::Landmark]
            .into_iter()
            .find(|&c| !self.outline.is_empty(c))
            .unwrap_or(Category::Heading);
        self.read_from(doc, fx, category);
    }

    fn read_from<D: Document<Node = N>>(&mut self, doc: &D, fx: &mut Effects<N>, category: Category) {
        let Some(entry) = self.outline.get(category, self.cursors.get(category)) else {
            self.say(fx, &format!("No {} to read.", category.plural()));
            return;
        };
        let text = doc.text(entry.node);
        let text = if text.is_empty() {
            "Nothing readable here.".to_string()
        } else {
            text
        };
        self.say(fx, &text);
    }

    pub fn toggle_speech(&mut self, fx: &mut Effects<N>) {
        self.speech_enabled = !self.speech_enabled;
        let text = if self.speech_enabled { "TTS on." } else { "TTS off." };
        self.say(fx, text);
    }

    /// Announce the configured greeting.
    pub fn greet(&mut self, fx: &mut Effects<N>) {
        let greeting = self.messages.greeting.clone();
        if !greeting.is_empty() {
            self.say(fx, &greeting);
        }
    }

    pub fn outline(&self) -> &Outline<N> {
        &self.outline
    }

    pub fn cursor(&self, category: Category) -> usize {
        self.cursors.get(category)
    }

    pub fn scope(&self) -> Option<N> {
        self.scope
    }

    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    pub fn body(&self) -> &BodyState<N> {
        &self.body
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech_enabled
    }

    fn say(&self, fx: &mut Effects<N>, text: &str) {
        fx.announce(text, self.speech_enabled, self.speech_rate);
    }
}
