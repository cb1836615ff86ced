//! Internal response model: what to tell the user, before any wire shaping.
//!
//! Handlers produce a `ResponseModel`; the projector turns it into the payload
//! for the calling surface. Rich content carries display metadata only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Conversation-state token with a name, remaining lifespan, and parameters.
/// Used for inbound contexts and for `contextOut` updates alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    #[serde(default)]
    pub lifespan: u32,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Context {
    pub fn new(name: impl Into<String>, lifespan: u32) -> Self {
        Self {
            name: name.into(),
            lifespan,
            parameters: Map::new(),
        }
    }
}

/// Image shown on a card or option item (URL plus alternate text).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub url: String,
    pub alt_text: String,
}

/// Link button on a basic card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardButton {
    pub label: String,
    pub url: String,
}

/// Link offered alongside suggestion chips.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionLink {
    pub label: String,
    pub url: String,
}

/// Entry in a list or carousel: stable key, spoken synonyms, display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    pub key: String,
    pub synonyms: Vec<String>,
    pub title: String,
    pub description: String,
    pub image: Option<ImageRef>,
}

/// Structured rich content. One variant is active per response; the projector
/// switches on the tag, never on insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum RichContent {
    BasicCard {
        title: String,
        body: String,
        button: Option<CardButton>,
        image: Option<ImageRef>,
    },
    List {
        title: String,
        items: Vec<OptionEntry>,
    },
    Carousel {
        items: Vec<OptionEntry>,
    },
    SuggestionChips {
        labels: Vec<String>,
        link: Option<SuggestionLink>,
    },
}

/// What to tell the user: spoken and displayed text, optional rich content,
/// optional per-channel attachment templates, optional context updates.
///
/// At least one of `spoken_text`/`display_text` must be non-empty; the
/// projector substitutes the other when one is missing. `attachments` is the
/// author-supplied template map for the generic branch, keyed by channel name
/// and passed through verbatim.
#[derive(Debug, Clone, Default)]
pub struct ResponseModel {
    pub spoken_text: String,
    pub display_text: String,
    pub content: Option<RichContent>,
    pub attachments: Option<Map<String, Value>>,
    pub output_contexts: Option<Vec<Context>>,
}

impl ResponseModel {
    /// Plain text response. Either argument may be empty; the projector fills
    /// it from the other.
    pub fn text(spoken: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            spoken_text: spoken.into(),
            display_text: display.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: RichContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_attachments(mut self, attachments: Map<String, Value>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    pub fn with_contexts(mut self, contexts: Vec<Context>) -> Self {
        self.output_contexts = Some(contexts);
        self
    }
}
