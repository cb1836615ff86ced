//! Projection of a `ResponseModel` into the outbound webhook payload.
//!
//! Two branches: the configured voice-assistant source gets the platform's
//! rich-response envelope under `data`; every other (or absent) source gets
//! the generic speech/displayText payload with pass-through channel
//! attachments. Projection is a pure function of its inputs.

use crate::response::{Context, ImageRef, OptionEntry, ResponseModel, RichContent};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Key in the outbound `data` map that carries the assistant envelope.
const ASSISTANT_DATA_KEY: &str = "google";

/// Intent requested from the assistant when the user must pick an option.
const OPTION_INTENT: &str = "actions.intent.OPTION";
const OPTION_VALUE_SPEC: &str = "type.googleapis.com/google.actions.v2.OptionValueSpec";

#[derive(Debug, Error)]
pub enum ProjectError {
    /// The model violates the text invariant: both texts empty.
    #[error("response has neither spoken nor display text")]
    EmptyResponse,

    #[error("serializing assistant payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outbound webhook payload, shared by both branches. Optional fields are
/// omitted from the wire when absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub speech: String,
    pub display_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_out: Option<Vec<Context>>,
}

/// Assistant envelope placed under `data.google`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssistantPayload {
    expect_user_response: bool,
    is_ssml: bool,
    rich_response: AssistantRichResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_intent: Option<SystemIntent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssistantRichResponse {
    items: Vec<RichResponseItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_out_suggestion: Option<LinkOutSuggestion>,
}

/// One entry in `richResponse.items`, externally tagged on the wire
/// (`{"simpleResponse": {...}}` or `{"basicCard": {...}}`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
enum RichResponseItem {
    SimpleResponse(SimpleResponse),
    BasicCard(BasicCardPayload),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimpleResponse {
    text_to_speech: String,
    display_text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct BasicCardPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    title: String,
    formatted_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buttons: Vec<CardButtonPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImagePayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardButtonPayload {
    title: String,
    open_url_action: OpenUrlAction,
}

#[derive(Debug, Clone, Serialize)]
struct OpenUrlAction {
    url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagePayload {
    url: String,
    accessibility_text: String,
}

#[derive(Debug, Clone, Serialize)]
struct Suggestion {
    title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkOutSuggestion {
    destination_name: String,
    url: String,
}

/// Follow-up intent carrying the list or carousel options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemIntent {
    intent: String,
    data: SystemIntentData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemIntentData {
    #[serde(rename = "@type")]
    type_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    list_select: Option<OptionSelect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    carousel_select: Option<OptionSelect>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionSelect {
    #[serde(skip_serializing_if = "String::is_empty")]
    title: String,
    items: Vec<OptionItemPayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionItemPayload {
    option_info: OptionInfo,
    title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImagePayload>,
}

#[derive(Debug, Clone, Serialize)]
struct OptionInfo {
    key: String,
    synonyms: Vec<String>,
}

/// Project a response model into the payload for the calling surface.
///
/// `source` is the inbound `originalRequest.source`; when it equals
/// `assistant_source` the assistant envelope is emitted, otherwise the generic
/// branch applies (unknown sources included, so projection is total over
/// origin values).
pub fn project(
    model: &ResponseModel,
    source: Option<&str>,
    assistant_source: &str,
) -> Result<WebhookResponse, ProjectError> {
    let (speech, display_text) = effective_texts(model)?;
    if source == Some(assistant_source) {
        let payload = assistant_payload(model, &speech, &display_text);
        let mut data = Map::new();
        data.insert(
            ASSISTANT_DATA_KEY.to_string(),
            serde_json::to_value(payload)?,
        );
        Ok(WebhookResponse {
            speech,
            display_text,
            data: Some(data),
            context_out: model.output_contexts.clone(),
        })
    } else {
        Ok(WebhookResponse {
            speech,
            display_text,
            data: model.attachments.clone(),
            context_out: model.output_contexts.clone(),
        })
    }
}

/// Apply the fallback rule: when one text is empty the other's value is used
/// for both. Both empty means the model is ill-formed.
fn effective_texts(model: &ResponseModel) -> Result<(String, String), ProjectError> {
    let spoken = if model.spoken_text.is_empty() {
        &model.display_text
    } else {
        &model.spoken_text
    };
    let display = if model.display_text.is_empty() {
        &model.spoken_text
    } else {
        &model.display_text
    };
    if spoken.is_empty() {
        return Err(ProjectError::EmptyResponse);
    }
    Ok((spoken.clone(), display.clone()))
}

fn assistant_payload(model: &ResponseModel, speech: &str, display_text: &str) -> AssistantPayload {
    let simple = RichResponseItem::SimpleResponse(SimpleResponse {
        text_to_speech: speech.to_string(),
        display_text: display_text.to_string(),
    });
    let mut rich = AssistantRichResponse {
        items: vec![simple],
        suggestions: Vec::new(),
        link_out_suggestion: None,
    };
    let mut system_intent = None;
    match &model.content {
        None => {}
        Some(RichContent::BasicCard {
            title,
            body,
            button,
            image,
        }) => {
            rich.items.push(RichResponseItem::BasicCard(BasicCardPayload {
                title: title.clone(),
                formatted_text: body.clone(),
                buttons: button
                    .iter()
                    .map(|b| CardButtonPayload {
                        title: b.label.clone(),
                        open_url_action: OpenUrlAction { url: b.url.clone() },
                    })
                    .collect(),
                image: image.as_ref().map(image_payload),
            }));
        }
        Some(RichContent::List { title, items }) if !items.is_empty() => {
            system_intent = Some(option_intent(SelectStyle::List, title, items));
        }
        Some(RichContent::Carousel { items }) if !items.is_empty() => {
            system_intent = Some(option_intent(SelectStyle::Carousel, "", items));
        }
        // An empty list or carousel degrades to the simple response.
        Some(RichContent::List { .. }) | Some(RichContent::Carousel { .. }) => {}
        Some(RichContent::SuggestionChips { labels, link }) => {
            rich.suggestions = labels
                .iter()
                .map(|label| Suggestion {
                    title: label.clone(),
                })
                .collect();
            rich.link_out_suggestion = link.as_ref().map(|l| LinkOutSuggestion {
                destination_name: l.label.clone(),
                url: l.url.clone(),
            });
        }
    }
    AssistantPayload {
        expect_user_response: true,
        is_ssml: false,
        rich_response: rich,
        system_intent,
    }
}

enum SelectStyle {
    List,
    Carousel,
}

fn option_intent(style: SelectStyle, title: &str, items: &[OptionEntry]) -> SystemIntent {
    let select = OptionSelect {
        title: title.to_string(),
        items: items.iter().map(option_item_payload).collect(),
    };
    let (list_select, carousel_select) = match style {
        SelectStyle::List => (Some(select), None),
        SelectStyle::Carousel => (None, Some(select)),
    };
    SystemIntent {
        intent: OPTION_INTENT.to_string(),
        data: SystemIntentData {
            type_url: OPTION_VALUE_SPEC.to_string(),
            list_select,
            carousel_select,
        },
    }
}

fn option_item_payload(entry: &OptionEntry) -> OptionItemPayload {
    OptionItemPayload {
        option_info: OptionInfo {
            key: entry.key.clone(),
            synonyms: entry.synonyms.clone(),
        },
        title: entry.title.clone(),
        description: entry.description.clone(),
        image: entry.image.as_ref().map(image_payload),
    }
}

fn image_payload(image: &ImageRef) -> ImagePayload {
    ImagePayload {
        url: image.url.clone(),
        accessibility_text: image.alt_text.clone(),
    }
}
