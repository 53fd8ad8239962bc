//! Provider REST payload types and MIME body decoding.
//!
//! The provider returns `format=full` messages as a tree of parts. Bodies
//! are base64url without padding and must decode to UTF-8; anything else is
//! a [`Error::Decode`] the stream turns into a skip.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::NormalizedEmail;

/// Response to a message list call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageStub>,
    #[allow(dead_code)]
    pub next_page_token: Option<String>,
}

/// One search match, id only. The content comes from a separate fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageStub {
    pub id: String,
}

/// A fully fetched message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageDetail {
    pub id: String,
    pub payload: Option<MessagePart>,
}

/// One node of the MIME part tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PartBody {
    pub data: Option<String>,
}

/// Flattens a fetched message into a [`NormalizedEmail`].
///
/// Multipart payloads are walked recursively, taking the first leaf with
/// data per MIME type. A single-part payload is classified by its own MIME
/// type: `text/html` becomes the HTML body, anything else the text body.
/// Empty bodies are normalized to `None`.
pub(crate) fn normalize(detail: MessageDetail) -> Result<NormalizedEmail> {
    let payload = detail
        .payload
        .ok_or_else(|| Error::Decode("message has no payload".to_string()))?;

    let mut email = NormalizedEmail {
        id: detail.id,
        message_id: header_value(&payload.headers, "Message-ID"),
        subject: header_value(&payload.headers, "Subject"),
        sender: header_value(&payload.headers, "From"),
        date: header_value(&payload.headers, "Date"),
        ..NormalizedEmail::default()
    };

    if payload.parts.is_empty() {
        if let Some(data) = part_data(&payload) {
            let body = decode_body(data)?;
            if body.is_empty() {
                return Ok(email);
            }
            if payload.mime_type.eq_ignore_ascii_case("text/html") {
                email.body_html = Some(body);
            } else {
                email.body_text = Some(body);
            }
        }
    } else {
        email.body_html = decode_first(&payload, "text/html")?;
        email.body_text = decode_first(&payload, "text/plain")?;
    }

    Ok(email)
}

fn header_value(headers: &[Header], name: &str) -> String {
    headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(name))
        .map(|header| header.value.clone())
        .unwrap_or_default()
}

fn decode_first(payload: &MessagePart, mime: &str) -> Result<Option<String>> {
    match find_part_data(payload, mime) {
        Some(data) => {
            let body = decode_body(data)?;
            Ok((!body.is_empty()).then_some(body))
        }
        None => Ok(None),
    }
}

/// Depth-first search for the first part of the given MIME type that
/// actually carries body data.
fn find_part_data<'a>(part: &'a MessagePart, mime: &str) -> Option<&'a str> {
    if part.mime_type.eq_ignore_ascii_case(mime) {
        if let Some(data) = part_data(part) {
            return Some(data);
        }
    }
    part.parts
        .iter()
        .find_map(|child| find_part_data(child, mime))
}

fn part_data(part: &MessagePart) -> Option<&str> {
    part.body.as_ref().and_then(|body| body.data.as_deref())
}

fn decode_body(data: &str) -> Result<String> {
    // Producers vary on padding; strip any before the unpadded decode.
    let bytes = URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .map_err(|err| Error::Decode(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| Error::Decode(err.to_string()))
}
