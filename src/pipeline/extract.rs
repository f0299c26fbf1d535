//! Body Extractor — best-effort plain text from a Gmail payload tree.

use std::collections::VecDeque;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use regex::Regex;
use tracing::debug;

use crate::gmail::types::MessagePayload;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Extract renderable text from a message payload.
///
/// A direct `text/plain` body is returned verbatim; a direct `text/html`
/// body is markup-stripped. Otherwise the part tree is scanned FIFO and
/// the first part carrying body data wins: `text/plain` verbatim,
/// anything else markup-stripped. That last branch is deliberately
/// permissive — a calendar invite or other non-text part that happens to
/// carry data is returned stripped rather than skipped, matching the
/// behavior this tool has always had.
///
/// Pure function of the payload; returns `""` when nothing textual exists.
pub fn extract(payload: &MessagePayload) -> String {
    if let Some(data) = payload.data() {
        match payload.mime_type.as_str() {
            "text/plain" => return decode_body(data),
            "text/html" => return strip_markup(&decode_body(data)),
            _ => {}
        }
    }

    let mut queue: VecDeque<&MessagePayload> = payload.parts.iter().collect();
    while let Some(part) = queue.pop_front() {
        if let Some(data) = part.data() {
            let text = decode_body(data);
            if part.mime_type == "text/plain" {
                return text;
            }
            return strip_markup(&text);
        }
        queue.extend(part.parts.iter());
    }

    String::new()
}

/// Decode a base64url body blob to text.
///
/// Accepts padded and unpadded input. Malformed base64 degrades to an
/// empty string and invalid UTF-8 bytes become replacement characters —
/// extraction never fails a message.
pub fn decode_body(data: &str) -> String {
    let bytes = URL_SAFE
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data))
        .unwrap_or_else(|e| {
            debug!(error = %e, "Malformed base64url body, treating as empty");
            Vec::new()
        });
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Remove `<...>` tag spans, then decode HTML entities.
///
/// Lossy by design — good enough for keyword/sentiment classification,
/// not a renderer.
pub fn strip_markup(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, "");
    html_escape::decode_html_entities(stripped.as_ref()).into_owned()
}
