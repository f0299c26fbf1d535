//! Serde models for the Gmail API wire format.
//!
//! Only the fields the poller reads are modeled. The payload tree is
//! recursive: a part has the same shape as the top-level payload.

use serde::{Deserialize, Serialize};

/// A full message as returned by `GET /messages/{id}?format=full`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<MessagePayload>,
}

impl Message {
    /// Look up a header value by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.as_ref()?.headers.iter().find_map(|h| {
            h.name
                .eq_ignore_ascii_case(name)
                .then_some(h.value.as_str())
        })
    }

    /// The From header, or `"unknown"` when absent.
    pub fn sender(&self) -> &str {
        self.header("From").unwrap_or("unknown")
    }

    /// The Subject header, or `"No Subject"` when absent.
    pub fn subject(&self) -> &str {
        self.header("Subject").unwrap_or("No Subject")
    }
}

/// A node in the message body tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<MessageBody>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePayload>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
}

impl MessagePayload {
    /// Base64url body data carried directly on this node, if any.
    pub fn data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }
}

/// Body blob of a payload node. `data` is base64url-encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
}

/// A single name/value header pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// A Gmail label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

/// Response wrapper for `GET /messages`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    #[serde(default)]
    pub messages: Option<Vec<MessageRef>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A minimal message reference from the list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Response wrapper for `GET /labels`.
#[derive(Debug, Deserialize)]
pub struct ListLabelsResponse {
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_with_headers(headers: Vec<(&str, &str)>) -> Message {
        Message {
            id: "m1".into(),
            payload: Some(MessagePayload {
                headers: headers
                    .into_iter()
                    .map(|(name, value)| Header {
                        name: name.into(),
                        value: value.into(),
                    })
                    .collect(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let msg = message_with_headers(vec![("from", "alice@example.com")]);
        assert_eq!(msg.header("From"), Some("alice@example.com"));
        assert_eq!(msg.sender(), "alice@example.com");
    }

    #[test]
    fn missing_headers_fall_back() {
        let msg = Message::default();
        assert_eq!(msg.sender(), "unknown");
        assert_eq!(msg.subject(), "No Subject");
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let json = r#"{
            "id": "17a",
            "threadId": "17a",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [{"name": "Subject", "value": "Hi"}],
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": "aGVsbG8="}}
                ]
            }
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.subject(), "Hi");
        let payload = msg.payload.unwrap();
        assert_eq!(payload.mime_type, "multipart/alternative");
        assert_eq!(payload.parts[0].data(), Some("aGVsbG8="));
    }

    #[test]
    fn empty_data_is_treated_as_absent() {
        let part = MessagePayload {
            mime_type: "text/plain".into(),
            body: Some(MessageBody {
                data: Some(String::new()),
                attachment_id: None,
            }),
            ..Default::default()
        };
        assert_eq!(part.data(), None);
    }
}
