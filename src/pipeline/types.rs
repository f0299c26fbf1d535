//! Shared types for the triage pipeline.

use serde::{Deserialize, Serialize};

/// Gmail's built-in starred label.
pub const STARRED_LABEL: &str = "STARRED";

/// Triage category for a message. Fully determined by one classification
/// pass over (text, sender, rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Billing and statements — star and attach the review label.
    Necessary,
    /// Positive or appreciative mail — star.
    Important,
    /// Everything else — trash.
    Neither,
}

impl Category {
    /// Lowercase label for logging and digest headings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Necessary => "necessary",
            Self::Important => "important",
            Self::Neither => "neither",
        }
    }
}

/// Mailbox mutation derived from a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Add the given labels to the message.
    Modify { add_label_ids: Vec<String> },
    /// Move the message to the trash.
    Trash,
}

impl Action {
    /// Map a category to its mutation. Total — no failure branch;
    /// failures belong to the mutation call, not the mapping.
    pub fn for_category(category: Category, review_label_id: Option<&str>) -> Self {
        match category {
            Category::Necessary => {
                let mut add_label_ids = vec![STARRED_LABEL.to_string()];
                if let Some(review) = review_label_id {
                    add_label_ids.push(review.to_string());
                }
                Self::Modify { add_label_ids }
            }
            Category::Important => Self::Modify {
                add_label_ids: vec![STARRED_LABEL.to_string()],
            },
            Category::Neither => Self::Trash,
        }
    }
}

/// One digest entry: the outcome of triaging a single message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriagedMessage {
    pub id: String,
    pub category: Category,
    pub subject: String,
    pub sender: String,
}
