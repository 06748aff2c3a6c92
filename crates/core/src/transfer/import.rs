//! Import payloads (chat exports and backups) to ticket drafts.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TagCatalog;
use crate::text;
use crate::ticket::{Attachment, TicketDraft, TicketStatus, DEFAULT_TICKET_NAME};

use super::message::parse_imported_message;

/// Parse the raw bytes of an import file.
pub fn parse_import(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// One piece of a formatted chat message.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextFragment {
    Plain(String),
    Rich {
        #[serde(default)]
        text: Option<String>,
    },
}

impl TextFragment {
    fn as_str(&self) -> &str {
        match self {
            TextFragment::Plain(s) => s,
            TextFragment::Rich { text } => text.as_deref().unwrap_or_default(),
        }
    }
}

/// The `text` field of an exported chat message.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    Plain(String),
    Fragments(Vec<TextFragment>),
    Entity {
        #[serde(default)]
        text: Option<String>,
    },
}

impl MessageText {
    /// The message's text with all fragments concatenated in order.
    pub fn extract(&self) -> String {
        match self {
            MessageText::Plain(s) => s.clone(),
            MessageText::Fragments(fragments) => {
                fragments.iter().map(TextFragment::as_str).collect()
            }
            MessageText::Entity { text } => text.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<MessageText>,
    #[serde(default)]
    date: Option<String>,
}

/// Turns parsed import payloads into drafts ready for numbering.
pub struct ImportNormalizer<'a> {
    tags: &'a TagCatalog,
    today: String,
}

impl<'a> ImportNormalizer<'a> {
    pub fn new(tags: &'a TagCatalog) -> Self {
        Self {
            tags,
            today: text::today(),
        }
    }

    /// Override the date used for entries without one.
    pub fn with_today(mut self, today: impl Into<String>) -> Self {
        self.today = today.into();
        self
    }

    /// Recognize a chat export (`{"messages": [...]}`) or a backup array.
    ///
    /// Any other shape yields no drafts.
    pub fn normalize(&self, payload: &Value) -> Vec<TicketDraft> {
        match payload {
            Value::Object(obj) => match obj.get("messages") {
                Some(Value::Array(messages)) => self.from_chat_export(messages),
                _ => Vec::new(),
            },
            Value::Array(entries) => self.from_backup(entries),
            _ => Vec::new(),
        }
    }

    fn from_chat_export(&self, messages: &[Value]) -> Vec<TicketDraft> {
        let mut drafts = Vec::new();

        for (index, raw) in messages.iter().enumerate() {
            let message: ChatMessage = match serde_json::from_value(raw.clone()) {
                Ok(m) => m,
                Err(e) => {
                    debug!(index, error = %e, "Skipping unreadable chat message");
                    continue;
                }
            };
            if message.kind.as_deref() != Some("message") {
                continue;
            }
            let body = message.text.map(|t| t.extract()).unwrap_or_default();
            if body.is_empty() {
                continue;
            }

            let parsed = parse_imported_message(&body);
            let date = message
                .date
                .as_deref()
                .map(text::date_portion)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| self.today.clone());

            drafts.push(TicketDraft {
                name: parsed.name,
                link: parsed.link,
                details: parsed.details,
                attachments: Vec::new(),
                status: TicketStatus::Pending,
                date,
                tags: Vec::new(),
            });
        }

        drafts
    }

    fn from_backup(&self, entries: &[Value]) -> Vec<TicketDraft> {
        let mut drafts = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let Some(obj) = entry.as_object() else {
                warn!(index, "Skipping backup entry that is not an object");
                continue;
            };
            let field = |key: &str| {
                obj.get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            };

            let status = match field("status") {
                None => TicketStatus::Pending,
                Some(raw) => TicketStatus::parse(raw).unwrap_or_else(|| {
                    warn!(index, status = raw, "Unknown status in backup, using pending");
                    TicketStatus::Pending
                }),
            };

            drafts.push(TicketDraft {
                name: field("name").unwrap_or(DEFAULT_TICKET_NAME).to_string(),
                link: field("link").unwrap_or_default().to_string(),
                details: field("details").unwrap_or_default().to_string(),
                attachments: backup_attachments(obj.get("attachments")),
                status,
                date: field("date")
                    .map(str::to_string)
                    .unwrap_or_else(|| self.today.clone()),
                tags: self.backup_tags(index, obj.get("tags")),
            });
        }

        drafts
    }

    fn backup_tags(&self, index: usize, raw: Option<&Value>) -> Vec<String> {
        let Some(Value::Array(values)) = raw else {
            return Vec::new();
        };
        values
            .iter()
            .filter_map(Value::as_str)
            .filter(|tag| {
                let known = self.tags.contains(tag);
                if !known {
                    warn!(index, tag = *tag, "Dropping unknown tag from backup");
                }
                known
            })
            .map(str::to_string)
            .collect()
    }
}

fn backup_attachments(raw: Option<&Value>) -> Vec<Attachment> {
    let Some(Value::Array(values)) = raw else {
        return Vec::new();
    };
    values
        .iter()
        .filter_map(|v| serde_json::from_value::<Attachment>(v.clone()).ok())
        .collect()
}
