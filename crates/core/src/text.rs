//! Small text helpers shared by the import pipeline and the read views.

use serde::{Deserialize, Serialize};

/// Writing direction of a piece of text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Rtl,
    Ltr,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Rtl => "rtl",
            TextDirection::Ltr => "ltr",
        }
    }
}

impl std::fmt::Display for TextDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the direction of `text` from its first character.
///
/// Empty text is treated as right-to-left, the default authoring language.
/// Only the Arabic block (U+0600..=U+06FF) counts as right-to-left.
pub fn detect_direction(text: &str) -> TextDirection {
    match text.chars().next() {
        None => TextDirection::Rtl,
        Some(c) if ('\u{0600}'..='\u{06FF}').contains(&c) => TextDirection::Rtl,
        Some(_) => TextDirection::Ltr,
    }
}

/// Today's date (UTC) as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// The calendar-date part of an ISO-8601 timestamp (everything before `T`).
pub fn date_portion(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Truncate to `max_chars` characters, appending `...` when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
