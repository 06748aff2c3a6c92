//! Free-text chat message to ticket fields.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::ticket::DEFAULT_TICKET_NAME;

/// Longest name taken from a message's first line when no label is found.
const FALLBACK_NAME_CHARS: usize = 100;

static NAME_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:اسم المشروع او الشركة|اسم الشركة)[:\s]*([^\n]+)").expect("valid regex")
});

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://[^\s]+").expect("valid regex"));

static NUMBER_MARKER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#\d+\s*$").expect("valid regex"));

static NAME_LABEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^(?:اسم المشروع او الشركة|اسم الشركة)[:\s]*.*$").expect("valid regex")
});

static LINK_LABEL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^الروابط?[:\s]*$").expect("valid regex"));

static DETAILS_LABEL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^التفاصيل[:\s]*$").expect("valid regex"));

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

/// Ticket fields recovered from one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub name: String,
    pub link: String,
    pub details: String,
}

/// Extract name, first link and cleaned details from a message body.
///
/// Never fails. Missing pieces fall back to the first line, an empty link
/// and the placeholder ticket name.
pub fn parse_imported_message(text: &str) -> ParsedMessage {
    ParsedMessage {
        name: extract_name(text),
        link: URL
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        details: extract_details(text),
    }
}

fn extract_name(text: &str) -> String {
    let labelled = NAME_LABEL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches(|c: char| c == ':' || c.is_whitespace()))
        .filter(|name| !name.is_empty());
    if let Some(name) = labelled {
        return name.to_string();
    }

    let first_line: String = text
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .take(FALLBACK_NAME_CHARS)
        .collect();
    if !first_line.is_empty() {
        return first_line;
    }

    DEFAULT_TICKET_NAME.to_string()
}

fn extract_details(text: &str) -> String {
    let details = NUMBER_MARKER_LINE.replace_all(text, "");
    let details = NAME_LABEL_LINE.replace_all(&details, "");
    let details = LINK_LABEL_LINE.replace_all(&details, "");
    let details = DETAILS_LABEL_LINE.replace_all(&details, "");
    let details = URL.replace_all(&details, "");
    let details = BLANK_RUN.replace_all(&details, "\n");
    details.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_message() {
        let parsed = parse_imported_message("اسم الشركة: Acme\nhttps://x.co/a\nتفاصيل هنا");

        assert_eq!(parsed.name, "Acme");
        assert_eq!(parsed.link, "https://x.co/a");
        assert!(parsed.details.contains("تفاصيل هنا"));
        assert!(!parsed.details.contains("Acme"));
        assert!(!parsed.details.contains("https://"));
    }

    #[test]
    fn test_empty_message() {
        let parsed = parse_imported_message("");
        assert_eq!(parsed.name, DEFAULT_TICKET_NAME);
        assert!(!parsed.name.is_empty());
        assert_eq!(parsed.link, "");
        assert_eq!(parsed.details, "");
    }

    #[test]
    fn test_long_label_without_colon() {
        let parsed = parse_imported_message("#12\nاسم المشروع او الشركة    شركة النور\nالتفاصيل:\nطلب تصميم شعار");

        assert_eq!(parsed.name, "شركة النور");
        assert_eq!(parsed.details, "طلب تصميم شعار");
    }

    #[test]
    fn test_name_falls_back_to_first_line() {
        let parsed = parse_imported_message("  Website redesign  \nneeds a new landing page");
        assert_eq!(parsed.name, "Website redesign");
        assert_eq!(
            parsed.details,
            "Website redesign  \nneeds a new landing page"
        );
    }

    #[test]
    fn test_fallback_name_is_truncated() {
        let line = "x".repeat(150);
        let parsed = parse_imported_message(&line);
        assert_eq!(parsed.name.chars().count(), FALLBACK_NAME_CHARS);
    }

    #[test]
    fn test_first_link_wins_and_all_links_are_stripped() {
        let text = "الروابط:\nhttp://one.example/a b\nHTTPS://two.example/c\nالتفاصيل\nbody";
        let parsed = parse_imported_message(text);

        assert_eq!(parsed.link, "http://one.example/a");
        assert!(!parsed.details.contains("example"));
        assert!(!parsed.details.contains("الروابط"));
        assert!(!parsed.details.contains("التفاصيل"));
        assert!(parsed.details.contains("body"));
    }

    #[test]
    fn test_blank_runs_collapse() {
        let parsed = parse_imported_message("first\n\n\n\nsecond");
        assert_eq!(parsed.details, "first\nsecond");
    }

    #[test]
    fn test_name_label_mid_document() {
        let parsed = parse_imported_message("طلب جديد\nاسم الشركة: Nile Co\nnext line");
        assert_eq!(parsed.name, "Nile Co");
        assert!(parsed.details.contains("طلب جديد"));
        assert!(parsed.details.contains("next line"));
        assert!(!parsed.details.contains("Nile Co"));
    }
}
