//! Backup serialization.

use crate::ticket::Ticket;

/// Pretty-printed JSON array of the whole collection.
pub fn serialize_backup(tickets: &[Ticket]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tickets)
}

/// Download name for a backup taken on `date` (`YYYY-MM-DD`).
pub fn backup_file_name(date: &str) -> String {
    format!("tickets-backup-{}.json", date)
}
