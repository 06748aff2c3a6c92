//! Client-side search, filtering and counters over a loaded collection.

use serde::Serialize;

use super::{Ticket, TicketStatus};

/// Filter for narrowing the loaded tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Case-insensitive substring matched against name and details.
    pub search: Option<String>,
    /// Only tickets with this status.
    pub status: Option<TicketStatus>,
    /// Only tickets carrying this tag.
    pub tag: Option<String>,
}

impl TicketFilter {
    /// Create a filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by search text. Blank text matches everything.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search.to_lowercase())
        };
        self
    }

    /// Filter by status.
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by tag id.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        let matches_search = match &self.search {
            None => true,
            Some(needle) => {
                ticket.name.to_lowercase().contains(needle)
                    || ticket.details.to_lowercase().contains(needle)
            }
        };
        let matches_status = self.status.is_none_or(|s| ticket.status == s);
        let matches_tag = self.tag.as_deref().is_none_or(|t| ticket.has_tag(t));

        matches_search && matches_status && matches_tag
    }

    /// Tickets that pass the filter, in their original order.
    pub fn apply<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        tickets.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Per-status counters shown above the ticket list.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TicketStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TicketStats {
    pub fn collect(tickets: &[Ticket]) -> Self {
        tickets.iter().fold(Self::default(), |mut stats, t| {
            stats.total += 1;
            match t.status {
                TicketStatus::Pending => stats.pending += 1,
                TicketStatus::InProgress => stats.in_progress += 1,
                TicketStatus::Completed => stats.completed += 1,
            }
            stats
        })
    }

    pub fn count(&self, status: TicketStatus) -> usize {
        match status {
            TicketStatus::Pending => self.pending,
            TicketStatus::InProgress => self.in_progress,
            TicketStatus::Completed => self.completed,
        }
    }
}
