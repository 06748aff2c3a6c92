//! Ticket store backed by a hosted `tickets` table behind PostgREST.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SupabaseConfig;

use super::{Attachment, Ticket, TicketDraft, TicketError, TicketStatus, TicketStore};

/// Row shape of the hosted table (snake_case columns, nullable extras).
#[derive(Debug, Deserialize)]
struct TicketRow {
    id: serde_json::Value,
    ticket_number: u32,
    name: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        let id = match row.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Ticket {
            id,
            ticket_number: row.ticket_number,
            name: row.name,
            link: row.link.unwrap_or_default(),
            details: row.details.unwrap_or_default(),
            attachments: row.attachments.unwrap_or_default(),
            status: row
                .status
                .as_deref()
                .and_then(TicketStatus::parse)
                .unwrap_or_default(),
            date: row.date.unwrap_or_default(),
            tags: row.tags.unwrap_or_default(),
        }
    }
}

/// Insert/update payload. `ticket_number` is only sent on insert.
#[derive(Debug, Serialize)]
struct RowPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ticket_number: Option<u32>,
    name: &'a str,
    link: &'a str,
    details: &'a str,
    attachments: &'a [Attachment],
    status: &'a str,
    date: &'a str,
    tags: &'a [String],
}

impl<'a> RowPayload<'a> {
    fn new(ticket_number: Option<u32>, draft: &'a TicketDraft) -> Self {
        Self {
            ticket_number,
            name: &draft.name,
            link: &draft.link,
            details: &draft.details,
            attachments: &draft.attachments,
            status: draft.status.as_str(),
            date: &draft.date,
            tags: &draft.tags,
        }
    }
}

/// PostgREST ticket store.
pub struct RestTicketStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestTicketStore {
    /// Create a new store for the project described by `config`.
    pub fn new(config: &SupabaseConfig) -> Result<Self, TicketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| TicketError::Remote(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/tickets", self.base_url)
    }

    fn id_filter_url(&self, id: &str) -> String {
        format!("{}?id=eq.{}", self.table_url(), urlencoding::encode(id))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send a request that answers with a JSON array of rows.
    async fn rows(&self, request: RequestBuilder) -> Result<Vec<TicketRow>, TicketError> {
        let response = request
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| TicketError::Remote(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TicketError::Remote(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TicketError::Remote(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl TicketStore for RestTicketStore {
    fn name(&self) -> &str {
        "postgrest"
    }

    async fn list(&self) -> Result<Vec<Ticket>, TicketError> {
        let url = format!("{}?select=*&order=created_at.desc", self.table_url());
        let rows = self.rows(self.request(Method::GET, &url)).await?;
        debug!(count = rows.len(), "Fetched tickets");
        Ok(rows.into_iter().map(Ticket::from).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let url = format!("{}&select=*", self.id_filter_url(id));
        let rows = self.rows(self.request(Method::GET, &url)).await?;
        Ok(rows.into_iter().next().map(Ticket::from))
    }

    async fn create(&self, ticket_number: u32, draft: &TicketDraft) -> Result<Ticket, TicketError> {
        let payload = [RowPayload::new(Some(ticket_number), draft)];
        let rows = self
            .rows(self.request(Method::POST, &self.table_url()).json(&payload))
            .await?;
        rows.into_iter()
            .next()
            .map(Ticket::from)
            .ok_or_else(|| TicketError::Remote("Insert returned no rows".to_string()))
    }

    async fn update(&self, id: &str, draft: &TicketDraft) -> Result<Ticket, TicketError> {
        let payload = RowPayload::new(None, draft);
        let rows = self
            .rows(self.request(Method::PATCH, &self.id_filter_url(id)).json(&payload))
            .await?;
        rows.into_iter()
            .next()
            .map(Ticket::from)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), TicketError> {
        let rows = self
            .rows(self.request(Method::DELETE, &self.id_filter_url(id)))
            .await?;
        if rows.is_empty() {
            return Err(TicketError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, TicketError> {
        // PostgREST refuses unfiltered deletes; match every row instead
        let url = format!("{}?id=neq.0", self.table_url());
        let rows = self.rows(self.request(Method::DELETE, &url)).await?;
        Ok(rows.len() as u64)
    }

    async fn bulk_create(
        &self,
        start_number: u32,
        drafts: &[TicketDraft],
    ) -> Result<Vec<Ticket>, TicketError> {
        let payload: Vec<RowPayload<'_>> = drafts
            .iter()
            .enumerate()
            .map(|(offset, draft)| RowPayload::new(Some(start_number + offset as u32), draft))
            .collect();
        let rows = self
            .rows(self.request(Method::POST, &self.table_url()).json(&payload))
            .await?;
        Ok(rows.into_iter().map(Ticket::from).collect())
    }
}
