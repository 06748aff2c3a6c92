//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};

use super::{Ticket, TicketDraft, TicketError, TicketStatus, TicketStore};

const SELECT_COLUMNS: &str =
    "SELECT id, ticket_number, name, link, details, attachments, status, date, tags FROM tickets";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                ticket_number INTEGER NOT NULL,
                name TEXT NOT NULL,
                link TEXT NOT NULL DEFAULT '',
                details TEXT NOT NULL,
                attachments TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'pending',
                date TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_number ON tickets(ticket_number);
            CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at DESC);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, TicketError> {
        self.conn
            .lock()
            .map_err(|_| TicketError::Database("connection mutex poisoned".to_string()))
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let id: String = row.get(0)?;
        let ticket_number: u32 = row.get(1)?;
        let name: String = row.get(2)?;
        let link: String = row.get(3)?;
        let details: String = row.get(4)?;
        let attachments_json: String = row.get(5)?;
        let status_str: String = row.get(6)?;
        let date: String = row.get(7)?;
        let tags_json: String = row.get(8)?;

        // JSON columns are written by this store; fall back to empty on damage
        let attachments = serde_json::from_str(&attachments_json).unwrap_or_default();
        let tags = serde_json::from_str(&tags_json).unwrap_or_default();
        let status = TicketStatus::parse(&status_str).unwrap_or_default();

        Ok(Ticket {
            id,
            ticket_number,
            name,
            link,
            details,
            attachments,
            status,
            date,
            tags,
        })
    }

    fn insert(
        conn: &Connection,
        ticket_number: u32,
        draft: &TicketDraft,
    ) -> Result<Ticket, TicketError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let attachments_json = serde_json::to_string(&draft.attachments)
            .map_err(|e| TicketError::Database(e.to_string()))?;
        let tags_json =
            serde_json::to_string(&draft.tags).map_err(|e| TicketError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO tickets (id, ticket_number, name, link, details, attachments, status, date, tags, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                ticket_number,
                draft.name,
                draft.link,
                draft.details,
                attachments_json,
                draft.status.as_str(),
                draft.date,
                tags_json,
                now,
                now,
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(Ticket::from_draft(id, ticket_number, draft.clone()))
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Ticket>, TicketError> {
        let result = conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_ticket,
        );

        match result {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }
}

#[async_trait]
impl TicketStore for SqliteTicketStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list(&self) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn()?;

        let sql = format!("{} ORDER BY created_at DESC, rowid DESC", SELECT_COLUMNS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_ticket)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut tickets = Vec::new();
        for row_result in rows {
            let ticket = row_result.map_err(|e| TicketError::Database(e.to_string()))?;
            tickets.push(ticket);
        }

        Ok(tickets)
    }

    async fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn()?;
        Self::fetch(&conn, id)
    }

    async fn create(&self, ticket_number: u32, draft: &TicketDraft) -> Result<Ticket, TicketError> {
        let conn = self.conn()?;
        Self::insert(&conn, ticket_number, draft)
    }

    async fn update(&self, id: &str, draft: &TicketDraft) -> Result<Ticket, TicketError> {
        let conn = self.conn()?;

        let attachments_json = serde_json::to_string(&draft.attachments)
            .map_err(|e| TicketError::Database(e.to_string()))?;
        let tags_json =
            serde_json::to_string(&draft.tags).map_err(|e| TicketError::Database(e.to_string()))?;

        let changed = conn
            .execute(
                "UPDATE tickets SET name = ?, link = ?, details = ?, attachments = ?, status = ?, date = ?, tags = ?, updated_at = ? WHERE id = ?",
                params![
                    draft.name,
                    draft.link,
                    draft.details,
                    attachments_json,
                    draft.status.as_str(),
                    draft.date,
                    tags_json,
                    Utc::now().to_rfc3339(),
                    id,
                ],
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(TicketError::NotFound(id.to_string()));
        }

        Self::fetch(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), TicketError> {
        let conn = self.conn()?;

        let deleted = conn
            .execute("DELETE FROM tickets WHERE id = ?", params![id])
            .map_err(|e| TicketError::Database(e.to_string()))?;

        if deleted == 0 {
            return Err(TicketError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, TicketError> {
        let conn = self.conn()?;

        let deleted = conn
            .execute("DELETE FROM tickets", [])
            .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(deleted as u64)
    }

    async fn bulk_create(
        &self,
        start_number: u32,
        drafts: &[TicketDraft],
    ) -> Result<Vec<Ticket>, TicketError> {
        let mut conn = self.conn()?;

        let tx = conn
            .transaction()
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut created = Vec::with_capacity(drafts.len());
        for (offset, draft) in drafts.iter().enumerate() {
            let number = start_number + offset as u32;
            created.push(Self::insert(&tx, number, draft)?);
        }

        tx.commit()
            .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(created)
    }
}
