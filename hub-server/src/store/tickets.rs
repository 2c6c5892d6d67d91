//! Support ticket storage

use chrono::{DateTime, Utc};
use hub_common::models::{Ticket, TicketStatus};
use hub_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: String,
    affiliate_id: String,
    affiliate_handle: String,
    subject: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_model(self) -> Result<Ticket> {
        Ok(Ticket {
            id: self.id,
            affiliate_id: self.affiliate_id,
            affiliate_handle: self.affiliate_handle,
            subject: self.subject,
            status: TicketStatus::parse(&self.status)?,
            created_at: self.created_at,
        })
    }
}

const SELECT_TICKET: &str =
    "SELECT id, affiliate_id, affiliate_handle, subject, status, created_at FROM tickets";

/// Fetch one ticket by id
pub async fn get_ticket(pool: &SqlitePool, id: &str) -> Result<Ticket> {
    let row: Option<TicketRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_TICKET))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.ok_or_else(|| Error::NotFound(format!("ticket {}", id)))?
        .into_model()
}

/// Create a ticket (starts Pending)
pub async fn create_ticket(
    pool: &SqlitePool,
    affiliate_id: &str,
    affiliate_handle: &str,
    subject: &str,
) -> Result<Ticket> {
    if subject.trim().is_empty() {
        return Err(Error::Validation("ticket subject must not be empty".to_string()));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO tickets (id, affiliate_id, affiliate_handle, subject, status, created_at) \
         VALUES (?, ?, ?, ?, 'Pending', ?)",
    )
    .bind(&id)
    .bind(affiliate_id)
    .bind(affiliate_handle)
    .bind(subject.trim())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_ticket(pool, &id).await
}

/// Fetch tickets newest first, optionally scoped to one affiliate
pub async fn list_tickets(pool: &SqlitePool, affiliate_id: Option<&str>) -> Result<Vec<Ticket>> {
    let rows: Vec<TicketRow> = match affiliate_id {
        Some(aid) => {
            sqlx::query_as(&format!(
                "{} WHERE affiliate_id = ? ORDER BY created_at DESC, id ASC",
                SELECT_TICKET
            ))
            .bind(aid)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!("{} ORDER BY created_at DESC, id ASC", SELECT_TICKET))
                .fetch_all(pool)
                .await?
        }
    };

    rows.into_iter().map(TicketRow::into_model).collect()
}

/// Set a ticket's status (admin queue management; any state may be set)
pub async fn set_ticket_status(
    pool: &SqlitePool,
    id: &str,
    status: TicketStatus,
) -> Result<Ticket> {
    let result = sqlx::query("UPDATE tickets SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("ticket {}", id)));
    }

    get_ticket(pool, id).await
}
