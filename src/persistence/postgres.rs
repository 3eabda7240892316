//! PostgreSQL implementation of the persistence layer.
//!
//! The purchase commit runs in a single transaction: idempotency lookup,
//! a conditional `UPDATE ... WHERE quantity_sold + $2 <= quantity` (which
//! also takes the row lock that serializes purchases per event), and the
//! ticket insert. Any failure rolls the whole unit back.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::models::{InboxRow, ListingRow, TicketRow};
use super::{CommitOutcome, InboxPage, InboxStore, TicketStore};
use crate::config::GatewayConfig;
use crate::domain::{EventId, EventListing, InboxItem, InboxItemId, InboxKind, Ticket, TicketId};
use crate::error::GatewayError;

const TICKET_CODE_CONSTRAINT: &str = "private_event_tickets_ticket_code_key";
const IDEMPOTENCY_CONSTRAINT: &str = "private_event_tickets_idempotency_key_key";
const SHARE_TOKEN_CONSTRAINT: &str = "private_events_share_token_key";

const LISTING_COLUMNS: &str = "id, name, description, event_date, start_time, end_time, \
     address, city, state, country, visibility, is_paid, unit_price, quantity, quantity_sold, \
     share_token, created_at, updated_at";

const TICKET_COLUMNS: &str = "id, event_id, buyer_name, buyer_email, buyer_phone, quantity, \
     price_paid, total_price, payment_reference, transaction_id, status, ticket_code, \
     idempotency_key, created_at";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the gateway configuration and applies pending
    /// migrations from `config.migrations_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the pool cannot be
    /// created or a migration fails.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(db_err)?;

        let migrator = sqlx::migrate::Migrator::new(Path::new(&config.migrations_dir))
            .await
            .map_err(|e| GatewayError::PersistenceError(format!("loading migrations: {e}")))?;
        migrator
            .run(&pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(format!("running migrations: {e}")))?;

        tracing::info!(dir = %config.migrations_dir, "database migrations applied");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TicketStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create_listing(&self, listing: EventListing) -> Result<(), GatewayError> {
        let quantity = to_i32(listing.quantity, "quantity")?;
        let quantity_sold = to_i32(listing.quantity_sold, "quantity_sold")?;
        let result = sqlx::query(
            "INSERT INTO private_events (id, name, description, event_date, start_time, end_time, \
             address, city, state, country, visibility, is_paid, unit_price, quantity, quantity_sold, \
             share_token, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(listing.id.as_uuid())
        .bind(&listing.name)
        .bind(&listing.description)
        .bind(listing.schedule.date)
        .bind(listing.schedule.start_time)
        .bind(listing.schedule.end_time)
        .bind(&listing.location.address)
        .bind(&listing.location.city)
        .bind(&listing.location.state)
        .bind(&listing.location.country)
        .bind(listing.visibility.as_str())
        .bind(listing.is_paid)
        .bind(listing.unit_price)
        .bind(quantity)
        .bind(quantity_sold)
        .bind(&listing.share_token)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if violates(&e, SHARE_TOKEN_CONSTRAINT) => Err(GatewayError::InvalidRequest(
                "share token already in use".to_string(),
            )),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn get_listing(&self, id: EventId) -> Result<Option<EventListing>, GatewayError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM private_events WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(EventListing::try_from).transpose()
    }

    async fn find_listing_by_share_token(
        &self,
        token: &str,
    ) -> Result<Option<EventListing>, GatewayError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM private_events WHERE share_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(EventListing::try_from).transpose()
    }

    async fn commit_purchase(&self, ticket: Ticket) -> Result<CommitOutcome, GatewayError> {
        let event_id = *ticket.event_id.as_uuid();
        let quantity = to_i32(ticket.quantity, "quantity")?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        if let Some(key) = ticket.idempotency_key.as_deref()
            && let Some(existing) = ticket_by_key(&mut tx, key).await?
        {
            let tickets_remaining = remaining(&mut tx, *existing.event_id.as_uuid())
                .await?
                .unwrap_or(0);
            tx.commit().await.map_err(db_err)?;
            return Ok(CommitOutcome::Replayed {
                ticket: existing,
                tickets_remaining,
            });
        }

        let updated: Option<(i32, i32)> = sqlx::query_as(
            "UPDATE private_events \
             SET quantity_sold = quantity_sold + $2, updated_at = NOW() \
             WHERE id = $1 AND quantity_sold + $2 <= quantity \
             RETURNING quantity, quantity_sold",
        )
        .bind(event_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let Some((total, sold)) = updated else {
            // The UPDATE waited on any concurrent holder of the row lock, so a
            // same-key purchase that took the last units is visible now.
            if let Some(key) = ticket.idempotency_key.as_deref()
                && let Some(existing) = ticket_by_key(&mut tx, key).await?
            {
                let tickets_remaining = remaining(&mut tx, event_id).await?.unwrap_or(0);
                tx.commit().await.map_err(db_err)?;
                return Ok(CommitOutcome::Replayed {
                    ticket: existing,
                    tickets_remaining,
                });
            }
            let available = remaining(&mut tx, event_id).await?;
            let _ = tx.rollback().await;
            return Err(match available {
                Some(available) => GatewayError::InsufficientTickets { available },
                None => GatewayError::EventNotFound(event_id),
            });
        };

        let inserted = sqlx::query(&format!(
            "INSERT INTO private_event_tickets ({TICKET_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(ticket.id.as_uuid())
        .bind(event_id)
        .bind(&ticket.buyer.name)
        .bind(&ticket.buyer.email)
        .bind(&ticket.buyer.phone)
        .bind(quantity)
        .bind(ticket.price_paid)
        .bind(ticket.total_price)
        .bind(&ticket.payment_reference)
        .bind(ticket.transaction_id.as_deref())
        .bind(ticket.status.as_str())
        .bind(ticket.ticket_code.as_str())
        .bind(ticket.idempotency_key.as_deref())
        .bind(ticket.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            let _ = tx.rollback().await;
            if violates(&e, TICKET_CODE_CONSTRAINT) {
                return Ok(CommitOutcome::CodeCollision);
            }
            if violates(&e, IDEMPOTENCY_CONSTRAINT)
                && let Some(key) = ticket.idempotency_key.as_deref()
            {
                // A concurrent request with the same key committed first.
                let mut conn = self.pool.acquire().await.map_err(db_err)?;
                let existing = ticket_by_key(&mut conn, key).await?.ok_or_else(|| {
                    GatewayError::Internal(format!("idempotency conflict without ticket: {key}"))
                })?;
                let tickets_remaining = remaining(&mut conn, event_id).await?.unwrap_or(0);
                return Ok(CommitOutcome::Replayed {
                    ticket: existing,
                    tickets_remaining,
                });
            }
            return Err(db_err(e));
        }

        tx.commit().await.map_err(db_err)?;

        let tickets_remaining = u32::try_from(total.saturating_sub(sold)).unwrap_or(0);
        Ok(CommitOutcome::Issued {
            ticket,
            tickets_remaining,
        })
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, GatewayError> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM private_event_tickets WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Ticket::try_from).transpose()
    }

    async fn list_tickets(&self, event_id: EventId) -> Result<Vec<Ticket>, GatewayError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM private_event_tickets \
             WHERE event_id = $1 ORDER BY created_at ASC"
        ))
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Ticket::try_from).collect()
    }
}

#[async_trait]
impl InboxStore for PostgresStore {
    async fn insert_item(&self, item: InboxItem) -> Result<(), GatewayError> {
        sqlx::query(&format!(
            "INSERT INTO {} (id, name, email, subject, message, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            item.kind.table()
        ))
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.email)
        .bind(&item.subject)
        .bind(&item.message)
        .bind(&item.status)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_items(
        &self,
        kind: InboxKind,
        status: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<InboxPage, GatewayError> {
        let table = kind.table();
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE ($1::text IS NULL OR status = $1)"
        ))
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        let rows = sqlx::query_as::<_, InboxRow>(&format!(
            "SELECT id, name, email, subject, message, status, created_at, updated_at \
             FROM {table} WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(InboxPage {
            items: rows.into_iter().map(|r| r.into_item(kind)).collect(),
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn update_status(
        &self,
        kind: InboxKind,
        id: InboxItemId,
        status: &str,
    ) -> Result<Option<InboxItem>, GatewayError> {
        let row = sqlx::query_as::<_, InboxRow>(&format!(
            "UPDATE {} SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING id, name, email, subject, message, status, created_at, updated_at",
            kind.table()
        ))
        .bind(id.as_uuid())
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(|r| r.into_item(kind)))
    }
}

/// Looks up a ticket by its scoped idempotency key.
async fn ticket_by_key(
    conn: &mut PgConnection,
    key: &str,
) -> Result<Option<Ticket>, GatewayError> {
    let row = sqlx::query_as::<_, TicketRow>(&format!(
        "SELECT {TICKET_COLUMNS} FROM private_event_tickets WHERE idempotency_key = $1"
    ))
    .bind(key)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_err)?;
    row.map(Ticket::try_from).transpose()
}

/// Units left for an event, or `None` if the event does not exist.
async fn remaining(conn: &mut PgConnection, event_id: Uuid) -> Result<Option<u32>, GatewayError> {
    let row: Option<(i32, i32)> =
        sqlx::query_as("SELECT quantity, quantity_sold FROM private_events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?;
    Ok(row.map(|(total, sold)| u32::try_from(total.saturating_sub(sold)).unwrap_or(0)))
}

fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}

fn to_i32(value: u32, field: &str) -> Result<i32, GatewayError> {
    i32::try_from(value)
        .map_err(|_| GatewayError::InvalidRequest(format!("{field} too large: {value}")))
}

fn db_err(e: sqlx::Error) -> GatewayError {
    GatewayError::PersistenceError(e.to_string())
}
