use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{InvoiceChanges, NewInvoice};

/// Persistence seam for invoice mutations. Each call issues a single statement.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert one row and return its identifier
    async fn insert(&self, invoice: &NewInvoice) -> Result<String, DatabaseError>;

    /// Replace customer, amount and status of the matching row; returns rows affected
    async fn update(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError>;

    /// Remove the matching row; returns rows affected
    async fn delete(&self, id: &str) -> Result<u64, DatabaseError>;

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// PostgreSQL store over the `invoices` table:
///
/// ```sql
/// CREATE TABLE invoices (
///     id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
///     customer_id UUID NOT NULL REFERENCES customers(id),
///     amount INT NOT NULL,
///     status VARCHAR(255) NOT NULL,
///     date DATE NOT NULL
/// );
/// ```
#[derive(Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Customer references are opaque to callers but stored as UUIDs;
    /// anything else can never satisfy the foreign key.
    fn customer_uuid(customer_id: &str) -> Result<Uuid, DatabaseError> {
        Uuid::parse_str(customer_id)
            .map_err(|_| DatabaseError::ConstraintViolation(format!("customer '{}' does not exist", customer_id)))
    }

    fn map_sqlx(err: sqlx::Error) -> DatabaseError {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() || db.is_check_violation() => {
                DatabaseError::ConstraintViolation(db.message().to_string())
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn insert(&self, invoice: &NewInvoice) -> Result<String, DatabaseError> {
        let customer_id = Self::customer_uuid(&invoice.customer_id)?;

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_sqlx)?;

        Ok(id.to_string())
    }

    async fn update(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError> {
        // A malformed identifier cannot match any row
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };
        let customer_id = Self::customer_uuid(&changes.customer_id)?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $1, amount = $2, status = $3
            WHERE id = $4
            "#,
        )
        .bind(customer_id)
        .bind(changes.amount)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Self::map_sqlx)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str) -> Result<u64, DatabaseError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Self::map_sqlx)?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
