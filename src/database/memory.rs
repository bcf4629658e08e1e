use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Invoice, InvoiceChanges, NewInvoice};
use crate::database::repository::InvoiceStore;

/// In-process invoice store for tests and local demos.
///
/// Mirrors the relational store's behavior: identifiers are assigned on insert,
/// the customer reference must exist, and an unavailable store fails every call.
#[derive(Default)]
pub struct MemoryInvoiceStore {
    invoices: RwLock<HashMap<String, Invoice>>,
    customers: RwLock<HashSet<String>>,
    unavailable: AtomicBool,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that knows the given customers
    pub fn with_customers<I, S>(customers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            customers: RwLock::new(customers.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Simulate losing (or regaining) the connection
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Seed a row directly, bypassing the customer check
    pub async fn seed(&self, invoice: Invoice) {
        self.invoices.write().await.insert(invoice.id.clone(), invoice);
    }

    pub async fn get(&self, id: &str) -> Option<Invoice> {
        self.invoices.read().await.get(id).cloned()
    }

    pub async fn all(&self) -> Vec<Invoice> {
        self.invoices.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.invoices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    async fn check_customer(&self, customer_id: &str) -> Result<(), DatabaseError> {
        if self.customers.read().await.contains(customer_id) {
            Ok(())
        } else {
            Err(DatabaseError::ConstraintViolation(format!(
                "customer '{}' does not exist",
                customer_id
            )))
        }
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn insert(&self, invoice: &NewInvoice) -> Result<String, DatabaseError> {
        self.check_available()?;
        self.check_customer(&invoice.customer_id).await?;

        let id = Uuid::new_v4().to_string();
        let row = Invoice {
            id: id.clone(),
            customer_id: invoice.customer_id.clone(),
            amount: invoice.amount,
            status: invoice.status,
            date: invoice.date,
        };
        self.invoices.write().await.insert(id.clone(), row);
        Ok(id)
    }

    async fn update(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, DatabaseError> {
        self.check_available()?;

        // An UPDATE that matches no row never evaluates the foreign key
        let mut invoices = self.invoices.write().await;
        let Some(row) = invoices.get_mut(id) else {
            return Ok(0);
        };
        self.check_customer(&changes.customer_id).await?;

        row.customer_id = changes.customer_id.clone();
        row.amount = changes.amount;
        row.status = changes.status;
        Ok(1)
    }

    async fn delete(&self, id: &str) -> Result<u64, DatabaseError> {
        self.check_available()?;
        Ok(self.invoices.write().await.remove(id).map_or(0, |_| 1))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check_available()
    }
}
