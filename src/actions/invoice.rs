// actions/invoice.rs - Invoice form actions
//
// validate -> single statement -> revalidate listing -> navigate.
// All three actions share one error contract: failures are logged and
// returned to the caller, never followed by revalidation or navigation.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::cache::PathRevalidator;
use crate::config::InvoiceConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{InvoiceChanges, NewInvoice};
use crate::database::repository::InvoiceStore;
use crate::error::ActionError;
use crate::types::Operation;
use crate::validation::{validate, InvoiceForm};

pub const CREATE_INVALID: &str = "Missing fields, Failed to create invoice";
pub const UPDATE_INVALID: &str = "Invalid form data.";

/// What the caller should do after a successful action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Navigate to the given path
    Redirect(String),
    /// Cached views were refreshed; stay on the current page
    Revalidated,
}

pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    revalidator: Arc<dyn PathRevalidator>,
    settings: InvoiceConfig,
    today: fn() -> NaiveDate,
}

impl InvoiceActions {
    pub fn new(
        store: Arc<dyn InvoiceStore>,
        revalidator: Arc<dyn PathRevalidator>,
        settings: InvoiceConfig,
    ) -> Self {
        Self {
            store,
            revalidator,
            settings,
            today: utc_today,
        }
    }

    /// Override the issue-date source
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn store(&self) -> &Arc<dyn InvoiceStore> {
        &self.store
    }

    /// Create an invoice issued today
    pub async fn create_invoice(&self, form: &InvoiceForm) -> Result<ActionOutcome, ActionError> {
        let valid = validate(form).map_err(|errors| {
            debug!("Create invoice rejected: {:?}", errors);
            ActionError::validation(errors, CREATE_INVALID)
        })?;

        let amount = valid.amount_in_cents();
        let invoice = NewInvoice {
            customer_id: valid.customer_id,
            amount,
            status: valid.status,
            date: (self.today)(),
        };

        let id = self
            .store
            .insert(&invoice)
            .await
            .map_err(|e| self.persistence_failure(Operation::Create, e))?;

        info!(
            "Created invoice {} for customer {} ({} cents, {})",
            id, invoice.customer_id, invoice.amount, invoice.status
        );
        Ok(self.refresh_and_navigate().await)
    }

    /// Replace customer, amount and status of an existing invoice
    pub async fn update_invoice(&self, id: &str, form: &InvoiceForm) -> Result<ActionOutcome, ActionError> {
        let valid = validate(form).map_err(|errors| {
            debug!("Update of invoice {} rejected: {:?}", id, errors);
            ActionError::validation(errors, UPDATE_INVALID)
        })?;

        let amount = valid.amount_in_cents();
        let changes = InvoiceChanges {
            customer_id: valid.customer_id,
            amount,
            status: valid.status,
        };

        let updated = self
            .store
            .update(id, &changes)
            .await
            .map_err(|e| self.persistence_failure(Operation::Update, e))?;

        if updated == 0 {
            warn!("Update of invoice {} matched no rows", id);
            return Err(ActionError::NotFound);
        }

        info!("Updated invoice {}", id);
        Ok(self.refresh_and_navigate().await)
    }

    /// Delete an invoice when deletion is enabled; the caller stays on the listing
    pub async fn delete_invoice(&self, id: &str) -> Result<ActionOutcome, ActionError> {
        if !self.settings.delete_enabled {
            warn!("Rejected delete of invoice {}: deletion is disabled", id);
            return Err(ActionError::DeleteDisabled);
        }

        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| self.persistence_failure(Operation::Delete, e))?;

        if deleted == 0 {
            warn!("Delete of invoice {} matched no rows", id);
            return Err(ActionError::NotFound);
        }

        info!("Deleted invoice {}", id);
        self.revalidator.revalidate(&self.settings.listing_path).await;
        Ok(ActionOutcome::Revalidated)
    }

    async fn refresh_and_navigate(&self) -> ActionOutcome {
        self.revalidator.revalidate(&self.settings.listing_path).await;
        ActionOutcome::Redirect(self.settings.listing_path.clone())
    }

    fn persistence_failure(&self, operation: Operation, err: DatabaseError) -> ActionError {
        error!("Database error during invoice {}: {}", operation, err);
        ActionError::persistence(operation, err)
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}
