// validation/mod.rs - Invoice form schema
//
// Untrusted form values are coerced into a typed record, or every failing
// field is reported with its messages. There is no partial success.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::database::models::InvoiceStatus;

pub const CUSTOMER_REQUIRED: &str = "Please select a customer.";
pub const AMOUNT_POSITIVE: &str = "Amount must be greater than 0.";
pub const AMOUNT_TOO_LARGE: &str = "Amount is too large.";
pub const STATUS_REQUIRED: &str = "Please select a status.";

/// Raw form submission. Field names follow the form contract (`customerId`, `amount`, `status`);
/// `id` and `date` are server-assigned and never read from the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceForm {
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
    pub amount: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    CustomerId,
    Amount,
    Status,
}

/// Messages per invalid field, in the order they were produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: FormField, message: impl Into<String>) {
        self.slot_mut(field).get_or_insert_with(Vec::new).push(message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&[String]> {
        match field {
            FormField::CustomerId => self.customer_id.as_deref(),
            FormField::Amount => self.amount.as_deref(),
            FormField::Status => self.status.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none() && self.amount.is_none() && self.status.is_none()
    }

    fn slot_mut(&mut self, field: FormField) -> &mut Option<Vec<String>> {
        match field {
            FormField::CustomerId => &mut self.customer_id,
            FormField::Amount => &mut self.amount,
            FormField::Status => &mut self.status,
        }
    }
}

/// State handed back to the form after a failed action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub message: Option<String>,
}

impl FormState {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: None,
            message: Some(message.into()),
        }
    }

    pub fn invalid(errors: FieldErrors, message: impl Into<String>) -> Self {
        Self {
            errors: Some(errors),
            message: Some(message.into()),
        }
    }
}

/// A form that passed validation. `amount` is in major units as entered.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
    pub customer_id: String,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    amount_in_cents: i32,
}

impl ValidatedInvoice {
    /// Amount in minor units, rounded half away from zero
    pub fn amount_in_cents(&self) -> i32 {
        self.amount_in_cents
    }
}

/// Validate and coerce a submitted invoice form
pub fn validate(form: &InvoiceForm) -> Result<ValidatedInvoice, FieldErrors> {
    let mut errors = FieldErrors::default();

    let customer_id = match form.customer_id.as_deref() {
        Some(id) if !id.trim().is_empty() => Some(id.to_string()),
        _ => {
            errors.add(FormField::CustomerId, CUSTOMER_REQUIRED);
            None
        }
    };

    let amount = parse_amount(form.amount.as_deref())
        .map_err(|msg| errors.add(FormField::Amount, msg))
        .ok();

    let status = parse_status(form.status.as_deref())
        .map_err(|msg| errors.add(FormField::Status, msg))
        .ok();

    match (customer_id, amount, status) {
        (Some(customer_id), Some((amount, amount_in_cents)), Some(status)) => Ok(ValidatedInvoice {
            customer_id,
            amount,
            status,
            amount_in_cents,
        }),
        _ => Err(errors),
    }
}

/// Parse a major-unit amount and derive its minor-unit value
fn parse_amount(raw: Option<&str>) -> Result<(Decimal, i32), &'static str> {
    let raw = raw.map(str::trim).unwrap_or_default();
    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| unparsed_amount(raw))?;

    if amount <= Decimal::ZERO {
        return Err(AMOUNT_POSITIVE);
    }

    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(AMOUNT_TOO_LARGE)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    // Fractions of a cent that round away entirely are not a positive amount
    if cents.is_zero() {
        return Err(AMOUNT_POSITIVE);
    }

    let cents = cents.to_i32().ok_or(AMOUNT_TOO_LARGE)?;
    Ok((amount, cents))
}

/// Message for input `Decimal` cannot hold: a positive number past its range
/// is too large, anything else is not a positive amount.
fn unparsed_amount(raw: &str) -> &'static str {
    let numeric = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    match raw.parse::<f64>() {
        Ok(value) if numeric && value > 0.0 => AMOUNT_TOO_LARGE,
        _ => AMOUNT_POSITIVE,
    }
}

fn parse_status(raw: Option<&str>) -> Result<InvoiceStatus, String> {
    match raw {
        None => Err(STATUS_REQUIRED.to_string()),
        Some(s) if s.trim().is_empty() => Err(STATUS_REQUIRED.to_string()),
        Some(s) => s.parse().map_err(|received: String| {
            let expected: Vec<String> = InvoiceStatus::ALL
                .iter()
                .map(|status| format!("'{}'", status))
                .collect();
            format!(
                "Invalid enum value. Expected {}, received '{}'",
                expected.join(" | "),
                received
            )
        }),
    }
}
