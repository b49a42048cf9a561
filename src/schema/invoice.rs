//! Invoice model and its validated mutation payload
//!
//! Wire field names are camelCase to match the declared schema contract
//! (`customerName`, `invoiceTotal`, ...). Dates are ISO-8601 calendar dates.

use crate::core::error::{AppResult, ValidationFailure};
use crate::core::record::Record;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An invoice record
///
/// `id`, `owner_id` and the timestamps are assigned by the store; everything
/// else comes from a validated [`InvoiceDraft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub customer_name: String,
    pub customer_address: String,
    pub date: NaiveDate,
    pub invoice_no: String,
    pub description: String,
    pub invoice_total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Build a new invoice from a draft, assigning identity and timestamps
    pub fn from_draft(owner_id: Uuid, draft: InvoiceDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            customer_name: draft.customer_name,
            customer_address: draft.customer_address,
            date: draft.date,
            invoice_no: draft.invoice_no,
            description: draft.description,
            invoice_total: draft.invoice_total,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a draft to an existing invoice, bumping `updated_at`
    ///
    /// Identity, ownership and `created_at` are preserved.
    pub fn apply_draft(&mut self, draft: InvoiceDraft) {
        self.customer_name = draft.customer_name;
        self.customer_address = draft.customer_address;
        self.date = draft.date;
        self.invoice_no = draft.invoice_no;
        self.description = draft.description;
        self.invoice_total = draft.invoice_total;
        self.updated_at = Utc::now();
    }
}

impl Record for Invoice {
    fn record_type() -> &'static str {
        "invoice"
    }

    fn resource_name() -> &'static str {
        "invoices"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// The validated mutation payload for creating or updating an invoice
///
/// Every field is mandatory. `invoice_no` is not checked for uniqueness, to
/// match the declared schema (it is plain text, not a key).
#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,

    #[validate(length(min = 1, message = "customer address is required"))]
    pub customer_address: String,

    pub date: NaiveDate,

    #[validate(length(min = 1, message = "invoice number is required"))]
    pub invoice_no: String,

    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,

    #[validate(range(min = 0.0, message = "invoice total must be zero or positive"))]
    pub invoice_total: f64,
}

impl InvoiceDraft {
    /// Run all validation rules
    ///
    /// `range` already rejects NaN (NaN compares false against the bound);
    /// the explicit finiteness check additionally rejects infinities so that
    /// no non-finite total ever reaches the store.
    pub fn check(&self) -> AppResult<()> {
        if !self.invoice_total.is_finite() {
            return Err(ValidationFailure::InvalidNumber {
                field: "invoice_total".to_string(),
                value: self.invoice_total.to_string(),
            }
            .into());
        }
        self.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> InvoiceDraft {
        InvoiceDraft {
            customer_name: "Acme".to_string(),
            customer_address: "1 Main St".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            invoice_no: "INV-001".to_string(),
            description: "Consulting".to_string(),
            invoice_total: 250.0,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(draft().check().is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut d = draft();
        d.customer_name = String::new();
        assert!(d.check().is_err());

        let mut d = draft();
        d.invoice_no = String::new();
        assert!(d.check().is_err());

        let mut d = draft();
        d.description = String::new();
        assert!(d.check().is_err());
    }

    #[test]
    fn test_nan_total_rejected() {
        let mut d = draft();
        d.invoice_total = f64::NAN;
        assert!(d.check().is_err());
    }

    #[test]
    fn test_infinite_total_rejected() {
        let mut d = draft();
        d.invoice_total = f64::INFINITY;
        assert!(d.check().is_err());
    }

    #[test]
    fn test_negative_total_rejected() {
        let mut d = draft();
        d.invoice_total = -1.0;
        assert!(d.check().is_err());
    }

    #[test]
    fn test_from_draft_assigns_identity() {
        let owner = Uuid::new_v4();
        let invoice = Invoice::from_draft(owner, draft());

        assert!(!invoice.id.is_nil());
        assert_eq!(invoice.owner_id, owner);
        assert_eq!(invoice.customer_name, "Acme");
        assert_eq!(invoice.invoice_total, 250.0);
        assert_eq!(invoice.created_at, invoice.updated_at);
    }

    #[test]
    fn test_apply_draft_preserves_identity() {
        let owner = Uuid::new_v4();
        let mut invoice = Invoice::from_draft(owner, draft());
        let id = invoice.id;
        let created = invoice.created_at;

        let mut updated = draft();
        updated.invoice_total = 300.0;
        updated.description = "Consulting (revised)".to_string();
        invoice.apply_draft(updated);

        assert_eq!(invoice.id, id);
        assert_eq!(invoice.owner_id, owner);
        assert_eq!(invoice.created_at, created);
        assert_eq!(invoice.invoice_total, 300.0);
        assert!(invoice.updated_at >= created);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let invoice = Invoice::from_draft(Uuid::new_v4(), draft());
        let json = serde_json::to_value(&invoice).unwrap();

        assert!(json.get("customerName").is_some());
        assert!(json.get("customerAddress").is_some());
        assert!(json.get("invoiceNo").is_some());
        assert!(json.get("invoiceTotal").is_some());
        assert!(json.get("customer_name").is_none());
    }

    #[test]
    fn test_date_round_trips_as_iso8601() {
        let json = serde_json::to_value(draft()).unwrap();
        assert_eq!(json["date"], "2024-01-01");
    }
}
