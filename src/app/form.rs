//! Form controller: create-or-update chosen by an explicit edit mode
//!
//! The edit state is a tagged variant, not a nullable reference: an update
//! can only be issued while the controller is in `Editing`, which carries the
//! record being edited. A successful submit in either mode resets the fields
//! and returns the controller to `Create`; a failed submit keeps both so the
//! user can correct and retry.

use crate::client::DataClient;
use crate::core::error::{AppResult, ValidationFailure};
use crate::schema::invoice::{Invoice, InvoiceDraft};
use chrono::NaiveDate;

/// The six form fields, as raw submitted text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub customer_name: String,
    pub customer_address: String,
    pub date: String,
    pub invoice_no: String,
    pub description: String,
    pub invoice_total: String,
}

impl FormFields {
    /// Pre-populate the fields from an existing record
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            customer_name: invoice.customer_name.clone(),
            customer_address: invoice.customer_address.clone(),
            date: invoice.date.to_string(),
            invoice_no: invoice.invoice_no.clone(),
            description: invoice.description.clone(),
            invoice_total: invoice.invoice_total.to_string(),
        }
    }

    /// Coerce the raw fields into a draft
    ///
    /// Empty or non-numeric totals are rejected here instead of being sent
    /// to the store as NaN.
    pub fn parse(&self) -> AppResult<InvoiceDraft> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            ValidationFailure::FieldError {
                field: "date".to_string(),
                message: format!("'{}' is not an ISO-8601 calendar date", self.date),
            }
        })?;

        let invoice_total = self
            .invoice_total
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationFailure::InvalidNumber {
                field: "invoice_total".to_string(),
                value: self.invoice_total.clone(),
            })?;

        Ok(InvoiceDraft {
            customer_name: self.customer_name.trim().to_string(),
            customer_address: self.customer_address.trim().to_string(),
            date,
            invoice_no: self.invoice_no.trim().to_string(),
            description: self.description.trim().to_string(),
            invoice_total,
        })
    }
}

/// The form's mode: creating a new record, or editing exactly one
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Editing(Invoice),
}

/// What a successful submit did
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Invoice),
    Updated(Invoice),
}

/// Translates submitted fields into create or update requests
pub struct FormController {
    client: DataClient,
    fields: FormFields,
    mode: FormMode,
}

impl FormController {
    pub fn new(client: DataClient) -> Self {
        Self {
            client,
            fields: FormFields::default(),
            mode: FormMode::Create,
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FormFields {
        &mut self.fields
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Load a record into the form for editing
    pub fn begin_edit(&mut self, invoice: Invoice) {
        self.fields = FormFields::from_invoice(&invoice);
        self.mode = FormMode::Editing(invoice);
    }

    /// Leave edit mode without issuing any request
    pub fn cancel_edit(&mut self) {
        self.fields = FormFields::default();
        self.mode = FormMode::Create;
    }

    /// Submit the form
    ///
    /// In `Create` mode this issues a create; in `Editing` mode an update
    /// keyed by the edit target's id. On success the fields are cleared and
    /// the mode returns to `Create`; on failure both are kept for retry.
    pub async fn submit(&mut self) -> AppResult<SubmitOutcome> {
        let draft = self.fields.parse()?;

        let outcome = match &self.mode {
            FormMode::Create => {
                let created = self.client.create_invoice(draft).await?;
                SubmitOutcome::Created(created)
            }
            FormMode::Editing(target) => {
                let updated = self.client.update_invoice(target.id, draft).await?;
                SubmitOutcome::Updated(updated)
            }
        };

        self.fields = FormFields::default();
        self.mode = FormMode::Create;
        Ok(outcome)
    }
}
