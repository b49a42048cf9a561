//! Declared data schema
//!
//! Mirrors the declarative schema contract of the service: two record types
//! (Invoice, Expense), each protected by an owner-only authorization rule,
//! with user-session identity as the default authorization mode. The store
//! and HTTP surface derive their behavior from these declarations rather
//! than hard-coding per-model rules.

pub mod expense;
pub mod invoice;

pub use expense::{Expense, ExpenseDraft};
pub use invoice::{Invoice, InvoiceDraft};

use crate::core::Record;
use serde::{Deserialize, Serialize};

/// Authorization rule attached to a declared model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthRule {
    /// Only the identity that created a record may read or write it
    Owner,
}

/// Descriptor for a declared model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Singular record type name (e.g. "invoice")
    pub record_type: String,
    /// Plural resource name used in URLs (e.g. "invoices")
    pub resource_name: String,
    /// Authorization rule for the model
    pub auth_rule: AuthRule,
}

impl ModelDescriptor {
    fn of<T: Record>(auth_rule: AuthRule) -> Self {
        Self {
            record_type: T::record_type().to_string(),
            resource_name: T::resource_name().to_string(),
            auth_rule,
        }
    }
}

/// The complete declared schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub models: Vec<ModelDescriptor>,
}

impl Schema {
    /// The schema as declared for this service
    ///
    /// Expense is declared for completeness of the data layer; no application
    /// logic references it.
    pub fn declared() -> Self {
        Self {
            models: vec![
                ModelDescriptor::of::<Expense>(AuthRule::Owner),
                ModelDescriptor::of::<Invoice>(AuthRule::Owner),
            ],
        }
    }

    /// Look up a declared model by record type name
    pub fn model(&self, record_type: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.record_type == record_type)
    }
}
