//! Expense model
//!
//! Declared by the schema but not wired to any route or application logic.

use crate::core::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Build a new expense from a draft, assigning identity and timestamps
    pub fn from_draft(owner_id: Uuid, draft: ExpenseDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: draft.name,
            amount: draft.amount,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for Expense {
    fn record_type() -> &'static str {
        "expense"
    }

    fn resource_name() -> &'static str {
        "expenses"
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

/// Mutation payload for an expense
#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "amount must be zero or positive"))]
    pub amount: f64,
}
