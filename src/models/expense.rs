//! Expense claim model and its history log.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "expense_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    SentToHr,
    Paid,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::SentToHr => "SENT_TO_HR",
            Self::Paid => "PAID",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseClaim {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub claim_date: NaiveDate,
    pub receipt_url: Option<String>,
    pub status: ExpenseStatus,
    pub reviewed_by: Option<Uuid>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExpense {
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub claim_date: NaiveDate,
    #[validate(url)]
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateExpense {
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub claim_date: Option<NaiveDate>,
    #[validate(url)]
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseHistory {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub from_status: ExpenseStatus,
    pub to_status: ExpenseStatus,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
