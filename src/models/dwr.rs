//! Daily work report rows (`dwr_history`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub report_date: NaiveDate,
    pub summary: String,
    pub calls_made: i32,
    pub visits_made: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitReport {
    pub report_date: NaiveDate,
    #[validate(length(min = 1, max = 5000))]
    pub summary: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub calls_made: i32,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub visits_made: i32,
}
