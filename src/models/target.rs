//! Monthly numeric goals assigned by a superior.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Target {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: NaiveDate,
    pub visits_per_day: Option<i32>,
    pub onboards_per_month: Option<i32>,
    pub calls_per_day: Option<i32>,
    pub set_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetTarget {
    pub user_id: Uuid,
    /// Any day inside the target month.
    pub month: NaiveDate,
    #[validate(range(min = 0))]
    pub visits_per_day: Option<i32>,
    #[validate(range(min = 0))]
    pub onboards_per_month: Option<i32>,
    #[validate(range(min = 0))]
    pub calls_per_day: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetQuery {
    pub month: Option<NaiveDate>,
    pub user_id: Option<Uuid>,
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
