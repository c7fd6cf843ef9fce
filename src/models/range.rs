//! Date-range and scope query parameters shared by the dashboard endpoints.

use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;

/// `?from_date=&to_date=&agent_id=` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub agent_id: Option<Uuid>,
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Resolve the query against `today`: missing bounds default to the
    /// current month to date.
    pub fn resolve(query: &RangeQuery, today: NaiveDate) -> Result<Self, AppError> {
        let to = query.to_date.unwrap_or(today);
        let from = query
            .from_date
            .unwrap_or_else(|| to.with_day(1).unwrap_or(to));
        if from > to {
            return Err(AppError::Validation(
                "from_date must not be after to_date".to_string(),
            ));
        }
        Ok(Self { from, to })
    }

    pub fn from_query(query: &RangeQuery) -> Result<Self, AppError> {
        Self::resolve(query, Utc::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}
