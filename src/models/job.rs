//! Job descriptions published for placement work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Open,
    OnHold,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobDescription {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub openings: i32,
    pub status: JobStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJob {
    pub client_id: Option<Uuid>,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub location: Option<String>,
    #[validate(range(min = 1))]
    pub openings: i32,
}

#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateJob {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 1))]
    pub openings: Option<i32>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct JobFilters {
    pub status: Option<JobStatus>,
    pub client_id: Option<Uuid>,
}
