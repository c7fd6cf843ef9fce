//! Append-only interaction logs for corporate leads and domestic clients.
//!
//! The current state of a lead or client is never stored; it is the latest
//! interaction row, resolved through [`crate::services::latest`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::not_blank;
use crate::services::latest::Timeline;

/// Row of `corporate_leads_interaction`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CorporateInteraction {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub leadgen_id: Uuid,
    pub contact_date: Option<NaiveDate>,
    pub contact_person: Option<String>,
    pub status: String,
    pub sub_status: Option<String>,
    pub franchise_status: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Timeline for CorporateInteraction {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.lead_id
    }
    fn id(&self) -> Uuid {
        self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn contact_date(&self) -> Option<NaiveDate> {
        self.contact_date
    }
}

/// Row of `domestic_clients_interaction`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DomesticInteraction {
    pub id: Uuid,
    pub client_id: Uuid,
    pub fse_id: Uuid,
    pub contact_date: Option<NaiveDate>,
    pub contact_person: Option<String>,
    pub status: String,
    pub sub_status: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Timeline for DomesticInteraction {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.client_id
    }
    fn id(&self) -> Uuid {
        self.id
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn contact_date(&self) -> Option<NaiveDate> {
        self.contact_date
    }
}

/// Body for appending a call or visit outcome.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInteraction {
    pub contact_date: Option<NaiveDate>,
    pub contact_person: Option<String>,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub status: String,
    pub sub_status: Option<String>,
    /// Only meaningful for corporate leads; ignored on domestic clients.
    pub franchise_status: Option<String>,
    pub remarks: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_status_is_rejected() {
        let input: CreateInteraction = serde_json::from_value(json!({ "status": "   " })).unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("status"));

        let input: CreateInteraction =
            serde_json::from_value(json!({ "status": " Picked " })).unwrap();
        assert!(input.validate().is_ok());
    }
}
