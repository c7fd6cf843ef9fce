//! Corporate leads (LeadGen pipeline) and domestic clients (FSE pipeline).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::not_blank;

/// Classify a loosely-typed startup marker.
///
/// `true`, `1`, and the strings `"yes"`, `"1"`, `"true"` (trimmed,
/// case-insensitive) are startups. Everything else is not.
pub fn is_startup_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_i64() == Some(1),
        serde_json::Value::String(s) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "1" | "true")
        }
        _ => false,
    }
}

/// Serde adapter normalizing any startup representation to a bool on write.
pub fn deserialize_startup<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().is_some_and(is_startup_value))
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CorporateLead {
    pub id: Uuid,
    pub leadgen_id: Uuid,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_startup: bool,
    pub sourcing_date: NaiveDate,
    pub lock_date: Option<NaiveDate>,
    pub projection: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCorporateLead {
    #[validate(length(max = 300), custom(function = "not_blank"))]
    pub company_name: String,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_startup", alias = "startup")]
    pub is_startup: bool,
    pub sourcing_date: Option<NaiveDate>,
    pub lock_date: Option<NaiveDate>,
    pub projection: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DomesticClient {
    pub id: Uuid,
    pub fse_id: Uuid,
    pub client_name: String,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub location: Option<String>,
    pub is_startup: bool,
    pub sourcing_date: NaiveDate,
    pub projection: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDomesticClient {
    #[validate(length(max = 300), custom(function = "not_blank"))]
    pub client_name: String,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_startup", alias = "startup")]
    pub is_startup: bool,
    pub sourcing_date: Option<NaiveDate>,
    pub projection: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn startup_truthy_representations() {
        for v in [json!(true), json!("yes"), json!("YES"), json!("1"), json!("true"), json!(" True "), json!(1)] {
            assert!(is_startup_value(&v), "expected {v} to classify as startup");
        }
    }

    #[test]
    fn startup_falsy_representations() {
        for v in [json!(false), json!("no"), json!("0"), json!(""), json!("y"), json!(0), json!(null), json!(2)] {
            assert!(!is_startup_value(&v), "expected {v} to classify as non-startup");
        }
    }

    #[test]
    fn classification_is_idempotent_on_normalized_value() {
        for v in [json!("Yes"), json!("nope"), json!(true)] {
            let once = is_startup_value(&v);
            assert_eq!(is_startup_value(&json!(once)), once);
        }
    }

    #[test]
    fn create_lead_normalizes_startup_on_write() {
        let lead: CreateCorporateLead = serde_json::from_value(json!({
            "company_name": "Acme Incubator",
            "startup": "Yes"
        }))
        .unwrap();
        assert!(lead.is_startup);

        let lead: CreateCorporateLead = serde_json::from_value(json!({
            "company_name": "Acme Holdings",
            "is_startup": "false"
        }))
        .unwrap();
        assert!(!lead.is_startup);

        let lead: CreateCorporateLead =
            serde_json::from_value(json!({ "company_name": "Acme" })).unwrap();
        assert!(!lead.is_startup);
    }

    #[test]
    fn whitespace_names_are_rejected() {
        let lead: CreateCorporateLead =
            serde_json::from_value(json!({ "company_name": "   " })).unwrap();
        assert!(lead.validate().unwrap_err().field_errors().contains_key("company_name"));

        let client: CreateDomesticClient =
            serde_json::from_value(json!({ "client_name": "\t\n" })).unwrap();
        assert!(client.validate().is_err());

        let lead: CreateCorporateLead =
            serde_json::from_value(json!({ "company_name": " Acme " })).unwrap();
        assert!(lead.validate().is_ok());
    }
}
