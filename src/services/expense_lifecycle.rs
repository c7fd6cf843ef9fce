//! Expense claim state machine with role-checked transitions.
//!
//! DRAFT → SUBMITTED → APPROVED | REJECTED, REJECTED → DRAFT,
//! APPROVED → SENT_TO_HR → PAID. Every transition is recorded in
//! expense_claim_history in the same transaction as the status update.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::expense::{ExpenseClaim, ExpenseStatus};
use crate::models::user::UserRole;
use crate::services::team;

/// Claims above this amount need a receipt link before submission.
pub const RECEIPT_THRESHOLD: &str = "500.00";

pub fn receipt_threshold() -> Decimal {
    Decimal::from_str(RECEIPT_THRESHOLD).unwrap_or(Decimal::ZERO)
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: ExpenseStatus,
    pub note: Option<String>,
}

/// How the acting user relates to the claim.
#[derive(Debug, Clone)]
pub struct ClaimActor<'a> {
    pub user: &'a CurrentUser,
    pub is_owner: bool,
    pub manages_owner: bool,
}

impl ClaimActor<'_> {
    fn can_review(&self) -> bool {
        !self.is_owner
            && (self.user.has(UserRole::Hod)
                || (self.user.has(UserRole::Manager) && self.manages_owner))
    }
}

#[derive(Debug, Serialize)]
pub struct TransitionResult {
    pub claim_id: Uuid,
    pub previous_status: ExpenseStatus,
    pub new_status: ExpenseStatus,
}

/// Check whether a status transition is an edge of the lifecycle graph.
pub fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
    use ExpenseStatus::*;
    matches!(
        (from, to),
        (Draft, Submitted)
            | (Submitted, Approved)
            | (Submitted, Rejected)
            | (Rejected, Draft)
            | (Approved, SentToHr)
            | (SentToHr, Paid)
    )
}

/// Whether the actor may move a claim into `to`.
pub fn is_permitted(actor: &ClaimActor<'_>, to: ExpenseStatus) -> bool {
    match to {
        ExpenseStatus::Submitted | ExpenseStatus::Draft => actor.is_owner,
        ExpenseStatus::Approved | ExpenseStatus::Rejected => actor.can_review(),
        ExpenseStatus::SentToHr | ExpenseStatus::Paid => actor.user.has(UserRole::Operations),
    }
}

/// Validate all preconditions for a transition.
pub fn validate_transition(
    claim: &ExpenseClaim,
    to: ExpenseStatus,
    actor: &ClaimActor<'_>,
    note: &Option<String>,
) -> Result<(), AppError> {
    if !is_valid_transition(claim.status, to) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move claim from {} to {}",
            claim.status.as_str(),
            to.as_str()
        )));
    }

    if !is_permitted(actor, to) {
        return Err(AppError::Forbidden(format!(
            "Not allowed to move claim to {}",
            to.as_str()
        )));
    }

    if to == ExpenseStatus::Submitted
        && claim.amount > receipt_threshold()
        && claim.receipt_url.as_ref().map_or(true, |u| u.trim().is_empty())
    {
        return Err(AppError::Validation(format!(
            "Claims above {RECEIPT_THRESHOLD} require a receipt"
        )));
    }

    if to == ExpenseStatus::Rejected && note.as_ref().map_or(true, |n| n.trim().is_empty()) {
        return Err(AppError::Validation(
            "Rejection requires a note".to_string(),
        ));
    }

    Ok(())
}

/// Execute a full status transition: validate, update, and log history.
pub async fn transition(
    pool: &PgPool,
    claim_id: Uuid,
    request: &TransitionRequest,
    user: &CurrentUser,
) -> Result<TransitionResult, AppError> {
    let claim = sqlx::query_as::<_, ExpenseClaim>("SELECT * FROM expense_claims WHERE id = $1")
        .bind(claim_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense claim not found".to_string()))?;

    let is_owner = claim.owner_id == user.id;
    let manages_owner = !is_owner
        && user.has(UserRole::Manager)
        && team::is_direct_report(pool, user.id, claim.owner_id).await?;
    let actor = ClaimActor {
        user,
        is_owner,
        manages_owner,
    };

    validate_transition(&claim, request.status, &actor, &request.note)?;

    let reviewing = matches!(
        request.status,
        ExpenseStatus::Approved | ExpenseStatus::Rejected
    );

    let mut tx = pool.begin().await?;

    // Guard on the loaded status so a concurrent transition loses cleanly.
    let updated = sqlx::query(
        r#"
        UPDATE expense_claims
        SET status = $1,
            reviewed_by = CASE WHEN $2 THEN $3 ELSE reviewed_by END,
            review_note = CASE WHEN $2 THEN $4 ELSE review_note END,
            updated_at = NOW()
        WHERE id = $5 AND status = $6
        "#,
    )
    .bind(request.status)
    .bind(reviewing)
    .bind(user.id)
    .bind(&request.note)
    .bind(claim.id)
    .bind(claim.status)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Claim status changed concurrently".to_string(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO expense_claim_history (claim_id, from_status, to_status, actor_id, actor_name, note)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(claim.id)
    .bind(claim.status)
    .bind(request.status)
    .bind(user.id)
    .bind(&user.name)
    .bind(&request.note)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        claim_id = %claim.id,
        from = claim.status.as_str(),
        to = request.status.as_str(),
        actor_id = %user.id,
        "Expense claim transitioned"
    );

    Ok(TransitionResult {
        claim_id: claim.id,
        previous_status: claim.status,
        new_status: request.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::RoleSet;
    use chrono::{NaiveDate, Utc};

    fn user(tags: &[&str]) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: "Actor".to_string(),
            email: "actor@maven.test".to_string(),
            roles: RoleSet::from_tags(tags),
            manager_id: None,
        }
    }

    fn claim(status: ExpenseStatus, amount: &str, receipt: Option<&str>) -> ExpenseClaim {
        ExpenseClaim {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            category: "Travel".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            description: None,
            claim_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            receipt_url: receipt.map(str::to_string),
            status,
            reviewed_by: None,
            review_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn owner(u: &CurrentUser) -> ClaimActor<'_> {
        ClaimActor { user: u, is_owner: true, manages_owner: false }
    }

    fn manager(u: &CurrentUser) -> ClaimActor<'_> {
        ClaimActor { user: u, is_owner: false, manages_owner: true }
    }

    fn stranger(u: &CurrentUser) -> ClaimActor<'_> {
        ClaimActor { user: u, is_owner: false, manages_owner: false }
    }

    // -- Graph --

    #[test]
    fn lifecycle_edges() {
        use ExpenseStatus::*;
        assert!(is_valid_transition(Draft, Submitted));
        assert!(is_valid_transition(Submitted, Approved));
        assert!(is_valid_transition(Submitted, Rejected));
        assert!(is_valid_transition(Rejected, Draft));
        assert!(is_valid_transition(Approved, SentToHr));
        assert!(is_valid_transition(SentToHr, Paid));
    }

    #[test]
    fn skipping_stages_is_invalid() {
        use ExpenseStatus::*;
        assert!(!is_valid_transition(Draft, Approved));
        assert!(!is_valid_transition(Submitted, Paid));
        assert!(!is_valid_transition(Approved, Paid));
        assert!(!is_valid_transition(Paid, Draft));
        assert!(!is_valid_transition(Rejected, Approved));
    }

    // -- Actors --

    #[test]
    fn owner_submits_and_revises() {
        let u = user(&["FSE"]);
        assert!(is_permitted(&owner(&u), ExpenseStatus::Submitted));
        assert!(is_permitted(&owner(&u), ExpenseStatus::Draft));
        assert!(!is_permitted(&owner(&u), ExpenseStatus::Approved));
    }

    #[test]
    fn manager_of_owner_reviews() {
        let u = user(&["MANAGER"]);
        assert!(is_permitted(&manager(&u), ExpenseStatus::Approved));
        assert!(is_permitted(&manager(&u), ExpenseStatus::Rejected));
        assert!(!is_permitted(&stranger(&u), ExpenseStatus::Approved));
    }

    #[test]
    fn hod_reviews_any_claim_but_not_own() {
        let u = user(&["HOD"]);
        assert!(is_permitted(&stranger(&u), ExpenseStatus::Approved));
        assert!(!is_permitted(&owner(&u), ExpenseStatus::Approved));
    }

    #[test]
    fn operations_pays_out() {
        let ops = user(&["OPERATIONS"]);
        assert!(is_permitted(&stranger(&ops), ExpenseStatus::SentToHr));
        assert!(is_permitted(&stranger(&ops), ExpenseStatus::Paid));
        let mgr = user(&["MANAGER"]);
        assert!(!is_permitted(&manager(&mgr), ExpenseStatus::Paid));
    }

    // -- Preconditions --

    #[test]
    fn large_claim_needs_receipt() {
        let u = user(&["LEADGEN"]);
        let c = claim(ExpenseStatus::Draft, "750.00", None);
        let err = validate_transition(&c, ExpenseStatus::Submitted, &owner(&u), &None).unwrap_err();
        assert!(err.to_string().contains("receipt"));

        let c = claim(ExpenseStatus::Draft, "750.00", Some("https://files.test/r.pdf"));
        assert!(validate_transition(&c, ExpenseStatus::Submitted, &owner(&u), &None).is_ok());

        let c = claim(ExpenseStatus::Draft, "500.00", None);
        assert!(validate_transition(&c, ExpenseStatus::Submitted, &owner(&u), &None).is_ok());
    }

    #[test]
    fn rejection_needs_note() {
        let u = user(&["MANAGER"]);
        let c = claim(ExpenseStatus::Submitted, "120.00", None);
        assert!(validate_transition(&c, ExpenseStatus::Rejected, &manager(&u), &None).is_err());
        assert!(validate_transition(
            &c,
            ExpenseStatus::Rejected,
            &manager(&u),
            &Some("Duplicate of last week".to_string())
        )
        .is_ok());
    }

    #[test]
    fn invalid_edge_reported_before_role() {
        let u = user(&["OPERATIONS"]);
        let c = claim(ExpenseStatus::Draft, "10.00", None);
        let err = validate_transition(&c, ExpenseStatus::Paid, &stranger(&u), &None).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn wrong_actor_is_forbidden() {
        let u = user(&["FSE"]);
        let c = claim(ExpenseStatus::Submitted, "10.00", None);
        let err = validate_transition(&c, ExpenseStatus::Approved, &stranger(&u), &None).unwrap_err();
        assert!(err.is_forbidden());
    }
}
