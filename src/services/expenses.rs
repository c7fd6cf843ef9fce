//! Expense claim records: owner CRUD while DRAFT, review queues, and the HR export.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::expense::{
    CreateExpense, ExpenseClaim, ExpenseHistory, ExpenseStatus, UpdateExpense,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::UserRole;
use crate::services::team;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseFilters {
    pub status: Option<ExpenseStatus>,
}

fn ensure_positive(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Owner-only edit guard: the claim must still be a draft.
fn ensure_editable(claim: &ExpenseClaim, user: &CurrentUser) -> Result<(), AppError> {
    if claim.owner_id != user.id {
        return Err(AppError::Forbidden(
            "Only the owner may change a claim".to_string(),
        ));
    }
    if claim.status != ExpenseStatus::Draft {
        return Err(AppError::Conflict(format!(
            "Claim is {} and can no longer be edited",
            claim.status.as_str()
        )));
    }
    Ok(())
}

pub async fn find_claim(pool: &PgPool, id: Uuid) -> Result<ExpenseClaim, AppError> {
    sqlx::query_as::<_, ExpenseClaim>("SELECT * FROM expense_claims WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense claim not found".to_string()))
}

/// Visible to the owner, the owner's manager, HOD, and OPERATIONS.
pub async fn ensure_can_view(
    pool: &PgPool,
    user: &CurrentUser,
    claim: &ExpenseClaim,
) -> Result<(), AppError> {
    if user.roles.has_any(&[UserRole::Hod, UserRole::Operations]) {
        return Ok(());
    }
    team::ensure_owner_or_manager(pool, user, claim.owner_id).await
}

pub async fn create_claim(
    pool: &PgPool,
    owner_id: Uuid,
    input: &CreateExpense,
) -> Result<ExpenseClaim, AppError> {
    ensure_positive(input.amount)?;

    let claim = sqlx::query_as::<_, ExpenseClaim>(
        r#"
        INSERT INTO expense_claims (owner_id, category, amount, description, claim_date, receipt_url, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'DRAFT')
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(input.category.trim())
    .bind(input.amount)
    .bind(&input.description)
    .bind(input.claim_date)
    .bind(&input.receipt_url)
    .fetch_one(pool)
    .await?;

    tracing::info!(claim_id = %claim.id, owner_id = %owner_id, "Expense claim drafted");
    Ok(claim)
}

pub async fn update_claim(
    pool: &PgPool,
    id: Uuid,
    user: &CurrentUser,
    input: &UpdateExpense,
) -> Result<ExpenseClaim, AppError> {
    let claim = find_claim(pool, id).await?;
    ensure_editable(&claim, user)?;
    if let Some(amount) = input.amount {
        ensure_positive(amount)?;
    }

    let updated = sqlx::query_as::<_, ExpenseClaim>(
        r#"
        UPDATE expense_claims
        SET category = COALESCE($1, category),
            amount = COALESCE($2, amount),
            description = COALESCE($3, description),
            claim_date = COALESCE($4, claim_date),
            receipt_url = COALESCE($5, receipt_url),
            updated_at = NOW()
        WHERE id = $6 AND status = 'DRAFT'
        RETURNING *
        "#,
    )
    .bind(input.category.as_deref().map(str::trim))
    .bind(input.amount)
    .bind(&input.description)
    .bind(input.claim_date)
    .bind(&input.receipt_url)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Claim is no longer a draft".to_string()))?;

    Ok(updated)
}

pub async fn delete_claim(pool: &PgPool, id: Uuid, user: &CurrentUser) -> Result<(), AppError> {
    let claim = find_claim(pool, id).await?;
    ensure_editable(&claim, user)?;

    let deleted = sqlx::query("DELETE FROM expense_claims WHERE id = $1 AND status = 'DRAFT'")
        .bind(id)
        .execute(pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::Conflict("Claim is no longer a draft".to_string()));
    }

    tracing::info!(claim_id = %id, "Expense claim deleted");
    Ok(())
}

/// The caller's own claims, newest first.
pub async fn list_own(
    pool: &PgPool,
    owner_id: Uuid,
    filters: &ExpenseFilters,
    pagination: &Pagination,
) -> Result<PagedResult<ExpenseClaim>, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM expense_claims WHERE owner_id = $1 AND ($2::expense_status IS NULL OR status = $2)",
    )
    .bind(owner_id)
    .bind(filters.status)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, ExpenseClaim>(
        r#"
        SELECT * FROM expense_claims
        WHERE owner_id = $1 AND ($2::expense_status IS NULL OR status = $2)
        ORDER BY claim_date DESC, created_at DESC, id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(owner_id)
    .bind(filters.status)
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Statuses waiting on the caller. Managers review submissions; OPERATIONS
/// handles approved claims through payout.
pub fn review_statuses(user: &CurrentUser) -> Vec<ExpenseStatus> {
    let mut statuses = Vec::new();
    if user.has(UserRole::Manager) {
        statuses.push(ExpenseStatus::Submitted);
    }
    if user.has(UserRole::Operations) {
        statuses.push(ExpenseStatus::Approved);
        statuses.push(ExpenseStatus::SentToHr);
    }
    statuses
}

pub async fn review_queue(
    pool: &PgPool,
    user: &CurrentUser,
) -> Result<Vec<ExpenseClaim>, AppError> {
    if review_statuses(user).is_empty() {
        return Err(AppError::Forbidden(
            "MANAGER or OPERATIONS access required".to_string(),
        ));
    }

    let mut claims = Vec::new();

    if user.has(UserRole::Manager) {
        let submitted = sqlx::query_as::<_, ExpenseClaim>(
            r#"
            SELECT c.* FROM expense_claims c
            JOIN users u ON u.id = c.owner_id
            WHERE u.manager_id = $1 AND c.status = 'SUBMITTED'
            ORDER BY c.updated_at ASC, c.id ASC
            "#,
        )
        .bind(user.id)
        .fetch_all(pool)
        .await?;
        claims.extend(submitted);
    }

    if user.has(UserRole::Operations) {
        let payable = sqlx::query_as::<_, ExpenseClaim>(
            r#"
            SELECT * FROM expense_claims
            WHERE status IN ('APPROVED', 'SENT_TO_HR')
            ORDER BY updated_at ASC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;
        claims.extend(payable);
    }

    Ok(claims)
}

pub async fn history(pool: &PgPool, claim_id: Uuid) -> Result<Vec<ExpenseHistory>, AppError> {
    let rows = sqlx::query_as::<_, ExpenseHistory>(
        "SELECT * FROM expense_claim_history WHERE claim_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(claim_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// One line of the HR payout sheet.
#[derive(Debug, sqlx::FromRow)]
pub struct ExportRow {
    pub id: Uuid,
    pub owner_name: String,
    pub owner_email: String,
    pub category: String,
    pub amount: Decimal,
    pub claim_date: chrono::NaiveDate,
    pub status: ExpenseStatus,
    pub receipt_url: Option<String>,
}

pub async fn export_rows(pool: &PgPool) -> Result<Vec<ExportRow>, AppError> {
    let rows = sqlx::query_as::<_, ExportRow>(
        r#"
        SELECT c.id, u.name AS owner_name, u.email AS owner_email, c.category,
               c.amount, c.claim_date, c.status, c.receipt_url
        FROM expense_claims c
        JOIN users u ON u.id = c.owner_id
        WHERE c.status IN ('APPROVED', 'SENT_TO_HR')
        ORDER BY u.name ASC, c.claim_date ASC, c.id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Render export rows as CSV with a header line.
pub fn render_csv(rows: &[ExportRow]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| AppError::Internal(format!("CSV write failed: {e}"));

    writer
        .write_record([
            "claim_id", "employee", "email", "category", "amount", "claim_date", "status",
            "receipt_url",
        ])
        .map_err(csv_err)?;

    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.owner_name.clone(),
                row.owner_email.clone(),
                row.category.clone(),
                row.amount.round_dp(2).to_string(),
                row.claim_date.to_string(),
                row.status.as_str().to_string(),
                row.receipt_url.clone().unwrap_or_default(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::RoleSet;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn user(id: u128, tags: &[&str]) -> CurrentUser {
        CurrentUser {
            id: Uuid::from_u128(id),
            name: "Caller".to_string(),
            email: "caller@maven.test".to_string(),
            roles: RoleSet::from_tags(tags),
            manager_id: None,
        }
    }

    fn draft(owner: u128) -> ExpenseClaim {
        ExpenseClaim {
            id: Uuid::new_v4(),
            owner_id: Uuid::from_u128(owner),
            category: "Fuel".to_string(),
            amount: Decimal::from_str("42.50").unwrap(),
            description: None,
            claim_date: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            receipt_url: None,
            status: ExpenseStatus::Draft,
            reviewed_by: None,
            review_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(ensure_positive(Decimal::ZERO).is_err());
        assert!(ensure_positive(Decimal::from_str("-1").unwrap()).is_err());
        assert!(ensure_positive(Decimal::from_str("0.01").unwrap()).is_ok());
    }

    #[test]
    fn only_owner_edits_drafts() {
        let claim = draft(1);
        assert!(ensure_editable(&claim, &user(1, &["FSE"])).is_ok());
        assert!(ensure_editable(&claim, &user(2, &["HOD"])).unwrap_err().is_forbidden());

        let mut submitted = draft(1);
        submitted.status = ExpenseStatus::Submitted;
        assert!(matches!(
            ensure_editable(&submitted, &user(1, &["FSE"])),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn review_statuses_follow_roles() {
        assert_eq!(review_statuses(&user(1, &["MANAGER"])), vec![ExpenseStatus::Submitted]);
        assert_eq!(
            review_statuses(&user(1, &["OPERATIONS"])),
            vec![ExpenseStatus::Approved, ExpenseStatus::SentToHr]
        );
        assert!(review_statuses(&user(1, &["LEADGEN"])).is_empty());
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let rows = vec![ExportRow {
            id: Uuid::from_u128(7),
            owner_name: "Rao, Meera".to_string(),
            owner_email: "meera@maven.test".to_string(),
            category: "Travel".to_string(),
            amount: Decimal::from_str("1200.5").unwrap(),
            claim_date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            status: ExpenseStatus::Approved,
            receipt_url: Some("https://files.test/r1.pdf".to_string()),
        }];
        let out = render_csv(&rows).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "claim_id,employee,email,category,amount,claim_date,status,receipt_url"
        );
        let line = lines.next().unwrap();
        assert!(line.contains("\"Rao, Meera\""));
        assert!(line.contains(",1200.5,"));
        assert!(line.ends_with(",APPROVED,https://files.test/r1.pdf"));
    }
}
