//! Monthly targets set by a superior for a subordinate.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::target::{month_start, SetTarget, Target, TargetQuery};
use crate::models::user::UserRole;
use crate::services::team;

/// How the target user sits relative to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relation {
    pub is_direct_report: bool,
    pub is_manager: bool,
}

/// A MANAGER sets targets for direct reports; an HOD sets targets for managers.
pub fn may_set(setter: &CurrentUser, target_user: Uuid, relation: Relation) -> bool {
    if setter.id == target_user {
        return false;
    }
    (setter.has(UserRole::Manager) && relation.is_direct_report)
        || (setter.has(UserRole::Hod) && relation.is_manager)
}

async fn relation(pool: &PgPool, caller: &CurrentUser, user_id: Uuid) -> Result<Relation, AppError> {
    let is_direct_report = caller.has(UserRole::Manager)
        && team::is_direct_report(pool, caller.id, user_id).await?;
    let is_manager = caller.has(UserRole::Hod) && team::is_manager(pool, user_id).await?;
    Ok(Relation {
        is_direct_report,
        is_manager,
    })
}

pub async fn set_target(
    pool: &PgPool,
    setter: &CurrentUser,
    input: &SetTarget,
) -> Result<Target, AppError> {
    let rel = relation(pool, setter, input.user_id).await?;
    if !may_set(setter, input.user_id, rel) {
        return Err(AppError::Forbidden(
            "Targets can only be set for your direct reports or managers".to_string(),
        ));
    }

    let month = month_start(input.month);
    let target = sqlx::query_as::<_, Target>(
        r#"
        INSERT INTO targets (user_id, month, visits_per_day, onboards_per_month, calls_per_day, set_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, month) DO UPDATE
        SET visits_per_day = EXCLUDED.visits_per_day,
            onboards_per_month = EXCLUDED.onboards_per_month,
            calls_per_day = EXCLUDED.calls_per_day,
            set_by = EXCLUDED.set_by,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(input.user_id)
    .bind(month)
    .bind(input.visits_per_day)
    .bind(input.onboards_per_month)
    .bind(input.calls_per_day)
    .bind(setter.id)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        user_id = %input.user_id,
        set_by = %setter.id,
        month = %month,
        "Target assigned"
    );
    Ok(target)
}

/// Targets for the caller, or for a subordinate the caller may set targets for.
pub async fn get_targets(
    pool: &PgPool,
    caller: &CurrentUser,
    query: &TargetQuery,
) -> Result<Vec<Target>, AppError> {
    let user_id = query.user_id.unwrap_or(caller.id);
    if user_id != caller.id {
        let rel = relation(pool, caller, user_id).await?;
        if !may_set(caller, user_id, rel) {
            return Err(AppError::Forbidden(
                "Not allowed to view this user's targets".to_string(),
            ));
        }
    }

    let rows = sqlx::query_as::<_, Target>(
        r#"
        SELECT * FROM targets
        WHERE user_id = $1 AND ($2::date IS NULL OR month = $2)
        ORDER BY month DESC
        "#,
    )
    .bind(user_id)
    .bind(query.month.map(month_start))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::RoleSet;

    fn caller(tags: &[&str]) -> CurrentUser {
        CurrentUser {
            id: Uuid::from_u128(1),
            name: "Setter".to_string(),
            email: "setter@maven.test".to_string(),
            roles: RoleSet::from_tags(tags),
            manager_id: None,
        }
    }

    const REPORT: Relation = Relation { is_direct_report: true, is_manager: false };
    const MANAGER: Relation = Relation { is_direct_report: false, is_manager: true };
    const NOBODY: Relation = Relation { is_direct_report: false, is_manager: false };

    #[test]
    fn manager_sets_for_direct_report_only() {
        let mgr = caller(&["MANAGER"]);
        assert!(may_set(&mgr, Uuid::from_u128(2), REPORT));
        assert!(!may_set(&mgr, Uuid::from_u128(2), NOBODY));
        assert!(!may_set(&mgr, Uuid::from_u128(2), MANAGER));
    }

    #[test]
    fn hod_sets_for_managers() {
        let hod = caller(&["HOD"]);
        assert!(may_set(&hod, Uuid::from_u128(2), MANAGER));
        assert!(!may_set(&hod, Uuid::from_u128(2), REPORT));
    }

    #[test]
    fn nobody_sets_own_target() {
        let both = caller(&["MANAGER", "HOD"]);
        let me = Uuid::from_u128(1);
        let everything = Relation { is_direct_report: true, is_manager: true };
        assert!(!may_set(&both, me, everything));
    }

    #[test]
    fn agents_cannot_set_targets() {
        let agent = caller(&["LEADGEN"]);
        let everything = Relation { is_direct_report: true, is_manager: true };
        assert!(!may_set(&agent, Uuid::from_u128(2), everything));
    }
}
