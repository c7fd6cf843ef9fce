//! Reporting hierarchy: direct reports, agent scoping, and ownership checks.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::{TeamMember, UserRole};

/// Users whose `manager_id` is `manager_id`.
pub async fn direct_reports(pool: &PgPool, manager_id: Uuid) -> Result<Vec<TeamMember>, AppError> {
    let rows = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT id, name, email, roles, manager_id, is_active
        FROM users
        WHERE manager_id = $1
        ORDER BY name ASC, id ASC
        "#,
    )
    .bind(manager_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Whether `user_id` reports directly to `manager_id`.
pub async fn is_direct_report(
    pool: &PgPool,
    manager_id: Uuid,
    user_id: Uuid,
) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND manager_id = $2)",
    )
    .bind(user_id)
    .bind(manager_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Pick the agent ids a dashboard request covers.
///
/// Managers see their direct reports carrying `agent_role` (plus themselves
/// when they carry it too), optionally narrowed to one report. Agents see
/// only themselves. Anyone else is forbidden.
pub fn scope_agents(
    user: &CurrentUser,
    agent_role: UserRole,
    requested: Option<Uuid>,
    reports: &[TeamMember],
) -> Result<Vec<Uuid>, AppError> {
    let is_agent = user.has(agent_role);
    let eligible = |r: &&TeamMember| r.is_active && r.role_set().has(agent_role);

    if user.has(UserRole::Manager) {
        return match requested {
            Some(id) if id == user.id && is_agent => Ok(vec![id]),
            Some(id) if reports.iter().filter(eligible).any(|r| r.id == id) => Ok(vec![id]),
            Some(_) => Err(AppError::Forbidden(format!(
                "Agent is not an active {agent_role} direct report"
            ))),
            None => {
                let mut ids: Vec<Uuid> = reports
                    .iter()
                    .filter(eligible)
                    .map(|r| r.id)
                    .collect();
                if is_agent {
                    ids.push(user.id);
                }
                Ok(ids)
            }
        };
    }

    if is_agent {
        return match requested {
            None => Ok(vec![user.id]),
            Some(id) if id == user.id => Ok(vec![id]),
            Some(_) => Err(AppError::Forbidden(
                "Agents may only view their own metrics".to_string(),
            )),
        };
    }

    Err(AppError::Forbidden(format!(
        "{agent_role} or MANAGER access required"
    )))
}

/// Database-backed wrapper around [`scope_agents`].
pub async fn resolve_agents(
    pool: &PgPool,
    user: &CurrentUser,
    agent_role: UserRole,
    requested: Option<Uuid>,
) -> Result<Vec<Uuid>, AppError> {
    let reports = if user.has(UserRole::Manager) {
        direct_reports(pool, user.id).await?
    } else {
        Vec::new()
    };
    scope_agents(user, agent_role, requested, &reports)
}

/// Allow access to a record owned by `owner_id`: the owner, or the owner's manager.
pub async fn ensure_owner_or_manager(
    pool: &PgPool,
    user: &CurrentUser,
    owner_id: Uuid,
) -> Result<(), AppError> {
    if owner_id == user.id {
        return Ok(());
    }
    if user.has(UserRole::Manager) && is_direct_report(pool, user.id, owner_id).await? {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Record belongs to another agent".to_string(),
    ))
}

/// One manager row on the HOD overview.
#[derive(Debug, Serialize, FromRow)]
pub struct ManagerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub direct_reports: i64,
}

/// Every user tagged MANAGER, with their direct-report counts.
pub async fn list_managers(pool: &PgPool) -> Result<Vec<ManagerSummary>, AppError> {
    let rows = sqlx::query_as::<_, ManagerSummary>(
        r#"
        SELECT m.id, m.name, m.email, m.is_active, COUNT(r.id) AS direct_reports
        FROM users m
        LEFT JOIN users r ON r.manager_id = m.id
        WHERE EXISTS (SELECT 1 FROM unnest(m.roles) AS tag WHERE upper(trim(tag)) = 'MANAGER')
        GROUP BY m.id, m.name, m.email, m.is_active
        ORDER BY m.name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Whether `user_id` carries the MANAGER tag, matched the way [`RoleSet`] parses tags.
///
/// [`RoleSet`]: crate::models::user::RoleSet
pub async fn is_manager(pool: &PgPool, user_id: Uuid) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE id = $1
              AND EXISTS (SELECT 1 FROM unnest(roles) AS tag WHERE upper(trim(tag)) = 'MANAGER')
        )
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::RoleSet;

    fn current(tags: &[&str]) -> CurrentUser {
        CurrentUser {
            id: Uuid::from_u128(1),
            name: "Caller".to_string(),
            email: "caller@maven.test".to_string(),
            roles: RoleSet::from_tags(tags),
            manager_id: None,
        }
    }

    fn member(id: u128, tags: &[&str], active: bool) -> TeamMember {
        TeamMember {
            id: Uuid::from_u128(id),
            name: format!("Agent {id}"),
            email: format!("agent{id}@maven.test"),
            roles: tags.iter().map(|t| t.to_string()).collect(),
            manager_id: Some(Uuid::from_u128(1)),
            is_active: active,
        }
    }

    #[test]
    fn manager_sees_active_reports_with_role() {
        let reports = vec![
            member(2, &["LEADGEN"], true),
            member(3, &["FSE"], true),
            member(4, &["LEADGEN"], false),
            member(5, &["LEADGEN", "FSE"], true),
        ];
        let ids = scope_agents(&current(&["MANAGER"]), UserRole::LeadGen, None, &reports).unwrap();
        assert_eq!(ids, vec![Uuid::from_u128(2), Uuid::from_u128(5)]);
    }

    #[test]
    fn manager_can_narrow_to_one_report() {
        let reports = vec![member(2, &["LEADGEN"], true), member(3, &["LEADGEN"], true)];
        let ids = scope_agents(
            &current(&["MANAGER"]),
            UserRole::LeadGen,
            Some(Uuid::from_u128(3)),
            &reports,
        )
        .unwrap();
        assert_eq!(ids, vec![Uuid::from_u128(3)]);
    }

    #[test]
    fn manager_cannot_reach_outside_team() {
        let reports = vec![member(2, &["LEADGEN"], true)];
        let err = scope_agents(
            &current(&["MANAGER"]),
            UserRole::LeadGen,
            Some(Uuid::from_u128(99)),
            &reports,
        )
        .unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn explicit_request_skips_inactive_or_off_role_reports() {
        let reports = vec![
            member(2, &["LEADGEN"], false),
            member(3, &["FSE"], true),
            member(4, &["leadgen"], true),
        ];
        let manager = current(&["MANAGER"]);
        for id in [2, 3] {
            let err = scope_agents(&manager, UserRole::LeadGen, Some(Uuid::from_u128(id)), &reports)
                .unwrap_err();
            assert!(err.is_forbidden(), "report {id} should be out of scope");
        }
        let ids = scope_agents(&manager, UserRole::LeadGen, Some(Uuid::from_u128(4)), &reports).unwrap();
        assert_eq!(ids, vec![Uuid::from_u128(4)]);
    }

    #[test]
    fn agent_sees_only_self() {
        let caller = current(&["FSE"]);
        assert_eq!(
            scope_agents(&caller, UserRole::Fse, None, &[]).unwrap(),
            vec![caller.id]
        );
        assert!(scope_agents(&caller, UserRole::Fse, Some(Uuid::from_u128(7)), &[]).is_err());
    }

    #[test]
    fn unrelated_role_is_forbidden() {
        let err = scope_agents(&current(&["OPERATIONS"]), UserRole::LeadGen, None, &[]).unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn manager_agent_includes_self() {
        let reports = vec![member(2, &["FSE"], true)];
        let ids = scope_agents(&current(&["MANAGER", "FSE"]), UserRole::Fse, None, &reports).unwrap();
        assert_eq!(ids, vec![Uuid::from_u128(2), Uuid::from_u128(1)]);
    }
}
