//! Manager dashboard: one activity row per direct report.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::paging::BatchLimits;
use crate::errors::AppError;
use crate::models::dwr::DailyReport;
use crate::models::interaction::{CorporateInteraction, DomesticInteraction};
use crate::models::range::DateRange;
use crate::models::user::TeamMember;
use crate::services::activity;
use crate::services::leadgen_metrics::is_not_picked;
use crate::services::partial::{Availability, SourceLog};
use crate::services::team;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: Uuid,
    pub name: String,
    pub roles: Vec<String>,
    pub calls: u64,
    pub not_picked: u64,
    pub picked: u64,
    pub visits: u64,
    pub unique_clients_visited: u64,
    pub dwr_submitted: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDashboard {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub members: Vec<MemberSummary>,
    #[serde(flatten)]
    pub availability: Availability,
}

pub fn compute(
    range: DateRange,
    members: &[TeamMember],
    calls: Vec<CorporateInteraction>,
    visits: Vec<DomesticInteraction>,
    reports: Vec<DailyReport>,
    availability: Availability,
) -> TeamDashboard {
    let mut rows: HashMap<Uuid, MemberSummary> = members
        .iter()
        .map(|m| {
            (
                m.id,
                MemberSummary {
                    id: m.id,
                    name: m.name.clone(),
                    roles: m.role_set().to_tags(),
                    ..MemberSummary::default()
                },
            )
        })
        .collect();

    for call in calls {
        let day = call.contact_date.unwrap_or_else(|| call.created_at.date_naive());
        if !range.contains(day) {
            continue;
        }
        if let Some(row) = rows.get_mut(&call.leadgen_id) {
            row.calls += 1;
            if is_not_picked(&call.status) {
                row.not_picked += 1;
            }
        }
    }

    let mut visited: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    for visit in visits {
        let day = visit.contact_date.unwrap_or_else(|| visit.created_at.date_naive());
        if !range.contains(day) {
            continue;
        }
        if let Some(row) = rows.get_mut(&visit.fse_id) {
            row.visits += 1;
            visited.entry(visit.fse_id).or_default().insert(visit.client_id);
        }
    }

    for report in reports {
        if !range.contains(report.report_date) {
            continue;
        }
        if let Some(row) = rows.get_mut(&report.user_id) {
            row.dwr_submitted += 1;
        }
    }

    let members = members
        .iter()
        .filter_map(|m| rows.remove(&m.id))
        .map(|mut row| {
            row.picked = row.calls.saturating_sub(row.not_picked);
            row.unique_clients_visited = visited.get(&row.id).map_or(0, |s| s.len() as u64);
            row
        })
        .collect();

    TeamDashboard {
        from_date: range.from,
        to_date: range.to,
        members,
        availability,
    }
}

/// Activity summary for every direct report of `manager_id`.
pub async fn get_dashboard(
    pool: &PgPool,
    limits: BatchLimits,
    manager_id: Uuid,
    range: DateRange,
) -> Result<TeamDashboard, AppError> {
    let members = team::direct_reports(pool, manager_id).await?;
    let ids: Vec<Uuid> = members.iter().map(|m| m.id).collect();

    let (calls, visits, reports) = tokio::join!(
        activity::corporate_interactions(pool, limits, &ids, range),
        activity::domestic_interactions(pool, limits, &ids, range),
        activity::daily_reports(pool, limits, &ids, range),
    );

    let mut sources = SourceLog::new();
    let calls = sources.absorb(activity::CORPORATE_INTERACTIONS, calls);
    let visits = sources.absorb(activity::DOMESTIC_INTERACTIONS, visits);
    let reports = sources.absorb(activity::DAILY_REPORTS, reports);

    Ok(compute(range, &members, calls, visits, reports, sources.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    fn member(id: u128, tag: &str) -> TeamMember {
        TeamMember {
            id: Uuid::from_u128(id),
            name: format!("Agent {id}"),
            email: format!("a{id}@maven.test"),
            roles: vec![tag.to_string()],
            manager_id: Some(Uuid::from_u128(99)),
            is_active: true,
        }
    }

    fn call(by: u128, day: u32, status: &str) -> CorporateInteraction {
        CorporateInteraction {
            id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            leadgen_id: Uuid::from_u128(by),
            contact_date: Some(d(day)),
            contact_person: None,
            status: status.to_string(),
            sub_status: None,
            franchise_status: None,
            remarks: None,
            created_at: Utc.with_ymd_and_hms(2026, 9, day, 10, 0, 0).unwrap(),
        }
    }

    fn visit(by: u128, client: u128, day: u32) -> DomesticInteraction {
        DomesticInteraction {
            id: Uuid::new_v4(),
            client_id: Uuid::from_u128(client),
            fse_id: Uuid::from_u128(by),
            contact_date: Some(d(day)),
            contact_person: None,
            status: "Visited".to_string(),
            sub_status: None,
            remarks: None,
            created_at: Utc.with_ymd_and_hms(2026, 9, day, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn summarizes_each_report_in_roster_order() {
        let members = vec![member(1, "LEADGEN"), member(2, "FSE")];
        let range = DateRange { from: d(1), to: d(30) };
        let dash = compute(
            range,
            &members,
            vec![call(1, 2, "Picked"), call(1, 3, "Not Picked"), call(7, 3, "Picked")],
            vec![visit(2, 10, 4), visit(2, 10, 5), visit(2, 11, 5)],
            vec![],
            SourceLog::new().finish(),
        );

        assert_eq!(dash.members.len(), 2);
        let leadgen = &dash.members[0];
        assert_eq!((leadgen.calls, leadgen.not_picked, leadgen.picked), (2, 1, 1));
        let fse = &dash.members[1];
        assert_eq!(fse.visits, 3);
        assert_eq!(fse.unique_clients_visited, 2);
        assert_eq!(fse.calls, 0);
    }

    #[test]
    fn empty_team_yields_no_rows() {
        let range = DateRange { from: d(1), to: d(30) };
        let dash = compute(range, &[], vec![call(1, 2, "Picked")], vec![], vec![], SourceLog::new().finish());
        assert!(dash.members.is_empty());
        assert!(dash.availability.complete);
    }
}
