//! FSE dashboard: client visits, client acquisition, and current client status.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::paging::BatchLimits;
use crate::errors::AppError;
use crate::models::dwr::DailyReport;
use crate::models::interaction::DomesticInteraction;
use crate::models::lead::DomesticClient;
use crate::models::range::DateRange;
use crate::models::target::Target;
use crate::services::activity;
use crate::services::latest::{latest_by_key, Recency};
use crate::services::leadgen_metrics::{Counter, StartupSplit};
use crate::services::partial::{Availability, SourceLog};

/// Recency rule for the current status of a domestic client.
pub const CLIENT_STATUS_RECENCY: Recency = Recency::CreatedAt;

/// Latest status that counts a client as onboarded.
const ONBOARDED: &str = "onboarded";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FseDashboard {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub agents: Vec<Uuid>,
    pub visits: Counter,
    pub unique_clients_visited: u64,
    pub clients_added: StartupSplit,
    pub status_breakdown: BTreeMap<String, u64>,
    pub onboarded: u64,
    pub dwr_submitted: u64,
    pub target: Option<Target>,
    #[serde(flatten)]
    pub availability: Availability,
}

/// Rows feeding one dashboard computation.
#[derive(Debug, Default)]
pub struct FseInputs {
    /// Visits by the agents inside the range.
    pub visits: Vec<DomesticInteraction>,
    /// Newest visit per client over all time, for the status breakdown.
    pub client_status: Vec<DomesticInteraction>,
    pub clients_added: Vec<DomesticClient>,
    pub reports: Vec<DailyReport>,
    pub target: Option<Target>,
}

fn visit_date(row: &DomesticInteraction) -> NaiveDate {
    row.contact_date.unwrap_or_else(|| row.created_at.date_naive())
}

pub fn compute(
    range: DateRange,
    agents: &[Uuid],
    inputs: FseInputs,
    availability: Availability,
) -> FseDashboard {
    let scoped: HashSet<Uuid> = agents.iter().copied().collect();

    let mut visits = Counter {
        total: 0,
        by_agent: agents.iter().map(|a| (*a, 0)).collect(),
    };
    let mut visited: HashSet<Uuid> = HashSet::new();
    for row in inputs
        .visits
        .iter()
        .filter(|row| scoped.contains(&row.fse_id) && range.contains(visit_date(row)))
    {
        visits.total += 1;
        *visits.by_agent.entry(row.fse_id).or_default() += 1;
        visited.insert(row.client_id);
    }

    let mut status_breakdown: BTreeMap<String, u64> = BTreeMap::new();
    let mut onboarded = 0;
    let owned = inputs
        .client_status
        .into_iter()
        .filter(|row| scoped.contains(&row.fse_id));
    for row in latest_by_key(owned, CLIENT_STATUS_RECENCY).into_values() {
        let status = row.status.trim();
        if status.eq_ignore_ascii_case(ONBOARDED) {
            onboarded += 1;
        }
        *status_breakdown.entry(status.to_string()).or_default() += 1;
    }

    let clients_added = StartupSplit::from_flags(
        inputs
            .clients_added
            .iter()
            .filter(|c| scoped.contains(&c.fse_id) && range.contains(c.sourcing_date))
            .map(|c| c.is_startup),
    );

    let dwr_submitted = inputs
        .reports
        .iter()
        .filter(|r| scoped.contains(&r.user_id) && range.contains(r.report_date))
        .count() as u64;

    FseDashboard {
        from_date: range.from,
        to_date: range.to,
        agents: agents.to_vec(),
        visits,
        unique_clients_visited: visited.len() as u64,
        clients_added,
        status_breakdown,
        onboarded,
        dwr_submitted,
        target: inputs.target,
        availability,
    }
}

/// Fetch and reduce the FSE dashboard for an already-scoped agent list.
///
/// The month target is only attached when exactly one agent is in scope.
pub async fn get_dashboard(
    pool: &PgPool,
    limits: BatchLimits,
    agents: &[Uuid],
    range: DateRange,
) -> Result<FseDashboard, AppError> {
    let single = match agents {
        [only] => Some(*only),
        _ => None,
    };

    let (visits, client_status, clients_added, reports, target) = tokio::join!(
        activity::domestic_interactions(pool, limits, agents, range),
        activity::latest_client_visits(pool, limits, agents),
        activity::domestic_clients_added(pool, limits, agents, range),
        activity::daily_reports(pool, limits, agents, range),
        async {
            match single {
                Some(agent) => activity::month_target(pool, agent, range.to).await,
                None => Ok(None),
            }
        },
    );

    let mut sources = SourceLog::new();
    let inputs = FseInputs {
        visits: sources.absorb(activity::DOMESTIC_INTERACTIONS, visits),
        client_status: sources.absorb(activity::CLIENT_STATUS, client_status),
        clients_added: sources.absorb(activity::DOMESTIC_CLIENTS, clients_added),
        reports: sources.absorb(activity::DAILY_REPORTS, reports),
        target: sources.absorb(activity::TARGETS, target),
    };

    Ok(compute(range, agents, inputs, sources.finish()))
}
