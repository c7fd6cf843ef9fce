//! LeadGen funnel metrics: calls, pick-up rate, sourcing and franchise stages.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::paging::BatchLimits;
use crate::errors::AppError;
use crate::models::interaction::CorporateInteraction;
use crate::models::lead::CorporateLead;
use crate::models::range::DateRange;
use crate::services::activity;
use crate::services::latest::{latest_by_key, Recency};
use crate::services::partial::{Availability, SourceLog};

/// Recency rule for the current status of a corporate lead.
pub const LEAD_STATUS_RECENCY: Recency = Recency::ContactDateThenCreatedAt;

static ACCEPTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)accept").unwrap());
static FORM_SHARED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)form[\s_-]*shared").unwrap());
static DISCUSSED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)discuss").unwrap());
/// Negation right before a stage keyword: "not accepted", "unaccepted", "didn't accept".
static NEGATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\b(?:not|never|no)|n't|\bun|\bnon)[\s_-]*$").unwrap());

/// Franchise pipeline stage read out of free-text `franchise_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FranchiseStage {
    Discussed,
    FormShared,
    Accepted,
}

impl FranchiseStage {
    /// Most advanced stage affirmed in the text, if any. A lead sits in
    /// exactly one stage.
    pub fn from_status(text: &str) -> Option<Self> {
        if affirms(&ACCEPTED, text) {
            Some(Self::Accepted)
        } else if affirms(&FORM_SHARED, text) {
            Some(Self::FormShared)
        } else if affirms(&DISCUSSED, text) {
            Some(Self::Discussed)
        } else {
            None
        }
    }
}

/// Whether `stage` occurs in `text` at least once without a negation in front.
fn affirms(stage: &Regex, text: &str) -> bool {
    stage
        .find_iter(text)
        .any(|m| !NEGATED.is_match(&text[..m.start()]))
}

/// Whether a call status means the contact did not pick up.
pub fn is_not_picked(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case("Not Picked")
}

/// Count with a per-agent breakdown. Every scoped agent appears, zeros included.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub total: u64,
    pub by_agent: BTreeMap<Uuid, u64>,
}

impl Counter {
    fn for_agents(agents: &[Uuid]) -> Self {
        Self {
            total: 0,
            by_agent: agents.iter().map(|a| (*a, 0)).collect(),
        }
    }

    fn bump(&mut self, agent: Uuid) {
        self.total += 1;
        *self.by_agent.entry(agent).or_default() += 1;
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartupSplit {
    pub total: u64,
    pub startup: u64,
    pub non_startup: u64,
}

impl StartupSplit {
    pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        flags.into_iter().fold(Self::default(), |mut acc, is_startup| {
            acc.total += 1;
            if is_startup {
                acc.startup += 1;
            } else {
                acc.non_startup += 1;
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FranchiseFunnel {
    pub discussed: u64,
    pub form_shared: u64,
    pub accepted: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadgenMetrics {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub agents: Vec<Uuid>,
    pub calls: Counter,
    pub not_picked: Counter,
    pub picked: Counter,
    pub unique_contacts: u64,
    pub leads_sourced: StartupSplit,
    pub franchise: FranchiseFunnel,
    pub latest_status: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub availability: Availability,
}

/// Reduce fetched rows into the metrics payload.
///
/// Rows belonging to other agents or dated outside `range` are ignored.
pub fn compute(
    range: DateRange,
    agents: &[Uuid],
    interactions: Vec<CorporateInteraction>,
    leads: Vec<CorporateLead>,
    availability: Availability,
) -> LeadgenMetrics {
    let scoped: HashSet<Uuid> = agents.iter().copied().collect();

    let in_scope: Vec<CorporateInteraction> = interactions
        .into_iter()
        .filter(|row| scoped.contains(&row.leadgen_id))
        .filter(|row| range.contains(row.contact_date.unwrap_or_else(|| row.created_at.date_naive())))
        .collect();

    let mut calls = Counter::for_agents(agents);
    let mut not_picked = Counter::for_agents(agents);
    let mut contacts: HashSet<(Uuid, String)> = HashSet::new();

    for row in &in_scope {
        calls.bump(row.leadgen_id);
        if is_not_picked(&row.status) {
            not_picked.bump(row.leadgen_id);
        }
        if let Some(person) = row.contact_person.as_deref() {
            let person = person.trim().to_lowercase();
            if !person.is_empty() {
                contacts.insert((row.lead_id, person));
            }
        }
    }

    let picked_by_agent: BTreeMap<Uuid, u64> = calls
        .by_agent
        .iter()
        .map(|(agent, n)| {
            let missed = not_picked.by_agent.get(agent).copied().unwrap_or(0);
            (*agent, n.saturating_sub(missed))
        })
        .collect();
    let picked = Counter {
        total: picked_by_agent.values().sum(),
        by_agent: picked_by_agent,
    };

    let mut franchise = FranchiseFunnel::default();
    let mut latest_status: BTreeMap<String, u64> = BTreeMap::new();
    for row in latest_by_key(in_scope, LEAD_STATUS_RECENCY).into_values() {
        *latest_status.entry(row.status.trim().to_string()).or_default() += 1;
        match row.franchise_status.as_deref().and_then(FranchiseStage::from_status) {
            Some(FranchiseStage::Discussed) => franchise.discussed += 1,
            Some(FranchiseStage::FormShared) => franchise.form_shared += 1,
            Some(FranchiseStage::Accepted) => franchise.accepted += 1,
            None => {}
        }
    }

    let leads_sourced = StartupSplit::from_flags(
        leads
            .iter()
            .filter(|lead| scoped.contains(&lead.leadgen_id) && range.contains(lead.sourcing_date))
            .map(|lead| lead.is_startup),
    );

    LeadgenMetrics {
        from_date: range.from,
        to_date: range.to,
        agents: agents.to_vec(),
        calls,
        not_picked,
        picked,
        unique_contacts: contacts.len() as u64,
        leads_sourced,
        franchise,
        latest_status,
        availability,
    }
}

/// Fetch and reduce LeadGen metrics for an already-scoped agent list.
pub async fn get_metrics(
    pool: &PgPool,
    limits: BatchLimits,
    agents: &[Uuid],
    range: DateRange,
) -> Result<LeadgenMetrics, AppError> {
    let (interactions, leads) = tokio::join!(
        activity::corporate_interactions(pool, limits, agents, range),
        activity::corporate_leads_sourced(pool, limits, agents, range),
    );

    let mut sources = SourceLog::new();
    let interactions = sources.absorb(activity::CORPORATE_INTERACTIONS, interactions);
    let leads = sources.absorb(activity::CORPORATE_LEADS, leads);

    Ok(compute(range, agents, interactions, leads, sources.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    fn range() -> DateRange {
        DateRange { from: d(1), to: d(30) }
    }

    fn agent(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn call(id: u128, lead: u128, by: u128, day: u32, status: &str) -> CorporateInteraction {
        CorporateInteraction {
            id: Uuid::from_u128(id),
            lead_id: Uuid::from_u128(lead),
            leadgen_id: agent(by),
            contact_date: Some(d(day)),
            contact_person: None,
            status: status.to_string(),
            sub_status: None,
            franchise_status: None,
            remarks: None,
            created_at: Utc.with_ymd_and_hms(2026, 9, day, 10, 0, 0).unwrap(),
        }
    }

    fn lead(id: u128, by: u128, day: u32, is_startup: bool) -> CorporateLead {
        CorporateLead {
            id: Uuid::from_u128(id),
            leadgen_id: agent(by),
            company_name: format!("Company {id}"),
            contact_person: None,
            contact_phone: None,
            contact_email: None,
            is_startup,
            sourcing_date: d(day),
            lock_date: None,
            projection: None,
            created_at: Utc.with_ymd_and_hms(2026, 9, day, 9, 0, 0).unwrap(),
        }
    }

    fn complete() -> Availability {
        SourceLog::new().finish()
    }

    #[test]
    fn two_agent_team_call_counts() {
        let agents = [agent(1), agent(2)];
        let rows = vec![
            call(10, 100, 1, 3, "Picked"),
            call(11, 101, 1, 4, "Not Picked"),
            call(12, 102, 2, 5, "Interested"),
        ];
        let m = compute(range(), &agents, rows, vec![], complete());
        assert_eq!(m.calls.total, 3);
        assert_eq!(m.not_picked.total, 1);
        assert_eq!(m.picked.total, 2);
        assert_eq!(m.picked.by_agent[&agent(1)], 1);
        assert_eq!(m.picked.by_agent[&agent(2)], 1);
    }

    #[test]
    fn picked_never_negative_under_skew() {
        // Every call is a not-picked row, so picked bottoms out at zero.
        let agents = [agent(1)];
        let rows = vec![call(1, 1, 1, 2, "not picked"), call(2, 1, 1, 3, " NOT PICKED ")];
        let m = compute(range(), &agents, rows, vec![], complete());
        assert_eq!(m.calls.total, 2);
        assert_eq!(m.not_picked.total, 2);
        assert_eq!(m.picked.total, 0);
    }

    #[test]
    fn rows_outside_scope_or_range_are_ignored() {
        let agents = [agent(1)];
        let mut stray = call(3, 9, 1, 1, "Picked");
        stray.contact_date = Some(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        let rows = vec![call(1, 1, 1, 2, "Picked"), call(2, 2, 7, 2, "Picked"), stray];
        let m = compute(range(), &agents, rows, vec![], complete());
        assert_eq!(m.calls.total, 1);
        assert!(!m.calls.by_agent.contains_key(&agent(7)));
    }

    #[test]
    fn idle_agents_report_zero() {
        let agents = [agent(1), agent(2)];
        let m = compute(range(), &agents, vec![call(1, 1, 1, 2, "Picked")], vec![], complete());
        assert_eq!(m.calls.by_agent[&agent(2)], 0);
        assert_eq!(m.picked.by_agent[&agent(2)], 0);
    }

    #[test]
    fn unique_contacts_dedupe_per_lead_case_insensitively() {
        let agents = [agent(1)];
        let mut a = call(1, 1, 1, 2, "Picked");
        a.contact_person = Some("Asha Rao".to_string());
        let mut b = call(2, 1, 1, 3, "Picked");
        b.contact_person = Some(" asha rao ".to_string());
        let mut c = call(3, 2, 1, 3, "Picked");
        c.contact_person = Some("Asha Rao".to_string());
        let mut blank = call(4, 3, 1, 3, "Picked");
        blank.contact_person = Some("  ".to_string());
        let m = compute(range(), &agents, vec![a, b, c, blank], vec![], complete());
        assert_eq!(m.unique_contacts, 2);
    }

    #[test]
    fn franchise_funnel_uses_latest_row_per_lead() {
        let agents = [agent(1)];
        let mut early = call(1, 50, 1, 2, "Picked");
        early.franchise_status = Some("Franchise discussed".to_string());
        let mut later = call(2, 50, 1, 9, "Picked");
        later.franchise_status = Some("Form Shared".to_string());
        let mut other = call(3, 51, 1, 4, "Picked");
        other.franchise_status = Some("franchise ACCEPTED".to_string());
        let mut third = call(4, 52, 1, 4, "Call back");
        third.franchise_status = Some("discussed briefly".to_string());

        let m = compute(range(), &agents, vec![later, early, other, third], vec![], complete());
        assert_eq!(
            m.franchise,
            FranchiseFunnel { discussed: 1, form_shared: 1, accepted: 1 }
        );
        assert_eq!(m.latest_status["Picked"], 2);
        assert_eq!(m.latest_status["Call back"], 1);
    }

    #[test]
    fn leads_sourced_split_by_startup_flag() {
        let agents = [agent(1)];
        let leads = vec![
            lead(1, 1, 2, true),
            lead(2, 1, 3, false),
            lead(3, 1, 4, true),
            lead(4, 2, 4, true),
        ];
        let m = compute(range(), &agents, vec![], leads, complete());
        assert_eq!(m.leads_sourced, StartupSplit { total: 3, startup: 2, non_startup: 1 });
    }

    #[test]
    fn franchise_stage_matching() {
        assert_eq!(FranchiseStage::from_status("Discussed"), Some(FranchiseStage::Discussed));
        assert_eq!(FranchiseStage::from_status("form_shared"), Some(FranchiseStage::FormShared));
        assert_eq!(FranchiseStage::from_status("Form shared & accepted"), Some(FranchiseStage::Accepted));
        assert_eq!(FranchiseStage::from_status("Not interested"), None);
    }

    #[test]
    fn negated_stage_does_not_count() {
        assert_eq!(FranchiseStage::from_status("Franchise not accepted"), None);
        assert_eq!(FranchiseStage::from_status("unaccepted"), None);
        assert_eq!(FranchiseStage::from_status("Form not shared yet"), None);
        assert_eq!(FranchiseStage::from_status("Client didn't accept"), None);
        assert_eq!(
            FranchiseStage::from_status("Discussed, not accepted"),
            Some(FranchiseStage::Discussed)
        );
        assert_eq!(
            FranchiseStage::from_status("Not accepted at first, accepted after revision"),
            Some(FranchiseStage::Accepted)
        );
    }

    #[test]
    fn underscored_status_is_a_regular_call() {
        let agents = [agent(1)];
        let rows = vec![call(1, 1, 1, 2, "Not Picked"), call(2, 1, 1, 3, "NOT_PICKED")];
        let m = compute(range(), &agents, rows, vec![], complete());
        assert_eq!(m.not_picked.total, 1);
        assert_eq!(m.picked.total, 1);
    }

    #[test]
    fn not_picked_variants() {
        assert!(is_not_picked("Not Picked"));
        assert!(is_not_picked("  not picked "));
        assert!(is_not_picked("NOT PICKED"));
        assert!(!is_not_picked("NOT_PICKED"));
        assert!(!is_not_picked("not-picked"));
        assert!(!is_not_picked("not   picked"));
        assert!(!is_not_picked("Picked"));
        assert!(!is_not_picked("Not picked up yet"));
    }

    #[test]
    fn serializes_camel_case_with_availability() {
        let agents = [agent(1)];
        let mut log = SourceLog::new();
        let _: Vec<u8> = log.absorb("corporate_leadgen_leads", Err(AppError::Internal("x".into())));
        let m = compute(range(), &agents, vec![call(1, 1, 1, 2, "Not Picked")], vec![], log.finish());
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["calls"]["total"], 1);
        assert_eq!(json["notPicked"]["total"], 1);
        assert_eq!(json["picked"]["total"], 0);
        assert_eq!(json["complete"], false);
        assert_eq!(json["unavailable"][0], "corporate_leadgen_leads");
    }
}
