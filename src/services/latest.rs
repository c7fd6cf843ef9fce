//! Latest-record resolution over append-only logs.
//!
//! A row "wins" for its key when it has the greatest sort key under the
//! chosen [`Recency`]. Exact ties go to the greater row id, so the result
//! does not depend on the order rows were fetched in.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A row in a keyed, timestamped log.
pub trait Timeline {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
    fn contact_date(&self) -> Option<NaiveDate>;
}

/// Which timestamp decides recency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    /// Insertion time only.
    CreatedAt,
    /// When the contact happened, then insertion time. Rows without a
    /// contact date sort before rows that have one.
    ContactDateThenCreatedAt,
}

impl Recency {
    pub fn compare<T: Timeline>(&self, a: &T, b: &T) -> Ordering {
        let by_time = match self {
            Recency::CreatedAt => a.created_at().cmp(&b.created_at()),
            Recency::ContactDateThenCreatedAt => a
                .contact_date()
                .cmp(&b.contact_date())
                .then_with(|| a.created_at().cmp(&b.created_at())),
        };
        by_time.then_with(|| a.id().cmp(&b.id()))
    }
}

/// Keep only the newest row per key.
pub fn latest_by_key<T, I>(rows: I, recency: Recency) -> HashMap<T::Key, T>
where
    T: Timeline,
    I: IntoIterator<Item = T>,
{
    let mut latest: HashMap<T::Key, T> = HashMap::new();
    for row in rows {
        match latest.get(&row.key()) {
            Some(current) if recency.compare(&row, current) != Ordering::Greater => {}
            _ => {
                latest.insert(row.key(), row);
            }
        }
    }
    latest
}
