//! Partial-failure bookkeeping for multi-source metrics.
//!
//! A failed source degrades to an empty result but is named in the response,
//! so a dashboard can tell "no activity" apart from "data unavailable".

use serde::Serialize;

use crate::errors::AppError;

/// Collects the names of sources whose query failed.
#[derive(Debug, Default)]
pub struct SourceLog {
    unavailable: Vec<&'static str>,
}

impl SourceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwrap a source result, substituting the empty value on failure.
    pub fn absorb<T: Default>(&mut self, source: &'static str, result: Result<T, AppError>) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(source, error = %e, "Metrics source unavailable");
                if !self.unavailable.contains(&source) {
                    self.unavailable.push(source);
                }
                T::default()
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty()
    }

    pub fn finish(self) -> Availability {
        Availability {
            complete: self.unavailable.is_empty(),
            unavailable: self.unavailable,
        }
    }
}

/// Serialized alongside every metrics payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub complete: bool,
    pub unavailable: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successes_pass_through() {
        let mut log = SourceLog::new();
        let rows: Vec<u32> = log.absorb("calls", Ok(vec![1, 2]));
        assert_eq!(rows, vec![1, 2]);
        assert!(log.is_complete());
        assert_eq!(log.finish(), Availability { complete: true, unavailable: vec![] });
    }

    #[test]
    fn failures_become_empty_and_are_named_once() {
        let mut log = SourceLog::new();
        let rows: Vec<u32> = log.absorb("calls", Err(AppError::Internal("timeout".into())));
        let again: Vec<u32> = log.absorb("calls", Err(AppError::Internal("timeout".into())));
        let other: Vec<u32> = log.absorb("leads", Ok(vec![7]));
        assert!(rows.is_empty() && again.is_empty());
        assert_eq!(other, vec![7]);

        let availability = log.finish();
        assert!(!availability.complete);
        assert_eq!(availability.unavailable, vec!["calls"]);
    }
}
