use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::leave_request::{DayStatus, LeaveDay, LeaveDayUnit};

/// What a reviewer may decide for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DecisionStatus {
    Approved,
    Rejected,
}

impl From<DecisionStatus> for DayStatus {
    fn from(status: DecisionStatus) -> Self {
        match status {
            DecisionStatus::Approved => DayStatus::Approved,
            DecisionStatus::Rejected => DayStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayDecision {
    pub date: NaiveDate,
    pub unit: LeaveDayUnit,
    pub status: DecisionStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MergeOutcome {
    pub approved_days: usize,
    pub rejected_days: usize,
    /// Weight of approved days outside the exclusion set
    pub approved_for: f64,
}

/// Applies `decisions` onto `days`, matching by calendar date.
///
/// Each day takes the first decision dated the same day; its own unit sets
/// the weight. Days without a decision keep their status and are not
/// counted, and decisions for dates outside the request are dropped.
pub fn merge_decisions(
    days: &mut [LeaveDay],
    decisions: &[DayDecision],
    excluded: &BTreeSet<NaiveDate>,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for day in days.iter_mut() {
        let Some(decision) = decisions.iter().find(|d| d.date == day.date) else {
            continue;
        };

        if decision.unit != day.unit {
            tracing::debug!(
                date = %day.date,
                stored = %day.unit,
                decided = %decision.unit,
                "Decision unit differs from the request, stored unit charged"
            );
        }

        day.status = decision.status.into();
        match decision.status {
            DecisionStatus::Approved => {
                outcome.approved_days += 1;
                if !excluded.contains(&day.date) {
                    outcome.approved_for += day.unit.weight();
                }
            }
            DecisionStatus::Rejected => outcome.rejected_days += 1,
        }
    }

    let unmatched = decisions
        .iter()
        .filter(|d| !days.iter().any(|day| day.date == d.date))
        .count();
    if unmatched > 0 {
        tracing::debug!(unmatched, "Dropped decisions for dates outside the request");
    }

    outcome
}
