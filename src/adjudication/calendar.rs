//! Dates inside a leave range that do not consume leave balance.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, ParseWeekdayError, Weekday};

use crate::error::StoreError;
use crate::model::leave_type::LeaveType;
use crate::store::HolidayCalendar;

/// Weekdays the organization does not work on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekOffs(Vec<Weekday>);

impl WeekOffs {
    pub fn new(days: Vec<Weekday>) -> Self {
        Self(days)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date.weekday())
    }
}

impl Default for WeekOffs {
    fn default() -> Self {
        Self(vec![Weekday::Sat, Weekday::Sun])
    }
}

/// Parses a comma separated list such as `Fri,Sat`.
impl FromStr for WeekOffs {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(Weekday::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(WeekOffs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionPolicy {
    pub holidays: bool,
    pub week_offs: bool,
}

impl From<&LeaveType> for ExclusionPolicy {
    fn from(leave_type: &LeaveType) -> Self {
        Self {
            holidays: leave_type.include_holidays,
            week_offs: leave_type.include_week_offs,
        }
    }
}

/// Resolves the exclusion set for `[from, to]`.
///
/// The holiday calendar is only queried when the policy asks for holidays.
pub async fn resolve_exclusions(
    calendar: &dyn HolidayCalendar,
    organization_id: u64,
    from: NaiveDate,
    to: NaiveDate,
    policy: ExclusionPolicy,
    week_offs: &WeekOffs,
) -> Result<BTreeSet<NaiveDate>, StoreError> {
    let mut excluded = BTreeSet::new();
    if from > to {
        return Ok(excluded);
    }

    if policy.holidays {
        excluded.extend(calendar.holidays_between(organization_id, from, to).await?);
    }

    if policy.week_offs {
        excluded.extend(
            from.iter_days()
                .take_while(|d| *d <= to)
                .filter(|d| week_offs.contains(*d)),
        );
    }

    Ok(excluded)
}
