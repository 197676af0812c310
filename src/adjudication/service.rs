use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::calendar::{ExclusionPolicy, WeekOffs, resolve_exclusions};
use super::ledger::plan_debit;
use super::merge::{DayDecision, merge_decisions};
use super::status::classify;
use crate::error::{AdjudicationError, AdjudicationResult};
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveStatus, VerdictKind};
use crate::model::role::Role;
use crate::notify::{NotificationJob, NotificationQueue};
use crate::store::{HolidayCalendar, LeaveRecord, LeaveStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Approve,
    Reject,
}

impl Action {
    fn default_remarks(self) -> &'static str {
        match self {
            Action::Approve => "Leave approved",
            Action::Reject => "Leave rejected",
        }
    }
}

/// The acting reviewer, as resolved from the caller's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reviewer {
    pub employee_id: u64,
    pub role: Role,
}

impl Reviewer {
    fn may_review(&self, employee: &Employee) -> bool {
        self.role.reviews_everyone() || employee.reporting_manager_id == Some(self.employee_id)
    }
}

#[derive(Debug, Clone)]
pub struct AdjudicationCommand {
    pub leave_id: u64,
    pub reviewer: Reviewer,
    pub action: Action,
    pub decisions: Vec<DayDecision>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub leave_id: u64,
    pub status: LeaveStatus,
    pub approved_days: usize,
    pub rejected_days: usize,
    /// Amount charged against the balance; zero unless the request was approved
    pub approved_for: f64,
    pub balance_after: Option<f64>,
}

/// Runs one adjudication from load to commit and queues the notification.
pub struct Adjudicator {
    store: Arc<dyn LeaveStore>,
    calendar: Arc<dyn HolidayCalendar>,
    week_offs: WeekOffs,
    notifications: NotificationQueue,
}

impl Adjudicator {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        calendar: Arc<dyn HolidayCalendar>,
        week_offs: WeekOffs,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            store,
            calendar,
            week_offs,
            notifications,
        }
    }

    #[instrument(
        name = "adjudicate_leave",
        skip(self, command),
        fields(leave_id = command.leave_id, reviewer_id = command.reviewer.employee_id)
    )]
    pub async fn adjudicate(&self, command: AdjudicationCommand) -> AdjudicationResult<Settlement> {
        let LeaveRecord { mut request, leave_type, employee } = self
            .store
            .load_request(command.leave_id)
            .await?
            .ok_or(AdjudicationError::NotFound { leave_id: command.leave_id })?;

        if !command.reviewer.may_review(&employee) {
            return Err(AdjudicationError::Forbidden {
                reviewer_id: command.reviewer.employee_id,
                employee_id: employee.id,
            });
        }

        request.remarks = Some(
            command
                .remarks
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| command.action.default_remarks().to_string()),
        );

        if command.decisions.is_empty() {
            return Err(AdjudicationError::MissingDayDecisions);
        }

        let excluded = resolve_exclusions(
            self.calendar.as_ref(),
            employee.organization_id,
            request.from_date,
            request.to_date,
            ExclusionPolicy::from(&leave_type),
            &self.week_offs,
        )
        .await?;

        let merged = merge_decisions(&mut request.days, &command.decisions, &excluded);
        let verdict = classify(
            request.days.len(),
            merged.approved_days,
            merged.rejected_days,
            command.reviewer.employee_id,
        );

        let mut debit = None;
        let mut approved_for = 0.0;
        match verdict {
            Some(verdict) => {
                request.status = verdict.status();
                request.verdict = Some(verdict);

                if matches!(verdict.kind, VerdictKind::Approved | VerdictKind::PartiallyApproved) {
                    approved_for = merged.approved_for;
                    match plan_debit(&employee, leave_type.id, merged.approved_for) {
                        Ok(planned) => debit = planned,
                        // Still adjudicated; flagged for an administrator to fix the balance.
                        Err(e) => warn!(error = %e, employee_id = employee.id, "Balance not debited"),
                    }
                }
            }
            None => info!(
                approved = merged.approved_days,
                rejected = merged.rejected_days,
                "Decisions left the request pending"
            ),
        }

        let balance_after = self.store.commit(&request, debit.as_ref()).await?;

        info!(
            status = %request.status,
            approved_for,
            balance_after = ?balance_after,
            "Leave request adjudicated"
        );

        let settlement = Settlement {
            leave_id: request.id,
            status: request.status,
            approved_days: merged.approved_days,
            rejected_days: merged.rejected_days,
            approved_for,
            balance_after,
        };

        if verdict.is_some() {
            self.notifications
                .enqueue(NotificationJob::new(request, employee, leave_type, approved_for));
        }

        Ok(settlement)
    }
}
