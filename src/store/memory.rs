//! In-memory leave store, used by tests and local runs without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::{HolidayCalendar, LeaveRecord, LeaveStore};
use crate::adjudication::ledger::{BalanceDebit, floor_debit};
use crate::error::StoreError;
use crate::model::employee::Employee;
use crate::model::holiday::Holiday;
use crate::model::leave_request::LeaveRequest;
use crate::model::leave_type::LeaveType;

#[derive(Default)]
struct State {
    requests: HashMap<u64, LeaveRequest>,
    leave_types: HashMap<u64, LeaveType>,
    employees: HashMap<u64, Employee>,
    holidays: Vec<Holiday>,
    fail_commits: bool,
}

/// Every operation runs under one lock, so a commit's request write and
/// balance decrement are observed together or not at all.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_leave_type(&self, leave_type: LeaveType) {
        self.state.lock().await.leave_types.insert(leave_type.id, leave_type);
    }

    pub async fn insert_employee(&self, employee: Employee) {
        self.state.lock().await.employees.insert(employee.id, employee);
    }

    pub async fn insert_request(&self, request: LeaveRequest) {
        self.state.lock().await.requests.insert(request.id, request);
    }

    pub async fn insert_holiday(&self, holiday: Holiday) {
        self.state.lock().await.holidays.push(holiday);
    }

    pub async fn request(&self, leave_id: u64) -> Option<LeaveRequest> {
        self.state.lock().await.requests.get(&leave_id).cloned()
    }

    pub async fn balance(&self, employee_id: u64, leave_type_id: u64) -> Option<f64> {
        let state = self.state.lock().await;
        state
            .employees
            .get(&employee_id)?
            .balances
            .iter()
            .find(|b| b.leave_type_id == leave_type_id)
            .map(|b| b.balance)
    }

    /// Makes every following commit fail, as a lost database connection would.
    pub async fn fail_commits(&self, fail: bool) {
        self.state.lock().await.fail_commits = fail;
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn load_request(&self, leave_id: u64) -> Result<Option<LeaveRecord>, StoreError> {
        let state = self.state.lock().await;
        let Some(request) = state.requests.get(&leave_id) else {
            return Ok(None);
        };

        let leave_type = state
            .leave_types
            .get(&request.leave_type_id)
            .cloned()
            .ok_or_else(|| StoreError::Corrupt {
                table: "leave_types",
                message: format!("leave type {} missing", request.leave_type_id),
            })?;
        let employee = state
            .employees
            .get(&request.employee_id)
            .cloned()
            .ok_or_else(|| StoreError::Corrupt {
                table: "employees",
                message: format!("employee {} missing", request.employee_id),
            })?;

        Ok(Some(LeaveRecord {
            request: request.clone(),
            leave_type,
            employee,
        }))
    }

    async fn employee_name(&self, employee_id: u64) -> Result<Option<String>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.employees.get(&employee_id).map(Employee::full_name))
    }

    async fn commit(
        &self,
        request: &LeaveRequest,
        debit: Option<&BalanceDebit>,
    ) -> Result<Option<f64>, StoreError> {
        let mut state = self.state.lock().await;
        if state.fail_commits {
            return Err(StoreError::Corrupt {
                table: "leave_requests",
                message: "commits disabled".to_string(),
            });
        }

        let mut balance_after = None;
        if let Some(debit) = debit {
            let entry = state
                .employees
                .get_mut(&debit.employee_id)
                .and_then(|e| e.balances.iter_mut().find(|b| b.id == debit.balance_id))
                .ok_or_else(|| StoreError::Corrupt {
                    table: "leave_balances",
                    message: format!("balance {} missing", debit.balance_id),
                })?;
            entry.balance = floor_debit(entry.balance, debit.amount);
            balance_after = Some(entry.balance);
        }

        state.requests.insert(request.id, request.clone());
        Ok(balance_after)
    }
}

#[async_trait]
impl HolidayCalendar for MemoryStore {
    async fn holidays_between(
        &self,
        organization_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        let state = self.state.lock().await;
        let mut dates: Vec<NaiveDate> = state
            .holidays
            .iter()
            .filter(|h| h.organization_id == organization_id && h.date >= from && h.date <= to)
            .map(|h| h.date)
            .collect();
        dates.sort();
        Ok(dates)
    }
}
