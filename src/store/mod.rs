//! Persistence seams for adjudication: loading a request with everything it
//! needs, committing the result, and the organization holiday calendar.

pub mod cache;
pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::adjudication::ledger::BalanceDebit;
use crate::error::StoreError;
use crate::model::employee::Employee;
use crate::model::leave_request::LeaveRequest;
use crate::model::leave_type::LeaveType;

pub use cache::CachedCalendar;
pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// A leave request loaded together with its leave type and the requester
/// (balances and reporting manager included).
#[derive(Debug, Clone)]
pub struct LeaveRecord {
    pub request: LeaveRequest,
    pub leave_type: LeaveType,
    pub employee: Employee,
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn load_request(&self, leave_id: u64) -> Result<Option<LeaveRecord>, StoreError>;

    /// Display name of an employee, used for reviewer names in notices.
    async fn employee_name(&self, employee_id: u64) -> Result<Option<String>, StoreError>;

    /// Writes the adjudicated request and applies `debit` in one unit of work.
    ///
    /// Returns the balance after the debit when one was applied.
    async fn commit(
        &self,
        request: &LeaveRequest,
        debit: Option<&BalanceDebit>,
    ) -> Result<Option<f64>, StoreError>;
}

#[async_trait]
pub trait HolidayCalendar: Send + Sync {
    /// Holidays of `organization_id` dated within `[from, to]`.
    async fn holidays_between(
        &self,
        organization_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError>;
}
