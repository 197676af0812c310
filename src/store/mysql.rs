use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, MySqlPool};

use super::{HolidayCalendar, LeaveRecord, LeaveStore};
use crate::adjudication::ledger::BalanceDebit;
use crate::error::StoreError;
use crate::model::employee::{Employee, LeaveBalance};
use crate::model::leave_request::{DayStatus, LeaveDay, LeaveDayUnit, LeaveRequest, LeaveStatus, Verdict};
use crate::model::leave_type::LeaveType;

#[derive(FromRow)]
struct LeaveRequestRow {
    id: u64,
    employee_id: u64,
    leave_type_id: u64,
    from_date: NaiveDate,
    to_date: NaiveDate,
    status: String,
    applied_days: f64,
    remarks: Option<String>,
    approved_by: Option<u64>,
    rejected_by: Option<u64>,
}

#[derive(FromRow)]
struct LeaveDayRow {
    id: u64,
    date: NaiveDate,
    unit: String,
    status: String,
}

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    organization_id: u64,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    country_code: Option<String>,
    reporting_manager_id: Option<u64>,
}

fn parse_label<T: FromStr>(table: &'static str, value: &str) -> Result<T, StoreError> {
    value.parse().map_err(|_| StoreError::Corrupt {
        table,
        message: format!("unknown label '{value}'"),
    })
}

impl TryFrom<LeaveDayRow> for LeaveDay {
    type Error = StoreError;

    fn try_from(row: LeaveDayRow) -> Result<Self, Self::Error> {
        Ok(LeaveDay {
            id: row.id,
            date: row.date,
            unit: parse_label::<LeaveDayUnit>("leave_request_days", &row.unit)?,
            status: parse_label::<DayStatus>("leave_request_days", &row.status)?,
        })
    }
}

/// Leave store and holiday calendar over the MySQL schema in `migrations/`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn load_request(&self, leave_id: u64) -> Result<Option<LeaveRecord>, StoreError> {
        let Some(row) = sqlx::query_as::<_, LeaveRequestRow>(
            r#"
            SELECT id, employee_id, leave_type_id, from_date, to_date, status,
                   applied_days, remarks, approved_by, rejected_by
            FROM leave_requests
            WHERE id = ?
            "#,
        )
        .bind(leave_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let days = sqlx::query_as::<_, LeaveDayRow>(
            r#"
            SELECT id, date, unit, status
            FROM leave_request_days
            WHERE leave_request_id = ?
            ORDER BY date, id
            "#,
        )
        .bind(leave_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(LeaveDay::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let leave_type = sqlx::query_as::<_, LeaveType>(
            "SELECT id, name, include_holidays, include_week_offs FROM leave_types WHERE id = ?",
        )
        .bind(row.leave_type_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::Corrupt {
            table: "leave_types",
            message: format!("leave type {} missing", row.leave_type_id),
        })?;

        let employee = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, organization_id, first_name, last_name, email,
                   phone, country_code, reporting_manager_id
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(row.employee_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::Corrupt {
            table: "employees",
            message: format!("employee {} missing", row.employee_id),
        })?;

        let balances = sqlx::query_as::<_, LeaveBalance>(
            "SELECT id, employee_id, leave_type_id, balance FROM leave_balances WHERE employee_id = ?",
        )
        .bind(employee.id)
        .fetch_all(&self.pool)
        .await?;

        let request = LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type_id: row.leave_type_id,
            from_date: row.from_date,
            to_date: row.to_date,
            status: parse_label::<LeaveStatus>("leave_requests", &row.status)?,
            applied_days: row.applied_days,
            days,
            remarks: row.remarks,
            verdict: Verdict::from_columns(row.approved_by, row.rejected_by),
        };

        Ok(Some(LeaveRecord {
            request,
            leave_type,
            employee: Employee {
                id: employee.id,
                organization_id: employee.organization_id,
                first_name: employee.first_name,
                last_name: employee.last_name,
                email: employee.email,
                phone: employee.phone,
                country_code: employee.country_code,
                reporting_manager_id: employee.reporting_manager_id,
                balances,
            },
        }))
    }

    async fn employee_name(&self, employee_id: u64) -> Result<Option<String>, StoreError> {
        let name = sqlx::query_as::<_, (String, String)>(
            "SELECT first_name, last_name FROM employees WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name.map(|(first, last)| format!("{first} {last}").trim().to_string()))
    }

    async fn commit(
        &self,
        request: &LeaveRequest,
        debit: Option<&BalanceDebit>,
    ) -> Result<Option<f64>, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, remarks = ?, approved_by = ?, rejected_by = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(request.status.as_ref())
        .bind(request.remarks.as_deref())
        .bind(request.approved_by())
        .bind(request.rejected_by())
        .bind(request.id)
        .execute(&mut *tx)
        .await?;

        for day in &request.days {
            sqlx::query("UPDATE leave_request_days SET status = ? WHERE id = ? AND leave_request_id = ?")
                .bind(day.status.as_ref())
                .bind(day.id)
                .bind(request.id)
                .execute(&mut *tx)
                .await?;
        }

        let mut balance_after = None;
        if let Some(debit) = debit {
            // Decrement in place so concurrent adjudications against the same
            // balance cannot overwrite each other.
            sqlx::query("UPDATE leave_balances SET balance = GREATEST(balance - ?, 0) WHERE id = ?")
                .bind(debit.amount)
                .bind(debit.balance_id)
                .execute(&mut *tx)
                .await?;

            let balance = sqlx::query_scalar::<_, f64>("SELECT balance FROM leave_balances WHERE id = ?")
                .bind(debit.balance_id)
                .fetch_one(&mut *tx)
                .await?;
            balance_after = Some(balance);
        }

        tx.commit().await?;
        Ok(balance_after)
    }
}

#[async_trait]
impl HolidayCalendar for MySqlStore {
    async fn holidays_between(
        &self,
        organization_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT date
            FROM holidays
            WHERE organization_id = ?
            AND date BETWEEN ? AND ?
            ORDER BY date
            "#,
        )
        .bind(organization_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_row_labels_map_onto_model() {
        let day = LeaveDay::try_from(LeaveDayRow {
            id: 5,
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            unit: "1st Quarter".to_string(),
            status: "Pending".to_string(),
        })
        .unwrap();

        assert_eq!(day.unit, LeaveDayUnit::FirstQuarter);
        assert_eq!(day.status, DayStatus::Pending);
    }

    #[test]
    fn unknown_labels_are_corrupt_records() {
        let err = LeaveDay::try_from(LeaveDayRow {
            id: 5,
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            unit: "Half Day".to_string(),
            status: "Pending".to_string(),
        })
        .unwrap_err();

        assert!(matches!(err, StoreError::Corrupt { table: "leave_request_days", .. }));
    }
}
