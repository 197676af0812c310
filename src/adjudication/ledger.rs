use thiserror::Error;

use crate::model::employee::Employee;

/// A debit against one balance entry, planned before the commit and applied
/// by the store as a single decrement-with-floor.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceDebit {
    pub balance_id: u64,
    pub employee_id: u64,
    pub amount: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("no leave balance for employee {employee_id} and leave type {leave_type_id}")]
    MissingBalance { employee_id: u64, leave_type_id: u64 },
}

/// Subtracts `amount` from `balance`, never going below zero.
pub fn floor_debit(balance: f64, amount: f64) -> f64 {
    (balance - amount).max(0.0)
}

/// Finds the employee's balance for `leave_type_id` and plans the debit.
///
/// Matching is by leave type id only. Returns `Ok(None)` when there is
/// nothing to charge.
pub fn plan_debit(
    employee: &Employee,
    leave_type_id: u64,
    amount: f64,
) -> Result<Option<BalanceDebit>, LedgerError> {
    let entry = employee
        .balances
        .iter()
        .find(|b| b.leave_type_id == leave_type_id)
        .ok_or(LedgerError::MissingBalance {
            employee_id: employee.id,
            leave_type_id,
        })?;

    if amount <= 0.0 {
        return Ok(None);
    }

    Ok(Some(BalanceDebit {
        balance_id: entry.id,
        employee_id: employee.id,
        amount,
    }))
}
