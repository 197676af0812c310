use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveType {
    pub id: u64,
    pub name: String,
    /// Approved days falling on a holiday are not charged
    pub include_holidays: bool,
    /// Approved days falling on a week-off are not charged
    pub include_week_offs: bool,
}
