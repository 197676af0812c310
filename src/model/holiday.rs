use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Holiday {
    pub organization_id: u64,
    pub date: NaiveDate,
    pub name: String,
}
