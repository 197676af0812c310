use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveBalance {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub organization_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Calling code used together with `phone`, e.g. "880"
    pub country_code: Option<String>,
    pub reporting_manager_id: Option<u64>,
    pub balances: Vec<LeaveBalance>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Phone and calling code, only when a usable phone is on file.
    pub fn phone_contact(&self) -> Option<(&str, &str)> {
        let phone = self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())?;
        Some((phone, self.country_code.as_deref().unwrap_or("")))
    }
}
