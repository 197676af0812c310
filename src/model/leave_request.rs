use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Overall status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(rename = "Partially Approved")]
    #[strum(serialize = "Partially Approved")]
    PartiallyApproved,
}

/// Status of a single day inside a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum DayStatus {
    Pending,
    Approved,
    Rejected,
}

/// Portion of a day a leave day covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema)]
pub enum LeaveDayUnit {
    #[serde(rename = "Full Day")]
    #[strum(serialize = "Full Day")]
    FullDay,
    #[serde(rename = "1st Half")]
    #[strum(serialize = "1st Half")]
    FirstHalf,
    #[serde(rename = "2nd Half")]
    #[strum(serialize = "2nd Half")]
    SecondHalf,
    #[serde(rename = "1st Quarter")]
    #[strum(serialize = "1st Quarter")]
    FirstQuarter,
    #[serde(rename = "2nd Quarter")]
    #[strum(serialize = "2nd Quarter")]
    SecondQuarter,
    #[serde(rename = "3rd Quarter")]
    #[strum(serialize = "3rd Quarter")]
    ThirdQuarter,
    #[serde(rename = "4th Quarter")]
    #[strum(serialize = "4th Quarter")]
    FourthQuarter,
}

impl LeaveDayUnit {
    /// Fraction of a working day this unit represents.
    pub fn weight(self) -> f64 {
        match self {
            LeaveDayUnit::FullDay => 1.0,
            LeaveDayUnit::FirstHalf | LeaveDayUnit::SecondHalf => 0.5,
            LeaveDayUnit::FirstQuarter
            | LeaveDayUnit::SecondQuarter
            | LeaveDayUnit::ThirdQuarter
            | LeaveDayUnit::FourthQuarter => 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveDay {
    pub id: u64,
    pub date: NaiveDate,
    pub unit: LeaveDayUnit,
    pub status: DayStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictKind {
    Approved,
    Rejected,
    PartiallyApproved,
}

/// The final word on a request together with the reviewer who gave it.
///
/// A partially approved request names the same reviewer as approver and
/// rejecter, so both references are derived from this one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub reviewer_id: u64,
}

impl Verdict {
    pub fn status(&self) -> LeaveStatus {
        match self.kind {
            VerdictKind::Approved => LeaveStatus::Approved,
            VerdictKind::Rejected => LeaveStatus::Rejected,
            VerdictKind::PartiallyApproved => LeaveStatus::PartiallyApproved,
        }
    }

    pub fn approver(&self) -> Option<u64> {
        match self.kind {
            VerdictKind::Approved | VerdictKind::PartiallyApproved => Some(self.reviewer_id),
            VerdictKind::Rejected => None,
        }
    }

    pub fn rejecter(&self) -> Option<u64> {
        match self.kind {
            VerdictKind::Rejected | VerdictKind::PartiallyApproved => Some(self.reviewer_id),
            VerdictKind::Approved => None,
        }
    }

    /// Rebuilds a verdict from the stored approver/rejecter columns.
    pub fn from_columns(approved_by: Option<u64>, rejected_by: Option<u64>) -> Option<Self> {
        match (approved_by, rejected_by) {
            (Some(a), Some(_)) => Some(Verdict { kind: VerdictKind::PartiallyApproved, reviewer_id: a }),
            (Some(a), None) => Some(Verdict { kind: VerdictKind::Approved, reviewer_id: a }),
            (None, Some(r)) => Some(Verdict { kind: VerdictKind::Rejected, reviewer_id: r }),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type_id: u64,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: LeaveStatus,
    pub applied_days: f64,
    pub days: Vec<LeaveDay>,
    pub remarks: Option<String>,
    pub verdict: Option<Verdict>,
}

impl LeaveRequest {
    pub fn approved_by(&self) -> Option<u64> {
        self.verdict.and_then(|v| v.approver())
    }

    pub fn rejected_by(&self) -> Option<u64> {
        self.verdict.and_then(|v| v.rejecter())
    }
}
