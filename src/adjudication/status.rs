use crate::model::leave_request::{Verdict, VerdictKind};

/// Turns per-day counts into the request's verdict.
///
/// `None` means the request stays pending: no day list, or the decisions
/// neither cover every day one way nor mix approvals with rejections.
pub fn classify(total_days: usize, approved: usize, rejected: usize, reviewer_id: u64) -> Option<Verdict> {
    if total_days == 0 {
        return None;
    }

    let kind = if approved == total_days {
        VerdictKind::Approved
    } else if rejected == total_days {
        VerdictKind::Rejected
    } else if approved > 0 && rejected > 0 {
        VerdictKind::PartiallyApproved
    } else {
        return None;
    };

    Some(Verdict { kind, reviewer_id })
}
