use chrono::NaiveDate;
use tera::{Context, Tera};

use crate::model::leave_request::LeaveStatus;

pub const APPROVED_TEMPLATE: &str = "leave_approved";
pub const PARTIALLY_APPROVED_TEMPLATE: &str = "leave_partially_approved";

/// `dd MMM yy`, e.g. `05 Jan 26`
const DATE_FORMAT: &str = "%d %b %y";
const NO_REMARKS: &str = "No remarks";

/// Everything a notice about one adjudicated request says.
#[derive(Debug, Clone)]
pub struct NoticeContext<'a> {
    pub status: LeaveStatus,
    pub employee_name: &'a str,
    pub reviewer_name: &'a str,
    pub leave_type: &'a str,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub applied_days: f64,
    pub approved_for: f64,
    pub remarks: Option<&'a str>,
}

impl NoticeContext<'_> {
    fn remarks(&self) -> &str {
        self.remarks.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(NO_REMARKS)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplatedMessage {
    pub template: &'static str,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailNotice {
    pub subject: String,
    pub html: String,
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Builds the phone message. Only approvals (full or partial) have one.
pub fn message_for(ctx: &NoticeContext<'_>) -> Option<TemplatedMessage> {
    let template = match ctx.status {
        LeaveStatus::Approved => APPROVED_TEMPLATE,
        LeaveStatus::PartiallyApproved => PARTIALLY_APPROVED_TEMPLATE,
        LeaveStatus::Rejected | LeaveStatus::Pending => return None,
    };

    let mut params = vec![
        ctx.employee_name.to_string(),
        ctx.reviewer_name.to_string(),
        ctx.leave_type.to_string(),
        format_date(ctx.from),
        format_date(ctx.to),
        ctx.applied_days.to_string(),
    ];
    if ctx.status == LeaveStatus::PartiallyApproved {
        params.push(ctx.approved_for.to_string());
    }
    params.push(ctx.remarks().to_string());

    Some(TemplatedMessage { template, params })
}

/// Registered name; the `.html` suffix turns on autoescaping.
const EMAIL_TEMPLATE_NAME: &str = "leave_notice.html";

const EMAIL_TEMPLATE: &str = r#"<p>Hi {{ employee }},</p>
<p>Your {{ leave_type }} request has been <strong>{{ verb }}</strong> by {{ reviewer }}.</p>
<table>
<tr><td>From</td><td>{{ from }}</td></tr>
<tr><td>To</td><td>{{ to }}</td></tr>
<tr><td>Applied days</td><td>{{ applied_days }}</td></tr>
{% if partial %}<tr><td>Approved days</td><td>{{ approved_for }}</td></tr>
{% endif %}<tr><td>Remarks</td><td>{{ remarks }}</td></tr>
</table>
<p><a href="{{ link | safe }}">View your leave dashboard</a></p>"#;

/// HTML email renderer, built once per dispatcher.
pub struct EmailTemplates {
    engine: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut engine = Tera::default();
        engine.add_raw_template(EMAIL_TEMPLATE_NAME, EMAIL_TEMPLATE)?;
        Ok(Self { engine })
    }

    pub fn render(&self, ctx: &NoticeContext<'_>, dashboard_url: &str) -> Result<EmailNotice, tera::Error> {
        let (subject, verb) = match ctx.status {
            LeaveStatus::Approved => ("Leave Request Approved", "approved"),
            LeaveStatus::PartiallyApproved => ("Leave Request Partially Approved", "partially approved"),
            LeaveStatus::Rejected => ("Leave Request Rejected", "rejected"),
            LeaveStatus::Pending => ("Leave Request Updated", "reviewed"),
        };

        let mut context = Context::new();
        context.insert("employee", ctx.employee_name);
        context.insert("leave_type", ctx.leave_type);
        context.insert("verb", verb);
        context.insert("reviewer", ctx.reviewer_name);
        context.insert("from", &format_date(ctx.from));
        context.insert("to", &format_date(ctx.to));
        context.insert("applied_days", &ctx.applied_days.to_string());
        context.insert("partial", &(ctx.status == LeaveStatus::PartiallyApproved));
        context.insert("approved_for", &ctx.approved_for.to_string());
        context.insert("remarks", ctx.remarks());
        context.insert("link", &format!("{}/leave", dashboard_url.trim_end_matches('/')));

        let html = self.engine.render(EMAIL_TEMPLATE_NAME, &context)?;
        Ok(EmailNotice { subject: subject.to_string(), html })
    }
}
