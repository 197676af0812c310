use crate::adjudication::{Action, AdjudicationCommand, Adjudicator, DayDecision, DecisionStatus};
use crate::auth::auth::AuthUser;
use crate::model::leave_request::LeaveDayUnit;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDayDecision {
    /// Day being decided; a plain date or a full ISO-8601 timestamp
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    #[serde(deserialize_with = "calendar_day")]
    pub date: NaiveDate,
    pub unit: LeaveDayUnit,
    pub status: DecisionStatus,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjudicateLeave {
    pub action: Action,
    #[schema(example = "Enjoy your time off")]
    pub remarks: Option<String>,
    #[serde(default)]
    pub leave_days: Vec<LeaveDayDecision>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjudicationResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = 4.0)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_for: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AdjudicationResponse {
    pub fn settled(approved_for: f64) -> Self {
        Self { success: true, approved_for: Some(approved_for), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, approved_for: None, error: Some(error.into()) }
    }
}

/// Accepts `2026-01-05` as well as `2026-01-05T00:00:00.000Z`.
fn calendar_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<NaiveDate>()
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

/// Swagger doc for adjudicate_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave/{leave_id}/adjudicate",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to adjudicate")
    ),
    request_body(
        content = AdjudicateLeave,
        description = "Per-day decisions of the reviewer",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Adjudication result; check `success`", body = AdjudicationResponse,
         example = json!({
            "success": true,
            "approvedFor": 4.0
         })
        ),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller has no employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn adjudicate_leave(
    auth: AuthUser,
    adjudicator: web::Data<Adjudicator>,
    path: web::Path<u64>,
    payload: web::Json<AdjudicateLeave>,
) -> actix_web::Result<impl Responder> {
    let reviewer = auth.reviewer()?;
    let leave_id = path.into_inner();
    let AdjudicateLeave { action, remarks, leave_days } = payload.into_inner();

    let command = AdjudicationCommand {
        leave_id,
        reviewer,
        action,
        decisions: leave_days
            .into_iter()
            .map(|d| DayDecision { date: d.date, unit: d.unit, status: d.status })
            .collect(),
        remarks,
    };

    // Failures travel in the body with a 200 status; callers check `success`.
    let response = match adjudicator.adjudicate(command).await {
        Ok(settlement) => AdjudicationResponse::settled(settlement.approved_for),
        Err(e) => {
            tracing::error!(
                error = %e,
                leave_id,
                user_id = auth.user_id,
                username = %auth.username,
                "Adjudication failed"
            );
            AdjudicationResponse::failed(e.public_message())
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_timestamp_dates() {
        let body: AdjudicateLeave = serde_json::from_value(serde_json::json!({
            "action": "approve",
            "leaveDays": [
                { "date": "2026-01-05", "unit": "Full Day", "status": "Approved" },
                { "date": "2026-01-06T00:00:00.000Z", "unit": "2nd Half", "status": "Rejected" }
            ]
        }))
        .unwrap();

        assert_eq!(body.leave_days[1].date, NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
        assert_eq!(body.leave_days[1].unit, LeaveDayUnit::SecondHalf);
        assert!(body.remarks.is_none());
    }

    #[test]
    fn missing_leave_days_defaults_to_empty() {
        let body: AdjudicateLeave = serde_json::from_value(serde_json::json!({ "action": "reject" })).unwrap();
        assert!(body.leave_days.is_empty());
    }

    #[test]
    fn rejects_pending_as_a_decision() {
        let result = serde_json::from_value::<AdjudicateLeave>(serde_json::json!({
            "action": "approve",
            "leaveDays": [{ "date": "2026-01-05", "unit": "Full Day", "status": "Pending" }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn failure_body_shape() {
        let json = serde_json::to_value(AdjudicationResponse::failed("Missing day decisions")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "Missing day decisions" }));
    }
}
