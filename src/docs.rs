use crate::adjudication::{Action, DecisionStatus};
use crate::api::leave_request::{AdjudicateLeave, AdjudicationResponse, LeaveDayDecision};
use crate::model::leave_request::LeaveDayUnit;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave Adjudication API",
        version = "1.0.0",
        description = r#"
## Leave Adjudication

Settles an already-submitted leave request from a reviewer's per-day decisions.

### 🔹 What happens on adjudication
- Each day is approved or rejected; the request becomes **Approved**, **Rejected** or **Partially Approved**
- Approved days falling on holidays or week-offs are not charged when the leave type says so
- The chargeable amount is debited from the employee's leave balance (never below zero)
- The employee is notified by email and, when a phone is on file, by templated message

### 🔐 Security
Endpoints require **JWT Bearer authentication**. HR/Admin may adjudicate any request,
other reviewers only their direct reports'.

### 📦 Response Format
Failures are returned with HTTP 200 and `"success": false`; always check `success`.
"#,
    ),
    paths(
        crate::api::leave_request::adjudicate_leave,
    ),
    components(
        schemas(
            AdjudicateLeave,
            LeaveDayDecision,
            AdjudicationResponse,
            Action,
            DecisionStatus,
            LeaveDayUnit
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave adjudication APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_adjudication_endpoint() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/leave/{leave_id}/adjudicate"));
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("bearer_auth"));
    }
}
