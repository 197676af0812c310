//! End-to-end tests for `POST /api/leave/{id}/adjudicate` against the
//! in-memory store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, http::StatusCode, test, web::Data};
use async_trait::async_trait;
use chrono::NaiveDate;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

use hrm_leave::adjudication::{Adjudicator, WeekOffs};
use hrm_leave::config::Config;
use hrm_leave::model::employee::{Employee, LeaveBalance};
use hrm_leave::model::holiday::Holiday;
use hrm_leave::model::leave_request::{DayStatus, LeaveDay, LeaveDayUnit, LeaveRequest, LeaveStatus};
use hrm_leave::model::leave_type::LeaveType;
use hrm_leave::models::{Claims, TokenType};
use hrm_leave::notify::template::{EmailNotice, TemplatedMessage};
use hrm_leave::notify::transport::{EmailSender, MessageSender, TransportError};
use hrm_leave::notify::{Dispatcher, DispatcherHandle};
use hrm_leave::routes;
use hrm_leave::store::MemoryStore;

const SECRET: &str = "test-secret";
const EMPLOYEE: u64 = 1;
const MANAGER: u64 = 2;
const ANNUAL: u64 = 10;

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Default)]
struct Outbox {
    emails: Mutex<Vec<EmailNotice>>,
    messages: Mutex<Vec<TemplatedMessage>>,
    fail: bool,
}

#[async_trait]
impl EmailSender for Outbox {
    async fn send_email(&self, _to: &str, notice: &EmailNotice) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Rejected { status: 500, body: "smtp down".into() });
        }
        self.emails.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

#[async_trait]
impl MessageSender for Outbox {
    async fn send_message(
        &self,
        _phone: &str,
        _country_code: &str,
        message: &TemplatedMessage,
    ) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Rejected { status: 500, body: "gateway down".into() });
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: SECRET.to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        api_prefix: "/api".to_string(),
        log_dir: "logs".to_string(),
        rate_protected_per_min: 1000,
        week_offs: WeekOffs::default(),
        holiday_cache_ttl: Duration::from_secs(60),
        notify_queue_capacity: 16,
        dashboard_url: "https://hr.example.com".to_string(),
        email_api_url: None,
        email_api_key: None,
        email_from: "hr@example.com".to_string(),
        message_api_url: None,
        message_api_key: None,
    }
}

fn date(d: u32) -> NaiveDate {
    // 2026-02-02 is a Monday
    NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
}

fn token(role: u8, employee_id: Option<u64>) -> String {
    let claims = Claims {
        user_id: 1,
        sub: "reviewer".to_string(),
        role,
        exp: 4_000_000_000,
        jti: "test".to_string(),
        token_type: TokenType::Access,
        employee_id,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn employee(id: u64, first: &str, balances: Vec<LeaveBalance>) -> Employee {
    Employee {
        id,
        organization_id: 1,
        first_name: first.to_string(),
        last_name: "Sarker".to_string(),
        email: format!("{}@example.com", first.to_lowercase()),
        phone: Some("1812345678".to_string()),
        country_code: Some("880".to_string()),
        reporting_manager_id: (id == EMPLOYEE).then_some(MANAGER),
        balances,
    }
}

/// Seeds a Monday-to-Friday full-day request (2026-02-02..06) with a
/// holiday on Wednesday the 4th.
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_leave_type(LeaveType {
            id: ANNUAL,
            name: "Annual Leave".to_string(),
            include_holidays: true,
            include_week_offs: true,
        })
        .await;
    store
        .insert_employee(employee(
            EMPLOYEE,
            "Sumaiya",
            vec![LeaveBalance { id: 1, employee_id: EMPLOYEE, leave_type_id: ANNUAL, balance: 10.0 }],
        ))
        .await;
    store.insert_employee(employee(MANAGER, "Imran", vec![])).await;
    store
        .insert_holiday(Holiday { organization_id: 1, date: date(4), name: "Company Day".to_string() })
        .await;
    store
        .insert_request(LeaveRequest {
            id: 300,
            employee_id: EMPLOYEE,
            leave_type_id: ANNUAL,
            from_date: date(2),
            to_date: date(6),
            status: LeaveStatus::Pending,
            applied_days: 5.0,
            days: (2..=6)
                .map(|d| LeaveDay { id: d as u64, date: date(d), unit: LeaveDayUnit::FullDay, status: DayStatus::Pending })
                .collect(),
            remarks: None,
            verdict: None,
        })
        .await;
    store
}

fn adjudicator(store: &Arc<MemoryStore>, outbox: &Arc<Outbox>) -> (Data<Adjudicator>, DispatcherHandle) {
    let (queue, handle) = Dispatcher::new(store.clone(), outbox.clone(), outbox.clone(), "https://hr.example.com")
        .unwrap()
        .spawn(16);
    let adjudicator = Adjudicator::new(store.clone(), store.clone(), WeekOffs::default(), queue);
    (Data::new(adjudicator), handle)
}

async fn post_adjudication(
    adjudicator: Data<Adjudicator>,
    bearer: Option<String>,
    leave_id: u64,
    body: Value,
) -> (StatusCode, Value) {
    let config = test_config();
    let app = test::init_service(
        App::new()
            .app_data(adjudicator)
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, config.clone())),
    )
    .await;

    let mut request = test::TestRequest::post()
        .uri(&format!("/api/leave/{leave_id}/adjudicate"))
        .peer_addr("127.0.0.1:40000".parse().unwrap())
        .set_json(body);
    if let Some(bearer) = bearer {
        request = request.insert_header(("Authorization", format!("Bearer {bearer}")));
    }

    let response = test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body: Value = test::read_body_json(response).await;
    (status, body)
}

fn all_days(status: &str) -> Value {
    json!((2..=6)
        .map(|d| json!({ "date": format!("2026-02-0{d}"), "unit": "Full Day", "status": status }))
        .collect::<Vec<_>>())
}

// =============================================================================
// Tests
// =============================================================================

#[actix_web::test]
async fn approving_every_day_skips_the_holiday() {
    let store = seeded_store().await;
    let outbox = Arc::new(Outbox::default());
    let (adjudicator, handle) = adjudicator(&store, &outbox);

    let (status, body) = post_adjudication(
        adjudicator,
        Some(token(3, Some(MANAGER))),
        300,
        json!({ "action": "approve", "remarks": "Have a good trip", "leaveDays": all_days("Approved") }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "approvedFor": 4.0 }));
    assert_eq!(store.balance(EMPLOYEE, ANNUAL).await, Some(6.0));
    assert_eq!(store.request(300).await.unwrap().status, LeaveStatus::Approved);

    handle.drain().await;
    let emails = outbox.emails.lock().unwrap();
    assert_eq!(emails.len(), 1);
    assert!(emails[0].html.contains("Have a good trip"));
    assert_eq!(outbox.messages.lock().unwrap()[0].template, "leave_approved");
}

#[actix_web::test]
async fn mixed_days_partially_approve() {
    let store = seeded_store().await;
    let outbox = Arc::new(Outbox::default());
    let (adjudicator, handle) = adjudicator(&store, &outbox);

    let (_, body) = post_adjudication(
        adjudicator,
        Some(token(2, Some(MANAGER))),
        300,
        json!({
            "action": "approve",
            "leaveDays": [
                { "date": "2026-02-02", "unit": "Full Day", "status": "Approved" },
                { "date": "2026-02-03", "unit": "Full Day", "status": "Approved" },
                { "date": "2026-02-04", "unit": "Full Day", "status": "Approved" },
                { "date": "2026-02-05", "unit": "Full Day", "status": "Rejected" },
                { "date": "2026-02-06T00:00:00.000Z", "unit": "Full Day", "status": "Rejected" }
            ]
        }),
    )
    .await;

    assert_eq!(body, json!({ "success": true, "approvedFor": 2.0 }));
    let stored = store.request(300).await.unwrap();
    assert_eq!(stored.status, LeaveStatus::PartiallyApproved);
    assert_eq!(stored.approved_by(), Some(MANAGER));
    assert_eq!(stored.rejected_by(), Some(MANAGER));

    handle.drain().await;
    let messages = outbox.messages.lock().unwrap();
    assert_eq!(messages[0].template, "leave_partially_approved");
    assert!(messages[0].params.contains(&"2".to_string()));
}

#[actix_web::test]
async fn empty_leave_days_is_a_validation_failure() {
    let store = seeded_store().await;
    let outbox = Arc::new(Outbox::default());
    let (adjudicator, _handle) = adjudicator(&store, &outbox);

    let (status, body) = post_adjudication(
        adjudicator,
        Some(token(2, Some(MANAGER))),
        300,
        json!({ "action": "approve", "leaveDays": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Missing day decisions" }));
    assert_eq!(store.request(300).await.unwrap().status, LeaveStatus::Pending);
    assert_eq!(store.balance(EMPLOYEE, ANNUAL).await, Some(10.0));
}

#[actix_web::test]
async fn unknown_request_reports_not_found() {
    let store = seeded_store().await;
    let outbox = Arc::new(Outbox::default());
    let (adjudicator, _handle) = adjudicator(&store, &outbox);

    let (status, body) = post_adjudication(
        adjudicator,
        Some(token(1, Some(MANAGER))),
        999,
        json!({ "action": "reject", "leaveDays": all_days("Rejected") }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Leave request 999 not found");
}

#[actix_web::test]
async fn malformed_body_is_reported_in_band() {
    let store = seeded_store().await;
    let outbox = Arc::new(Outbox::default());
    let (adjudicator, _handle) = adjudicator(&store, &outbox);

    let (status, body) = post_adjudication(
        adjudicator,
        Some(token(2, Some(MANAGER))),
        300,
        json!({ "action": "approve", "leaveDays": [{ "date": "someday", "unit": "Full Day", "status": "Approved" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let store = seeded_store().await;
    let outbox = Arc::new(Outbox::default());
    let (adjudicator, _handle) = adjudicator(&store, &outbox);

    let (status, _) = post_adjudication(
        adjudicator,
        None,
        300,
        json!({ "action": "approve", "leaveDays": all_days("Approved") }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(store.request(300).await.unwrap().status, LeaveStatus::Pending);
}

#[actix_web::test]
async fn notification_failure_does_not_affect_result() {
    let store = seeded_store().await;
    let outbox = Arc::new(Outbox { fail: true, ..Outbox::default() });
    let (adjudicator, handle) = adjudicator(&store, &outbox);

    let (_, body) = post_adjudication(
        adjudicator,
        Some(token(2, Some(MANAGER))),
        300,
        json!({ "action": "reject", "leaveDays": all_days("Rejected") }),
    )
    .await;

    handle.drain().await;
    assert_eq!(body, json!({ "success": true, "approvedFor": 0.0 }));
    assert_eq!(store.request(300).await.unwrap().status, LeaveStatus::Rejected);
    assert_eq!(store.balance(EMPLOYEE, ANNUAL).await, Some(10.0));
}
