//! End-to-end tests for the management router: validation, submission and
//! audience preview over HTTP.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use campaign_core::AppConfig;
use campaign_management::{management_router, ManagementState};
use campaign_segmentation::{CustomerActivity, CustomerSource, DisconnectedSource, InMemoryCustomerSource};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn customer(name: &str, days_ago: i64, appointments: u32, member: bool) -> CustomerActivity {
    CustomerActivity {
        customer_id: Uuid::new_v4(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: Some("+15550199".to_string()),
        last_visit_date: Some(Utc::now() - Duration::days(days_ago)),
        appointment_count: appointments,
        total_spend: appointments as f64 * 70.0,
        has_membership: member,
        loyalty_eligible: false,
        has_upcoming_appointment: false,
    }
}

fn app_with(source: Arc<dyn CustomerSource>) -> Router {
    management_router(ManagementState::from_config(&AppConfig::default(), source))
}

fn app() -> Router {
    app_with(Arc::new(InMemoryCustomerSource::new(vec![
        customer("Ruby", 10, 4, true),
        customer("Scout", 40, 1, false),
        customer("Teddy", 5, 7, true),
    ])))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn sms_draft() -> Value {
    json!({
        "type": "one_time",
        "channel": "sms",
        "segmentCriteria": {"hasMembership": true},
        "messageContent": {"smsBody": "Members: book a spa bath this week."},
        "sendNow": true
    })
}

#[tokio::test]
async fn test_preview_counts_and_samples() {
    let (status, body) = post_json(
        app(),
        "/api/v1/segments/preview",
        json!({"requestSeq": 7, "criteria": {"lastVisitWithinDays": 30}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requestSeq"], 7);
    assert_eq!(body["seq"], 1);
    assert_eq!(body["totalCount"], 2);
    let names: Vec<&str> = body["sample"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Teddy", "Ruby"]);
}

#[tokio::test]
async fn test_preview_rejects_empty_criteria() {
    let (status, body) = post_json(app(), "/api/v1/segments/preview", json!({"criteria": {}})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["valid"], false);
    assert!(body["errors"]["segmentCriteria"].is_array());
}

#[tokio::test]
async fn test_preview_unavailable_when_source_fails() {
    let (status, body) = post_json(
        app_with(Arc::new(DisconnectedSource)),
        "/api/v1/segments/preview",
        json!({"criteria": {"minAppointments": 1}}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "preview_unavailable");
}

#[tokio::test]
async fn test_validate_reports_every_field() {
    let draft = json!({
        "type": "",
        "channel": "email",
        "segmentCriteria": {},
        "messageContent": {"emailSubject": "s".repeat(101)},
        "scheduledAt": (Utc::now() + Duration::minutes(30)).to_rfc3339()
    });
    let (status, body) = post_json(app(), "/api/v1/campaigns/validate", draft).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    let errors = body["errors"].as_object().unwrap();
    for field in [
        "type",
        "segmentCriteria",
        "messageContent.emailSubject",
        "messageContent.emailBody",
        "scheduledAt",
    ] {
        assert!(errors.contains_key(field), "missing {field}: {errors:?}");
    }
}

#[tokio::test]
async fn test_create_campaign_persists_valid_draft() {
    let (status, body) = post_json(app(), "/api/v1/campaigns", sms_draft()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "draft");
    assert_eq!(body["type"], "one_time");
    assert_eq!(body["channel"], "sms");
    assert!(body["id"].is_string());
}

#[tokio::test]
async fn test_create_campaign_rejects_invalid_draft() {
    let mut draft = sms_draft();
    draft["abTestConfig"] = json!({"trafficSplitPercent": 15, "variantB": {"smsBody": "B"}});
    let (status, body) = post_json(app(), "/api/v1/campaigns", draft).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["abTestConfig.trafficSplitPercent"].is_array());
}

#[tokio::test]
async fn test_templates_listed() {
    let response = app()
        .oneshot(Request::get("/api/v1/campaign-templates").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let templates: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(templates
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["id"] == "win_back"));
}

#[tokio::test]
async fn test_later_previews_have_higher_seq() {
    let app = app();
    let criteria = json!({"criteria": {"hasMembership": true}});
    let (_, first) = post_json(app.clone(), "/api/v1/segments/preview", criteria.clone()).await;
    let (_, second) = post_json(app, "/api/v1/segments/preview", criteria).await;
    assert!(second["seq"].as_u64().unwrap() > first["seq"].as_u64().unwrap());
}

#[tokio::test]
async fn test_validate_treats_blank_fields_as_unset() {
    let draft = json!({
        "type": "one_time",
        "channel": "sms",
        "segmentCriteria": {"hasMembership": true, "minAppointments": ""},
        "messageContent": {"smsBody": "Spa day for members!"},
        "abTestConfig": {"trafficSplitPercent": "", "variantB": {"smsBody": "B"}},
        "sendNow": "",
        "scheduledAt": ""
    });
    let (status, body) = post_json(app(), "/api/v1/campaigns/validate", draft).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    let errors = body["errors"].as_object().unwrap();
    assert!(errors.contains_key("abTestConfig.trafficSplitPercent"));
    assert!(errors.contains_key("scheduledAt"));
    assert!(!errors.contains_key("segmentCriteria"));
}

#[tokio::test]
async fn test_preview_treats_blank_fields_as_unset() {
    let (status, body) = post_json(
        app(),
        "/api/v1/segments/preview",
        json!({"requestSeq": "", "criteria": {"lastVisitWithinDays": 30, "minTotalSpend": ""}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 2);
    assert!(body["requestSeq"].is_null());

    let (status, body) = post_json(
        app(),
        "/api/v1/segments/preview",
        json!({"criteria": {"lastVisitWithinDays": "", "hasMembership": ""}}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["segmentCriteria"].is_array());
}

#[tokio::test]
async fn test_malformed_body_returns_validation_result() {
    let draft = json!({"type": "one_time", "segmentCriteria": {"minAppointments": "lots"}});
    let (status, body) = post_json(app(), "/api/v1/campaigns/validate", draft).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["valid"], false);
    assert!(body["errors"]["body"].is_array());

    let (status, body) = post_json(app(), "/api/v1/campaigns", json!({"sendNow": 5})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["body"].is_array());
}
