//! Integration tests for the time-bank engine.
//!
//! This suite drives the engine through the HTTP API and directly:
//! - Worked hours, overtime buckets and time bank per punch
//! - Night, holiday and weekend punches
//! - Lateness
//! - Department caps
//! - Corrections and their history
//! - Batch recalculation
//! - File-backed persistence and recompute notices
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

use timebank_engine::api::{AppState, create_router};
use timebank_engine::config::{ConfigLoader, EngineConfig, NotificationSettings};
use timebank_engine::engine::{
    BroadcastSink, CorrectionLedger, HoursEngine, StaticDirectory, TracingSink,
};
use timebank_engine::models::{PunchCorrection, PunchRecord};
use timebank_engine::store::{FileStore, MemoryStore, Repository, Store};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_engine_with(config: EngineConfig, store: Arc<dyn Store>) -> Arc<HoursEngine> {
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    Arc::new(HoursEngine::new(
        config,
        Arc::new(Repository::new(store)),
        Arc::new(StaticDirectory::new(loader.employees().to_vec())),
        Arc::new(TracingSink),
    ))
}

fn create_engine() -> Arc<HoursEngine> {
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    create_engine_with(loader.config().clone(), Arc::new(MemoryStore::new()))
}

fn create_router_for_test() -> Router {
    create_router(AppState::new(create_engine()))
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn make_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Reads a decimal field serialized as a string.
fn dec_field(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap().normalize()
}

fn punch_json(id: &str, employee_id: &str, date: &str, check_in: &str, check_out: &str) -> Value {
    json!({
        "id": id,
        "employee_id": employee_id,
        "date": date,
        "check_in": check_in,
        "check_out": check_out,
    })
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, json)
}

async fn compute(router: &Router, punch: Value) -> (StatusCode, Value) {
    send(router, "POST", "/compute", Some(punch)).await
}

// =============================================================================
// Per-punch computation
// =============================================================================

#[tokio::test]
async fn test_weekday_ten_hours() {
    let router = create_router_for_test();
    // 2026-01-14 is a Wednesday
    let (status, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2026-01-14", "08:00", "18:00"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let result = &body["data"]["result"];
    assert_eq!(dec_field(&result["worked_hours"]), decimal("10"));
    assert_eq!(dec_field(&result["overtime"]["total"]), decimal("2"));
    assert_eq!(dec_field(&result["overtime"]["day"]), decimal("2"));
    assert_eq!(dec_field(&result["overtime"]["night"]), Decimal::ZERO);
    assert_eq!(dec_field(&result["overtime"]["holiday"]), Decimal::ZERO);
    assert_eq!(dec_field(&result["time_bank"]["positive"]), decimal("2"));
    assert_eq!(dec_field(&result["time_bank"]["negative"]), Decimal::ZERO);
    assert_eq!(dec_field(&result["time_bank"]["balance"]), decimal("2"));
    assert_eq!(result["is_holiday"], false);
    assert_eq!(result["is_weekend"], false);
    assert_eq!(result["caps_applied"]["department"], "operations");
}

#[tokio::test]
async fn test_break_is_deducted() {
    let router = create_router_for_test();
    let mut punch = punch_json("p1", "emp_001", "2026-01-14", "08:00", "17:00");
    punch["break_start"] = json!("12:00");
    punch["break_end"] = json!("13:00");

    let (_, body) = compute(&router, punch).await;
    let result = &body["data"]["result"];
    assert_eq!(dec_field(&result["worked_hours"]), decimal("8"));
    assert_eq!(dec_field(&result["time_bank"]["balance"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_undertime_goes_negative() {
    let router = create_router_for_test();
    let (_, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2026-01-14", "08:00", "15:30"),
    )
    .await;
    let time_bank = &body["data"]["result"]["time_bank"];
    assert_eq!(dec_field(&time_bank["positive"]), Decimal::ZERO);
    assert_eq!(dec_field(&time_bank["negative"]), decimal("0.5"));
    assert_eq!(dec_field(&time_bank["balance"]), decimal("-0.5"));
}

#[tokio::test]
async fn test_wrapped_night_shift() {
    let router = create_router_for_test();
    // emp_003 works 22:00-06:00 on an 8h contract
    let (status, body) = compute(
        &router,
        punch_json("p1", "emp_003", "2026-01-14", "22:00", "07:00"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["data"]["result"];
    assert_eq!(dec_field(&result["worked_hours"]), decimal("9"));
    assert_eq!(dec_field(&result["overtime"]["total"]), decimal("1"));
    assert_eq!(dec_field(&result["overtime"]["day"]), Decimal::ZERO);
    assert_eq!(dec_field(&result["overtime"]["night"]), decimal("1"));
}

#[tokio::test]
async fn test_day_to_night_crossing_splits_overtime() {
    let router = create_router_for_test();
    // emp_002 has a 6h contract; 16:00-23:00 is 7h, 1h overtime
    let (_, body) = compute(
        &router,
        punch_json("p1", "emp_002", "2026-01-14", "16:00", "23:00"),
    )
    .await;
    let overtime = &body["data"]["result"]["overtime"];
    assert_eq!(dec_field(&overtime["total"]), decimal("1"));
    assert_eq!(dec_field(&overtime["day"]), decimal("1"));
    assert_eq!(dec_field(&overtime["night"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_christmas_is_holiday_overtime() {
    let router = create_router_for_test();
    let (_, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2024-12-25", "08:00", "18:00"),
    )
    .await;
    let result = &body["data"]["result"];
    assert_eq!(result["is_holiday"], true);
    assert_eq!(dec_field(&result["overtime"]["holiday"]), decimal("2"));
    assert_eq!(dec_field(&result["overtime"]["day"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_day_after_christmas_is_ordinary() {
    let router = create_router_for_test();
    // 2024-12-26 is a Thursday
    let (_, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2024-12-26", "08:00", "18:00"),
    )
    .await;
    let result = &body["data"]["result"];
    assert_eq!(result["is_holiday"], false);
    assert_eq!(dec_field(&result["overtime"]["day"]), decimal("2"));
}

#[tokio::test]
async fn test_saturday_is_weekend() {
    let router = create_router_for_test();
    // 2026-01-17 is a Saturday
    let (_, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2026-01-17", "08:00", "12:00"),
    )
    .await;
    assert_eq!(body["data"]["result"]["is_weekend"], true);
    assert_eq!(body["data"]["result"]["is_holiday"], false);
}

#[tokio::test]
async fn test_late_check_in() {
    let router = create_router_for_test();
    let (_, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2026-01-14", "08:10", "17:00"),
    )
    .await;
    let lateness = &body["data"]["result"]["lateness"];
    assert_eq!(lateness["is_late"], true);
    assert_eq!(lateness["minutes"], 10);
}

#[tokio::test]
async fn test_check_in_within_tolerance() {
    let router = create_router_for_test();
    let (_, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2026-01-14", "08:05", "17:00"),
    )
    .await;
    assert_eq!(body["data"]["result"]["lateness"]["is_late"], false);
}

#[tokio::test]
async fn test_unknown_employee_warns() {
    let router = create_router_for_test();
    let (status, body) = compute(
        &router,
        punch_json("p1", "emp_999", "2026-01-14", "08:00", "17:00"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body["data"]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"PROFILE_NOT_FOUND"));
}

#[tokio::test]
async fn test_repeated_compute_is_stable() {
    let engine = create_engine();
    let punch = PunchRecord::new("p1", "emp_001", make_date("2026-01-14"), "08:00", "18:00");

    let first = engine.compute_daily_hours(&punch).unwrap();
    let second = engine.compute_daily_hours(&punch).unwrap();
    assert!(first.result.same_figures(&second.result));
    assert_eq!(engine.computation_log("p1").unwrap().len(), 2);
}

// =============================================================================
// Caps
// =============================================================================

#[tokio::test]
async fn test_department_cap_truncates() {
    let router = create_router_for_test();
    let (status, _) = send(
        &router,
        "PUT",
        "/departments/operations/cap",
        Some(json!({"daily_cap": "1", "monthly_cap": "40", "updated_by": "hr_admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2026-01-14", "08:00", "18:00"),
    )
    .await;
    let result = &body["data"]["result"];
    assert_eq!(result["caps_applied"]["daily_exceeded"], true);
    assert_eq!(dec_field(&result["overtime"]["total"]), decimal("1"));
    assert_eq!(dec_field(&result["overtime"]["day"]), decimal("1"));
    // The time bank still reflects every hour worked
    assert_eq!(dec_field(&result["time_bank"]["balance"]), decimal("2"));
}

#[tokio::test]
async fn test_cap_lifecycle_and_history() {
    let router = create_router_for_test();
    send(
        &router,
        "PUT",
        "/departments/warehouse/cap",
        Some(json!({"daily_cap": "3", "monthly_cap": "30", "updated_by": "hr_admin"})),
    )
    .await;

    let (_, view) = send(&router, "GET", "/departments/warehouse/cap", None).await;
    assert_eq!(view["configured"], true);
    assert_eq!(dec_field(&view["daily_cap"]), decimal("3"));

    let (status, removed) = send(
        &router,
        "DELETE",
        "/departments/warehouse/cap?actor=hr_lead",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&removed["removed"]["monthly_cap"]), decimal("30"));

    let (_, view) = send(&router, "GET", "/departments/warehouse/cap", None).await;
    assert_eq!(view["configured"], false);
    assert_eq!(dec_field(&view["daily_cap"]), decimal("2"));

    let (_, history) = send(&router, "GET", "/departments/warehouse/cap/history", None).await;
    let actions: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["created", "removed"]);
}

#[tokio::test]
async fn test_negative_cap_rejected() {
    let router = create_router_for_test();
    let (status, body) = send(
        &router,
        "PUT",
        "/departments/warehouse/cap",
        Some(json!({"daily_cap": "-1", "monthly_cap": "30", "updated_by": "hr_admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_monthly_cap_flagged_across_punches() {
    let engine = create_engine();
    engine
        .caps()
        .set_cap(
            "operations",
            timebank_engine::models::CapLimits {
                daily_cap: decimal("2"),
                monthly_cap: decimal("5"),
            },
            "hr_admin",
        )
        .unwrap();

    let mut last = None;
    for day in 12..=14 {
        let punch = PunchRecord::new(
            format!("p{}", day),
            "emp_001",
            make_date(&format!("2026-01-{}", day)),
            "08:00",
            "18:00",
        );
        last = Some(engine.compute_daily_hours(&punch).unwrap());
    }

    let last = last.unwrap();
    assert!(last.result.caps_applied.monthly_exceeded);
    assert_eq!(last.result.caps_applied.monthly_accumulated, decimal("6"));
    assert_eq!(last.result.overtime.total, decimal("2"));
    assert_eq!(
        engine.caps().monthly_accumulated("emp_001", 1, 2026).unwrap(),
        decimal("6")
    );
}

// =============================================================================
// Corrections
// =============================================================================

#[tokio::test]
async fn test_correction_flow_over_http() {
    let router = create_router_for_test();
    let (status, _) = send(
        &router,
        "POST",
        "/punches",
        Some(json!({"punches": [punch_json("p1", "emp_001", "2026-01-14", "08:00", "17:00")]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &router,
        "POST",
        "/punches/p1/corrections",
        Some(json!({
            "new_check_out": "18:00",
            "reason": "Forgot to clock out",
            "corrected_by": "supervisor_01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["punch"]["status"], "corrected");

    let (status, _) = send(
        &router,
        "POST",
        "/punches/p1/corrections",
        Some(json!({
            "new_check_in": "07:30",
            "reason": "Arrived early to open the store",
            "corrected_by": "supervisor_02"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, history) = send(&router, "GET", "/punches/p1/corrections", None).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["corrected_by"], "supervisor_02");
    assert_eq!(history[1]["new_check_out"], "18:00");

    let (_, punch) = send(&router, "GET", "/punches/p1", None).await;
    assert_eq!(punch["check_in"], "07:30");
    assert_eq!(punch["check_out"], "18:00");

    let (_, result) = send(&router, "GET", "/results/p1", None).await;
    assert_eq!(dec_field(&result["worked_hours"]), decimal("10.5"));
}

#[tokio::test]
async fn test_short_reason_rejected() {
    let router = create_router_for_test();
    send(
        &router,
        "POST",
        "/punches",
        Some(json!({"punches": [punch_json("p1", "emp_001", "2026-01-14", "08:00", "17:00")]})),
    )
    .await;

    let (status, body) = send(
        &router,
        "POST",
        "/punches/p1/corrections",
        Some(json!({"new_check_out": "18:00", "reason": "late", "corrected_by": "sup"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["invalid_input"], true);

    let (_, history) = send(&router, "GET", "/punches/p1/corrections", None).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_correction_of_unknown_punch_is_404() {
    let router = create_router_for_test();
    let (status, body) = send(
        &router,
        "POST",
        "/punches/nope/corrections",
        Some(json!({"new_check_out": "18:00", "reason": "Forgot to clock out", "corrected_by": "sup"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["invalid_input"], false);
}

#[tokio::test]
async fn test_correction_does_not_double_count_month() {
    let engine = create_engine();
    let ledger = CorrectionLedger::new(engine.clone());
    engine
        .record_punches(vec![PunchRecord::new(
            "p1",
            "emp_001",
            make_date("2026-01-14"),
            "08:00",
            "18:00",
        )])
        .unwrap();
    engine.compute_stored("p1").unwrap();

    let outcome = ledger
        .correct_punch(
            "p1",
            &PunchCorrection {
                new_check_in: None,
                new_check_out: Some("17:30".to_string()),
                reason: "Left early for appointment".to_string(),
            },
            "sup",
        )
        .unwrap();

    let result = outcome.recomputed.unwrap();
    assert_eq!(result.overtime.total, decimal("1.5"));
    assert_eq!(result.caps_applied.monthly_accumulated, decimal("1.5"));
    assert_eq!(
        engine.caps().monthly_accumulated("emp_001", 1, 2026).unwrap(),
        decimal("1.5")
    );
}

// =============================================================================
// Batch recalculation
// =============================================================================

#[tokio::test]
async fn test_recalc_over_http() {
    let router = create_router_for_test();
    send(
        &router,
        "POST",
        "/punches",
        Some(json!({"punches": [
            punch_json("p1", "emp_001", "2026-01-12", "08:00", "17:00"),
            punch_json("p2", "emp_001", "2026-01-13", "08:00", "18:00"),
            punch_json("p3", "emp_002", "2026-01-13", "14:00", "20:00"),
        ]})),
    )
    .await;

    let (status, body) = send(
        &router,
        "POST",
        "/recalc",
        Some(json!({"employee_id": "emp_001", "date_from": "2026-01-01", "date_to": "2026-01-31"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let (status, _) = send(&router, "GET", "/results/p2", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&router, "GET", "/results/p3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recalc_inverted_range() {
    let router = create_router_for_test();
    let (status, body) = send(
        &router,
        "POST",
        "/recalc",
        Some(json!({"employee_id": "emp_001", "date_from": "2026-02-01", "date_to": "2026-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["count"], 0);
    assert!(body["error"]["message"].is_string());
}

// =============================================================================
// Persistence and notices
// =============================================================================

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = std::env::temp_dir().join(format!("timebank-it-{}", uuid::Uuid::new_v4()));

    {
        let engine = create_engine_with(EngineConfig::default(), Arc::new(FileStore::new(&dir)));
        engine
            .record_punches(vec![PunchRecord::new(
                "p1",
                "emp_001",
                make_date("2026-01-14"),
                "08:00",
                "18:00",
            )])
            .unwrap();
        engine.compute_stored("p1").unwrap();
    }

    let engine = create_engine_with(EngineConfig::default(), Arc::new(FileStore::new(&dir)));
    let result = engine.result_for("p1").unwrap().unwrap();
    assert_eq!(result.worked_hours, decimal("10"));
    assert_eq!(engine.current_punch("p1").unwrap().check_out, "18:00");
    assert!(dir.join("computedResults.json").exists());

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_recompute_notice_broadcast() {
    let sink = Arc::new(BroadcastSink::new(16));
    let mut receiver = sink.subscribe();
    let config = EngineConfig {
        notifications: NotificationSettings {
            debounce_ms: 0,
            min_interval_ms: 0,
        },
        ..EngineConfig::default()
    };
    let engine = HoursEngine::new(
        config,
        Arc::new(Repository::new(Arc::new(MemoryStore::new()))),
        Arc::new(StaticDirectory::default()),
        sink,
    );

    engine
        .compute_daily_hours(&PunchRecord::new(
            "p1",
            "emp_001",
            make_date("2026-01-14"),
            "08:00",
            "17:00",
        ))
        .unwrap();

    let notice = receiver.recv().await.unwrap();
    assert_eq!(notice.topic, "recomputed");
    assert_eq!(notice.punch_ids, vec!["p1"]);
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_missing_field_is_validation_error() {
    let router = create_router_for_test();
    let (status, body) = compute(
        &router,
        json!({"id": "p1", "employee_id": "emp_001", "date": "2026-01-14", "check_in": "08:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_seconds_in_time_rejected() {
    let router = create_router_for_test();
    let (status, body) = compute(
        &router,
        punch_json("p1", "emp_001", "2026-01-14", "08:00:00", "17:00"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["invalid_input"], true);

    let (status, _) = send(&router, "GET", "/results/p1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overlong_wrapped_import_rejected() {
    let router = create_router_for_test();
    let (status, body) = send(
        &router,
        "POST",
        "/punches",
        Some(json!({"punches": [punch_json("p1", "emp_001", "2026-01-14", "09:00", "08:00")]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["invalid_input"], true);
}
