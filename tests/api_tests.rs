mod common;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;

use common::{create_test_app, json_request, money, JWT_SECRET};
use toll_collection::models::VehicleStatus;
use toll_collection::repositories::BalanceStore;
use toll_collection::utils::jwt;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_scan_debits_checkpoint_rate() {
    let app = create_test_app();
    let owner = app.owner("amina@example.com").await;
    let vehicle = app.vehicle(&owner, "TAG-100", Decimal::new(1000, 2)).await;

    let (status, body) = app
        .scan(json!({ "rfid": "TAG-100", "checkpoint": "Toll Plaza B", "scanner_id": "SCN-7" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["license_plate"], "PL-TAG-100");
    assert_eq!(money(&body["toll_amount"]), Decimal::new(750, 2));
    assert_eq!(money(&body["previous_balance"]), Decimal::new(1000, 2));
    assert_eq!(money(&body["new_balance"]), Decimal::new(250, 2));

    let history = app.store.transactions_for_vehicle(vehicle.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].balance_before, Decimal::new(1000, 2));
    assert_eq!(history[0].balance_after, Decimal::new(250, 2));
    assert_eq!(history[0].status.to_string(), "completed");
    assert_eq!(history[0].scanner_id, "SCN-7");
}

#[tokio::test]
async fn test_client_supplied_amount_is_ignored() {
    let app = create_test_app();
    let owner = app.owner("ignored@example.com").await;
    app.vehicle(&owner, "TAG-101", Decimal::new(2000, 2)).await;

    let (status, body) = app
        .scan(json!({ "rfid": "TAG-101", "checkpoint": "Nowhere", "toll_amount": 0.01 }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["toll_amount"]), Decimal::new(500, 2));
    assert_eq!(body["checkpoint"], "Nowhere");
}

#[tokio::test]
async fn test_scan_without_rfid_is_bad_request() {
    let app = create_test_app();
    let (status, body) = app.scan(json!({ "checkpoint": "Toll Plaza A" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_scan_requires_credentials() {
    let app = create_test_app();
    let owner = app.owner("creds@example.com").await;
    let vehicle = app.vehicle(&owner, "TAG-102", Decimal::new(1000, 2)).await;

    let (status, _) = app
        .send(json_request("/api/toll/rfid-scan", json!({ "rfid": "TAG-102" }), &[]))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(json_request(
            "/api/toll/rfid-scan",
            json!({ "rfid": "TAG-102" }),
            &[("x-scanner-token", "wrong")],
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let stored = app.store.get_vehicle(vehicle.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, Decimal::new(1000, 2));
}

#[tokio::test]
async fn test_manual_scan_with_admin_token() {
    let app = create_test_app();
    let owner = app.owner("manual@example.com").await;
    let vehicle = app.vehicle(&owner, "TAG-103", Decimal::new(1000, 2)).await;

    let token = jwt::issue_token("ops-1", jwt::ADMIN_ROLE, JWT_SECRET, 300).unwrap();
    let bearer = format!("Bearer {}", token);
    let (status, _) = app
        .send(json_request(
            "/api/toll/rfid-scan",
            json!({ "rfid": "TAG-103", "checkpoint": "Toll Plaza A" }),
            &[("authorization", bearer.as_str())],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let history = app.store.transactions_for_vehicle(vehicle.id).await.unwrap();
    assert_eq!(history[0].scanner_id, "manual:ops-1");
}

#[tokio::test]
async fn test_unknown_tag_is_not_found() {
    let app = create_test_app();
    let (status, body) = app.scan(json!({ "rfid": "NO-SUCH-TAG" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "VEHICLE_NOT_FOUND");
    assert_eq!(body["details"]["rfid"], "NO-SUCH-TAG");
}

#[tokio::test]
async fn test_unrecognised_tag_format_is_not_found() {
    let app = create_test_app();
    let (status, body) = app.scan(json!({ "rfid": "E200 3412" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "VEHICLE_NOT_FOUND");
    assert_eq!(body["details"]["rfid"], "E200 3412");
}

#[tokio::test]
async fn test_suspended_vehicle_is_forbidden() {
    let app = create_test_app();
    let owner = app.owner("stolen@example.com").await;
    let vehicle = app.vehicle(&owner, "TAG-104", Decimal::new(1000, 2)).await;

    let (status, body) = app
        .post_json(&format!("/api/vehicle/{}/suspend", vehicle.id), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "suspended");

    let (status, body) = app.scan(json!({ "rfid": "TAG-104" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"]["status"], "suspended");

    let stored = app.store.get_vehicle(vehicle.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, Decimal::new(1000, 2));
    assert!(app.store.transactions_for_vehicle(vehicle.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_insufficient_balance_is_payment_required() {
    let app = create_test_app();
    let owner = app.owner("broke@example.com").await;
    let vehicle = app.vehicle(&owner, "TAG-105", Decimal::new(300, 2)).await;

    let (status, body) = app.scan(json!({ "rfid": "TAG-105", "checkpoint": "Toll Plaza A" })).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], "INSUFFICIENT_BALANCE");
    assert_eq!(money(&body["details"]["current_balance"]), Decimal::new(300, 2));
    assert_eq!(money(&body["details"]["required_amount"]), Decimal::new(500, 2));

    let stored = app.store.get_vehicle(vehicle.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, Decimal::new(300, 2));
}

#[tokio::test]
async fn test_persistence_failure_is_500_without_details() {
    let app = create_test_app();
    let owner = app.owner("down@example.com").await;
    app.vehicle(&owner, "TAG-106", Decimal::new(1000, 2)).await;
    app.store.set_write_failure(true);

    let (status, body) = app.scan(json!({ "rfid": "TAG-106" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "PERSISTENCE_FAILURE");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_recharge_flow() {
    let app = create_test_app();
    let owner = app.owner("topup@example.com").await;
    let vehicle = app.vehicle(&owner, "TAG-107", Decimal::new(250, 2)).await;

    let uri = format!("/api/vehicle/{}/recharge", vehicle.id);
    let (status, body) = app.post_json(&uri, json!({ "amount": "20.00" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["amount_added"]), Decimal::new(2000, 2));
    assert_eq!(money(&body["new_balance"]), Decimal::new(2250, 2));

    let (status, body) = app.post_json(&uri, json!({ "amount": -5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let (status, _) = app.post_json(&uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stored = app.store.get_vehicle(vehicle.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, Decimal::new(2250, 2));
}

#[tokio::test]
async fn test_recharge_amount_must_fit_the_balance_column() {
    let app = create_test_app();
    let owner = app.owner("bounds@example.com").await;
    let vehicle = app.vehicle(&owner, "TAG-109", Decimal::new(1000, 2)).await;
    let uri = format!("/api/vehicle/{}/recharge", vehicle.id);

    for amount in ["79228162514264337593543950335", "10000000000", "0.001", "0.005"] {
        let (status, body) = app.post_json(&uri, json!({ "amount": amount })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {}", amount);
        assert_eq!(body["code"], "INVALID_AMOUNT");
    }

    let stored = app.store.get_vehicle(vehicle.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, Decimal::new(1000, 2));
    assert!(app.store.payments_for_vehicle(vehicle.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_vehicle_id_is_json_bad_request() {
    let app = create_test_app();

    let (status, body) = app.get("/api/vehicle/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = app.post_json("/api/vehicle/not-a-uuid/recharge", json!({ "amount": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = app.get("/api/owner/42/tolls").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_recharge_unknown_vehicle() {
    let app = create_test_app();
    let uri = format!("/api/vehicle/{}/recharge", uuid::Uuid::new_v4());
    let (status, _) = app.post_json(&uri, json!({ "amount": 10 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lifecycle_transitions() {
    let app = create_test_app();
    let owner = app.owner("cycle@example.com").await;
    let vehicle = app.vehicle(&owner, "TAG-108", Decimal::new(1000, 2)).await;

    let reactivate = format!("/api/vehicle/{}/reactivate", vehicle.id);
    let (status, body) = app.post_json(&reactivate, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let suspend = format!("/api/vehicle/{}/suspend", vehicle.id);
    let (status, _) = app.post_json(&suspend, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    // Suspender dos veces no es error
    let (status, _) = app.post_json(&suspend, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post_json(&reactivate, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert!(body["suspended_at"].is_null());
    assert!(!body["reactivated_at"].is_null());

    let stored = app.store.get_vehicle(vehicle.id).await.unwrap().unwrap();
    assert_eq!(stored.status, VehicleStatus::Active);
}

#[tokio::test]
async fn test_heartbeat_is_recorded() {
    let app = create_test_app();

    let (status, body) = app
        .post_json("/api/scanner/heartbeat", json!({ "scanner_id": "SCN-9", "status": "online" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Heartbeat received");
    assert!(body["server_time"].is_string());

    let (status, body) = app.get("/api/admin/scanners").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["scanner_id"], "SCN-9");
}

#[tokio::test]
async fn test_owner_history_and_admin_surface() {
    let app = create_test_app();

    let (status, body) = app
        .post_json(
            "/api/admin/owners",
            json!({ "name": "Wanjiru Kamau", "email": "wanjiru@example.com", "phone": "+254712345678" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let owner_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post_json(
            "/api/admin/vehicles",
            json!({ "owner_id": owner_id, "rfid": "TAG-200", "license_plate": "KCA 123A", "initial_balance": "15.00" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");

    let (status, _) = app
        .post_json(
            "/api/admin/vehicles",
            json!({ "owner_id": owner_id, "rfid": "TAG-200", "license_plate": "KCA 999Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post_json(
            "/api/admin/vehicles",
            json!({ "owner_id": owner_id, "rfid": "TAG-201", "license_plate": "KCA 124A", "initial_balance": "0.001" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let (status, _) = app.scan(json!({ "rfid": "TAG-200", "checkpoint": "Toll Plaza C" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/owner/{}", owner_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vehicles"].as_array().unwrap().len(), 1);
    assert_eq!(money(&body["data"]["vehicles"][0]["balance"]), Decimal::new(900, 2));

    let (status, body) = app.get(&format!("/api/owner/{}/tolls", owner_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["items"][0]["checkpoint"], "Toll Plaza C");

    let (status, body) = app.get("/api/admin/vehicles?status=active").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app.get("/api/admin/suspended-vehicles").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_owner_payload_is_rejected() {
    let app = create_test_app();
    let (status, body) = app
        .post_json("/api/admin/owners", json!({ "name": "", "email": "not-an-email" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_owner_is_not_found() {
    let app = create_test_app();
    let (status, body) = app.get(&format!("/api/owner/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "OWNER_NOT_FOUND");
}
