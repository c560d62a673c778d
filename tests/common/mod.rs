#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use toll_collection::{
    config::EnvironmentConfig,
    models::{NewOwner, NewVehicle, Owner, Vehicle},
    repositories::MemoryBalanceStore,
    routes::create_router,
    state::AppState,
};

pub const SCANNER_TOKEN: &str = "test-scanner-token";
pub const JWT_SECRET: &str = "test-jwt-secret";

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryBalanceStore>,
    pub router: Router,
}

pub fn test_config() -> EnvironmentConfig {
    let vars: HashMap<String, String> = [("SCANNER_TOKEN", SCANNER_TOKEN), ("JWT_SECRET", JWT_SECRET)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvironmentConfig::from_map(&vars).unwrap()
}

pub fn create_test_app() -> TestApp {
    let store = Arc::new(MemoryBalanceStore::new());
    let state = AppState::new(test_config(), store.clone(), None);
    let router = create_router(state.clone());
    TestApp { state, store, router }
}

impl TestApp {
    pub async fn owner(&self, email: &str) -> Owner {
        self.state
            .accounts
            .add_owner(NewOwner {
                name: "Test Owner".to_string(),
                email: email.to_string(),
                phone: None,
            })
            .await
            .unwrap()
    }

    pub async fn vehicle(&self, owner: &Owner, rfid: &str, balance: Decimal) -> Vehicle {
        self.state
            .accounts
            .provision_vehicle(NewVehicle {
                owner_id: owner.id,
                rfid: rfid.to_string(),
                license_plate: format!("PL-{}", rfid),
                vehicle_type: Some("car".to_string()),
                initial_balance: balance,
            })
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(uri, body, &[])).await
    }

    pub async fn scan(&self, body: Value) -> (StatusCode, Value) {
        self.send(json_request("/api/toll/rfid-scan", body, &[("x-scanner-token", SCANNER_TOKEN)]))
            .await
    }
}

pub fn json_request(uri: &str, body: Value, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Los importes se serializan como strings decimales
pub fn money(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}
