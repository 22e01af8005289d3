//! HTTP API tests against the in-memory ledger

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use interface_api::auth::{create_token, permissions};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};
use test_utils::{fake_tenant, seed_units, LedgerFixture, BEDSITTER_RENT};

const SECRET: &str = "api-test-secret";

struct Api {
    server: TestServer,
    fixture: LedgerFixture,
    token: String,
}

impl Api {
    async fn start() -> Self {
        Self::with_roles(vec!["admin".to_string()]).await
    }

    async fn with_roles(roles: Vec<String>) -> Self {
        let fixture = LedgerFixture::new().await;
        let config = ApiConfig {
            jwt_secret: SECRET.to_string(),
            ..ApiConfig::default()
        };
        let state = AppState::new(fixture.ledger.ports(), config).unwrap();
        let server = TestServer::new(create_router(state)).unwrap();
        let token = create_token("caretaker", roles, SECRET, 300).unwrap();
        Self { server, fixture, token }
    }

    fn unit_id(&self) -> String {
        self.fixture.unit.id.as_uuid().to_string()
    }

    fn tenant_id(&self) -> String {
        self.fixture.tenant.id.as_uuid().to_string()
    }

    fn payment(&self, amount: i64, year: i32, month: u32) -> Value {
        json!({
            "unit_id": self.unit_id(),
            "tenant_id": self.tenant_id(),
            "method": "mpesa",
            "amount": amount,
            "start_year": year,
            "start_month": month,
            "tx_ref": "QAB12CD34E",
        })
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let api = Api::start().await;
        let response = api.server.get("/health").await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_adapters() {
        let api = Api::start().await;
        let response = api.server.get("/health/ready").await;
        response.assert_status(StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"].as_array().map(Vec::len), Some(3));
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let api = Api::start().await;
        let body = api.payment(BEDSITTER_RENT, 2024, 1);
        api.server
            .post("/api/v1/payments")
            .json(&body)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_permission_is_forbidden() {
        let api = Api::with_roles(vec![permissions::LEDGER_READ.to_string()]).await;
        let body = api.payment(BEDSITTER_RENT, 2024, 1);
        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}

mod payments {
    use super::*;

    #[tokio::test]
    async fn test_allocate_spans_months() {
        let api = Api::start().await;
        let body = api.payment(8000, 2024, 1);
        let response = api
            .server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await;

        response.assert_status(StatusCode::CREATED);
        let allocations = response.json::<Value>()["allocations"].clone();
        assert_eq!(allocations.as_array().map(Vec::len), Some(3));
        assert_eq!(allocations[0]["status"], "paid");
        assert_eq!(allocations[2]["month"], 3);
        assert_eq!(allocations[2]["applied"], 1000);
        assert_eq!(allocations[2]["status"], "partially_paid");
        assert_eq!(allocations[2]["balance"], 2500);

        let sent = api.fixture.ledger.notifications.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].message.contains("Ref: QAB12CD34E"));
    }

    #[tokio::test]
    async fn test_unassigned_payer_is_rejected() {
        let api = Api::start().await;
        let mut body = api.payment(BEDSITTER_RENT, 2024, 1);
        body["tenant_id"] = json!(uuid::Uuid::new_v4().to_string());

        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.fixture.ledger.store.period_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_unit_is_not_found() {
        let api = Api::start().await;
        let mut body = api.payment(BEDSITTER_RENT, 2024, 1);
        body["unit_id"] = json!(uuid::Uuid::new_v4().to_string());

        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let api = Api::start().await;
        let body = api.payment(-500, 2024, 1);
        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_oversized_amount_rejected_before_writes() {
        let api = Api::start().await;
        let body = api.payment(100_000_001, 2024, 1);
        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body = api.payment(1201 * BEDSITTER_RENT, 2024, 1);
        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(api.fixture.ledger.store.period_count().await, 0);
        assert!(api.fixture.ledger.notifications.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_transactions_list() {
        let api = Api::start().await;
        let body = api.payment(8000, 2024, 1);
        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);

        let response = api
            .server
            .get("/api/v1/payments")
            .authorization_bearer(&api.token)
            .await;
        response.assert_status(StatusCode::OK);
        let entries = response.json::<Value>();
        let entries = entries.as_array().cloned().unwrap_or_default();
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(entry["unit_number"], 1);
            assert_eq!(entry["payer_name"], "Jane Wanjiku");
            assert_eq!(entry["method"], "mobile_money");
            assert_eq!(entry["tx_ref"], "QAB12CD34E");
        }
        let total: i64 = entries.iter().filter_map(|e| e["amount"].as_i64()).sum();
        assert_eq!(total, 8000);

        let limited = api
            .server
            .get("/api/v1/payments")
            .authorization_bearer(&api.token)
            .add_query_param("limit", 1)
            .await;
        assert_eq!(limited.json::<Value>().as_array().map(Vec::len), Some(1));

        api.server
            .get("/api/v1/payments")
            .authorization_bearer(&api.token)
            .add_query_param("limit", 0)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_half_a_start_month_is_bad_request() {
        let api = Api::start().await;
        let mut body = api.payment(BEDSITTER_RENT, 2024, 1);
        if let Some(fields) = body.as_object_mut() {
            fields.remove("start_year");
        }

        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reverse_resettles_period() {
        let api = Api::start().await;
        let body = api.payment(BEDSITTER_RENT, 2024, 1);
        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);

        let payment_id = api.fixture.ledger.store.all_payments().await[0].id;
        let response = api
            .server
            .post(&format!("/api/v1/payments/{}/reverse", payment_id.as_uuid()))
            .authorization_bearer(&api.token)
            .json(&json!({ "reason": "bounced" }))
            .await;

        response.assert_status(StatusCode::OK);
        let outcome = response.json::<Value>();
        assert_eq!(outcome["payment"]["status"], "reversed");
        assert_eq!(outcome["settlement"]["status"], "pending");
    }
}

mod ledger {
    use super::*;

    #[tokio::test]
    async fn test_unit_year_report() {
        let api = Api::start().await;
        let body = api.payment(5000, 2024, 2);
        api.server
            .post("/api/v1/payments")
            .authorization_bearer(&api.token)
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);

        let response = api
            .server
            .get(&format!("/api/v1/units/{}/ledger/2024", api.unit_id()))
            .authorization_bearer(&api.token)
            .await;
        response.assert_status(StatusCode::OK);

        let ledger = response.json::<Value>();
        assert_eq!(ledger["months"].as_array().map(Vec::len), Some(12));
        assert_eq!(ledger["months"][0]["state"], "not_paid");
        assert_eq!(ledger["months"][1]["state"], "paid");
        assert_eq!(ledger["months"][2]["state"], "partially_paid");
        assert_eq!(ledger["total_paid"], 5000);

        let received = api
            .server
            .get(&format!("/api/v1/units/{}/received", api.unit_id()))
            .authorization_bearer(&api.token)
            .await;
        assert_eq!(received.json::<Value>()["total"], 5000);
    }
}

mod registry {
    use super::*;

    #[tokio::test]
    async fn test_unit_and_tenant_lifecycle() {
        let api = Api::start().await;

        let unit = api
            .server
            .post("/api/v1/units")
            .authorization_bearer(&api.token)
            .json(&json!({ "number": 7, "category": "single", "monthly_rent": 3000 }))
            .await;
        unit.assert_status(StatusCode::CREATED);
        let unit_id = unit.json::<Value>()["id"].as_str().map(str::to_string).unwrap();

        api.server
            .post("/api/v1/units")
            .authorization_bearer(&api.token)
            .json(&json!({ "number": 7, "category": "single", "monthly_rent": 3000 }))
            .await
            .assert_status(StatusCode::CONFLICT);

        let tenant = api
            .server
            .post("/api/v1/tenants")
            .authorization_bearer(&api.token)
            .json(&json!({ "full_name": "Otieno Ochieng", "phone": "+254 722 000 111" }))
            .await;
        tenant.assert_status(StatusCode::CREATED);
        let tenant = tenant.json::<Value>();
        assert_eq!(tenant["phone"], "+254722000111");
        let tenant_id = tenant["id"].as_str().map(str::to_string).unwrap();

        api.server
            .post(&format!("/api/v1/units/{}/tenants", unit_id))
            .authorization_bearer(&api.token)
            .json(&json!({ "tenant_id": tenant_id, "start_date": "2024-01-01" }))
            .await
            .assert_status(StatusCode::CREATED);

        let occupants = api
            .server
            .get(&format!("/api/v1/units/{}/tenants", unit_id))
            .authorization_bearer(&api.token)
            .await;
        assert_eq!(occupants.json::<Value>().as_array().map(Vec::len), Some(1));

        api.server
            .delete(&format!("/api/v1/units/{}/tenants/{}", unit_id, tenant_id))
            .authorization_bearer(&api.token)
            .add_query_param("end_date", "2024-06-30")
            .await
            .assert_status(StatusCode::OK);

        let occupants = api
            .server
            .get(&format!("/api/v1/units/{}/tenants", unit_id))
            .authorization_bearer(&api.token)
            .await;
        assert_eq!(occupants.json::<Value>().as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_units_listed_by_number() {
        let api = Api::start().await;
        for unit in seed_units().into_iter().skip(1) {
            api.fixture.ledger.property.insert_unit(unit).await;
        }

        let response = api
            .server
            .get("/api/v1/units")
            .authorization_bearer(&api.token)
            .await;
        response.assert_status(StatusCode::OK);
        let units = response.json::<Value>();
        let numbers: Vec<i64> = units
            .as_array()
            .map(|units| units.iter().filter_map(|u| u["number"].as_i64()).collect())
            .unwrap_or_default();
        assert_eq!(numbers, (1..=10).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_rent_above_ceiling_is_rejected() {
        let api = Api::start().await;
        api.server
            .post("/api/v1/units")
            .authorization_bearer(&api.token)
            .json(&json!({ "number": 11, "category": "single", "monthly_rent": 10_000_001i64 }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_tenant_roster_shows_assignment_status() {
        let api = Api::start().await;
        let newcomer = fake_tenant();
        let newcomer_id = newcomer.id.as_uuid().to_string();
        api.fixture.ledger.property.insert_tenant(newcomer).await;

        let response = api
            .server
            .get("/api/v1/tenants")
            .authorization_bearer(&api.token)
            .await;
        response.assert_status(StatusCode::OK);
        let roster = response.json::<Value>();
        let roster = roster.as_array().cloned().unwrap_or_default();
        assert_eq!(roster.len(), 2);

        let assigned = roster.iter().find(|e| e["id"] == api.tenant_id()).cloned().unwrap_or_default();
        assert_eq!(assigned["status"], "active");
        assert_eq!(assigned["unit_number"], 1);
        assert_eq!(assigned["start_date"], "2023-12-01");
        assert!(assigned["end_date"].is_null());

        let unassigned = roster.iter().find(|e| e["id"] == newcomer_id).cloned().unwrap_or_default();
        assert_eq!(unassigned["status"], "unassigned");
        assert!(unassigned["unit_number"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_tenant_is_rejected() {
        let api = Api::start().await;
        api.server
            .post("/api/v1/tenants")
            .authorization_bearer(&api.token)
            .json(&json!({ "full_name": "", "phone": "0712345678" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
