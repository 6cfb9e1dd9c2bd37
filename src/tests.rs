#[cfg(test)]
mod integration_tests {
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::Utc;
    use serde_json::{json, Value};
    use uuid::Uuid;

    async fn setup_server() -> TestServer {
        let app = setup_test_app().await;
        TestServer::new(app).unwrap()
    }

    /// Create a user and an account through the API, returning their IDs.
    async fn seed_user_and_account(server: &TestServer) -> (i64, i64) {
        let user_response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "tester" }))
            .await;
        user_response.assert_status(StatusCode::CREATED);
        let user_body: ApiResponse<Value> = user_response.json();
        let user_id = user_body.data["id"].as_i64().unwrap();

        let account_response = server
            .post("/api/v1/accounts")
            .json(&json!({
                "name": "Checking",
                "currency_code": "USD",
                "owner_id": user_id,
            }))
            .await;
        account_response.assert_status(StatusCode::CREATED);
        let account_body: ApiResponse<Value> = account_response.json();
        let account_id = account_body.data["id"].as_i64().unwrap();

        (user_id, account_id)
    }

    /// Create a template through the API and return its JSON representation.
    async fn create_template(server: &TestServer, body: Value) -> Value {
        let response = server.post("/api/v1/recurring-templates").json(&body).await;
        if response.status_code() != StatusCode::CREATED {
            panic!(
                "Expected 201 Created, got {}: {}",
                response.status_code(),
                response.text()
            );
        }
        let body: ApiResponse<Value> = response.json();
        body.data
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = setup_server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_create_user() {
        let server = setup_server().await;

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "username": "alice" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["username"], "alice");
        assert!(body.data["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let server = setup_server().await;

        let response = server.get("/api/v1/users/99999").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_and_get_account() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;

        let response = server
            .get(&format!("/api/v1/accounts/{}", account_id))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["name"], "Checking");
        assert_eq!(body.data["owner_id"].as_i64().unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_create_template_starts_pointer_at_start_date() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;

        let template = create_template(
            &server,
            json!({
                "user_id": user_id,
                "account_id": account_id,
                "name": "Rent",
                "amount": "1500.00",
                "transaction_type": "Expense",
                "category": "Housing",
                "frequency": "Monthly",
                "start_date": "2024-01-31",
            }),
        )
        .await;

        assert_eq!(template["next_execution_date"], "2024-01-31");
        assert_eq!(template["is_active"], true);
        assert_eq!(template["auto_generate"], true);
        assert_eq!(template["days_in_advance"].as_i64().unwrap(), 30);
        assert_eq!(template["amount"], "1500.00");
    }

    #[tokio::test]
    async fn test_create_template_rejects_invalid_frequency() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;

        let response = server
            .post("/api/v1/recurring-templates")
            .json(&json!({
                "user_id": user_id,
                "account_id": account_id,
                "name": "Broken",
                "amount": "10.00",
                "transaction_type": "Expense",
                "frequency": "Fortnightly",
                "start_date": "2024-01-01",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_FREQUENCY");
    }

    #[tokio::test]
    async fn test_create_template_rejects_custom_without_interval() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;

        let response = server
            .post("/api/v1/recurring-templates")
            .json(&json!({
                "user_id": user_id,
                "account_id": account_id,
                "name": "Broken",
                "amount": "10.00",
                "transaction_type": "Expense",
                "frequency": "Custom",
                "start_date": "2024-01-01",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "MISSING_CUSTOM_INTERVAL");
    }

    #[tokio::test]
    async fn test_next_execution_date_clamps_month_end() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;

        let template = create_template(
            &server,
            json!({
                "user_id": user_id,
                "account_id": account_id,
                "name": "Rent",
                "amount": "1500.00",
                "transaction_type": "Expense",
                "frequency": "Monthly",
                "start_date": "2024-01-31",
            }),
        )
        .await;

        let response = server
            .get(&format!(
                "/api/v1/recurring-templates/{}/next-execution-date",
                template["id"].as_str().unwrap()
            ))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        // Jan 31 + one month in a leap year clamps to Feb 29.
        assert_eq!(body.data, "2024-02-29");
    }

    #[tokio::test]
    async fn test_next_execution_date_unknown_template() {
        let server = setup_server().await;

        let response = server
            .get(&format!(
                "/api/v1/recurring-templates/{}/next-execution-date",
                Uuid::new_v4()
            ))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generate_for_template_and_list_rows() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        let today = Utc::now().date_naive();

        let template = create_template(
            &server,
            json!({
                "user_id": user_id,
                "account_id": account_id,
                "name": "Rent",
                "amount": "1500.00",
                "transaction_type": "Expense",
                "frequency": "Monthly",
                "start_date": today.to_string(),
                "days_in_advance": 40,
            }),
        )
        .await;
        let template_id = template["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!(
                "/api/v1/recurring-templates/{}/generate",
                template_id
            ))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        // Today and one month from today fit in a 40-day horizon.
        assert_eq!(body.data["created"].as_u64().unwrap(), 2);
        assert_eq!(body.data["skipped"], false);

        let listing = server
            .get(&format!(
                "/api/v1/recurring-templates/{}/expected-transactions",
                template_id
            ))
            .await;
        listing.assert_status(StatusCode::OK);
        let listing_body: ApiResponse<Vec<Value>> = listing.json();
        assert_eq!(listing_body.data.len(), 2);
        assert_eq!(listing_body.data[0]["expected_date"], today.to_string());
        assert_eq!(listing_body.data[0]["status"], "Pending");
        assert_eq!(listing_body.data[0]["expected_amount"], "1500.00");

        // Rerunning with an unchanged clock creates nothing new.
        let rerun = server
            .post(&format!(
                "/api/v1/recurring-templates/{}/generate",
                template_id
            ))
            .await;
        rerun.assert_status(StatusCode::OK);
        let rerun_body: ApiResponse<Value> = rerun.json();
        assert_eq!(rerun_body.data["created"].as_u64().unwrap(), 0);
    }

    /// Generates one pending row for a fresh template and returns its ID.
    async fn seed_pending_row(server: &TestServer, user_id: i64, account_id: i64) -> String {
        let today = Utc::now().date_naive();
        let template = create_template(
            server,
            json!({
                "user_id": user_id,
                "account_id": account_id,
                "name": "Utilities",
                "amount": "100.00",
                "transaction_type": "Expense",
                "category": "Utilities",
                "frequency": "Monthly",
                "start_date": today.to_string(),
                "days_in_advance": 0,
            }),
        )
        .await;
        let template_id = template["id"].as_str().unwrap();

        let response = server
            .post(&format!(
                "/api/v1/recurring-templates/{}/generate",
                template_id
            ))
            .await;
        response.assert_status(StatusCode::OK);

        let listing = server
            .get(&format!(
                "/api/v1/recurring-templates/{}/expected-transactions",
                template_id
            ))
            .await;
        let listing_body: ApiResponse<Vec<Value>> = listing.json();
        assert_eq!(listing_body.data.len(), 1);
        listing_body.data[0]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_confirm_expected_transaction() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        let expected_id = seed_pending_row(&server, user_id, account_id).await;
        let actual_id = Uuid::new_v4();

        let response = server
            .post(&format!(
                "/api/v1/expected-transactions/{}/confirm",
                expected_id
            ))
            .json(&json!({ "actual_transaction_id": actual_id }))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["status"], "Confirmed");
        assert_eq!(
            body.data["actual_transaction_id"].as_str().unwrap(),
            actual_id.to_string()
        );
        assert!(!body.data["processed_at"].is_null());

        // A second confirmation is rejected.
        let again = server
            .post(&format!(
                "/api/v1/expected-transactions/{}/confirm",
                expected_id
            ))
            .json(&json!({ "actual_transaction_id": Uuid::new_v4() }))
            .await;
        again.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cancel_expected_transaction() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        let expected_id = seed_pending_row(&server, user_id, account_id).await;

        let response = server
            .post(&format!(
                "/api/v1/expected-transactions/{}/cancel",
                expected_id
            ))
            .json(&json!({ "reason": "subscription ended" }))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["status"], "Cancelled");
        assert_eq!(body.data["adjustment_reason"], "subscription ended");
    }

    #[tokio::test]
    async fn test_adjust_preserves_original_amount() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        let expected_id = seed_pending_row(&server, user_id, account_id).await;

        let first = server
            .post(&format!(
                "/api/v1/expected-transactions/{}/adjust",
                expected_id
            ))
            .json(&json!({ "new_amount": "120.00", "reason": "price increase" }))
            .await;
        first.assert_status(StatusCode::OK);
        let first_body: ApiResponse<Value> = first.json();
        assert_eq!(first_body.data["expected_amount"], "120.00");
        assert_eq!(first_body.data["original_amount"], "100.00");
        assert_eq!(first_body.data["is_adjusted"], true);
        assert_eq!(first_body.data["status"], "Pending");

        // The snapshot survives a second adjustment.
        let second = server
            .post(&format!(
                "/api/v1/expected-transactions/{}/adjust",
                expected_id
            ))
            .json(&json!({ "new_amount": "130.00", "reason": "price increase again" }))
            .await;
        second.assert_status(StatusCode::OK);
        let second_body: ApiResponse<Value> = second.json();
        assert_eq!(second_body.data["expected_amount"], "130.00");
        assert_eq!(second_body.data["original_amount"], "100.00");
    }

    #[tokio::test]
    async fn test_transition_on_missing_row_is_rejected() {
        let server = setup_server().await;

        let response = server
            .post(&format!(
                "/api/v1/expected-transactions/{}/cancel",
                Uuid::new_v4()
            ))
            .json(&json!({ "reason": "nothing there" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], "TRANSITION_REJECTED");
    }

    #[tokio::test]
    async fn test_forecasts_over_pending_rows() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        let today = Utc::now().date_naive();

        for (name, amount, transaction_type, category) in [
            ("Salary", "500.00", "Income", "Salary"),
            ("Rent", "200.00", "Expense", "Rent"),
        ] {
            create_template(
                &server,
                json!({
                    "user_id": user_id,
                    "account_id": account_id,
                    "name": name,
                    "amount": amount,
                    "transaction_type": transaction_type,
                    "category": category,
                    "frequency": "Monthly",
                    "start_date": today.to_string(),
                    "days_in_advance": 0,
                }),
            )
            .await;
        }

        let generate = server
            .post("/api/v1/expected-transactions/generate-all")
            .await;
        generate.assert_status(StatusCode::OK);
        let generate_body: ApiResponse<Value> = generate.json();
        assert_eq!(generate_body.data["templates_processed"].as_u64().unwrap(), 2);
        assert_eq!(generate_body.data["rows_created"].as_u64().unwrap(), 2);

        let cash_flow = server
            .get(&format!(
                "/api/v1/users/{}/forecast/cash-flow?start_date={}&end_date={}",
                user_id, today, today
            ))
            .await;
        cash_flow.assert_status(StatusCode::OK);
        let cash_flow_body: ApiResponse<Value> = cash_flow.json();
        assert_eq!(cash_flow_body.data["total_income"], "500.00");
        assert_eq!(cash_flow_body.data["total_expense"], "200.00");
        assert_eq!(cash_flow_body.data["net"], "300.00");

        let categories = server
            .get(&format!(
                "/api/v1/users/{}/forecast/categories?start_date={}&end_date={}",
                user_id, today, today
            ))
            .await;
        categories.assert_status(StatusCode::OK);
        let categories_body: ApiResponse<Value> = categories.json();
        assert_eq!(categories_body.data["categories"]["Salary"], "500.00");
        assert_eq!(categories_body.data["categories"]["Rent"], "-200.00");
    }

    #[tokio::test]
    async fn test_forecast_rejects_inverted_window() {
        let server = setup_server().await;
        let (user_id, _) = seed_user_and_account(&server).await;

        let response = server
            .get(&format!(
                "/api/v1/users/{}/forecast/cash-flow?start_date=2024-02-01&end_date=2024-01-01",
                user_id
            ))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_DATE_RANGE");
    }

    #[tokio::test]
    async fn test_upcoming_expected_transactions() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        let expected_id = seed_pending_row(&server, user_id, account_id).await;

        let response = server
            .get(&format!(
                "/api/v1/users/{}/expected-transactions/upcoming?days=7",
                user_id
            ))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["id"], expected_id);
    }

    #[tokio::test]
    async fn test_user_listing_filters_by_status() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        let expected_id = seed_pending_row(&server, user_id, account_id).await;

        let cancel = server
            .post(&format!(
                "/api/v1/expected-transactions/{}/cancel",
                expected_id
            ))
            .json(&json!({ "reason": "paused" }))
            .await;
        cancel.assert_status(StatusCode::OK);

        let cancelled = server
            .get(&format!(
                "/api/v1/users/{}/expected-transactions?status=Cancelled",
                user_id
            ))
            .await;
        cancelled.assert_status(StatusCode::OK);
        let cancelled_body: ApiResponse<Vec<Value>> = cancelled.json();
        assert_eq!(cancelled_body.data.len(), 1);
        assert_eq!(cancelled_body.data[0]["id"], expected_id);

        let pending = server
            .get(&format!(
                "/api/v1/users/{}/expected-transactions?status=Pending",
                user_id
            ))
            .await;
        pending.assert_status(StatusCode::OK);
        let pending_body: ApiResponse<Vec<Value>> = pending.json();
        assert!(pending_body.data.is_empty());

        let invalid = server
            .get(&format!(
                "/api/v1/users/{}/expected-transactions?status=Done",
                user_id
            ))
            .await;
        invalid.assert_status(StatusCode::BAD_REQUEST);
        let invalid_body: Value = invalid.json();
        assert_eq!(invalid_body["code"], "INVALID_STATUS");
    }

    #[tokio::test]
    async fn test_generate_all_is_idempotent() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        seed_pending_row(&server, user_id, account_id).await;

        let response = server
            .post("/api/v1/expected-transactions/generate-all")
            .await;

        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["rows_created"].as_u64().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deactivated_template_is_skipped_by_generation() {
        let server = setup_server().await;
        let (user_id, account_id) = seed_user_and_account(&server).await;
        let today = Utc::now().date_naive();

        let template = create_template(
            &server,
            json!({
                "user_id": user_id,
                "account_id": account_id,
                "name": "Gym",
                "amount": "30.00",
                "transaction_type": "Expense",
                "frequency": "Monthly",
                "start_date": today.to_string(),
            }),
        )
        .await;
        let template_id = template["id"].as_str().unwrap().to_string();

        let deactivate = server
            .post(&format!(
                "/api/v1/recurring-templates/{}/deactivate",
                template_id
            ))
            .await;
        deactivate.assert_status(StatusCode::OK);
        let deactivate_body: ApiResponse<Value> = deactivate.json();
        assert_eq!(deactivate_body.data["is_active"], false);

        let generate = server
            .post(&format!(
                "/api/v1/recurring-templates/{}/generate",
                template_id
            ))
            .await;
        generate.assert_status(StatusCode::OK);
        let generate_body: ApiResponse<Value> = generate.json();
        assert_eq!(generate_body.data["skipped"], true);
        assert_eq!(generate_body.data["created"].as_u64().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_expected_transaction_not_found() {
        let server = setup_server().await;

        let response = server
            .get(&format!("/api/v1/expected-transactions/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let server = setup_server().await;

        let response = server.get("/api-docs/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["info"]["title"], "FinPlan API");
        assert!(body["paths"]
            .as_object()
            .unwrap()
            .contains_key("/api/v1/expected-transactions/{expected_id}/confirm"));
    }
}
