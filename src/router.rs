use crate::handlers::{
    accounts::{create_account, get_account, get_accounts},
    expected::{
        adjust_expected_transaction, cancel_expected_transaction, confirm_expected_transaction,
        generate_all_expected_transactions, get_account_expected_transactions,
        get_cash_flow_forecast, get_category_forecast, get_expected_transaction,
        get_template_expected_transactions, get_upcoming_expected_transactions,
        get_user_expected_transactions,
    },
    health::health_check,
    templates::{
        create_template, deactivate_template, generate_for_template, get_next_execution_date,
        get_template, get_templates, update_template,
    },
    users::{create_user, get_user, get_users},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        // Account routes
        .route("/api/v1/accounts", post(create_account))
        .route("/api/v1/accounts", get(get_accounts))
        .route("/api/v1/accounts/:account_id", get(get_account))
        // Recurring transaction template routes
        .route("/api/v1/recurring-templates", post(create_template))
        .route("/api/v1/recurring-templates", get(get_templates))
        .route("/api/v1/recurring-templates/:template_id", get(get_template))
        .route("/api/v1/recurring-templates/:template_id", put(update_template))
        .route(
            "/api/v1/recurring-templates/:template_id/deactivate",
            post(deactivate_template),
        )
        .route(
            "/api/v1/recurring-templates/:template_id/generate",
            post(generate_for_template),
        )
        .route(
            "/api/v1/recurring-templates/:template_id/next-execution-date",
            get(get_next_execution_date),
        )
        .route(
            "/api/v1/recurring-templates/:template_id/expected-transactions",
            get(get_template_expected_transactions),
        )
        // Expected transaction routes
        .route(
            "/api/v1/expected-transactions/generate-all",
            post(generate_all_expected_transactions),
        )
        .route(
            "/api/v1/expected-transactions/:expected_id",
            get(get_expected_transaction),
        )
        .route(
            "/api/v1/expected-transactions/:expected_id/confirm",
            post(confirm_expected_transaction),
        )
        .route(
            "/api/v1/expected-transactions/:expected_id/cancel",
            post(cancel_expected_transaction),
        )
        .route(
            "/api/v1/expected-transactions/:expected_id/adjust",
            post(adjust_expected_transaction),
        )
        .route(
            "/api/v1/users/:user_id/expected-transactions",
            get(get_user_expected_transactions),
        )
        .route(
            "/api/v1/users/:user_id/expected-transactions/upcoming",
            get(get_upcoming_expected_transactions),
        )
        .route(
            "/api/v1/accounts/:account_id/expected-transactions",
            get(get_account_expected_transactions),
        )
        // Forecast routes
        .route(
            "/api/v1/users/:user_id/forecast/cash-flow",
            get(get_cash_flow_forecast),
        )
        .route(
            "/api/v1/users/:user_id/forecast/categories",
            get(get_category_forecast),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
