use chrono::NaiveDate;
use common::{CashFlowReport, CategoryForecast, DateRange};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// Query parameters for forecast endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ForecastQuery {
    /// Start date of the window (YYYY-MM-DD, inclusive)
    pub start_date: NaiveDate,
    /// End date of the window (YYYY-MM-DD, inclusive)
    pub end_date: NaiveDate,
}

/// Query parameters for the upcoming expected transactions endpoint
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct UpcomingQuery {
    /// How many days ahead to look (default: 30)
    #[validate(range(min = 0, max = 3650))]
    pub days: Option<i32>,
}

/// Query parameters for listing a user's expected transactions
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ExpectedListQuery {
    /// Start date of the window (YYYY-MM-DD, inclusive)
    pub start_date: Option<NaiveDate>,
    /// End date of the window (YYYY-MM-DD, inclusive)
    pub end_date: Option<NaiveDate>,
    /// Filter by status (Pending, Confirmed or Cancelled)
    pub status: Option<String>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::accounts::create_account,
        crate::handlers::accounts::get_accounts,
        crate::handlers::accounts::get_account,
        crate::handlers::templates::create_template,
        crate::handlers::templates::get_templates,
        crate::handlers::templates::get_template,
        crate::handlers::templates::update_template,
        crate::handlers::templates::deactivate_template,
        crate::handlers::templates::generate_for_template,
        crate::handlers::templates::get_next_execution_date,
        crate::handlers::expected::get_expected_transaction,
        crate::handlers::expected::get_user_expected_transactions,
        crate::handlers::expected::get_upcoming_expected_transactions,
        crate::handlers::expected::get_account_expected_transactions,
        crate::handlers::expected::get_template_expected_transactions,
        crate::handlers::expected::confirm_expected_transaction,
        crate::handlers::expected::cancel_expected_transaction,
        crate::handlers::expected::adjust_expected_transaction,
        crate::handlers::expected::get_cash_flow_forecast,
        crate::handlers::expected::get_category_forecast,
        crate::handlers::expected::generate_all_expected_transactions,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ForecastQuery,
            UpcomingQuery,
            ExpectedListQuery,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::accounts::CreateAccountRequest,
            crate::handlers::accounts::AccountResponse,
            crate::handlers::templates::TemplateListQuery,
            crate::handlers::templates::CreateTemplateRequest,
            crate::handlers::templates::UpdateTemplateRequest,
            crate::handlers::templates::TemplateResponse,
            crate::handlers::templates::GenerationResponse,
            crate::handlers::expected::ExpectedTransactionResponse,
            crate::handlers::expected::ConfirmRequest,
            crate::handlers::expected::CancelRequest,
            crate::handlers::expected::AdjustRequest,
            crate::handlers::expected::BatchGenerationResponse,
            CashFlowReport,
            CategoryForecast,
            DateRange,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "accounts", description = "Account management endpoints"),
        (name = "recurring-templates", description = "Recurring transaction template endpoints"),
        (name = "expected-transactions", description = "Expected transaction lifecycle and forecast endpoints"),
    ),
    info(
        title = "FinPlan API",
        description = "Recurring transaction planning API - schedule templates, expected transaction generation and cash-flow forecasting",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
