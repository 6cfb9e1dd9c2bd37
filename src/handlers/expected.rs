use crate::schemas::{
    ApiResponse, AppState, ErrorResponse, ExpectedListQuery, ForecastQuery, UpcomingQuery,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{NaiveDate, NaiveDateTime};
use common::{CashFlowReport, CategoryForecast};
use engine::{batch, forecast, lifecycle};
use model::entities::expected_transaction::{self, ExpectedStatus};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Expected transaction response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpectedTransactionResponse {
    pub id: Uuid,
    pub user_id: i32,
    pub account_id: i32,
    pub template_id: Uuid,
    pub expected_date: NaiveDate,
    pub expected_amount: Decimal,
    /// Amount before the first adjustment, if any
    pub original_amount: Option<Decimal>,
    pub description: Option<String>,
    pub transaction_type: String,
    pub category: Option<String>,
    /// Pending, Confirmed or Cancelled
    pub status: String,
    pub is_adjusted: bool,
    pub adjustment_reason: Option<String>,
    /// The real transaction that fulfilled this expectation
    pub actual_transaction_id: Option<Uuid>,
    pub generated_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
}

impl From<expected_transaction::Model> for ExpectedTransactionResponse {
    fn from(model: expected_transaction::Model) -> Self {
        // Sqlite strips trailing zeros from stored amounts; responses
        // always carry two decimal places.
        let mut expected_amount = model.expected_amount;
        expected_amount.rescale(2);
        let original_amount = model.original_amount.map(|mut amount| {
            amount.rescale(2);
            amount
        });
        Self {
            id: model.id,
            user_id: model.user_id,
            account_id: model.account_id,
            template_id: model.template_id,
            expected_date: model.expected_date,
            expected_amount,
            original_amount,
            description: model.description,
            transaction_type: format!("{:?}", model.transaction_type),
            category: model.category,
            status: format!("{:?}", model.status),
            is_adjusted: model.is_adjusted,
            adjustment_reason: model.adjustment_reason,
            actual_transaction_id: model.actual_transaction_id,
            generated_at: model.generated_at,
            processed_at: model.processed_at,
        }
    }
}

/// Request body for confirming an expected transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ConfirmRequest {
    /// The real transaction that fulfilled the expectation
    pub actual_transaction_id: Uuid,
}

/// Request body for cancelling an expected transaction
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CancelRequest {
    /// Why the occurrence will not happen
    #[validate(length(min = 1, max = 1024))]
    pub reason: String,
}

/// Request body for adjusting an expected transaction's amount
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AdjustRequest {
    /// The new expected amount
    pub new_amount: Decimal,
    /// Why the amount changed
    #[validate(length(min = 1, max = 1024))]
    pub reason: String,
}

/// Result of a batch generation run
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchGenerationResponse {
    /// Templates that walked their schedule
    pub templates_processed: u64,
    /// Newly created expected transactions across all templates
    pub rows_created: u64,
}

// Helper function to parse status string to ExpectedStatus enum
fn parse_status(status_str: &str) -> Result<ExpectedStatus, String> {
    match status_str {
        "Pending" => Ok(ExpectedStatus::Pending),
        "Confirmed" => Ok(ExpectedStatus::Confirmed),
        "Cancelled" => Ok(ExpectedStatus::Cancelled),
        _ => Err(format!("Invalid status: {}", status_str)),
    }
}

fn transition_rejected(op: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!(
                "Expected transaction not found or not pending, cannot {}",
                op
            ),
            code: "TRANSITION_REJECTED".to_string(),
            success: false,
        }),
    )
}

/// Get a specific expected transaction by ID
#[utoipa::path(
    get,
    path = "/api/v1/expected-transactions/{expected_id}",
    tag = "expected-transactions",
    params(
        ("expected_id" = Uuid, Path, description = "Expected transaction ID"),
    ),
    responses(
        (status = 200, description = "Expected transaction retrieved successfully", body = ApiResponse<ExpectedTransactionResponse>),
        (status = 404, description = "Expected transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_expected_transaction(
    Path(expected_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ExpectedTransactionResponse>>, StatusCode> {
    trace!(
        "Entering get_expected_transaction function for expected_id: {}",
        expected_id
    );

    match expected_transaction::Entity::find_by_id(expected_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => {
            debug!("Found expected transaction dated {}", model.expected_date);
            let response = ApiResponse {
                data: ExpectedTransactionResponse::from(model),
                message: "Expected transaction retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Expected transaction with ID {} not found", expected_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve expected transaction with ID {}: {}",
                expected_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a user's expected transactions. With a date window, returns all
/// statuses inside it; without one, returns the pending set. A status
/// filter narrows either listing.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/expected-transactions",
    tag = "expected-transactions",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ExpectedListQuery,
    ),
    responses(
        (status = 200, description = "Expected transactions retrieved successfully", body = ApiResponse<Vec<ExpectedTransactionResponse>>),
        (status = 400, description = "Invalid status filter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_user_expected_transactions(
    Path(user_id): Path<i32>,
    Query(query): Query<ExpectedListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ExpectedTransactionResponse>>>, (StatusCode, Json<ErrorResponse>)>
{
    trace!(
        "Entering get_user_expected_transactions function for user_id: {}",
        user_id
    );

    let status = match query.status.as_deref() {
        Some(status_str) => match parse_status(status_str) {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("Invalid status filter: {}", e);
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: e,
                        code: "INVALID_STATUS".to_string(),
                        success: false,
                    }),
                ));
            }
        },
        None => None,
    };

    let result = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => forecast::in_date_range(&state.db, user_id, start, end).await,
        _ => match status {
            Some(status) => forecast::for_user_with_status(&state.db, user_id, status).await,
            None => forecast::pending_for_user(&state.db, user_id).await,
        },
    };

    match result {
        Ok(mut rows) => {
            if let Some(status) = status {
                rows.retain(|row| row.status == status);
            }
            info!(
                "Retrieved {} expected transactions for user {}",
                rows.len(),
                user_id
            );
            let response = ApiResponse {
                data: rows
                    .into_iter()
                    .map(ExpectedTransactionResponse::from)
                    .collect(),
                message: "Expected transactions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!(
                "Failed to retrieve expected transactions for user {}: {}",
                user_id, e
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to retrieve expected transactions".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Get a user's pending expected transactions due within the next days
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/expected-transactions/upcoming",
    tag = "expected-transactions",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        UpcomingQuery,
    ),
    responses(
        (status = 200, description = "Upcoming expected transactions retrieved successfully", body = ApiResponse<Vec<ExpectedTransactionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_upcoming_expected_transactions(
    Path(user_id): Path<i32>,
    Valid(Query(query)): Valid<Query<UpcomingQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ExpectedTransactionResponse>>>, StatusCode> {
    trace!(
        "Entering get_upcoming_expected_transactions function for user_id: {}",
        user_id
    );

    let days = query.days.unwrap_or(30);
    match forecast::upcoming_for_user(&state.db, user_id, days).await {
        Ok(rows) => {
            info!(
                "Retrieved {} upcoming expected transactions for user {} within {} days",
                rows.len(),
                user_id,
                days
            );
            let response = ApiResponse {
                data: rows
                    .into_iter()
                    .map(ExpectedTransactionResponse::from)
                    .collect(),
                message: "Upcoming expected transactions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!(
                "Failed to retrieve upcoming expected transactions for user {}: {}",
                user_id, e
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get every expected transaction on an account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}/expected-transactions",
    tag = "expected-transactions",
    params(
        ("account_id" = i32, Path, description = "Account ID"),
    ),
    responses(
        (status = 200, description = "Expected transactions retrieved successfully", body = ApiResponse<Vec<ExpectedTransactionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_account_expected_transactions(
    Path(account_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ExpectedTransactionResponse>>>, StatusCode> {
    trace!(
        "Entering get_account_expected_transactions function for account_id: {}",
        account_id
    );

    match forecast::for_account(&state.db, account_id).await {
        Ok(rows) => {
            info!(
                "Retrieved {} expected transactions for account {}",
                rows.len(),
                account_id
            );
            let response = ApiResponse {
                data: rows
                    .into_iter()
                    .map(ExpectedTransactionResponse::from)
                    .collect(),
                message: "Expected transactions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!(
                "Failed to retrieve expected transactions for account {}: {}",
                account_id, e
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get every expected transaction generated from a template
#[utoipa::path(
    get,
    path = "/api/v1/recurring-templates/{template_id}/expected-transactions",
    tag = "expected-transactions",
    params(
        ("template_id" = Uuid, Path, description = "Template ID"),
    ),
    responses(
        (status = 200, description = "Expected transactions retrieved successfully", body = ApiResponse<Vec<ExpectedTransactionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_template_expected_transactions(
    Path(template_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ExpectedTransactionResponse>>>, StatusCode> {
    trace!(
        "Entering get_template_expected_transactions function for template_id: {}",
        template_id
    );

    match forecast::for_template(&state.db, template_id).await {
        Ok(rows) => {
            info!(
                "Retrieved {} expected transactions for template {}",
                rows.len(),
                template_id
            );
            let response = ApiResponse {
                data: rows
                    .into_iter()
                    .map(ExpectedTransactionResponse::from)
                    .collect(),
                message: "Expected transactions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!(
                "Failed to retrieve expected transactions for template {}: {}",
                template_id, e
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Confirm a pending expected transaction against a real transaction
#[utoipa::path(
    post,
    path = "/api/v1/expected-transactions/{expected_id}/confirm",
    tag = "expected-transactions",
    params(
        ("expected_id" = Uuid, Path, description = "Expected transaction ID"),
    ),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Expected transaction confirmed", body = ApiResponse<ExpectedTransactionResponse>),
        (status = 404, description = "Not found or not pending", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn confirm_expected_transaction(
    Path(expected_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ApiResponse<ExpectedTransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering confirm_expected_transaction function for expected_id: {}",
        expected_id
    );

    if !lifecycle::confirm(&state.db, expected_id, request.actual_transaction_id).await {
        warn!("Confirm rejected for expected transaction {}", expected_id);
        return Err(transition_rejected("confirm"));
    }

    info!("Expected transaction {} confirmed", expected_id);
    reload_after_transition(&state, expected_id, "Expected transaction confirmed").await
}

/// Cancel a pending expected transaction
#[utoipa::path(
    post,
    path = "/api/v1/expected-transactions/{expected_id}/cancel",
    tag = "expected-transactions",
    params(
        ("expected_id" = Uuid, Path, description = "Expected transaction ID"),
    ),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Expected transaction cancelled", body = ApiResponse<ExpectedTransactionResponse>),
        (status = 404, description = "Not found or not pending", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn cancel_expected_transaction(
    Path(expected_id): Path<Uuid>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CancelRequest>>,
) -> Result<Json<ApiResponse<ExpectedTransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering cancel_expected_transaction function for expected_id: {}",
        expected_id
    );

    if !lifecycle::cancel(&state.db, expected_id, &request.reason).await {
        warn!("Cancel rejected for expected transaction {}", expected_id);
        return Err(transition_rejected("cancel"));
    }

    info!("Expected transaction {} cancelled", expected_id);
    reload_after_transition(&state, expected_id, "Expected transaction cancelled").await
}

/// Adjust the amount of a pending expected transaction
#[utoipa::path(
    post,
    path = "/api/v1/expected-transactions/{expected_id}/adjust",
    tag = "expected-transactions",
    params(
        ("expected_id" = Uuid, Path, description = "Expected transaction ID"),
    ),
    request_body = AdjustRequest,
    responses(
        (status = 200, description = "Expected transaction adjusted", body = ApiResponse<ExpectedTransactionResponse>),
        (status = 404, description = "Not found or not pending", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn adjust_expected_transaction(
    Path(expected_id): Path<Uuid>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<AdjustRequest>>,
) -> Result<Json<ApiResponse<ExpectedTransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering adjust_expected_transaction function for expected_id: {}",
        expected_id
    );

    if !lifecycle::adjust(&state.db, expected_id, request.new_amount, &request.reason).await {
        warn!("Adjust rejected for expected transaction {}", expected_id);
        return Err(transition_rejected("adjust"));
    }

    info!("Expected transaction {} adjusted", expected_id);
    reload_after_transition(&state, expected_id, "Expected transaction adjusted").await
}

async fn reload_after_transition(
    state: &AppState,
    expected_id: Uuid,
    message: &str,
) -> Result<Json<ApiResponse<ExpectedTransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match expected_transaction::Entity::find_by_id(expected_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => Ok(Json(ApiResponse {
            data: ExpectedTransactionResponse::from(model),
            message: message.to_string(),
            success: true,
        })),
        Ok(None) => {
            error!(
                "Expected transaction {} vanished after transition",
                expected_id
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Expected transaction disappeared after transition".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to reload expected transaction {}: {}",
                expected_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to reload expected transaction".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Cash-flow forecast over a user's pending expected transactions
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/forecast/cash-flow",
    tag = "expected-transactions",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ForecastQuery,
    ),
    responses(
        (status = 200, description = "Cash-flow forecast computed", body = ApiResponse<CashFlowReport>),
        (status = 400, description = "Invalid date window", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_cash_flow_forecast(
    Path(user_id): Path<i32>,
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CashFlowReport>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering get_cash_flow_forecast function for user_id: {}",
        user_id
    );

    validate_window(&query)?;

    match forecast::cash_flow_forecast(&state.db, user_id, query.start_date, query.end_date).await {
        Ok(report) => {
            info!(
                "Cash-flow forecast for user {} over {}..={}: net {}",
                user_id, query.start_date, query.end_date, report.net
            );
            Ok(Json(ApiResponse {
                data: report,
                message: "Cash-flow forecast computed successfully".to_string(),
                success: true,
            }))
        }
        Err(e) => {
            error!("Failed to compute cash-flow forecast for user {}: {}", user_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to compute cash-flow forecast".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Per-category forecast over a user's pending expected transactions
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/forecast/categories",
    tag = "expected-transactions",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ForecastQuery,
    ),
    responses(
        (status = 200, description = "Category forecast computed", body = ApiResponse<CategoryForecast>),
        (status = 400, description = "Invalid date window", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_category_forecast(
    Path(user_id): Path<i32>,
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CategoryForecast>>, (StatusCode, Json<ErrorResponse>)> {
    trace!(
        "Entering get_category_forecast function for user_id: {}",
        user_id
    );

    validate_window(&query)?;

    match forecast::category_forecast(&state.db, user_id, query.start_date, query.end_date).await {
        Ok(report) => {
            info!(
                "Category forecast for user {} over {}..={}: {} categories",
                user_id,
                query.start_date,
                query.end_date,
                report.categories.len()
            );
            Ok(Json(ApiResponse {
                data: report,
                message: "Category forecast computed successfully".to_string(),
                success: true,
            }))
        }
        Err(e) => {
            error!("Failed to compute category forecast for user {}: {}", user_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to compute category forecast".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

fn validate_window(query: &ForecastQuery) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if query.end_date < query.start_date {
        warn!(
            "Invalid forecast window: {} to {}",
            query.start_date, query.end_date
        );
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "end_date must not be before start_date".to_string(),
                code: "INVALID_DATE_RANGE".to_string(),
                success: false,
            }),
        ));
    }
    Ok(())
}

/// Run generation for every active, auto-generating template
#[utoipa::path(
    post,
    path = "/api/v1/expected-transactions/generate-all",
    tag = "expected-transactions",
    responses(
        (status = 200, description = "Batch generation completed", body = ApiResponse<BatchGenerationResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn generate_all_expected_transactions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BatchGenerationResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering generate_all_expected_transactions function");

    match batch::generate_for_all_active(&state.db).await {
        Ok(outcome) => {
            info!(
                "Batch generation processed {} templates, created {} rows",
                outcome.templates_processed, outcome.rows_created
            );
            Ok(Json(ApiResponse {
                data: BatchGenerationResponse {
                    templates_processed: outcome.templates_processed,
                    rows_created: outcome.rows_created,
                },
                message: "Batch generation completed successfully".to_string(),
                success: true,
            }))
        }
        Err(e) => {
            error!("Batch generation failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Batch generation failed; no partial progress was committed"
                        .to_string(),
                    code: "BATCH_GENERATION_FAILED".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
