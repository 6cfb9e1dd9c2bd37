use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use engine::generator::{self, GenerationOutcome};
use engine::EngineError;
use model::entities::recurring_transaction_template::{self, Frequency, TransactionType};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a recurring transaction template
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTemplateRequest {
    /// Owning user ID
    pub user_id: i32,
    /// Target account ID
    pub account_id: i32,
    /// Template name
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Optional description, copied onto generated rows
    pub description: Option<String>,
    /// Amount of each occurrence (positive)
    pub amount: Decimal,
    /// "Income" or "Expense"
    pub transaction_type: String,
    /// Optional category, copied onto generated rows
    pub category: Option<String>,
    /// Recurrence frequency (Daily, Weekly, Biweekly, Monthly, Quarterly, SemiAnnually, Annually, Custom)
    pub frequency: String,
    /// Interval in days, required when frequency is Custom
    #[validate(range(min = 1, max = 3650))]
    pub custom_interval_days: Option<i32>,
    /// Date of the first occurrence
    pub start_date: NaiveDate,
    /// Optional date of the last occurrence
    pub end_date: Option<NaiveDate>,
    /// Generation horizon in days (default: 30)
    #[validate(range(min = 0, max = 3650))]
    pub days_in_advance: Option<i32>,
    /// Whether generation picks this template up (default: true)
    pub auto_generate: Option<bool>,
}

/// Request body for updating a template. Only provided fields change;
/// the schedule pointer is never updatable from the outside.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 0, max = 3650))]
    pub days_in_advance: Option<i32>,
    pub auto_generate: Option<bool>,
    pub is_active: Option<bool>,
}

/// Query parameters for listing templates
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct TemplateListQuery {
    /// Filter by owning user
    pub user_id: Option<i32>,
}

/// Recurring transaction template response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TemplateResponse {
    pub id: Uuid,
    pub user_id: i32,
    pub account_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub transaction_type: String,
    pub category: Option<String>,
    pub frequency: String,
    pub custom_interval_days: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_execution_date: NaiveDate,
    pub is_active: bool,
    pub auto_generate: bool,
    pub days_in_advance: i32,
}

impl From<recurring_transaction_template::Model> for TemplateResponse {
    fn from(model: recurring_transaction_template::Model) -> Self {
        // Sqlite strips trailing zeros from stored amounts; responses
        // always carry two decimal places.
        let mut amount = model.amount;
        amount.rescale(2);
        Self {
            id: model.id,
            user_id: model.user_id,
            account_id: model.account_id,
            name: model.name,
            description: model.description,
            amount,
            transaction_type: format!("{:?}", model.transaction_type),
            category: model.category,
            frequency: format!("{:?}", model.frequency),
            custom_interval_days: model.custom_interval_days,
            start_date: model.start_date,
            end_date: model.end_date,
            next_execution_date: model.next_execution_date,
            is_active: model.is_active,
            auto_generate: model.auto_generate,
            days_in_advance: model.days_in_advance,
        }
    }
}

/// Result of a generation run for one template
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerationResponse {
    /// Newly created expected transactions
    pub created: u64,
    /// The template's schedule pointer after the run, if it ran
    pub next_execution_date: Option<NaiveDate>,
    /// Whether the template was skipped (inactive, not auto-generating,
    /// or schedule exhausted)
    pub skipped: bool,
}

impl From<GenerationOutcome> for GenerationResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        match outcome {
            GenerationOutcome::Skipped => Self {
                created: 0,
                next_execution_date: None,
                skipped: true,
            },
            GenerationOutcome::Generated {
                created,
                next_execution_date,
            } => Self {
                created,
                next_execution_date: Some(next_execution_date),
                skipped: false,
            },
        }
    }
}

// Helper function to parse frequency string to Frequency enum
fn parse_frequency(frequency_str: &str) -> Result<Frequency, String> {
    match frequency_str {
        "Daily" => Ok(Frequency::Daily),
        "Weekly" => Ok(Frequency::Weekly),
        "Biweekly" => Ok(Frequency::Biweekly),
        "Monthly" => Ok(Frequency::Monthly),
        "Quarterly" => Ok(Frequency::Quarterly),
        "SemiAnnually" => Ok(Frequency::SemiAnnually),
        "Annually" => Ok(Frequency::Annually),
        "Custom" => Ok(Frequency::Custom),
        _ => Err(format!("Invalid frequency: {}", frequency_str)),
    }
}

// Helper function to parse transaction type string to TransactionType enum
fn parse_transaction_type(type_str: &str) -> Result<TransactionType, String> {
    match type_str {
        "Income" => Ok(TransactionType::Income),
        "Expense" => Ok(TransactionType::Expense),
        _ => Err(format!("Invalid transaction type: {}", type_str)),
    }
}

/// Create a new recurring transaction template
#[utoipa::path(
    post,
    path = "/api/v1/recurring-templates",
    tag = "recurring-templates",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created successfully", body = ApiResponse<TemplateResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_template(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateTemplateRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TemplateResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_template function");
    debug!(
        "Creating template '{}' for user {} on account {}",
        request.name, request.user_id, request.account_id
    );

    let frequency = match parse_frequency(&request.frequency) {
        Ok(frequency) => frequency,
        Err(e) => {
            warn!("Invalid frequency: {}", e);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e,
                    code: "INVALID_FREQUENCY".to_string(),
                    success: false,
                }),
            ));
        }
    };

    let transaction_type = match parse_transaction_type(&request.transaction_type) {
        Ok(transaction_type) => transaction_type,
        Err(e) => {
            warn!("Invalid transaction type: {}", e);
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e,
                    code: "INVALID_TRANSACTION_TYPE".to_string(),
                    success: false,
                }),
            ));
        }
    };

    if frequency == Frequency::Custom && request.custom_interval_days.is_none() {
        warn!("Custom frequency without custom_interval_days");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "custom_interval_days is required when frequency is Custom".to_string(),
                code: "MISSING_CUSTOM_INTERVAL".to_string(),
                success: false,
            }),
        ));
    }

    if let Some(end_date) = request.end_date {
        if end_date < request.start_date {
            warn!(
                "End date {} is before start date {}",
                end_date, request.start_date
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
    }

    // The schedule pointer starts at the first occurrence.
    let new_template = recurring_transaction_template::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(request.user_id),
        account_id: Set(request.account_id),
        name: Set(request.name.clone()),
        description: Set(request.description.clone()),
        amount: Set(request.amount),
        transaction_type: Set(transaction_type),
        category: Set(request.category.clone()),
        frequency: Set(frequency),
        custom_interval_days: Set(request.custom_interval_days),
        start_date: Set(request.start_date),
        end_date: Set(request.end_date),
        next_execution_date: Set(request.start_date),
        is_active: Set(true),
        auto_generate: Set(request.auto_generate.unwrap_or(true)),
        days_in_advance: Set(request.days_in_advance.unwrap_or(30)),
    };

    match new_template.insert(&state.db).await {
        Ok(template_model) => {
            info!(
                "Template created successfully with ID: {}, name: {}",
                template_model.id, template_model.name
            );
            let response = ApiResponse {
                data: TemplateResponse::from(template_model),
                message: "Template created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create template '{}': {}", request.name, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create template".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Get all templates, optionally filtered by user
#[utoipa::path(
    get,
    path = "/api/v1/recurring-templates",
    tag = "recurring-templates",
    params(TemplateListQuery),
    responses(
        (status = 200, description = "Templates retrieved successfully", body = ApiResponse<Vec<TemplateResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_templates(
    Query(query): Query<TemplateListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TemplateResponse>>>, StatusCode> {
    trace!("Entering get_templates function");

    let mut query_builder = recurring_transaction_template::Entity::find();
    if let Some(user_id) = query.user_id {
        debug!("Filtering templates by user_id: {}", user_id);
        query_builder =
            query_builder.filter(recurring_transaction_template::Column::UserId.eq(user_id));
    }

    match query_builder
        .order_by_asc(recurring_transaction_template::Column::NextExecutionDate)
        .all(&state.db)
        .await
    {
        Ok(templates) => {
            info!("Successfully retrieved {} templates", templates.len());
            let response = ApiResponse {
                data: templates.into_iter().map(TemplateResponse::from).collect(),
                message: "Templates retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve templates: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific template by ID
#[utoipa::path(
    get,
    path = "/api/v1/recurring-templates/{template_id}",
    tag = "recurring-templates",
    params(
        ("template_id" = Uuid, Path, description = "Template ID"),
    ),
    responses(
        (status = 200, description = "Template retrieved successfully", body = ApiResponse<TemplateResponse>),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_template(
    Path(template_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TemplateResponse>>, StatusCode> {
    trace!("Entering get_template function for template_id: {}", template_id);

    match recurring_transaction_template::Entity::find_by_id(template_id)
        .one(&state.db)
        .await
    {
        Ok(Some(template_model)) => {
            debug!("Found template: {}", template_model.name);
            let response = ApiResponse {
                data: TemplateResponse::from(template_model),
                message: "Template retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Template with ID {} not found", template_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve template with ID {}: {}",
                template_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a template
#[utoipa::path(
    put,
    path = "/api/v1/recurring-templates/{template_id}",
    tag = "recurring-templates",
    params(
        ("template_id" = Uuid, Path, description = "Template ID"),
    ),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated successfully", body = ApiResponse<TemplateResponse>),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_template(
    Path(template_id): Path<Uuid>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateTemplateRequest>>,
) -> Result<Json<ApiResponse<TemplateResponse>>, StatusCode> {
    trace!("Entering update_template function for template_id: {}", template_id);

    let existing = match recurring_transaction_template::Entity::find_by_id(template_id)
        .one(&state.db)
        .await
    {
        Ok(Some(template)) => template,
        Ok(None) => {
            warn!("Template with ID {} not found for update", template_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup template with ID {} for update: {}",
                template_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut template_active: recurring_transaction_template::ActiveModel = existing.into();

    if let Some(name) = request.name {
        template_active.name = Set(name);
    }
    if let Some(description) = request.description {
        template_active.description = Set(Some(description));
    }
    if let Some(amount) = request.amount {
        template_active.amount = Set(amount);
    }
    if let Some(category) = request.category {
        template_active.category = Set(Some(category));
    }
    if let Some(end_date) = request.end_date {
        template_active.end_date = Set(Some(end_date));
    }
    if let Some(days_in_advance) = request.days_in_advance {
        template_active.days_in_advance = Set(days_in_advance);
    }
    if let Some(auto_generate) = request.auto_generate {
        template_active.auto_generate = Set(auto_generate);
    }
    if let Some(is_active) = request.is_active {
        template_active.is_active = Set(is_active);
    }

    match template_active.update(&state.db).await {
        Ok(updated) => {
            info!("Template with ID {} updated successfully", template_id);
            let response = ApiResponse {
                data: TemplateResponse::from(updated),
                message: "Template updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to update template with ID {}: {}",
                template_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Deactivate a template so generation skips it. Already-generated
/// expected transactions are untouched.
#[utoipa::path(
    post,
    path = "/api/v1/recurring-templates/{template_id}/deactivate",
    tag = "recurring-templates",
    params(
        ("template_id" = Uuid, Path, description = "Template ID"),
    ),
    responses(
        (status = 200, description = "Template deactivated successfully", body = ApiResponse<TemplateResponse>),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn deactivate_template(
    Path(template_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TemplateResponse>>, StatusCode> {
    trace!(
        "Entering deactivate_template function for template_id: {}",
        template_id
    );

    let existing = match recurring_transaction_template::Entity::find_by_id(template_id)
        .one(&state.db)
        .await
    {
        Ok(Some(template)) => template,
        Ok(None) => {
            warn!("Template with ID {} not found for deactivation", template_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup template with ID {} for deactivation: {}",
                template_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut template_active: recurring_transaction_template::ActiveModel = existing.into();
    template_active.is_active = Set(false);

    match template_active.update(&state.db).await {
        Ok(updated) => {
            info!("Template with ID {} deactivated", template_id);
            let response = ApiResponse {
                data: TemplateResponse::from(updated),
                message: "Template deactivated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to deactivate template with ID {}: {}",
                template_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Generate expected transactions for one template up to its horizon
#[utoipa::path(
    post,
    path = "/api/v1/recurring-templates/{template_id}/generate",
    tag = "recurring-templates",
    params(
        ("template_id" = Uuid, Path, description = "Template ID"),
    ),
    responses(
        (status = 200, description = "Generation completed", body = ApiResponse<GenerationResponse>),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn generate_for_template(
    Path(template_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GenerationResponse>>, StatusCode> {
    trace!(
        "Entering generate_for_template function for template_id: {}",
        template_id
    );

    let template = match recurring_transaction_template::Entity::find_by_id(template_id)
        .one(&state.db)
        .await
    {
        Ok(Some(template)) => template,
        Ok(None) => {
            warn!("Template with ID {} not found for generation", template_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup template with ID {} for generation: {}",
                template_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match generator::generate(&state.db, template.id, template.days_in_advance).await {
        Ok(outcome) => {
            info!(
                "Generation for template {} finished: {:?}",
                template_id, outcome
            );
            let response = ApiResponse {
                data: GenerationResponse::from(outcome),
                message: "Generation completed".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!("Generation for template {} failed: {}", template_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get the occurrence that would follow the template's current schedule
/// pointer, without generating anything
#[utoipa::path(
    get,
    path = "/api/v1/recurring-templates/{template_id}/next-execution-date",
    tag = "recurring-templates",
    params(
        ("template_id" = Uuid, Path, description = "Template ID"),
    ),
    responses(
        (status = 200, description = "Next execution date computed", body = ApiResponse<NaiveDate>),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_next_execution_date(
    Path(template_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<NaiveDate>>, StatusCode> {
    trace!(
        "Entering get_next_execution_date function for template_id: {}",
        template_id
    );

    match generator::calculate_next_execution_date(&state.db, template_id).await {
        Ok(next_date) => {
            debug!(
                "Next execution date for template {}: {}",
                template_id, next_date
            );
            let response = ApiResponse {
                data: next_date,
                message: "Next execution date computed successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(EngineError::TemplateNotFound(_)) => {
            warn!("Template with ID {} not found", template_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            error!(
                "Failed to compute next execution date for template {}: {}",
                template_id, e
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
