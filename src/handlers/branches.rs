use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::entities::branch;
use model::AcademyError;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn, info, debug};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a branch
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateBranchRequest {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    /// Defaults to true
    pub is_active: Option<bool>,
    #[validate(length(max = 500))]
    pub descriptions: Option<String>,
}

/// Request body for updating a branch
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateBranchRequest {
    #[validate(length(min = 1, max = 50))]
    pub title: Option<String>,
    pub is_active: Option<bool>,
    #[validate(length(max = 500))]
    pub descriptions: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BranchResponse {
    pub id: i32,
    pub title: String,
    pub is_active: bool,
    pub descriptions: Option<String>,
}

impl From<branch::Model> for BranchResponse {
    fn from(model: branch::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            is_active: model.is_active,
            descriptions: model.descriptions,
        }
    }
}

/// Create a branch
#[utoipa::path(
    post,
    path = "/api/v1/branches",
    tag = "branches",
    request_body = CreateBranchRequest,
    responses(
        (status = 201, description = "Branch created successfully", body = ApiResponse<BranchResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_branch(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateBranchRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<BranchResponse>>), ApiError> {
    let mut new_branch = branch::ActiveModel {
        title: Set(request.title),
        descriptions: Set(request.descriptions),
        ..Default::default()
    };
    if let Some(is_active) = request.is_active {
        new_branch.is_active = Set(is_active);
    }

    let created = new_branch
        .insert(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    info!("Branch created with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(BranchResponse::from(created), "Branch created successfully")),
    ))
}

/// Get all branches
#[utoipa::path(
    get,
    path = "/api/v1/branches",
    tag = "branches",
    params(ListQuery),
    responses(
        (status = 200, description = "Branches retrieved successfully", body = ApiResponse<Vec<BranchResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_branches(
    Valid(Query(query)): Valid<Query<ListQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BranchResponse>>>, ApiError> {
    let (page, limit) = query.page_and_size();

    let branches = branch::Entity::find()
        .order_by_asc(branch::Column::Id)
        .paginate(&state.db, limit)
        .fetch_page(page)
        .await
        .map_err(|e| api_error(e.into()))?;

    debug!("Retrieved {} branches", branches.len());
    let data = branches.into_iter().map(BranchResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "Branches retrieved successfully")))
}

/// Get a branch by ID
#[utoipa::path(
    get,
    path = "/api/v1/branches/{branch_id}",
    tag = "branches",
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
    ),
    responses(
        (status = 200, description = "Branch retrieved successfully", body = ApiResponse<BranchResponse>),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_branch(
    Path(branch_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BranchResponse>>, ApiError> {
    let found = find_branch(&state, branch_id).await?;
    Ok(Json(ApiResponse::ok(BranchResponse::from(found), "Branch retrieved successfully")))
}

/// Update a branch
#[utoipa::path(
    put,
    path = "/api/v1/branches/{branch_id}",
    tag = "branches",
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
    ),
    request_body = UpdateBranchRequest,
    responses(
        (status = 200, description = "Branch updated successfully", body = ApiResponse<BranchResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_branch(
    Path(branch_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateBranchRequest>>,
) -> Result<Json<ApiResponse<BranchResponse>>, ApiError> {
    let existing = find_branch(&state, branch_id).await?;

    let mut active: branch::ActiveModel = existing.into();
    if let Some(title) = request.title {
        active.title = Set(title);
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(descriptions) = request.descriptions {
        active.descriptions = Set(Some(descriptions));
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    info!("Branch with ID {} updated successfully", branch_id);
    Ok(Json(ApiResponse::ok(BranchResponse::from(updated), "Branch updated successfully")))
}

/// Delete a branch. Its teacher links go with it.
#[utoipa::path(
    delete,
    path = "/api/v1/branches/{branch_id}",
    tag = "branches",
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
    ),
    responses(
        (status = 200, description = "Branch deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Branch not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_branch(
    Path(branch_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = branch::Entity::delete_by_id(branch_id)
        .exec(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    if result.rows_affected == 0 {
        warn!("Branch with ID {} not found for deletion", branch_id);
        return Err(api_error(AcademyError::NotFound { entity: "Branch", id: branch_id }));
    }

    info!("Branch with ID {} deleted successfully", branch_id);
    Ok(Json(ApiResponse::ok(format!("Branch {} deleted", branch_id), "Branch deleted successfully")))
}

async fn find_branch(state: &AppState, branch_id: i32) -> Result<branch::Model, ApiError> {
    branch::Entity::find_by_id(branch_id)
        .one(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?
        .ok_or_else(|| api_error(AcademyError::NotFound { entity: "Branch", id: branch_id }))
}
