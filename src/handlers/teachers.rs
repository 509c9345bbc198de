use crate::handlers::branches::BranchResponse;
use crate::handlers::courses::CourseResponse;
use crate::handlers::{link_pair, unlink_pair};
use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::academic::{self, Link};
use model::entities::{branch, course, teacher, user};
use model::AcademyError;
use sea_orm::{EntityTrait, ModelTrait, PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn, info, debug};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for attaching a teacher or student profile to a user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateProfileRequest {
    pub user_id: i32,
    #[validate(length(max = 500))]
    pub descriptions: Option<String>,
}

/// A teacher or student profile, shown by its owner's phone
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i32,
    pub user_id: i32,
    pub phone: String,
    pub descriptions: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn from_teacher(model: teacher::Model, phone: String) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            phone,
            descriptions: model.descriptions,
            created: model.created,
            updated: model.updated,
        }
    }
}

pub(crate) fn owner_phone(owner: Option<user::Model>) -> String {
    owner.map(|u| u.phone).unwrap_or_default()
}

async fn find_teacher(state: &AppState, teacher_id: i32) -> Result<teacher::Model, ApiError> {
    teacher::Entity::find_by_id(teacher_id)
        .one(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?
        .ok_or_else(|| api_error(AcademyError::NotFound { entity: "Teacher", id: teacher_id }))
}

/// Create a teacher profile for an existing user
#[utoipa::path(
    post,
    path = "/api/v1/teachers",
    tag = "teachers",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Teacher created successfully", body = ApiResponse<ProfileResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "User already has a teacher profile", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_teacher(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateProfileRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileResponse>>), ApiError> {
    let created = academic::create_teacher(&state.db, request.user_id, request.descriptions)
        .await
        .map_err(api_error)?;
    let phone = created.display_name(&state.db).await.map_err(api_error)?;

    info!("Teacher {} created for user {}", created.id, created.user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ProfileResponse::from_teacher(created, phone),
            "Teacher created successfully",
        )),
    ))
}

/// Get all teachers
#[utoipa::path(
    get,
    path = "/api/v1/teachers",
    tag = "teachers",
    params(ListQuery),
    responses(
        (status = 200, description = "Teachers retrieved successfully", body = ApiResponse<Vec<ProfileResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_teachers(
    Valid(Query(query)): Valid<Query<ListQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProfileResponse>>>, ApiError> {
    let (page, limit) = query.page_and_size();

    let rows = teacher::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(teacher::Column::Id)
        .paginate(&state.db, limit)
        .fetch_page(page)
        .await
        .map_err(|e| api_error(e.into()))?;

    debug!("Retrieved {} teachers", rows.len());
    let data = rows
        .into_iter()
        .map(|(found, owner)| ProfileResponse::from_teacher(found, owner_phone(owner)))
        .collect();
    Ok(Json(ApiResponse::ok(data, "Teachers retrieved successfully")))
}

/// Get a teacher by ID
#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}",
    tag = "teachers",
    params(
        ("teacher_id" = i32, Path, description = "Teacher ID"),
    ),
    responses(
        (status = 200, description = "Teacher retrieved successfully", body = ApiResponse<ProfileResponse>),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    Path(teacher_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let found = find_teacher(&state, teacher_id).await?;
    let phone = found.display_name(&state.db).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        ProfileResponse::from_teacher(found, phone),
        "Teacher retrieved successfully",
    )))
}

/// Delete a teacher profile. The user account stays.
#[utoipa::path(
    delete,
    path = "/api/v1/teachers/{teacher_id}",
    tag = "teachers",
    params(
        ("teacher_id" = i32, Path, description = "Teacher ID"),
    ),
    responses(
        (status = 200, description = "Teacher deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_teacher(
    Path(teacher_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = teacher::Entity::delete_by_id(teacher_id)
        .exec(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    if result.rows_affected == 0 {
        warn!("Teacher with ID {} not found for deletion", teacher_id);
        return Err(api_error(AcademyError::NotFound { entity: "Teacher", id: teacher_id }));
    }

    info!("Teacher with ID {} deleted successfully", teacher_id);
    Ok(Json(ApiResponse::ok(format!("Teacher {} deleted", teacher_id), "Teacher deleted successfully")))
}

/// Branches a teacher works at
#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}/branches",
    tag = "teachers",
    params(
        ("teacher_id" = i32, Path, description = "Teacher ID"),
    ),
    responses(
        (status = 200, description = "Branches retrieved successfully", body = ApiResponse<Vec<BranchResponse>>),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_teacher_branches(
    Path(teacher_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BranchResponse>>>, ApiError> {
    let found = find_teacher(&state, teacher_id).await?;
    let branches = found
        .find_related(branch::Entity)
        .all(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    let data = branches.into_iter().map(BranchResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "Branches retrieved successfully")))
}

/// Courses a teacher teaches
#[utoipa::path(
    get,
    path = "/api/v1/teachers/{teacher_id}/courses",
    tag = "teachers",
    params(
        ("teacher_id" = i32, Path, description = "Teacher ID"),
    ),
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<Vec<CourseResponse>>),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_teacher_courses(
    Path(teacher_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, ApiError> {
    let found = find_teacher(&state, teacher_id).await?;
    let courses = found
        .find_related(course::Entity)
        .all(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    let data = courses.into_iter().map(CourseResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "Courses retrieved successfully")))
}

/// Assign a teacher to a branch
#[utoipa::path(
    put,
    path = "/api/v1/teachers/{teacher_id}/branches/{branch_id}",
    tag = "teachers",
    params(
        ("teacher_id" = i32, Path, description = "Teacher ID"),
        ("branch_id" = i32, Path, description = "Branch ID"),
    ),
    responses(
        (status = 200, description = "Teacher assigned to branch", body = ApiResponse<String>),
        (status = 404, description = "Teacher or branch not found", body = ErrorResponse),
        (status = 409, description = "Already assigned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn link_teacher_branch(
    Path((teacher_id, branch_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    link_pair(&state.db, Link::TeacherBranch { teacher_id, branch_id }).await
}

/// Remove a teacher from a branch
#[utoipa::path(
    delete,
    path = "/api/v1/teachers/{teacher_id}/branches/{branch_id}",
    tag = "teachers",
    params(
        ("teacher_id" = i32, Path, description = "Teacher ID"),
        ("branch_id" = i32, Path, description = "Branch ID"),
    ),
    responses(
        (status = 200, description = "Teacher removed from branch", body = ApiResponse<String>),
        (status = 404, description = "No such assignment", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unlink_teacher_branch(
    Path((teacher_id, branch_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    unlink_pair(&state.db, Link::TeacherBranch { teacher_id, branch_id }).await
}

/// Assign a teacher to a course
#[utoipa::path(
    put,
    path = "/api/v1/teachers/{teacher_id}/courses/{course_id}",
    tag = "teachers",
    params(
        ("teacher_id" = i32, Path, description = "Teacher ID"),
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Teacher assigned to course", body = ApiResponse<String>),
        (status = 404, description = "Teacher or course not found", body = ErrorResponse),
        (status = 409, description = "Already assigned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn link_teacher_course(
    Path((teacher_id, course_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    link_pair(&state.db, Link::TeacherCourse { teacher_id, course_id }).await
}

/// Remove a teacher from a course
#[utoipa::path(
    delete,
    path = "/api/v1/teachers/{teacher_id}/courses/{course_id}",
    tag = "teachers",
    params(
        ("teacher_id" = i32, Path, description = "Teacher ID"),
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Teacher removed from course", body = ApiResponse<String>),
        (status = 404, description = "No such assignment", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unlink_teacher_course(
    Path((teacher_id, course_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    unlink_pair(&state.db, Link::TeacherCourse { teacher_id, course_id }).await
}
