use crate::handlers::teachers::{owner_phone, ProfileResponse};
use crate::handlers::{link_pair, unlink_pair};
use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use model::academic::{self, Link, NewStudyGroup};
use model::entities::{student, study_group, teacher, user};
use model::AcademyError;
use sea_orm::{EntityTrait, ModelTrait, PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn, info, debug};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a study group
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateStudyGroupRequest {
    /// Unique title
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    pub course_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Free-form price, e.g. "900000"
    #[validate(length(max = 15))]
    pub price: Option<String>,
    #[validate(length(max = 500))]
    pub descriptions: Option<String>,
}

impl From<CreateStudyGroupRequest> for NewStudyGroup {
    fn from(request: CreateStudyGroupRequest) -> Self {
        Self {
            title: request.title,
            course_id: request.course_id,
            start_date: request.start_date,
            end_date: request.end_date,
            price: request.price,
            descriptions: request.descriptions,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudyGroupResponse {
    pub id: i32,
    pub title: String,
    pub course_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: Option<String>,
    pub descriptions: Option<String>,
    pub created: NaiveDate,
    pub updated: NaiveDate,
}

impl From<study_group::Model> for StudyGroupResponse {
    fn from(model: study_group::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            course_id: model.course_id,
            start_date: model.start_date,
            end_date: model.end_date,
            price: model.price,
            descriptions: model.descriptions,
            created: model.created,
            updated: model.updated,
        }
    }
}

async fn find_group(state: &AppState, study_group_id: i32) -> Result<study_group::Model, ApiError> {
    study_group::Entity::find_by_id(study_group_id)
        .one(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?
        .ok_or_else(|| api_error(AcademyError::NotFound { entity: "StudyGroup", id: study_group_id }))
}

/// Create a study group
#[utoipa::path(
    post,
    path = "/api/v1/study-groups",
    tag = "study-groups",
    request_body = CreateStudyGroupRequest,
    responses(
        (status = 201, description = "Study group created successfully", body = ApiResponse<StudyGroupResponse>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Title already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_study_group(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateStudyGroupRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<StudyGroupResponse>>), ApiError> {
    let created = academic::create_study_group(&state.db, request.into())
        .await
        .map_err(api_error)?;

    info!("Study group {} created for course {}", created.id, created.course_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(StudyGroupResponse::from(created), "Study group created successfully")),
    ))
}

/// Get all study groups
#[utoipa::path(
    get,
    path = "/api/v1/study-groups",
    tag = "study-groups",
    params(ListQuery),
    responses(
        (status = 200, description = "Study groups retrieved successfully", body = ApiResponse<Vec<StudyGroupResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_study_groups(
    Valid(Query(query)): Valid<Query<ListQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StudyGroupResponse>>>, ApiError> {
    let (page, limit) = query.page_and_size();

    let groups = study_group::Entity::find()
        .order_by_asc(study_group::Column::StartDate)
        .order_by_asc(study_group::Column::Id)
        .paginate(&state.db, limit)
        .fetch_page(page)
        .await
        .map_err(|e| api_error(e.into()))?;

    debug!("Retrieved {} study groups", groups.len());
    let data = groups.into_iter().map(StudyGroupResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "Study groups retrieved successfully")))
}

/// Get a study group by ID
#[utoipa::path(
    get,
    path = "/api/v1/study-groups/{study_group_id}",
    tag = "study-groups",
    params(
        ("study_group_id" = i32, Path, description = "Study group ID"),
    ),
    responses(
        (status = 200, description = "Study group retrieved successfully", body = ApiResponse<StudyGroupResponse>),
        (status = 404, description = "Study group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_study_group(
    Path(study_group_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StudyGroupResponse>>, ApiError> {
    let found = find_group(&state, study_group_id).await?;
    Ok(Json(ApiResponse::ok(StudyGroupResponse::from(found), "Study group retrieved successfully")))
}

/// Delete a study group. Enrolments and teacher assignments go with it.
#[utoipa::path(
    delete,
    path = "/api/v1/study-groups/{study_group_id}",
    tag = "study-groups",
    params(
        ("study_group_id" = i32, Path, description = "Study group ID"),
    ),
    responses(
        (status = 200, description = "Study group deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Study group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_study_group(
    Path(study_group_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = study_group::Entity::delete_by_id(study_group_id)
        .exec(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    if result.rows_affected == 0 {
        warn!("Study group with ID {} not found for deletion", study_group_id);
        return Err(api_error(AcademyError::NotFound { entity: "StudyGroup", id: study_group_id }));
    }

    info!("Study group with ID {} deleted successfully", study_group_id);
    Ok(Json(ApiResponse::ok(
        format!("Study group {} deleted", study_group_id),
        "Study group deleted successfully",
    )))
}

/// Teachers of a study group
#[utoipa::path(
    get,
    path = "/api/v1/study-groups/{study_group_id}/teachers",
    tag = "study-groups",
    params(
        ("study_group_id" = i32, Path, description = "Study group ID"),
    ),
    responses(
        (status = 200, description = "Teachers retrieved successfully", body = ApiResponse<Vec<ProfileResponse>>),
        (status = 404, description = "Study group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_group_teachers(
    Path(study_group_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProfileResponse>>>, ApiError> {
    let group = find_group(&state, study_group_id).await?;
    let rows = group
        .find_related(teacher::Entity)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    let data = rows
        .into_iter()
        .map(|(found, owner)| ProfileResponse::from_teacher(found, owner_phone(owner)))
        .collect();
    Ok(Json(ApiResponse::ok(data, "Teachers retrieved successfully")))
}

/// Students of a study group
#[utoipa::path(
    get,
    path = "/api/v1/study-groups/{study_group_id}/students",
    tag = "study-groups",
    params(
        ("study_group_id" = i32, Path, description = "Study group ID"),
    ),
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<Vec<ProfileResponse>>),
        (status = 404, description = "Study group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_group_students(
    Path(study_group_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProfileResponse>>>, ApiError> {
    let group = find_group(&state, study_group_id).await?;
    let rows = group
        .find_related(student::Entity)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    let data = rows
        .into_iter()
        .map(|(found, owner)| ProfileResponse::from_student(found, owner_phone(owner)))
        .collect();
    Ok(Json(ApiResponse::ok(data, "Students retrieved successfully")))
}

/// Assign a teacher to a study group
#[utoipa::path(
    put,
    path = "/api/v1/study-groups/{study_group_id}/teachers/{teacher_id}",
    tag = "study-groups",
    params(
        ("study_group_id" = i32, Path, description = "Study group ID"),
        ("teacher_id" = i32, Path, description = "Teacher ID"),
    ),
    responses(
        (status = 200, description = "Teacher assigned to study group", body = ApiResponse<String>),
        (status = 404, description = "Study group or teacher not found", body = ErrorResponse),
        (status = 409, description = "Already assigned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn link_group_teacher(
    Path((study_group_id, teacher_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    link_pair(&state.db, Link::StudyGroupTeacher { study_group_id, teacher_id }).await
}

/// Remove a teacher from a study group
#[utoipa::path(
    delete,
    path = "/api/v1/study-groups/{study_group_id}/teachers/{teacher_id}",
    tag = "study-groups",
    params(
        ("study_group_id" = i32, Path, description = "Study group ID"),
        ("teacher_id" = i32, Path, description = "Teacher ID"),
    ),
    responses(
        (status = 200, description = "Teacher removed from study group", body = ApiResponse<String>),
        (status = 404, description = "No such assignment", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unlink_group_teacher(
    Path((study_group_id, teacher_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    unlink_pair(&state.db, Link::StudyGroupTeacher { study_group_id, teacher_id }).await
}
