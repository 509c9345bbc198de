use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::academic;
use model::entities::course;
use model::AcademyError;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{instrument, info, debug};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a course
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    #[validate(length(max = 500))]
    pub descriptions: Option<String>,
}

/// Request body for updating a course
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 50))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub descriptions: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub title: String,
    pub descriptions: Option<String>,
}

impl From<course::Model> for CourseResponse {
    fn from(model: course::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            descriptions: model.descriptions,
        }
    }
}

/// Create a course
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created successfully", body = ApiResponse<CourseResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateCourseRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CourseResponse>>), ApiError> {
    debug!("Creating course: {}", request.title);

    let created = course::ActiveModel {
        title: Set(request.title),
        descriptions: Set(request.descriptions),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| api_error(e.into()))?;

    info!("Course created with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CourseResponse::from(created), "Course created successfully")),
    ))
}

/// Get all courses
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "courses",
    params(ListQuery),
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<Vec<CourseResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_courses(
    Valid(Query(query)): Valid<Query<ListQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, ApiError> {
    let (page, limit) = query.page_and_size();

    let courses = course::Entity::find()
        .order_by_asc(course::Column::Id)
        .paginate(&state.db, limit)
        .fetch_page(page)
        .await
        .map_err(|e| api_error(e.into()))?;

    debug!("Retrieved {} courses", courses.len());
    let data = courses.into_iter().map(CourseResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "Courses retrieved successfully")))
}

/// Get a course by ID
#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course retrieved successfully", body = ApiResponse<CourseResponse>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CourseResponse>>, ApiError> {
    let found = find_course(&state, course_id).await?;
    Ok(Json(ApiResponse::ok(CourseResponse::from(found), "Course retrieved successfully")))
}

/// Update a course
#[utoipa::path(
    put,
    path = "/api/v1/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated successfully", body = ApiResponse<CourseResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateCourseRequest>>,
) -> Result<Json<ApiResponse<CourseResponse>>, ApiError> {
    let existing = find_course(&state, course_id).await?;

    let mut active: course::ActiveModel = existing.into();
    if let Some(title) = request.title {
        active.title = Set(title);
    }
    if let Some(descriptions) = request.descriptions {
        active.descriptions = Set(Some(descriptions));
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    info!("Course with ID {} updated successfully", course_id);
    Ok(Json(ApiResponse::ok(CourseResponse::from(updated), "Course updated successfully")))
}

/// Delete a course
///
/// Refused while any study group still belongs to the course.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Course still has study groups", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    academic::delete_course(&state.db, course_id).await.map_err(api_error)?;

    info!("Course with ID {} deleted successfully", course_id);
    Ok(Json(ApiResponse::ok(format!("Course {} deleted", course_id), "Course deleted successfully")))
}

async fn find_course(state: &AppState, course_id: i32) -> Result<course::Model, ApiError> {
    course::Entity::find_by_id(course_id)
        .one(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?
        .ok_or_else(|| api_error(AcademyError::NotFound { entity: "Course", id: course_id }))
}
