use crate::handlers::courses::CourseResponse;
use crate::handlers::study_groups::StudyGroupResponse;
use crate::handlers::teachers::{owner_phone, CreateProfileRequest, ProfileResponse};
use crate::handlers::{link_pair, unlink_pair};
use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::academic::{self, Link};
use model::entities::{course, student, study_group, user};
use model::AcademyError;
use sea_orm::{EntityTrait, ModelTrait, PaginatorTrait, QueryOrder};
use tracing::{instrument, warn, info, debug};

impl ProfileResponse {
    pub fn from_student(model: student::Model, phone: String) -> Self {
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

async fn find_student(state: &AppState, student_id: i32) -> Result<student::Model, ApiError> {
    student::Entity::find_by_id(student_id)
        .one(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?
        .ok_or_else(|| api_error(AcademyError::NotFound { entity: "Student", id: student_id }))
}

/// Create a student profile for an existing user
#[utoipa::path(
    post,
    path = "/api/v1/students",
    tag = "students",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Student created successfully", body = ApiResponse<ProfileResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "User already has a student profile", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_student(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateProfileRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileResponse>>), ApiError> {
    let created = academic::create_student(&state.db, request.user_id, request.descriptions)
        .await
        .map_err(api_error)?;
    let phone = created.display_name(&state.db).await.map_err(api_error)?;

    info!("Student {} created for user {}", created.id, created.user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            ProfileResponse::from_student(created, phone),
            "Student created successfully",
        )),
    ))
}

/// Get all students
#[utoipa::path(
    get,
    path = "/api/v1/students",
    tag = "students",
    params(ListQuery),
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<Vec<ProfileResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_students(
    Valid(Query(query)): Valid<Query<ListQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProfileResponse>>>, ApiError> {
    let (page, limit) = query.page_and_size();

    let rows = student::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(student::Column::Id)
        .paginate(&state.db, limit)
        .fetch_page(page)
        .await
        .map_err(|e| api_error(e.into()))?;

    debug!("Retrieved {} students", rows.len());
    let data = rows
        .into_iter()
        .map(|(found, owner)| ProfileResponse::from_student(found, owner_phone(owner)))
        .collect();
    Ok(Json(ApiResponse::ok(data, "Students retrieved successfully")))
}

/// Get a student by ID
#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student retrieved successfully", body = ApiResponse<ProfileResponse>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let found = find_student(&state, student_id).await?;
    let phone = found.display_name(&state.db).await.map_err(api_error)?;
    Ok(Json(ApiResponse::ok(
        ProfileResponse::from_student(found, phone),
        "Student retrieved successfully",
    )))
}

/// Delete a student profile. The user account stays.
#[utoipa::path(
    delete,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = student::Entity::delete_by_id(student_id)
        .exec(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    if result.rows_affected == 0 {
        warn!("Student with ID {} not found for deletion", student_id);
        return Err(api_error(AcademyError::NotFound { entity: "Student", id: student_id }));
    }

    info!("Student with ID {} deleted successfully", student_id);
    Ok(Json(ApiResponse::ok(format!("Student {} deleted", student_id), "Student deleted successfully")))
}

/// Courses a student is enrolled in
#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}/courses",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<Vec<CourseResponse>>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_student_courses(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, ApiError> {
    let found = find_student(&state, student_id).await?;
    let courses = found
        .find_related(course::Entity)
        .all(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    let data = courses.into_iter().map(CourseResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "Courses retrieved successfully")))
}

/// Study groups a student attends
#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}/study-groups",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Study groups retrieved successfully", body = ApiResponse<Vec<StudyGroupResponse>>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_student_groups(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StudyGroupResponse>>>, ApiError> {
    let found = find_student(&state, student_id).await?;
    let groups = found
        .find_related(study_group::Entity)
        .all(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    let data = groups.into_iter().map(StudyGroupResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "Study groups retrieved successfully")))
}

/// Enroll a student in a course
#[utoipa::path(
    put,
    path = "/api/v1/students/{student_id}/courses/{course_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Student enrolled in course", body = ApiResponse<String>),
        (status = 404, description = "Student or course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn link_student_course(
    Path((student_id, course_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    link_pair(&state.db, Link::StudentCourse { student_id, course_id }).await
}

/// Withdraw a student from a course
#[utoipa::path(
    delete,
    path = "/api/v1/students/{student_id}/courses/{course_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Student withdrawn from course", body = ApiResponse<String>),
        (status = 404, description = "No such enrolment", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unlink_student_course(
    Path((student_id, course_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    unlink_pair(&state.db, Link::StudentCourse { student_id, course_id }).await
}

/// Add a student to a study group
#[utoipa::path(
    put,
    path = "/api/v1/students/{student_id}/study-groups/{study_group_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
        ("study_group_id" = i32, Path, description = "Study group ID"),
    ),
    responses(
        (status = 200, description = "Student added to study group", body = ApiResponse<String>),
        (status = 404, description = "Student or study group not found", body = ErrorResponse),
        (status = 409, description = "Already in the group", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn link_student_group(
    Path((student_id, study_group_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    link_pair(&state.db, Link::StudentStudyGroup { student_id, study_group_id }).await
}

/// Remove a student from a study group
#[utoipa::path(
    delete,
    path = "/api/v1/students/{student_id}/study-groups/{study_group_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
        ("study_group_id" = i32, Path, description = "Study group ID"),
    ),
    responses(
        (status = 200, description = "Student removed from study group", body = ApiResponse<String>),
        (status = 404, description = "Student is not in the group", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unlink_student_group(
    Path((student_id, study_group_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    unlink_pair(&state.db, Link::StudentStudyGroup { student_id, study_group_id }).await
}
