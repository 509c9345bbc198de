use axum::{http::StatusCode, response::Json};
use model::AcademyError;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

use crate::handlers::{
    branches::{BranchResponse, CreateBranchRequest, UpdateBranchRequest},
    courses::{CourseResponse, CreateCourseRequest, UpdateCourseRequest},
    study_groups::{CreateStudyGroupRequest, StudyGroupResponse},
    teachers::{CreateProfileRequest, ProfileResponse},
    users::{
        CreateUserRequest, LoginRequest, PermissionQuery, PermissionResponse, UpdateUserRequest,
        UserResponse,
    },
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// Pagination for list endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ListQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 100)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

impl ListQuery {
    /// Zero-based page index and page size
    pub fn page_and_size(&self) -> (u64, u64) {
        (self.page.unwrap_or(1) - 1, self.limit.unwrap_or(100))
    }
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

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: &str) -> Self {
        Self {
            data,
            message: message.to_string(),
            success: true,
        }
    }
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

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Translate a model error into its HTTP status and error code.
///
/// Storage and hashing failures are logged with their detail and reported
/// to the client without it.
pub fn api_error(err: AcademyError) -> ApiError {
    let (status, code) = match &err {
        AcademyError::MissingPhone => (StatusCode::BAD_REQUEST, "PHONE_REQUIRED"),
        AcademyError::InvalidPhone(_) => (StatusCode::BAD_REQUEST, "INVALID_PHONE"),
        AcademyError::FieldRejected(_) => (StatusCode::BAD_REQUEST, "INVALID_FIELD"),
        AcademyError::SuperuserMisconfigured(_) => (StatusCode::BAD_REQUEST, "SUPERUSER_MISCONFIGURED"),
        AcademyError::DuplicatePhone(_) => (StatusCode::CONFLICT, "PHONE_ALREADY_EXISTS"),
        AcademyError::DuplicateTitle(_) => (StatusCode::CONFLICT, "TITLE_ALREADY_EXISTS"),
        AcademyError::AlreadyLinked(_) => (StatusCode::CONFLICT, "ALREADY_LINKED"),
        AcademyError::CourseInUse(_) => (StatusCode::CONFLICT, "COURSE_IN_USE"),
        AcademyError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        AcademyError::MissingReference(_) => (StatusCode::NOT_FOUND, "REFERENCE_NOT_FOUND"),
        AcademyError::PasswordHash(_) | AcademyError::Database(_) => {
            error!("Internal error: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            );
        }
    };

    warn!("Request rejected ({}): {}", code, err);
    (status, Json(ErrorResponse::new(err.to_string(), code)))
}

/// Health check response
#[derive(Serialize, ToSchema)]
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
        crate::handlers::users::create_superuser,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::check_permission,
        crate::handlers::users::login,
        crate::handlers::courses::create_course,
        crate::handlers::courses::get_courses,
        crate::handlers::courses::get_course,
        crate::handlers::courses::update_course,
        crate::handlers::courses::delete_course,
        crate::handlers::branches::create_branch,
        crate::handlers::branches::get_branches,
        crate::handlers::branches::get_branch,
        crate::handlers::branches::update_branch,
        crate::handlers::branches::delete_branch,
        crate::handlers::teachers::create_teacher,
        crate::handlers::teachers::get_teachers,
        crate::handlers::teachers::get_teacher,
        crate::handlers::teachers::delete_teacher,
        crate::handlers::teachers::get_teacher_branches,
        crate::handlers::teachers::get_teacher_courses,
        crate::handlers::teachers::link_teacher_branch,
        crate::handlers::teachers::unlink_teacher_branch,
        crate::handlers::teachers::link_teacher_course,
        crate::handlers::teachers::unlink_teacher_course,
        crate::handlers::students::create_student,
        crate::handlers::students::get_students,
        crate::handlers::students::get_student,
        crate::handlers::students::delete_student,
        crate::handlers::students::get_student_courses,
        crate::handlers::students::get_student_groups,
        crate::handlers::students::link_student_course,
        crate::handlers::students::unlink_student_course,
        crate::handlers::students::link_student_group,
        crate::handlers::students::unlink_student_group,
        crate::handlers::study_groups::create_study_group,
        crate::handlers::study_groups::get_study_groups,
        crate::handlers::study_groups::get_study_group,
        crate::handlers::study_groups::delete_study_group,
        crate::handlers::study_groups::get_group_teachers,
        crate::handlers::study_groups::get_group_students,
        crate::handlers::study_groups::link_group_teacher,
        crate::handlers::study_groups::unlink_group_teacher,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ListQuery,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            LoginRequest,
            PermissionQuery,
            PermissionResponse,
            CreateCourseRequest,
            UpdateCourseRequest,
            CourseResponse,
            CreateBranchRequest,
            UpdateBranchRequest,
            BranchResponse,
            CreateProfileRequest,
            ProfileResponse,
            CreateStudyGroupRequest,
            StudyGroupResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User accounts, login and permission checks"),
        (name = "courses", description = "Course catalogue"),
        (name = "branches", description = "Branches of the academy"),
        (name = "teachers", description = "Teacher profiles and their branch/course links"),
        (name = "students", description = "Student profiles and their course/group enrolments"),
        (name = "study-groups", description = "Study groups and their teachers"),
    ),
    info(
        title = "Academy API",
        description = "Users, courses, branches, teachers, students and study groups of an educational centre",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
