use crate::handlers::{
    branches::{create_branch, delete_branch, get_branch, get_branches, update_branch},
    courses::{create_course, delete_course, get_course, get_courses, update_course},
    health::health_check,
    students::{
        create_student, delete_student, get_student, get_student_courses, get_student_groups,
        get_students, link_student_course, link_student_group, unlink_student_course,
        unlink_student_group,
    },
    study_groups::{
        create_study_group, delete_study_group, get_group_students, get_group_teachers,
        get_study_group, get_study_groups, link_group_teacher, unlink_group_teacher,
    },
    teachers::{
        create_teacher, delete_teacher, get_teacher, get_teacher_branches, get_teacher_courses,
        get_teachers, link_teacher_branch, link_teacher_course, unlink_teacher_branch,
        unlink_teacher_course,
    },
    users::{
        check_permission, create_superuser, create_user, delete_user, get_user, get_users, login,
        update_user,
    },
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
        // Users and authentication
        .route("/api/v1/users", post(create_user).get(get_users))
        .route("/api/v1/users/superusers", post(create_superuser))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/v1/users/:user_id/permissions", get(check_permission))
        .route("/api/v1/auth/login", post(login))
        // Catalogue
        .route("/api/v1/courses", post(create_course).get(get_courses))
        .route(
            "/api/v1/courses/:course_id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/api/v1/branches", post(create_branch).get(get_branches))
        .route(
            "/api/v1/branches/:branch_id",
            get(get_branch).put(update_branch).delete(delete_branch),
        )
        // Teachers
        .route("/api/v1/teachers", post(create_teacher).get(get_teachers))
        .route(
            "/api/v1/teachers/:teacher_id",
            get(get_teacher).delete(delete_teacher),
        )
        .route("/api/v1/teachers/:teacher_id/branches", get(get_teacher_branches))
        .route(
            "/api/v1/teachers/:teacher_id/branches/:branch_id",
            put(link_teacher_branch).delete(unlink_teacher_branch),
        )
        .route("/api/v1/teachers/:teacher_id/courses", get(get_teacher_courses))
        .route(
            "/api/v1/teachers/:teacher_id/courses/:course_id",
            put(link_teacher_course).delete(unlink_teacher_course),
        )
        // Students
        .route("/api/v1/students", post(create_student).get(get_students))
        .route(
            "/api/v1/students/:student_id",
            get(get_student).delete(delete_student),
        )
        .route("/api/v1/students/:student_id/courses", get(get_student_courses))
        .route(
            "/api/v1/students/:student_id/courses/:course_id",
            put(link_student_course).delete(unlink_student_course),
        )
        .route("/api/v1/students/:student_id/study-groups", get(get_student_groups))
        .route(
            "/api/v1/students/:student_id/study-groups/:study_group_id",
            put(link_student_group).delete(unlink_student_group),
        )
        // Study groups
        .route("/api/v1/study-groups", post(create_study_group).get(get_study_groups))
        .route(
            "/api/v1/study-groups/:study_group_id",
            get(get_study_group).delete(delete_study_group),
        )
        .route("/api/v1/study-groups/:study_group_id/students", get(get_group_students))
        .route("/api/v1/study-groups/:study_group_id/teachers", get(get_group_teachers))
        .route(
            "/api/v1/study-groups/:study_group_id/teachers/:teacher_id",
            put(link_group_teacher).delete(unlink_group_teacher),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
