use crate::schemas::{api_error, ApiError, ApiResponse, AppState, ErrorResponse, ListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::academic;
use model::entities::user;
use model::identity::{self, PasswordCredential, PermissionCheck, UserFields};
use model::AcademyError;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn, info, debug, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a new user
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Phone number, e.g. +998901234567 (must be unique)
    #[validate(length(max = 13))]
    pub phone: String,
    /// Plain password. Without one the account cannot log in
    #[validate(length(min = 1, max = 72))]
    pub password: Option<String>,
    #[validate(length(max = 50))]
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_admin: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_student: Option<bool>,
    pub is_teacher: Option<bool>,
}

impl CreateUserRequest {
    fn split(self) -> (String, Option<String>, UserFields) {
        let fields = UserFields {
            full_name: self.full_name,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_admin: self.is_admin,
            is_superuser: self.is_superuser,
            is_student: self.is_student,
            is_teacher: self.is_teacher,
        };
        (self.phone, self.password, fields)
    }
}

/// Request body for updating a user. The phone cannot be changed.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 50))]
    pub full_name: Option<String>,
    /// New password
    #[validate(length(min = 1, max = 72))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_admin: Option<bool>,
    pub is_student: Option<bool>,
    pub is_teacher: Option<bool>,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 13))]
    pub phone: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Query parameters for a permission check
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct PermissionQuery {
    /// Permission in the form `app_label.codename`
    #[validate(length(min = 1, max = 255))]
    pub permission: String,
}

/// Result of a permission check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermissionResponse {
    pub permission: String,
    pub has_perm: bool,
    /// Whether the user may see the permission's app at all
    pub has_module_perms: bool,
}

/// User response model. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub phone: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
    pub is_superuser: bool,
    pub is_student: bool,
    pub is_teacher: bool,
    pub has_usable_password: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            has_usable_password: model.has_usable_password(),
            id: model.id,
            phone: model.phone,
            full_name: model.full_name,
            is_active: model.is_active,
            is_staff: model.is_staff,
            is_admin: model.is_admin,
            is_superuser: model.is_superuser,
            is_student: model.is_student,
            is_teacher: model.is_teacher,
            last_login: model.last_login,
            created: model.created,
            updated: model.updated,
        }
    }
}

async fn find_user(state: &AppState, user_id: i32) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?
        .ok_or_else(|| api_error(AcademyError::NotFound { entity: "User", id: user_id }))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing or malformed phone", body = ErrorResponse),
        (status = 409, description = "Phone already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    debug!("Creating user with phone: {}", request.phone);
    let (phone, password, fields) = request.split();

    let created = identity::create_user(&state.db, &phone, password.as_deref(), fields)
        .await
        .map_err(api_error)?;

    info!("User created successfully with ID: {}, phone: {}", created.id, created.phone);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(created), "User created successfully")),
    ))
}

/// Create a superuser
///
/// `is_staff` and `is_superuser` default to true; sending either as false is rejected.
#[utoipa::path(
    post,
    path = "/api/v1/users/superusers",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Superuser created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid phone or privilege flag set to false", body = ErrorResponse),
        (status = 409, description = "Phone already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_superuser(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    debug!("Creating superuser with phone: {}", request.phone);
    let (phone, password, fields) = request.split();

    let created = identity::create_superuser(&state.db, &phone, password.as_deref(), fields)
        .await
        .map_err(api_error)?;

    info!("Superuser created with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(created), "Superuser created successfully")),
    ))
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(ListQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(
    Valid(Query(query)): Valid<Query<ListQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let (page, limit) = query.page_and_size();
    trace!("Fetching users - page: {}, limit: {}", page, limit);

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .paginate(&state.db, limit)
        .fetch_page(page)
        .await
        .map_err(|e| api_error(e.into()))?;

    debug!("Retrieved {} users", users.len());
    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::ok(data, "Users retrieved successfully")))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let found = find_user(&state, user_id).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(found), "User retrieved successfully")))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateUserRequest>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let existing = find_user(&state, user_id).await?;

    let mut active: user::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if let Some(full_name) = request.full_name {
        active.full_name = Set(Some(full_name));
        updated_fields.push("full_name");
    }
    if let Some(raw) = request.password.as_deref() {
        active.set_password(Some(raw)).map_err(api_error)?;
        updated_fields.push("password");
    }
    let flags = [
        (request.is_active, &mut active.is_active, "is_active"),
        (request.is_staff, &mut active.is_staff, "is_staff"),
        (request.is_admin, &mut active.is_admin, "is_admin"),
        (request.is_student, &mut active.is_student, "is_student"),
        (request.is_teacher, &mut active.is_teacher, "is_teacher"),
    ];
    for (value, column, name) in flags {
        if let Some(value) = value {
            *column = Set(value);
            updated_fields.push(name);
        }
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for user ID: {}", user_id);
    } else {
        debug!("Updating fields: {}", updated_fields.join(", "));
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| api_error(e.into()))?;

    info!("User with ID {} updated successfully", user_id);
    Ok(Json(ApiResponse::ok(UserResponse::from(updated), "User updated successfully")))
}

/// Delete a user together with its teacher and student profiles
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    academic::delete_user(&state.db, user_id).await.map_err(api_error)?;

    info!("User with ID {} deleted successfully", user_id);
    Ok(Json(ApiResponse::ok(format!("User {} deleted", user_id), "User deleted successfully")))
}

/// Check one permission for a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/permissions",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        PermissionQuery,
    ),
    responses(
        (status = 200, description = "Permission evaluated", body = ApiResponse<PermissionResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn check_permission(
    Path(user_id): Path<i32>,
    Valid(Query(query)): Valid<Query<PermissionQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PermissionResponse>>, ApiError> {
    let found = find_user(&state, user_id).await?;

    let app_label = query
        .permission
        .split_once('.')
        .map(|(label, _)| label)
        .unwrap_or(query.permission.as_str());

    let response = PermissionResponse {
        has_perm: found.has_perm(&query.permission, None),
        has_module_perms: found.has_module_perms(app_label),
        permission: query.permission.clone(),
    };
    Ok(Json(ApiResponse::ok(response, "Permission evaluated")))
}

/// Log in with phone and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unknown phone, wrong password or inactive user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<LoginRequest>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    match identity::authenticate(&state.db, &request.phone, &request.password).await {
        Ok(Some(found)) => {
            info!("User {} logged in", found.id);
            Ok(Json(ApiResponse::ok(UserResponse::from(found), "Login successful")))
        }
        Ok(None) => {
            warn!("Rejected login for phone {}", request.phone);
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Invalid phone or password", "INVALID_CREDENTIALS")),
            ))
        }
        Err(e) => Err(api_error(e)),
    }
}
