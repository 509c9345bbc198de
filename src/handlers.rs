use axum::{http::StatusCode, response::Json};
use model::academic::{self, Link};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::schemas::{api_error, ApiError, ApiResponse, ErrorResponse};

pub mod branches;
pub mod courses;
pub mod health;
pub mod students;
pub mod study_groups;
pub mod teachers;
pub mod users;

/// Store one many-to-many pair for the link endpoints
pub(crate) async fn link_pair(
    db: &DatabaseConnection,
    link: Link,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    academic::link(db, link).await.map_err(api_error)?;
    info!("Linked {}", link);
    Ok(Json(ApiResponse::ok(format!("Linked {}", link), "Link created successfully")))
}

/// Remove one many-to-many pair. Removing a pair that is not stored is a 404.
pub(crate) async fn unlink_pair(
    db: &DatabaseConnection,
    link: Link,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    if !academic::unlink(db, link).await.map_err(api_error)? {
        warn!("No link between {}", link);
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("No link between {}", link), "LINK_NOT_FOUND")),
        ));
    }
    info!("Unlinked {}", link);
    Ok(Json(ApiResponse::ok(format!("Unlinked {}", link), "Link removed successfully")))
}
