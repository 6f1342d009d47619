//! Public user profile endpoints.

use actix_web::{get, web};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::badge::UserBadge;
use crate::domain::user::{User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// A user's public profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = User),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<User>> {
    let id = UserId::from_uuid(path.into_inner());
    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(web::Json(user))
}

/// Badges a user has earned.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/badges",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Earned badges", body = [UserBadge]),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUserBadges",
    security([])
)]
#[get("/users/{id}/badges")]
pub async fn get_user_badges(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<UserBadge>>> {
    let id = UserId::from_uuid(path.into_inner());
    state
        .users
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("user not found"))?;
    let badges = state.badges.badges_for_user(id).await.map_err(Error::from)?;
    Ok(web::Json(badges))
}
