//! Public badge catalogue endpoint.
//!
//! Per-user badge listings live on the user profile in
//! [`crate::inbound::http::users`].

use actix_web::{get, web};

use crate::domain::Error;
use crate::domain::badge::Badge;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// All badges the platform can grant.
#[utoipa::path(
    get,
    path = "/api/v1/badges",
    responses(
        (status = 200, description = "Badge catalogue", body = [Badge]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["badges"],
    operation_id = "listBadges",
    security([])
)]
#[get("/badges")]
pub async fn list_badges(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Badge>>> {
    let catalogue = state.badges.list().await.map_err(Error::from)?;
    Ok(web::Json(catalogue))
}
