//! Admin endpoints for deciding mentor applications.

use actix_web::{get, post, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::mentor::{ApplicationId, ApplicationStatus, MentorApplication};
use crate::domain::user::User;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Filter for the application queue.
#[derive(Debug, Deserialize)]
pub struct ApplicationQueueQuery {
    pub status: Option<ApplicationStatus>,
}

fn require_admin(caller: &User) -> Result<(), Error> {
    if caller.role.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("administrator access required"))
    }
}

/// Applications awaiting (or past) decision, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/applications",
    params(
        ("status" = Option<String>, Query, description = "pending, approved or rejected; defaults to pending")
    ),
    responses(
        (status = 200, description = "Applications", body = [MentorApplication]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listMentorApplications"
)]
#[get("/admin/applications")]
pub async fn list_applications(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ApplicationQueueQuery>,
) -> ApiResult<web::Json<Vec<MentorApplication>>> {
    let caller = state.current_user(&session).await?;
    require_admin(&caller)?;

    let status = query.status.unwrap_or(ApplicationStatus::Pending);
    let applications = state.mentor.list_by_status(status).await?;
    Ok(web::Json(applications))
}

/// Approve a pending application.
#[utoipa::path(
    post,
    path = "/api/v1/admin/applications/{id}/approve",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Approved application", body = MentorApplication),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Already decided", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "approveMentorApplication"
)]
#[post("/admin/applications/{id}/approve")]
pub async fn approve_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<MentorApplication>> {
    let caller = state.current_user(&session).await?;
    require_admin(&caller)?;

    let application = state
        .mentor
        .approve(ApplicationId(path.into_inner()), caller.id)
        .await?;
    Ok(web::Json(application))
}

/// Reject a pending application.
#[utoipa::path(
    post,
    path = "/api/v1/admin/applications/{id}/reject",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Rejected application", body = MentorApplication),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Already decided", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "rejectMentorApplication"
)]
#[post("/admin/applications/{id}/reject")]
pub async fn reject_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<MentorApplication>> {
    let caller = state.current_user(&session).await?;
    require_admin(&caller)?;

    let application = state
        .mentor
        .reject(ApplicationId(path.into_inner()), caller.id)
        .await?;
    Ok(web::Json(application))
}
