//! Failure log endpoints.
//!
//! Public logs are readable by anyone; private logs only by their owner
//! (admins may also read them). The first log a user writes earns the
//! `first-failure-log` badge; every log earns a token award.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::badge;
use crate::domain::failure_log::{
    FailureLog, FailureLogDraft, FailureLogId, FailureLogPatch, Visibility,
};
use crate::domain::project::ProjectId;
use crate::domain::tokens::TokenAction;
use crate::domain::user::User;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, owner_scope};

/// Failure log creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFailureLogRequest {
    #[schema(value_type = Option<String>)]
    pub project_id: Option<Uuid>,
    pub title: String,
    pub what_happened: String,
    pub lessons_learned: String,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
}

fn default_visibility() -> Visibility {
    Visibility::Public
}

/// Partial failure log update request body.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFailureLogRequest {
    pub title: Option<String>,
    pub what_happened: Option<String>,
    pub lessons_learned: Option<String>,
    pub visibility: Option<Visibility>,
}

fn validation_error(err: impl std::fmt::Display) -> Error {
    Error::invalid_request(err.to_string())
}

/// Whether `viewer` may read `log`.
pub(crate) fn readable_by(log: &FailureLog, viewer: Option<&User>) -> bool {
    if viewer.is_some_and(|user| user.role.is_admin()) {
        return true;
    }
    log.visible_to(viewer.map(|user| user.id))
}

/// Create a failure log.
#[utoipa::path(
    post,
    path = "/api/v1/failure-logs",
    request_body = CreateFailureLogRequest,
    responses(
        (status = 201, description = "Failure log created", body = FailureLog),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Linked project not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["failure-logs"],
    operation_id = "createFailureLog"
)]
#[post("/failure-logs")]
pub async fn create_failure_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateFailureLogRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();
    let draft = FailureLogDraft::new(
        payload.project_id.map(ProjectId),
        payload.title,
        payload.what_happened,
        payload.lessons_learned,
        payload.visibility,
    )
    .map_err(validation_error)?;

    if let Some(project_id) = draft.project_id {
        state
            .projects
            .find_by_id(project_id)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found("linked project not found"))?;
    }

    let now = Utc::now();
    let log = FailureLog {
        id: FailureLogId::random(),
        owner_id: user_id,
        project_id: draft.project_id,
        title: draft.title,
        what_happened: draft.what_happened,
        lessons_learned: draft.lessons_learned,
        visibility: draft.visibility,
        created_at: now,
        updated_at: now,
    };
    state
        .failure_logs
        .insert(&log)
        .await
        .map_err(Error::from)?;

    state
        .rewards
        .award(user_id, TokenAction::FailureLogged, Some(log.id.0))
        .await;
    // Count-based check; racy across concurrent first logs, accepted.
    match state.failure_logs.count_for_owner(user_id).await {
        Ok(1) => {
            state
                .rewards
                .grant_badge_once(user_id, badge::FIRST_FAILURE_LOG)
                .await;
        }
        Ok(_) => {}
        Err(error) => {
            tracing::warn!(%error, user_id = %user_id, "failure log count lookup failed");
        }
    }

    Ok(HttpResponse::Created().json(log))
}

/// List failure logs readable by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/failure-logs",
    responses(
        (status = 200, description = "Failure logs", body = [FailureLog]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["failure-logs"],
    operation_id = "listFailureLogs",
    security([])
)]
#[get("/failure-logs")]
pub async fn list_failure_logs(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<FailureLog>>> {
    let viewer = session.user_id()?;
    let logs = state
        .failure_logs
        .list_visible_to(viewer)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(logs))
}

/// Fetch a failure log by id, subject to its visibility.
#[utoipa::path(
    get,
    path = "/api/v1/failure-logs/{id}",
    params(("id" = String, Path, description = "Failure log id")),
    responses(
        (status = 200, description = "Failure log", body = FailureLog),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["failure-logs"],
    operation_id = "getFailureLog",
    security([])
)]
#[get("/failure-logs/{id}")]
pub async fn get_failure_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<FailureLog>> {
    let id = FailureLogId(path.into_inner());
    let log = state
        .failure_logs
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("failure log not found"))?;

    let viewer = match session.user_id()? {
        Some(user_id) => state.users.find_by_id(user_id).await.map_err(Error::from)?,
        None => None,
    };
    // Hidden logs 404 rather than 403 so their existence stays private.
    if !readable_by(&log, viewer.as_ref()) {
        return Err(Error::not_found("failure log not found"));
    }
    Ok(web::Json(log))
}

/// Update an owned failure log.
#[utoipa::path(
    patch,
    path = "/api/v1/failure-logs/{id}",
    params(("id" = String, Path, description = "Failure log id")),
    request_body = UpdateFailureLogRequest,
    responses(
        (status = 200, description = "Updated failure log", body = FailureLog),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["failure-logs"],
    operation_id = "updateFailureLog"
)]
#[patch("/failure-logs/{id}")]
pub async fn update_failure_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateFailureLogRequest>,
) -> ApiResult<web::Json<FailureLog>> {
    let caller = state.current_user(&session).await?;
    let id = FailureLogId(path.into_inner());
    let payload = payload.into_inner();

    let patch = FailureLogPatch {
        title: payload.title,
        what_happened: payload.what_happened,
        lessons_learned: payload.lessons_learned,
        visibility: payload.visibility,
    }
    .validated()
    .map_err(validation_error)?;

    let log = state
        .failure_logs
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("failure log not found"))?;
    let scope = owner_scope(&caller, log.owner_id)?;

    let updated = state
        .failure_logs
        .update(id, scope, &patch)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(updated))
}

/// Delete an owned failure log.
#[utoipa::path(
    delete,
    path = "/api/v1/failure-logs/{id}",
    params(("id" = String, Path, description = "Failure log id")),
    responses(
        (status = 204, description = "Failure log deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["failure-logs"],
    operation_id = "deleteFailureLog"
)]
#[delete("/failure-logs/{id}")]
pub async fn delete_failure_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let caller = state.current_user(&session).await?;
    let id = FailureLogId(path.into_inner());

    let log = state
        .failure_logs
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("failure log not found"))?;
    let scope = owner_scope(&caller, log.owner_id)?;

    let deleted = state
        .failure_logs
        .delete(id, scope)
        .await
        .map_err(Error::from)?;
    if !deleted {
        return Err(Error::not_found("failure log not found"));
    }
    Ok(HttpResponse::NoContent().finish())
}
