//! Mentor application endpoints for applicants.
//!
//! Admin decisions live in [`crate::inbound::http::admin`].

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::domain::mentor::{ApplicationDraft, MentorApplication};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Mentor application request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    /// Why the applicant wants to mentor.
    pub motivation: String,
    /// Areas the applicant can mentor in.
    pub expertise: String,
}

/// Apply for the mentor role.
#[utoipa::path(
    post,
    path = "/api/v1/mentor/applications",
    request_body = SubmitApplicationRequest,
    responses(
        (status = 201, description = "Application submitted", body = MentorApplication),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "An application already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["mentor"],
    operation_id = "submitMentorApplication"
)]
#[post("/mentor/applications")]
pub async fn submit_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitApplicationRequest>,
) -> ApiResult<HttpResponse> {
    let caller = state.current_user(&session).await?;
    let payload = payload.into_inner();
    let draft = ApplicationDraft::new(payload.motivation, payload.expertise)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let application = state.mentor.submit(caller.id, draft).await?;
    Ok(HttpResponse::Created().json(application))
}

/// The caller's own application.
#[utoipa::path(
    get,
    path = "/api/v1/mentor/applications/me",
    responses(
        (status = 200, description = "The caller's application", body = MentorApplication),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No application on file", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["mentor"],
    operation_id = "getOwnMentorApplication"
)]
#[get("/mentor/applications/me")]
pub async fn my_application(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MentorApplication>> {
    let caller = state.current_user(&session).await?;
    let application = state
        .mentor
        .application_for(caller.id)
        .await?
        .ok_or_else(|| Error::not_found("no application on file"))?;
    Ok(web::Json(application))
}
