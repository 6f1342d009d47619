//! Project endpoints.
//!
//! Slugs are derived from the title at creation and never change afterwards;
//! collisions gain a numeric suffix. Mutations require the caller to own the
//! project (admins bypass the check).

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::project::{Project, ProjectDraft, ProjectId, ProjectPatch, ProjectStatus};
use crate::domain::slug::Slug;
use crate::domain::tokens::TokenAction;
use crate::domain::user::UserId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, owner_scope};

/// Project creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

/// Partial project update request body.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub status: Option<ProjectStatus>,
}

/// Optional listing filter.
#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    /// Restrict the listing to one owner.
    pub owner: Option<Uuid>,
}

fn validation_error(err: impl std::fmt::Display) -> Error {
    Error::invalid_request(err.to_string())
}

/// Create a project with a unique, title-derived slug.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Slug conflict", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProjectRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();
    let draft = ProjectDraft::new(payload.title, payload.summary).map_err(validation_error)?;

    let base = Slug::from_title(&draft.title);
    let taken = state
        .projects
        .slugs_with_prefix(base.as_str())
        .await
        .map_err(Error::from)?;
    let slug = base.resolve_collisions(&taken);

    let now = Utc::now();
    let project = Project {
        id: ProjectId::random(),
        owner_id: user_id,
        title: draft.title,
        summary: draft.summary,
        status: ProjectStatus::InProgress,
        slug,
        created_at: now,
        updated_at: now,
    };
    state.projects.insert(&project).await.map_err(Error::from)?;

    state
        .rewards
        .award(user_id, TokenAction::ProjectCreated, Some(project.id.0))
        .await;

    Ok(HttpResponse::Created().json(project))
}

/// List projects, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(("owner" = Option<String>, Query, description = "Filter by owner id")),
    responses(
        (status = 200, description = "Projects", body = [Project]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "listProjects",
    security([])
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    query: web::Query<ProjectListQuery>,
) -> ApiResult<web::Json<Vec<Project>>> {
    let owner = query.owner.map(UserId::from_uuid);
    let projects = state.projects.list(owner).await.map_err(Error::from)?;
    Ok(web::Json(projects))
}

/// Fetch a project by slug.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{slug}",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "getProjectBySlug",
    security([])
)]
#[get("/projects/{slug}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Project>> {
    let slug = path.into_inner();
    let project = state
        .projects
        .find_by_slug(&slug)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("project not found"))?;
    Ok(web::Json(project))
}

/// Update an owned project. The slug never changes.
#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = Project),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[patch("/projects/{id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateProjectRequest>,
) -> ApiResult<web::Json<Project>> {
    let caller = state.current_user(&session).await?;
    let id = ProjectId(path.into_inner());
    let payload = payload.into_inner();

    let patch = ProjectPatch {
        title: payload.title,
        summary: payload.summary,
        status: payload.status,
    }
    .validated()
    .map_err(validation_error)?;
    if patch.is_empty() {
        return Err(Error::invalid_request("no fields to update")
            .with_details(json!({ "fields": ["title", "summary", "status"] })));
    }

    let project = state
        .projects
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("project not found"))?;
    let scope = owner_scope(&caller, project.owner_id)?;

    let updated = state
        .projects
        .update(id, scope, &patch)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(updated))
}

/// Delete an owned project.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/projects/{id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let caller = state.current_user(&session).await?;
    let id = ProjectId(path.into_inner());

    let project = state
        .projects
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("project not found"))?;
    let scope = owner_scope(&caller, project.owner_id)?;

    let deleted = state
        .projects
        .delete(id, scope)
        .await
        .map_err(Error::from)?;
    if !deleted {
        return Err(Error::not_found("project not found"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, cookie::Cookie, test as actix_test};
    use serde_json::Value;

    use crate::inbound::http::auth;

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(auth::register)
                    .service(create_project)
                    .service(list_projects)
                    .service(get_project)
                    .service(update_project)
                    .service(delete_project),
            )
    }

    async fn register<S>(app: &S, username: &str) -> Cookie<'static>
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(json!({
                    "username": username,
                    "displayName": "Test User",
                    "password": "correct horse battery staple",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        res.response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    async fn create<S>(app: &S, cookie: &Cookie<'static>, title: &str) -> Value
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/projects")
                .cookie(cookie.clone())
                .set_json(json!({ "title": title, "summary": "a summary" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        actix_test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn same_title_projects_get_suffixed_slugs() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let cookie = register(&app, "ada-lovelace").await;

        let slugs: Vec<String> = [
            create(&app, &cookie, "My Robot").await,
            create(&app, &cookie, "My Robot").await,
            create(&app, &cookie, "My Robot").await,
        ]
        .iter()
        .map(|p| p["slug"].as_str().expect("slug").to_owned())
        .collect();
        assert_eq!(slugs, ["my-robot", "my-robot-2", "my-robot-3"]);
    }

    #[actix_web::test]
    async fn creation_requires_a_session() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/projects")
                .set_json(json!({ "title": "My Robot", "summary": "" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn creation_awards_tokens() {
        let state = HttpState::memory();
        let ledger = state.ledger.clone();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register(&app, "ada-lovelace").await;

        let project = create(&app, &cookie, "My Robot").await;
        let owner = UserId::new(project["ownerId"].as_str().expect("owner")).expect("uuid");

        let balance = ledger.balance(owner).await.expect("balance");
        assert_eq!(balance.balance, TokenAction::ProjectCreated.amount());
    }

    #[actix_web::test]
    async fn strangers_cannot_update_or_delete() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let owner = register(&app, "ada-lovelace").await;
        let stranger = register(&app, "charles-babbage").await;

        let project = create(&app, &owner, "My Robot").await;
        let id = project["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/projects/{id}"))
                .cookie(stranger.clone())
                .set_json(json!({ "title": "Stolen" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/v1/projects/{id}"))
                .cookie(stranger)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn owner_updates_status_and_slug_stays_fixed() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let cookie = register(&app, "ada-lovelace").await;
        let project = create(&app, &cookie, "My Robot").await;
        let id = project["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/projects/{id}"))
                .cookie(cookie)
                .set_json(json!({ "title": "Renamed Robot", "status": "COMPLETED" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["title"], "Renamed Robot");
        assert_eq!(body["status"], "COMPLETED");
        assert_eq!(body["slug"], "my-robot");
    }

    #[actix_web::test]
    async fn empty_patch_is_rejected() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let cookie = register(&app, "ada-lovelace").await;
        let project = create(&app, &cookie, "My Robot").await;
        let id = project["id"].as_str().expect("id").to_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/v1/projects/{id}"))
                .cookie(cookie)
                .set_json(json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn slug_lookup_finds_projects() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let cookie = register(&app, "ada-lovelace").await;
        create(&app, &cookie, "My Robot").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/projects/my-robot")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/projects/no-such-slug")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
