//! Comment endpoints, including helpful marks.
//!
//! Replies nest a single level; posting a reply to a reply is rejected.
//! Only the owner of the commented resource may mark a comment helpful,
//! at most once per comment.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::comment::{Comment, CommentDraft, CommentId, ResourceRef};
use crate::domain::tokens::TokenAction;
use crate::domain::user::{User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::failure_logs::readable_by;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, owner_scope};

/// Comment creation request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub target: ResourceRef,
    #[schema(value_type = Option<String>)]
    pub parent_id: Option<Uuid>,
    pub body: String,
}

/// Target selector for comment listings.
#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    /// `project` or `failure_log`.
    pub kind: String,
    pub id: Uuid,
}

/// Resolve a comment or review target to its owner, enforcing existence and
/// the caller's read access. Hidden targets 404.
pub(crate) async fn resolve_target_owner(
    state: &HttpState,
    target: ResourceRef,
    viewer: Option<&User>,
) -> Result<UserId, Error> {
    match target {
        ResourceRef::Project(id) => {
            let project = state
                .projects
                .find_by_id(id)
                .await
                .map_err(Error::from)?
                .ok_or_else(|| Error::not_found("project not found"))?;
            Ok(project.owner_id)
        }
        ResourceRef::FailureLog(id) => {
            let log = state
                .failure_logs
                .find_by_id(id)
                .await
                .map_err(Error::from)?
                .ok_or_else(|| Error::not_found("failure log not found"))?;
            if !readable_by(&log, viewer) {
                return Err(Error::not_found("failure log not found"));
            }
            Ok(log.owner_id)
        }
    }
}

/// Post a comment or a single-level reply.
#[utoipa::path(
    post,
    path = "/api/v1/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = Comment),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Target not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCommentRequest>,
) -> ApiResult<HttpResponse> {
    let caller = state.current_user(&session).await?;
    let payload = payload.into_inner();
    let draft = CommentDraft::new(
        payload.target,
        payload.parent_id.map(CommentId),
        payload.body,
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;

    resolve_target_owner(&state, draft.target, Some(&caller)).await?;

    if let Some(parent_id) = draft.parent_id {
        let parent = state
            .comments
            .find_by_id(parent_id)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found("parent comment not found"))?;
        if parent.target != draft.target {
            return Err(Error::invalid_request(
                "parent comment belongs to a different resource",
            ));
        }
        parent
            .accepts_replies()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
    }

    let comment = Comment {
        id: CommentId::random(),
        author_id: caller.id,
        target: draft.target,
        parent_id: draft.parent_id,
        body: draft.body,
        helpful_count: 0,
        created_at: Utc::now(),
    };
    state.comments.insert(&comment).await.map_err(Error::from)?;

    state
        .rewards
        .award(caller.id, TokenAction::CommentPosted, Some(comment.id.0))
        .await;

    Ok(HttpResponse::Created().json(comment))
}

/// Comments attached to a resource, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/comments",
    params(
        ("kind" = String, Query, description = "Target kind: project or failure_log"),
        ("id" = String, Query, description = "Target id")
    ),
    responses(
        (status = 200, description = "Comments", body = [Comment]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Target not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CommentListQuery>,
) -> ApiResult<web::Json<Vec<Comment>>> {
    let target = ResourceRef::from_parts(&query.kind, query.id)
        .ok_or_else(|| Error::invalid_request("kind must be project or failure_log"))?;

    let viewer = match session.user_id()? {
        Some(user_id) => state.users.find_by_id(user_id).await.map_err(Error::from)?,
        None => None,
    };
    resolve_target_owner(&state, target, viewer.as_ref()).await?;

    let comments = state
        .comments
        .list_for_target(target)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(comments))
}

/// Mark a comment helpful. Owner of the commented resource only.
#[utoipa::path(
    post,
    path = "/api/v1/comments/{id}/helpful",
    params(("id" = String, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment with updated count", body = Comment),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Already marked", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["comments"],
    operation_id = "markCommentHelpful"
)]
#[post("/comments/{id}/helpful")]
pub async fn mark_helpful(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Comment>> {
    let caller = state.current_user(&session).await?;
    let id = CommentId(path.into_inner());

    let comment = state
        .comments
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("comment not found"))?;
    let target_owner = resolve_target_owner(&state, comment.target, Some(&caller)).await?;
    if caller.id != target_owner {
        return Err(Error::forbidden(
            "only the resource owner may mark comments helpful",
        ));
    }

    let marked = state
        .comments
        .add_helpful_mark(id, caller.id)
        .await
        .map_err(Error::from)?;
    if !marked {
        return Err(Error::conflict("comment already marked helpful"));
    }

    let refreshed = state
        .comments
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("comment not found"))?;
    Ok(web::Json(refreshed))
}

/// Delete an authored comment.
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    params(("id" = String, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/comments/{id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let caller = state.current_user(&session).await?;
    let id = CommentId(path.into_inner());

    let comment = state
        .comments
        .find_by_id(id)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("comment not found"))?;
    let scope = owner_scope(&caller, comment.author_id)?;

    let deleted = state
        .comments
        .delete(id, scope)
        .await
        .map_err(Error::from)?;
    if !deleted {
        return Err(Error::not_found("comment not found"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, cookie::Cookie, test as actix_test};
    use serde_json::{Value, json};

    use crate::inbound::http::{auth, projects};

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
                    .service(projects::create_project)
                    .service(create_comment)
                    .service(list_comments)
                    .service(mark_helpful)
                    .service(delete_comment),
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

    async fn create_project<S>(app: &S, cookie: &Cookie<'static>) -> String
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
                .set_json(json!({ "title": "My Robot", "summary": "a summary" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        body["id"].as_str().expect("project id").to_owned()
    }

    async fn post_comment<S>(
        app: &S,
        cookie: &Cookie<'static>,
        project_id: &str,
        parent_id: Option<&str>,
    ) -> actix_web::dev::ServiceResponse
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/comments")
                .cookie(cookie.clone())
                .set_json(json!({
                    "target": { "kind": "project", "id": project_id },
                    "parentId": parent_id,
                    "body": "nice work",
                }))
                .to_request(),
        )
        .await
    }

    #[actix_web::test]
    async fn replies_nest_exactly_one_level() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let cookie = register(&app, "ada-lovelace").await;
        let project_id = create_project(&app, &cookie).await;

        let res = post_comment(&app, &cookie, &project_id, None).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let top: Value = actix_test::read_body_json(res).await;
        let top_id = top["id"].as_str().expect("id").to_owned();

        let res = post_comment(&app, &cookie, &project_id, Some(&top_id)).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let reply: Value = actix_test::read_body_json(res).await;
        let reply_id = reply["id"].as_str().expect("id").to_owned();

        // Replying to a reply violates the single-level invariant.
        let res = post_comment(&app, &cookie, &project_id, Some(&reply_id)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn helpful_marks_are_owner_only_and_single_use() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let owner = register(&app, "ada-lovelace").await;
        let commenter = register(&app, "charles-babbage").await;
        let project_id = create_project(&app, &owner).await;

        let res = post_comment(&app, &commenter, &project_id, None).await;
        let comment: Value = actix_test::read_body_json(res).await;
        let comment_id = comment["id"].as_str().expect("id").to_owned();
        let helpful_uri = format!("/api/v1/comments/{comment_id}/helpful");

        // The commenter is not the project owner.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&helpful_uri)
                .cookie(commenter)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&helpful_uri)
                .cookie(owner.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let marked: Value = actix_test::read_body_json(res).await;
        assert_eq!(marked["helpfulCount"], 1);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&helpful_uri)
                .cookie(owner)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn comments_on_missing_targets_fail() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let cookie = register(&app, "ada-lovelace").await;

        let res = post_comment(&app, &cookie, &Uuid::new_v4().to_string(), None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn listing_is_public_and_oldest_first() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let cookie = register(&app, "ada-lovelace").await;
        let project_id = create_project(&app, &cookie).await;
        post_comment(&app, &cookie, &project_id, None).await;
        post_comment(&app, &cookie, &project_id, None).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/comments?kind=project&id={project_id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn authors_delete_their_own_comments_only() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let author = register(&app, "ada-lovelace").await;
        let stranger = register(&app, "charles-babbage").await;
        let project_id = create_project(&app, &author).await;

        let res = post_comment(&app, &author, &project_id, None).await;
        let comment: Value = actix_test::read_body_json(res).await;
        let uri = format!("/api/v1/comments/{}", comment["id"].as_str().expect("id"));

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&uri)
                .cookie(stranger)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&uri)
                .cookie(author)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
