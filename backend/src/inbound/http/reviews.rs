//! Mentor review endpoints.
//!
//! Only mentors and admins may submit reviews. A reviewer may not review
//! their own content and may review a given target at most once.

use actix_web::{get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::comment::ResourceRef;
use crate::domain::ports::PersistenceError;
use crate::domain::review::{MentorReview, ReviewDraft, ReviewId};
use crate::domain::tokens::TokenAction;
use crate::inbound::http::ApiResult;
use crate::inbound::http::comments::resolve_target_owner;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Review submission request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub target: ResourceRef,
    pub feedback: String,
    /// Optional 1-5 quality rating.
    pub rating: Option<i16>,
}

/// Target selector for review listings.
#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    /// `project` or `failure_log`.
    pub kind: String,
    pub id: Uuid,
}

/// Submit a mentor review.
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review submitted", body = MentorReview),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Target not found", body = Error),
        (status = 409, description = "Target already reviewed", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/reviews")]
pub async fn create_review(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<actix_web::HttpResponse> {
    let caller = state.current_user(&session).await?;
    if !caller.role.can_review() {
        return Err(Error::forbidden("only mentors may submit reviews"));
    }

    let payload = payload.into_inner();
    let draft = ReviewDraft::new(payload.target, payload.feedback, payload.rating)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let target_owner = resolve_target_owner(&state, draft.target, Some(&caller)).await?;
    if target_owner == caller.id {
        return Err(Error::forbidden("you may not review your own content"));
    }

    let review = MentorReview {
        id: ReviewId::random(),
        reviewer_id: caller.id,
        target: draft.target,
        feedback: draft.feedback,
        rating: draft.rating,
        created_at: Utc::now(),
    };
    state.reviews.insert(&review).await.map_err(|err| {
        if matches!(err, PersistenceError::Conflict { .. }) {
            Error::conflict("you have already reviewed this target")
        } else {
            Error::from(err)
        }
    })?;

    state
        .rewards
        .award(caller.id, TokenAction::MentorReview, Some(review.id.0))
        .await;

    Ok(actix_web::HttpResponse::Created().json(review))
}

/// Reviews attached to a resource, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    params(
        ("kind" = String, Query, description = "Target kind: project or failure_log"),
        ("id" = String, Query, description = "Target id")
    ),
    responses(
        (status = 200, description = "Reviews", body = [MentorReview]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Target not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
#[get("/reviews")]
pub async fn list_reviews(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReviewListQuery>,
) -> ApiResult<web::Json<Vec<MentorReview>>> {
    let target = ResourceRef::from_parts(&query.kind, query.id)
        .ok_or_else(|| Error::invalid_request("kind must be project or failure_log"))?;

    let viewer = match session.user_id()? {
        Some(user_id) => state.users.find_by_id(user_id).await.map_err(Error::from)?,
        None => None,
    };
    resolve_target_owner(&state, target, viewer.as_ref()).await?;

    let reviews = state
        .reviews
        .list_for_target(target)
        .await
        .map_err(Error::from)?;
    Ok(web::Json(reviews))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, cookie::Cookie, test as actix_test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    use crate::domain::user::Role;
    use crate::inbound::http::{auth, projects};
    use crate::outbound::memory::MemoryUsersRepository;

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
                    .service(create_review)
                    .service(list_reviews),
            )
    }

    async fn register<S>(app: &S, username: &str) -> (Cookie<'static>, String)
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
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned();
        let body: Value = actix_test::read_body_json(res).await;
        (cookie, body["id"].as_str().expect("user id").to_owned())
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

    async fn promote(users: &Arc<MemoryUsersRepository>, id: &str) {
        use crate::domain::ports::UsersRepository;
        use crate::domain::user::UserId;
        let id = UserId::new(id).expect("uuid");
        users.set_role(id, Role::Mentor).await.expect("set role");
    }

    fn memory_state_with_users() -> (HttpState, Arc<MemoryUsersRepository>) {
        use crate::inbound::http::state::HttpStatePorts;
        use crate::outbound::memory::{
            MemoryBadgeRepository, MemoryCommentRepository, MemoryFailureLogRepository,
            MemoryMentorApplicationRepository, MemoryProjectRepository, MemoryReviewRepository,
            MemoryTokenLedger,
        };
        let users = Arc::new(MemoryUsersRepository::default());
        let state = HttpState::new(HttpStatePorts {
            users: users.clone(),
            projects: Arc::new(MemoryProjectRepository::default()),
            failure_logs: Arc::new(MemoryFailureLogRepository::default()),
            comments: Arc::new(MemoryCommentRepository::default()),
            applications: Arc::new(MemoryMentorApplicationRepository::default()),
            reviews: Arc::new(MemoryReviewRepository::default()),
            ledger: Arc::new(MemoryTokenLedger::default()),
            badges: Arc::new(MemoryBadgeRepository::with_default_catalogue()),
        });
        (state, users)
    }

    fn review_body(project_id: &str) -> Value {
        json!({
            "target": { "kind": "project", "id": project_id },
            "feedback": "solid work, document the failure modes",
            "rating": 4,
        })
    }

    #[actix_web::test]
    async fn students_may_not_review() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let (owner, _) = register(&app, "ada-lovelace").await;
        let (student, _) = register(&app, "charles-babbage").await;
        let project_id = create_project(&app, &owner).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reviews")
                .cookie(student)
                .set_json(review_body(&project_id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn mentors_review_once_per_target() {
        let (state, users) = memory_state_with_users();
        let app = actix_test::init_service(test_app(state)).await;
        let (owner, _) = register(&app, "ada-lovelace").await;
        let (mentor, mentor_id) = register(&app, "grace-hopper").await;
        promote(&users, &mentor_id).await;
        let project_id = create_project(&app, &owner).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reviews")
                .cookie(mentor.clone())
                .set_json(review_body(&project_id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reviews")
                .cookie(mentor)
                .set_json(review_body(&project_id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn self_review_is_forbidden() {
        let (state, users) = memory_state_with_users();
        let app = actix_test::init_service(test_app(state)).await;
        let (mentor, mentor_id) = register(&app, "grace-hopper").await;
        promote(&users, &mentor_id).await;
        let project_id = create_project(&app, &mentor).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reviews")
                .cookie(mentor)
                .set_json(review_body(&project_id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn review_listing_is_public() {
        let (state, users) = memory_state_with_users();
        let app = actix_test::init_service(test_app(state)).await;
        let (owner, _) = register(&app, "ada-lovelace").await;
        let (mentor, mentor_id) = register(&app, "grace-hopper").await;
        promote(&users, &mentor_id).await;
        let project_id = create_project(&app, &owner).await;

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reviews")
                .cookie(mentor)
                .set_json(review_body(&project_id))
                .to_request(),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/reviews?kind=project&id={project_id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["rating"], 4);
    }
}
