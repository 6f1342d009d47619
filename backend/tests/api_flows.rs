//! End-to-end API flows over the in-memory adapters.
//!
//! These exercise the real Actix handlers with the same session middleware
//! the server mounts, covering the journeys that cross several modules:
//! registration through project publication, the failure-log badge, the
//! mentor application lifecycle, and review rewards.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use cyberodyssey_backend::domain::ports::UsersRepository;
use cyberodyssey_backend::domain::user::{Role, UserId};
use cyberodyssey_backend::inbound::http::state::{HttpState, HttpStatePorts};
use cyberodyssey_backend::inbound::http::{
    admin, auth, badges, comments, failure_logs, mentor, projects, reviews, tokens, users,
};
use cyberodyssey_backend::outbound::memory::{
    MemoryBadgeRepository, MemoryCommentRepository, MemoryFailureLogRepository,
    MemoryMentorApplicationRepository, MemoryProjectRepository, MemoryReviewRepository,
    MemoryTokenLedger, MemoryUsersRepository,
};

fn memory_state() -> (HttpState, Arc<MemoryUsersRepository>) {
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

fn full_app(
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
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build();

    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .wrap(session)
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(users::get_user)
            .service(users::get_user_badges)
            .service(projects::create_project)
            .service(projects::list_projects)
            .service(projects::get_project)
            .service(projects::update_project)
            .service(projects::delete_project)
            .service(failure_logs::create_failure_log)
            .service(failure_logs::list_failure_logs)
            .service(failure_logs::get_failure_log)
            .service(failure_logs::update_failure_log)
            .service(failure_logs::delete_failure_log)
            .service(comments::create_comment)
            .service(comments::list_comments)
            .service(comments::mark_helpful)
            .service(comments::delete_comment)
            .service(reviews::create_review)
            .service(reviews::list_reviews)
            .service(mentor::submit_application)
            .service(mentor::my_application)
            .service(admin::list_applications)
            .service(admin::approve_application)
            .service(admin::reject_application)
            .service(tokens::get_balance)
            .service(tokens::get_history)
            .service(badges::list_badges),
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
    let res = test::call_service(
        app,
        test::TestRequest::post()
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
    let body: Value = test::read_body_json(res).await;
    (cookie, body["id"].as_str().expect("user id").to_owned())
}

async fn get_json<S>(app: &S, cookie: Option<&Cookie<'static>>, uri: &str) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie.clone());
    }
    let res = test::call_service(app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::OK, "GET {uri}");
    test::read_body_json(res).await
}

#[actix_web::test]
async fn learner_journey_awards_tokens_and_badges() {
    let (state, _) = memory_state();
    let app = test::init_service(full_app(state)).await;
    let (learner, learner_id) = register(&app, "ada-lovelace").await;

    // Publish a project; the slug is derived from the title.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/projects")
            .cookie(learner.clone())
            .set_json(json!({ "title": "Line Follower", "summary": "a small robot" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let project: Value = test::read_body_json(res).await;
    assert_eq!(project["slug"], "line-follower");
    let project_id = project["id"].as_str().expect("id").to_owned();

    // Log the first failure; this grants the one-time badge.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/failure-logs")
            .cookie(learner.clone())
            .set_json(json!({
                "projectId": project_id,
                "title": "Motor burnout",
                "whatHappened": "ran the motor at 12V",
                "lessonsLearned": "check the rated voltage first",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let balance = get_json(&app, Some(&learner), "/api/v1/tokens/balance").await;
    assert_eq!(balance["balance"], 10 + 15);
    assert_eq!(balance["totalEarned"], 25);

    let held = get_json(&app, None, &format!("/api/v1/users/{learner_id}/badges")).await;
    let codes: Vec<_> = held
        .as_array()
        .expect("array")
        .iter()
        .map(|b| b["badge"]["code"].as_str().expect("code").to_owned())
        .collect();
    assert_eq!(codes, vec!["first-failure-log".to_owned()]);

    // A second visitor comments; the owner marks it helpful.
    let (visitor, _) = register(&app, "charles-babbage").await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/comments")
            .cookie(visitor.clone())
            .set_json(json!({
                "target": { "kind": "project", "id": project_id },
                "body": "what gauge wire did you use?",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(res).await;
    let comment_id = comment["id"].as_str().expect("id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/comments/{comment_id}/helpful"))
            .cookie(learner.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let visitor_balance = get_json(&app, Some(&visitor), "/api/v1/tokens/balance").await;
    assert_eq!(visitor_balance["balance"], 2);

    let history = get_json(&app, Some(&learner), "/api/v1/tokens/history").await;
    let actions: Vec<_> = history
        .as_array()
        .expect("array")
        .iter()
        .map(|e| e["action"].as_str().expect("action").to_owned())
        .collect();
    // Newest first.
    assert_eq!(actions, vec!["failure_logged".to_owned(), "project_created".to_owned()]);
}

#[actix_web::test]
async fn private_failure_logs_stay_hidden_from_other_users() {
    let (state, _) = memory_state();
    let app = test::init_service(full_app(state)).await;
    let (owner, _) = register(&app, "ada-lovelace").await;
    let (stranger, _) = register(&app, "charles-babbage").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/failure-logs")
            .cookie(owner.clone())
            .set_json(json!({
                "title": "Solder bridge",
                "whatHappened": "bridged two pads",
                "lessonsLearned": "use flux",
                "visibility": "private",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let log: Value = test::read_body_json(res).await;
    let uri = format!("/api/v1/failure-logs/{}", log["id"].as_str().expect("id"));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .cookie(stranger.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Comments on the hidden log are rejected the same way.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/comments")
            .cookie(stranger)
            .set_json(json!({
                "target": { "kind": "failure_log", "id": log["id"] },
                "body": "ouch",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let listing = get_json(&app, Some(&owner), "/api/v1/failure-logs").await;
    assert_eq!(listing.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn mentor_lifecycle_from_application_to_review() {
    let (state, users) = memory_state();
    let app = test::init_service(full_app(state)).await;
    let (applicant, applicant_id) = register(&app, "ada-lovelace").await;
    let (student, _) = register(&app, "charles-babbage").await;
    let (admin_cookie, admin_id) = register(&app, "the-admin").await;
    users
        .set_role(UserId::new(&admin_id).expect("uuid"), Role::Admin)
        .await
        .expect("promote admin");

    // Apply and approve.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/mentor/applications")
            .cookie(applicant.clone())
            .set_json(json!({
                "motivation": "I want to give back",
                "expertise": "embedded systems",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let application: Value = test::read_body_json(res).await;
    let application_id = application["id"].as_str().expect("id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/admin/applications/{application_id}/approve"))
            .cookie(admin_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Approval promotes, verifies, awards tokens, and grants the badge.
    let profile = get_json(&app, None, &format!("/api/v1/users/{applicant_id}")).await;
    assert_eq!(profile["role"], "mentor");
    assert_eq!(profile["verified"], true);

    let balance = get_json(&app, Some(&applicant), "/api/v1/tokens/balance").await;
    assert_eq!(balance["balance"], 50);

    let held = get_json(&app, None, &format!("/api/v1/users/{applicant_id}/badges")).await;
    let codes: Vec<_> = held
        .as_array()
        .expect("array")
        .iter()
        .map(|b| b["badge"]["code"].as_str().expect("code").to_owned())
        .collect();
    assert_eq!(codes, vec!["mentor".to_owned()]);

    // An approved mentor cannot reapply.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/mentor/applications")
            .cookie(applicant.clone())
            .set_json(json!({ "motivation": "again", "expertise": "again" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The new mentor reviews a student project and earns the review award.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/projects")
            .cookie(student)
            .set_json(json!({ "title": "Weather Station", "summary": "esp32 logger" }))
            .to_request(),
    )
    .await;
    let project: Value = test::read_body_json(res).await;
    let project_id = project["id"].as_str().expect("id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/reviews")
            .cookie(applicant.clone())
            .set_json(json!({
                "target": { "kind": "project", "id": project_id },
                "feedback": "solid build, add error handling for the sensor bus",
                "rating": 4,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let balance = get_json(&app, Some(&applicant), "/api/v1/tokens/balance").await;
    assert_eq!(balance["balance"], 70);

    let listed = get_json(
        &app,
        None,
        &format!("/api/v1/reviews?kind=project&id={project_id}"),
    )
    .await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn duplicate_titles_get_numbered_slugs() {
    let (state, _) = memory_state();
    let app = test::init_service(full_app(state)).await;
    let (cookie, _) = register(&app, "ada-lovelace").await;

    let mut slugs = Vec::new();
    for _ in 0..3 {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/projects")
                .cookie(cookie.clone())
                .set_json(json!({ "title": "My Robot", "summary": "a summary" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        slugs.push(body["slug"].as_str().expect("slug").to_owned());
    }
    assert_eq!(slugs, vec!["my-robot", "my-robot-2", "my-robot-3"]);

    // Slug lookup resolves each variant.
    let fetched = get_json(&app, None, "/api/v1/projects/my-robot-2").await;
    assert_eq!(fetched["slug"], "my-robot-2");
}

#[actix_web::test]
async fn logout_invalidates_the_session() {
    let (state, _) = memory_state();
    let app = test::init_service(full_app(state)).await;
    let (cookie, _) = register(&app, "ada-lovelace").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cleared)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
