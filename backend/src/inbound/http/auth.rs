//! Account registration and session endpoints.
//!
//! ```text
//! POST /api/v1/register {"username":"ada-lovelace","displayName":"Ada","password":"..."}
//! POST /api/v1/login    {"username":"ada-lovelace","password":"..."}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::PersistenceError;
use crate::domain::user::{DisplayName, Role, User, UserId, Username};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::outbound::password::{hash_password, verify_password};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub display_name: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn field_error(message: impl Into<String>, field: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

/// Create an account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let username =
        Username::new(payload.username).map_err(|err| field_error(err.to_string(), "username"))?;
    let display_name = DisplayName::new(payload.display_name)
        .map_err(|err| field_error(err.to_string(), "displayName"))?;
    if payload.password.chars().count() < PASSWORD_MIN {
        return Err(field_error(
            format!("password must be at least {PASSWORD_MIN} characters"),
            "password",
        ));
    }

    let user = User {
        id: UserId::random(),
        username,
        display_name,
        role: Role::Student,
        verified: false,
        created_at: Utc::now(),
    };
    let password_hash = hash_password(&payload.password)?;

    state
        .users
        .insert(&user, &password_hash)
        .await
        .map_err(|err| match err {
            PersistenceError::Conflict { .. } => Error::conflict("username already taken"),
            other => other.into(),
        })?;

    session.persist_user(user.id)?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    // Malformed usernames cannot exist, so they fail exactly like unknown
    // ones; credential probes learn nothing about handle validity.
    let rejected = || Error::unauthorized("invalid credentials");
    let username = Username::new(payload.username).map_err(|_| rejected())?;

    let credentials = state
        .users
        .credentials(&username)
        .await
        .map_err(Error::from)?
        .ok_or_else(rejected)?;
    if !verify_password(&payload.password, &credentials.password_hash)? {
        return Err(rejected());
    }

    let user = state
        .users
        .find_by_id(credentials.user_id)
        .await
        .map_err(Error::from)?
        .ok_or_else(rejected)?;

    session.persist_user(user.id)?;
    Ok(HttpResponse::Ok().json(user))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session ended")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The authenticated caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<web::Json<User>> {
    let user = state.current_user(&session).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

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
                    .service(register)
                    .service(login)
                    .service(logout)
                    .service(me),
            )
    }

    fn register_body(username: &str) -> Value {
        json!({
            "username": username,
            "displayName": "Ada Lovelace",
            "password": "correct horse battery staple",
        })
    }

    #[actix_web::test]
    async fn register_then_me_round_trips() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(register_body("ada-lovelace"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie");

        let me_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(me_res).await;
        assert_eq!(body["username"], "ada-lovelace");
        assert_eq!(body["role"], "student");
        assert_eq!(body["verified"], false);
    }

    #[actix_web::test]
    async fn duplicate_username_conflicts() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/v1/register")
                    .set_json(register_body("ada-lovelace"))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn register_rejects_short_password() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(json!({
                    "username": "ada-lovelace",
                    "displayName": "Ada Lovelace",
                    "password": "short",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "password");
    }

    #[actix_web::test]
    async fn login_rejects_wrong_password() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(register_body("ada-lovelace"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": "ada-lovelace", "password": "wrong password" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn login_succeeds_with_correct_password() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;

        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/register")
                .set_json(register_body("ada-lovelace"))
                .to_request(),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({
                    "username": "ada-lovelace",
                    "password": "correct horse battery staple",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn me_requires_a_session() {
        let app = actix_test::init_service(test_app(HttpState::memory())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
