//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification covering every REST
//! endpoint plus the session cookie security scheme. Swagger UI serves the
//! document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::badge::{Badge, UserBadge};
use crate::domain::comment::{Comment, ResourceRef};
use crate::domain::error::{Error, ErrorCode};
use crate::domain::failure_log::{FailureLog, Visibility};
use crate::domain::mentor::{ApplicationStatus, MentorApplication};
use crate::domain::project::{Project, ProjectStatus};
use crate::domain::review::MentorReview;
use crate::domain::tokens::{LedgerEntry, TokenAction, TokenBalance};
use crate::domain::user::{Role, User};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::comments::CreateCommentRequest;
use crate::inbound::http::failure_logs::{CreateFailureLogRequest, UpdateFailureLogRequest};
use crate::inbound::http::mentor::SubmitApplicationRequest;
use crate::inbound::http::projects::{CreateProjectRequest, UpdateProjectRequest};
use crate::inbound::http::reviews::CreateReviewRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/register or /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Cyberodyssey backend API",
        description = "HTTP interface for the learning-in-public platform: \
            projects, failure logs, comments, mentorship, and token rewards.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::get_user_badges,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::failure_logs::create_failure_log,
        crate::inbound::http::failure_logs::list_failure_logs,
        crate::inbound::http::failure_logs::get_failure_log,
        crate::inbound::http::failure_logs::update_failure_log,
        crate::inbound::http::failure_logs::delete_failure_log,
        crate::inbound::http::comments::create_comment,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::mark_helpful,
        crate::inbound::http::comments::delete_comment,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::mentor::submit_application,
        crate::inbound::http::mentor::my_application,
        crate::inbound::http::admin::list_applications,
        crate::inbound::http::admin::approve_application,
        crate::inbound::http::admin::reject_application,
        crate::inbound::http::tokens::get_balance,
        crate::inbound::http::tokens::get_history,
        crate::inbound::http::badges::list_badges,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        Project,
        ProjectStatus,
        FailureLog,
        Visibility,
        Comment,
        ResourceRef,
        MentorApplication,
        ApplicationStatus,
        MentorReview,
        TokenBalance,
        LedgerEntry,
        TokenAction,
        Badge,
        UserBadge,
        RegisterRequest,
        LoginRequest,
        CreateProjectRequest,
        UpdateProjectRequest,
        CreateFailureLogRequest,
        UpdateFailureLogRequest,
        CreateCommentRequest,
        CreateReviewRequest,
        SubmitApplicationRequest,
    )),
    tags(
        (name = "auth", description = "Registration, login, and sessions"),
        (name = "users", description = "Public user profiles"),
        (name = "projects", description = "Learning projects"),
        (name = "failure-logs", description = "Failure logs with visibility controls"),
        (name = "comments", description = "Comments and helpful marks"),
        (name = "reviews", description = "Mentor reviews"),
        (name = "mentor", description = "Mentor applications"),
        (name = "admin", description = "Administrative decisions"),
        (name = "tokens", description = "Token balances and ledger history"),
        (name = "badges", description = "Badge catalogue"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;
