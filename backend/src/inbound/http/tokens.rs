//! Token balance and ledger endpoints.
//!
//! Both endpoints operate on the caller's own account.

use actix_web::{get, web};

use crate::domain::Error;
use crate::domain::tokens::{LedgerEntry, TokenBalance};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// The caller's token account.
#[utoipa::path(
    get,
    path = "/api/v1/tokens/balance",
    responses(
        (status = 200, description = "Account state", body = TokenBalance),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tokens"],
    operation_id = "getTokenBalance"
)]
#[get("/tokens/balance")]
pub async fn get_balance(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<TokenBalance>> {
    let user_id = session.require_user_id()?;
    let balance = state.ledger.balance(user_id).await.map_err(Error::from)?;
    Ok(web::Json(balance))
}

/// The caller's ledger entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/tokens/history",
    responses(
        (status = 200, description = "Ledger entries", body = [LedgerEntry]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tokens"],
    operation_id = "getTokenHistory"
)]
#[get("/tokens/history")]
pub async fn get_history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<LedgerEntry>>> {
    let user_id = session.require_user_id()?;
    let history = state.ledger.history(user_id).await.map_err(Error::from)?;
    Ok(web::Json(history))
}
