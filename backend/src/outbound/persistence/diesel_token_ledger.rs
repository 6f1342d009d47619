//! PostgreSQL-backed `TokenLedger` implementation using Diesel ORM.
//!
//! An award appends a ledger row and credits the user's account in the same
//! transaction; the account upsert does the arithmetic server-side so
//! concurrent awards never lose an increment.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PersistenceError, TokenLedger};
use crate::domain::tokens::{LedgerEntry, TokenAward, TokenBalance};
use crate::domain::user::UserId;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{LedgerEntryRow, NewLedgerEntryRow, NewTokenAccountRow, TokenAccountRow};
use super::pool::DbPool;
use super::schema::{token_accounts, token_ledger};

/// Diesel-backed implementation of the `TokenLedger` port.
#[derive(Clone)]
pub struct DieselTokenLedger {
    pool: DbPool,
}

impl DieselTokenLedger {
    /// Create a new ledger with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenLedger for DieselTokenLedger {
    async fn award(&self, award: &TokenAward) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let entry = NewLedgerEntryRow {
            id: Uuid::new_v4(),
            user_id: award.user_id.as_uuid(),
            action: award.action.as_str(),
            amount: award.amount,
            reference: award.reference,
        };
        let account = NewTokenAccountRow {
            user_id: award.user_id.as_uuid(),
            balance: award.amount,
            total_earned: award.amount,
        };
        let amount = award.amount;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(token_ledger::table)
                    .values(&entry)
                    .execute(conn)
                    .await?;

                diesel::insert_into(token_accounts::table)
                    .values(&account)
                    .on_conflict(token_accounts::user_id)
                    .do_update()
                    .set((
                        token_accounts::balance.eq(token_accounts::balance + amount),
                        token_accounts::total_earned.eq(token_accounts::total_earned + amount),
                    ))
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn balance(&self, user: UserId) -> Result<TokenBalance, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TokenAccountRow> = token_accounts::table
            .filter(token_accounts::user_id.eq(user.as_uuid()))
            .select(TokenAccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map_or_else(
            || TokenBalance::empty(user),
            TokenAccountRow::into_domain,
        ))
    }

    async fn history(&self, user: UserId) -> Result<Vec<LedgerEntry>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LedgerEntryRow> = token_ledger::table
            .filter(token_ledger::user_id.eq(user.as_uuid()))
            .select(LedgerEntryRow::as_select())
            .order_by(token_ledger::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(LedgerEntryRow::into_domain).collect()
    }
}
