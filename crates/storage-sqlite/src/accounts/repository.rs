use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use roster_core::accounts::{Account, AccountInsert, AccountRepositoryTrait, AccountUpdate};
use roster_core::errors::{DatabaseError, Error, Result};

use super::model::{AccountDB, NewAccountDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::accounts;

/// Repository for managing account data in the database.
///
/// Reads use pooled connections; writes go through the single writer actor.
/// Uniqueness of `username` and `email` is enforced by unique indexes.
pub struct AccountRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AccountRepository {
    /// Creates a new AccountRepository instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn insert(&self, account: AccountInsert) -> Result<Account> {
        let row: NewAccountDB = account.into();

        self.writer
            .exec(move |conn| {
                let created = diesel::insert_into(accounts::table)
                    .values(&row)
                    .returning(AccountDB::as_returning())
                    .get_result::<AccountDB>(conn)
                    .into_core()?;

                Ok(created.into())
            })
            .await
    }

    fn find_by_id(&self, account_id: i64) -> Result<Option<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let account = accounts::table
            .find(account_id)
            .select(AccountDB::as_select())
            .first::<AccountDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(account.map(Account::from))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let account = accounts::table
            .filter(accounts::username.eq(username))
            .select(AccountDB::as_select())
            .first::<AccountDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(account.map(Account::from))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let account = accounts::table
            .filter(accounts::email.eq(email))
            .select(AccountDB::as_select())
            .first::<AccountDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(account.map(Account::from))
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let results = accounts::table
            .filter(accounts::name.eq(name))
            .select(AccountDB::as_select())
            .order(accounts::id.asc())
            .load::<AccountDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Account::from).collect())
    }

    fn exists_by_id(&self, account_id: i64) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        diesel::select(diesel::dsl::exists(
            accounts::table.filter(accounts::id.eq(account_id)),
        ))
        .get_result::<bool>(&mut conn)
        .into_core()
    }

    fn exists_by_username(&self, username: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        diesel::select(diesel::dsl::exists(
            accounts::table.filter(accounts::username.eq(username)),
        ))
        .get_result::<bool>(&mut conn)
        .into_core()
    }

    fn exists_by_email(&self, email: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        diesel::select(diesel::dsl::exists(
            accounts::table.filter(accounts::email.eq(email)),
        ))
        .get_result::<bool>(&mut conn)
        .into_core()
    }

    /// Reads, merges and writes inside one writer job, so the row cannot
    /// change between the read and the write.
    async fn update(
        &self,
        account_id: i64,
        changes: AccountUpdate,
        now: NaiveDateTime,
    ) -> Result<Account> {
        self.writer
            .exec(move |conn| {
                let current = accounts::table
                    .find(account_id)
                    .select(AccountDB::as_select())
                    .first::<AccountDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| {
                        Error::Database(DatabaseError::NotFound(format!(
                            "Account {}",
                            account_id
                        )))
                    })?;

                let mut account = Account::from(current);
                changes.apply_to(&mut account);
                account.touch(now);

                let row: AccountDB = account.into();
                diesel::update(accounts::table.find(account_id))
                    .set(&row)
                    .execute(conn)
                    .into_core()?;

                Ok(row.into())
            })
            .await
    }

    /// Deletes an account by its ID and returns the number of deleted records
    async fn delete_by_id(&self, account_id: i64) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                diesel::delete(accounts::table.find(account_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    /// Lists every account ordered by id, i.e. creation order
    fn list_all(&self) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let results = accounts::table
            .select(AccountDB::as_select())
            .order(accounts::id.asc())
            .load::<AccountDB>(&mut conn)
            .into_core()?;

        Ok(results.into_iter().map(Account::from).collect())
    }
}
