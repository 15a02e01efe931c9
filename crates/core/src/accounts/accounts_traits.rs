//! Account repository and service traits.
//!
//! These traits define the contract for account operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::accounts_model::{Account, AccountInsert, AccountUpdate, NewAccount};
use crate::errors::Result;

/// Trait defining the contract for the account record store.
///
/// Implementations must enforce uniqueness of `username` and `email`
/// themselves and report a violation as
/// `Error::Database(DatabaseError::UniqueViolation(_))`. The service's own
/// lookups are only a pre-check.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    /// Inserts a new account and returns it with its store-assigned id.
    async fn insert(&self, account: AccountInsert) -> Result<Account>;

    /// Retrieves an account by its ID.
    fn find_by_id(&self, account_id: i64) -> Result<Option<Account>>;

    /// Retrieves an account by its username.
    fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Retrieves an account by its email.
    fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Retrieves every account whose display name equals `name`.
    fn find_by_name(&self, name: &str) -> Result<Vec<Account>>;

    fn exists_by_id(&self, account_id: i64) -> Result<bool>;

    fn exists_by_username(&self, username: &str) -> Result<bool>;

    fn exists_by_email(&self, email: &str) -> Result<bool>;

    /// Applies `changes` to the current row and advances its `updated_at`
    /// (see `Account::touch`), as one atomic read-merge-write.
    ///
    /// Fields absent from `changes` keep whatever value the row holds at
    /// write time, so concurrent patches of different fields never undo
    /// each other. Fails with `DatabaseError::NotFound` if the row no
    /// longer exists.
    async fn update(
        &self,
        account_id: i64,
        changes: AccountUpdate,
        now: NaiveDateTime,
    ) -> Result<Account>;

    /// Deletes an account by its ID.
    ///
    /// Returns the number of deleted records.
    async fn delete_by_id(&self, account_id: i64) -> Result<usize>;

    /// Lists every account in the store's natural order.
    fn list_all(&self) -> Result<Vec<Account>>;
}

/// Trait defining the contract for Account service operations.
///
/// The service layer owns validation, uniqueness and existence rules and
/// coordinates with the repository.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// Creates a new account with business validation.
    async fn create_account(&self, new_account: NewAccount) -> Result<Account>;

    /// Merges `account_update` into the account with `account_id`.
    async fn update_account(&self, account_id: i64, account_update: AccountUpdate)
        -> Result<Account>;

    /// Deletes an account. Fails with `NotFound` if it does not exist.
    async fn delete_account(&self, account_id: i64) -> Result<()>;

    /// Retrieves an account by ID. Absence is `Ok(None)`.
    fn get_account(&self, account_id: i64) -> Result<Option<Account>>;

    /// Retrieves an account by username. Absence is `Ok(None)`.
    fn get_account_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Retrieves an account by email. Absence is `Ok(None)`.
    fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Lists all accounts.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Returns every account that shares its display name with another account.
    fn find_duplicates(&self) -> Result<Vec<Account>>;

    /// Returns accounts whose display name equals `name`.
    fn search_by_name(&self, name: &str) -> Result<Vec<Account>>;
}
