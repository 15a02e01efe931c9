use chrono::{NaiveDateTime, Utc};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use super::accounts_constants::fields;
use super::accounts_model::{Account, AccountInsert, AccountUpdate, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::{ConflictError, DatabaseError, Error, Result};

/// Service for managing accounts
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Loads the account or fails with `NotFound`.
    fn require_account(&self, account_id: i64) -> Result<Account> {
        self.get_account(account_id)?
            .ok_or_else(|| account_not_found(account_id))
    }

    /// Rejects `username` if another account (not `owner_id`) already holds it.
    fn ensure_username_available(&self, username: &str, owner_id: Option<i64>) -> Result<()> {
        let taken = match owner_id {
            None => self.repository.exists_by_username(username)?,
            Some(owner) => self
                .repository
                .find_by_username(username)?
                .is_some_and(|other| other.id != owner),
        };
        if taken {
            warn!("Rejected write: username '{}' is already taken", username);
            return Err(ConflictError::UsernameTaken(username.to_string()).into());
        }
        Ok(())
    }

    /// Rejects `email` if another account (not `owner_id`) already holds it.
    fn ensure_email_available(&self, email: &str, owner_id: Option<i64>) -> Result<()> {
        let taken = match owner_id {
            None => self.repository.exists_by_email(email)?,
            Some(owner) => self
                .repository
                .find_by_email(email)?
                .is_some_and(|other| other.id != owner),
        };
        if taken {
            warn!("Rejected write: email '{}' is already registered", email);
            return Err(ConflictError::EmailTaken(email.to_string()).into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    /// Validates, checks uniqueness, then inserts exactly once.
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        let new_account = new_account.normalized();
        debug!("Creating account '{}'", new_account.username);
        new_account.validate()?;

        // Username is checked first so a double collision reports it.
        self.ensure_username_available(&new_account.username, None)?;
        self.ensure_email_available(&new_account.email, None)?;

        let username = new_account.username.clone();
        let email = new_account.email.clone();
        let insert = AccountInsert::new(new_account, now());

        let created = self
            .repository
            .insert(insert)
            .await
            .map_err(|e| map_store_conflict(e, &username, &email))?;
        debug!("Created account {} ('{}')", created.id, created.username);
        Ok(created)
    }

    /// Merges the provided fields and refreshes `updated_at`.
    async fn update_account(
        &self,
        account_id: i64,
        account_update: AccountUpdate,
    ) -> Result<Account> {
        let account = self.require_account(account_id)?;

        let account_update = account_update.normalized();
        account_update.validate()?;

        if let Some(username) = account_update.username.as_deref() {
            if username != account.username {
                self.ensure_username_available(username, Some(account.id))?;
            }
        }
        if let Some(email) = account_update.email.as_deref() {
            if email != account.email {
                self.ensure_email_available(email, Some(account.id))?;
            }
        }

        if account_update.is_empty() {
            debug!("Empty patch for account {}, only refreshing updated_at", account_id);
        } else {
            debug!("Updating account {}: {:?}", account_id, account_update);
        }

        // Only patched values can collide; the others are already unique.
        let username = account_update.username.clone().unwrap_or(account.username);
        let email = account_update.email.clone().unwrap_or(account.email);
        self.repository
            .update(account_id, account_update, now())
            .await
            .map_err(|e| match e {
                Error::Database(DatabaseError::NotFound(_)) => account_not_found(account_id),
                other => map_store_conflict(other, &username, &email),
            })
    }

    /// Deletes an account by its ID
    async fn delete_account(&self, account_id: i64) -> Result<()> {
        if account_id <= 0 || !self.repository.exists_by_id(account_id)? {
            return Err(account_not_found(account_id));
        }

        let deleted = self.repository.delete_by_id(account_id).await?;
        if deleted == 0 {
            // Removed by a concurrent request between the check and the delete.
            return Err(account_not_found(account_id));
        }
        debug!("Deleted account {}", account_id);
        Ok(())
    }

    /// Retrieves an account by its ID
    fn get_account(&self, account_id: i64) -> Result<Option<Account>> {
        if account_id <= 0 {
            return Ok(None);
        }
        self.repository.find_by_id(account_id)
    }

    fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let username = username.trim();
        if username.is_empty() {
            return Ok(None);
        }
        self.repository.find_by_username(username)
    }

    fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(None);
        }
        self.repository.find_by_email(email)
    }

    /// Lists all accounts
    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.repository.list_all()
    }

    /// Groups accounts by display name in a single pass and keeps the
    /// members of every group larger than one, in list order.
    fn find_duplicates(&self) -> Result<Vec<Account>> {
        let accounts = self.repository.list_all()?;

        let mut group_sizes: HashMap<&str, usize> = HashMap::with_capacity(accounts.len());
        for name in accounts.iter().filter_map(|a| a.name.as_deref()) {
            *group_sizes.entry(name).or_default() += 1;
        }
        let is_duplicate: Vec<bool> = accounts
            .iter()
            .map(|a| {
                a.name
                    .as_deref()
                    .is_some_and(|name| group_sizes.get(name).copied().unwrap_or(0) > 1)
            })
            .collect();

        Ok(accounts
            .into_iter()
            .zip(is_duplicate)
            .filter_map(|(account, duplicate)| duplicate.then_some(account))
            .collect())
    }

    fn search_by_name(&self, name: &str) -> Result<Vec<Account>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        self.repository.find_by_name(name)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn account_not_found(account_id: i64) -> Error {
    Error::NotFound(format!("Account {} not found", account_id))
}

/// Turns a store-level unique violation into a `Conflict` naming the field.
fn map_store_conflict(err: Error, username: &str, email: &str) -> Error {
    match err {
        Error::Database(DatabaseError::UniqueViolation(message)) => {
            warn!("Store rejected write with unique violation: {}", message);
            let conflict = if message.contains(fields::USERNAME) {
                ConflictError::UsernameTaken(username.to_string())
            } else if message.contains(fields::EMAIL) {
                ConflictError::EmailTaken(email.to_string())
            } else {
                ConflictError::Constraint(message)
            };
            Error::Conflict(conflict)
        }
        other => other,
    }
}
