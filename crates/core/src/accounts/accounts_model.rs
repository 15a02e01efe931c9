//! Account domain models.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::accounts_constants::{fields, is_reserved_username, is_valid_email};
use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a stored account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Opaque credential material, stored verbatim
    pub secret: String,
    /// Display name, not unique
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Account {
    /// Advances `updated_at` to `now`, or by one microsecond when the clock
    /// has not moved past the stored value.
    pub fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Input model for creating a new account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub secret: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl NewAccount {
    /// Trims `username`, `email` and `name`. Blank names become `None`.
    /// The secret is left untouched.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            secret: self.secret,
            name: normalize_name(self.name),
        }
    }

    /// Validates the new account data.
    pub fn validate(&self) -> Result<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_secret(&self.secret)?;
        Ok(())
    }
}

/// Partial update of an existing account.
///
/// Every `None` field means "leave unchanged". For `name`, a blank value
/// clears the display name.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl fmt::Debug for AccountUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountUpdate")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .finish()
    }
}

impl AccountUpdate {
    /// Trims the provided `username`, `email` and `name` values.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.map(|u| u.trim().to_string()),
            email: self.email.map(|e| e.trim().to_string()),
            secret: self.secret,
            name: self.name.map(|n| n.trim().to_string()),
        }
    }

    /// Validates only the fields that are present.
    pub fn validate(&self) -> Result<()> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(secret) = &self.secret {
            validate_secret(secret)?;
        }
        Ok(())
    }

    /// Returns true if the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.secret.is_none() && self.name.is_none()
    }

    /// Merges the provided fields into `account`. Timestamps are not touched.
    pub fn apply_to(self, account: &mut Account) {
        if let Some(username) = self.username {
            account.username = username;
        }
        if let Some(email) = self.email {
            account.email = email;
        }
        if let Some(secret) = self.secret {
            account.secret = secret;
        }
        if let Some(name) = self.name {
            account.name = normalize_name(Some(name));
        }
    }
}

/// Fully validated account row handed to the record store, which assigns the id.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountInsert {
    pub username: String,
    pub email: String,
    pub secret: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AccountInsert {
    pub fn new(new_account: NewAccount, now: NaiveDateTime) -> Self {
        Self {
            username: new_account.username,
            email: new_account.email,
            secret: new_account.secret,
            name: new_account.name,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Debug for AccountInsert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountInsert")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            fields::USERNAME.to_string(),
        )));
    }
    if is_reserved_username(username) {
        return Err(Error::Validation(ValidationError::ReservedUsername(
            username.to_string(),
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            fields::EMAIL.to_string(),
        )));
    }
    if !is_valid_email(email) {
        return Err(Error::Validation(ValidationError::InvalidEmail(
            email.to_string(),
        )));
    }
    Ok(())
}

fn validate_secret(secret: &str) -> Result<()> {
    if secret.is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            fields::SECRET.to_string(),
        )));
    }
    Ok(())
}
