use chrono::NaiveDateTime;
use roster_core::accounts as core_accounts;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account as exposed over HTTP. The stored secret is never part of it.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<core_accounts::Account> for Account {
    fn from(a: core_accounts::Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            email: a.email,
            name: a.name,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub secret: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<NewAccount> for core_accounts::NewAccount {
    fn from(a: NewAccount) -> Self {
        Self {
            username: a.username,
            email: a.email,
            secret: a.secret,
            name: a.name,
        }
    }
}

/// Partial update; omitted fields are left unchanged.
#[derive(Serialize, Deserialize, ToSchema, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub secret: Option<String>,
    pub name: Option<String>,
}

impl From<AccountUpdate> for core_accounts::AccountUpdate {
    fn from(a: AccountUpdate) -> Self {
        Self {
            username: a.username,
            email: a.email,
            secret: a.secret,
            name: a.name,
        }
    }
}
