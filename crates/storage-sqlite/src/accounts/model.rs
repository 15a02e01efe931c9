//! Database model for accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use roster_core::accounts::{Account, AccountInsert};

/// Database model for accounts
#[derive(Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Clone)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct AccountDB {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub secret: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable row; the id is assigned by SQLite.
#[derive(Insertable, Clone)]
#[diesel(table_name = crate::schema::accounts)]
pub struct NewAccountDB {
    pub username: String,
    pub email: String,
    pub secret: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Conversion implementations
impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
            secret: db.secret,
            name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Account> for AccountDB {
    fn from(domain: Account) -> Self {
        Self {
            id: domain.id,
            username: domain.username,
            email: domain.email,
            secret: domain.secret,
            name: domain.name,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl From<AccountInsert> for NewAccountDB {
    fn from(domain: AccountInsert) -> Self {
        Self {
            username: domain.username,
            email: domain.email,
            secret: domain.secret,
            name: domain.name,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}
