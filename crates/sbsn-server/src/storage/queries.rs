//! Database queries for SBSN users.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sbsn_core::db::{DatabaseError, unix_timestamp};

use super::db::UserDatabase;
use super::models::User;
use crate::auth::{AccountStore, Principal, PrincipalRecord, PrincipalStore, StoreError};

impl UserDatabase {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a new user. The id is assigned by the database.
    pub async fn create_user(
        &self,
        login: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        let id = sqlx::query(
            "INSERT INTO users (login, first_name, last_name, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(login)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?
        .last_insert_rowid();

        self.get_user(id).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Get a user by login.
    pub async fn get_user_by_login(&self, login: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User with login {login}")))
    }

    /// Delete a user and their authorities. Returns whether a row was removed.
    pub async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Authority queries
    // =========================================================================

    /// Grant an authority. Granting one that is already held is a no-op.
    pub async fn grant_authority(&self, user_id: i64, authority: &str) -> Result<(), DatabaseError> {
        sqlx::query("INSERT OR IGNORE INTO user_authorities (user_id, authority) VALUES (?, ?)")
            .bind(user_id)
            .bind(authority)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// All authorities granted to a user.
    pub async fn authorities_for(&self, user_id: i64) -> Result<BTreeSet<String>, DatabaseError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT authority FROM user_authorities WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|(a,)| a).collect())
    }

    async fn principal_of(&self, user: User) -> Result<PrincipalRecord, DatabaseError> {
        let authorities = self.authorities_for(user.id).await?;
        Ok(PrincipalRecord {
            principal: Principal {
                id: user.id,
                login: user.login,
                first_name: user.first_name,
                last_name: user.last_name,
                authorities,
            },
            secret_hash: user.password_hash,
        })
    }
}

#[async_trait]
impl PrincipalStore for UserDatabase {
    async fn find_by_login(&self, login: &str) -> Result<Option<PrincipalRecord>, StoreError> {
        match self.get_user_by_login(login).await {
            Ok(user) => self.principal_of(user).await.map(Some).map_err(store_error),
            Err(DatabaseError::NotFound(_)) => Ok(None),
            Err(e) => Err(store_error(e)),
        }
    }
}

#[async_trait]
impl AccountStore for UserDatabase {
    async fn create_account(
        &self,
        login: &str,
        first_name: &str,
        last_name: &str,
        secret_hash: &str,
    ) -> Result<Principal, StoreError> {
        let user = self
            .create_user(login, first_name, last_name, secret_hash)
            .await
            .map_err(store_error)?;
        Ok(self.principal_of(user).await.map_err(store_error)?.principal)
    }
}

fn store_error(e: DatabaseError) -> StoreError {
    match e {
        DatabaseError::Conflict(_) => StoreError::Conflict,
        other => StoreError::Backend(other.to_string()),
    }
}
