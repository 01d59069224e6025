//! PostgreSQL user repository.

use super::db_error;
use crate::error::Result;
use crate::providers::UserRepository;
use crate::types::{User, UserId, UserRole};
use sqlx::{PgPool, Row};

/// PostgreSQL user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new PostgreSQL user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PostgresUserRepository {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, role
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get user", &e))?;

        row.map(|row| -> std::result::Result<User, sqlx::Error> {
            let role: String = row.try_get("role")?;

            Ok(User {
                id: UserId::from_uuid(row.try_get("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                role: role
                    .parse::<UserRole>()
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            })
        })
        .transpose()
        .map_err(|e| db_error("Failed to read user", &e))
    }
}
