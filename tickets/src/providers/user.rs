//! User repository trait.

use crate::error::Result;
use crate::types::{User, UserId};
use std::future::Future;

/// User lookups (query-only).
pub trait UserRepository: Send + Sync {
    /// Find a user by ID.
    ///
    /// # Returns
    ///
    /// `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn find_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<User>>> + Send;
}
