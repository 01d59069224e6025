//! Mock user repository for testing.

use crate::error::{Result, TicketError};
use crate::providers::UserRepository;
use crate::types::{User, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock user repository.
#[derive(Debug, Clone)]
pub struct MockUserRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl MockUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Seed a user, replacing any existing record with the same ID.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::Internal` if the lock is poisoned.
    pub fn insert(&self, user: User) -> Result<()> {
        self.users
            .lock()
            .map_err(|_| TicketError::Internal("user store lock poisoned".to_string()))?
            .insert(user.id, user);
        Ok(())
    }

    /// Remove a user.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::Internal` if the lock is poisoned.
    pub fn remove(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .map_err(|_| TicketError::Internal("user store lock poisoned".to_string()))?
            .remove(&user_id))
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for MockUserRepository {
    fn find_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<User>>> + Send {
        let users = Arc::clone(&self.users);

        async move {
            Ok(users
                .lock()
                .map_err(|_| TicketError::Internal("user store lock poisoned".to_string()))?
                .get(&user_id)
                .cloned())
        }
    }
}
