use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

/// Persistence of [`User`] records.
///
/// Listing methods return users in insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user and assigns its id.
    ///
    /// Fails with [`UserError::DuplicateEmail`] if the email is taken.
    async fn insert(&self, user: NewUser) -> UserResult<User>;

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn find_active(&self) -> UserResult<Vec<User>>;

    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Writes the full state of `user`, inserting it if its id is unknown.
    ///
    /// Fails with [`UserError::DuplicateEmail`] if another user owns the email.
    async fn save(&self, user: User) -> UserResult<User>;

    /// Number of users removed, `0` or `1`.
    async fn delete_by_id(&self, id: ObjectId) -> UserResult<u64>;
}

/// Vec-backed store for development and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn insert(&self, input: NewUser) -> UserResult<User> {
        tracing::info!("Creating user");

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == input.email) {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let user = User::new(input);
        users.push(user.clone());

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn find_active(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.active).cloned().collect())
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> UserResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn save(&self, user: User) -> UserResult<User> {
        tracing::info!("Updating user");

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }

        tracing::info!("User updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: ObjectId) -> UserResult<u64> {
        tracing::info!("Removing user");

        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        let removed = (before - users.len()) as u64;

        if removed > 0 {
            tracing::info!("User removed");
        }
        Ok(removed)
    }
}
