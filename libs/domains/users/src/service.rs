use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, NewUser, UpdateUser, User, parse_user_id};
use crate::password::{hash_password, verify_password};
use crate::repository::UserRepository;

/// Business rules for user accounts on top of a [`UserRepository`].
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Registers an inactive user with a hashed password.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: CreateUser) -> UserResult<User> {
        let password_hash = hash_password(&input.password)?;

        self.repository
            .insert(NewUser {
                email: input.email,
                password_hash,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> UserResult<Vec<User>> {
        self.repository.find_all().await
    }

    /// `InvalidId` for a malformed id, `NotFound` when nothing matches.
    #[instrument(skip(self))]
    pub async fn find_one_by_id(&self, id: &str) -> UserResult<User> {
        let object_id = parse_user_id(id)?;

        self.repository
            .find_by_id(object_id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    /// Absence is not an error here.
    #[instrument(skip(self))]
    pub async fn find_one_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.repository.find_by_email(email).await
    }

    #[instrument(skip(self))]
    pub async fn find_active(&self) -> UserResult<Vec<User>> {
        self.repository.find_active().await
    }

    /// Applies the non-empty fields of `input`. A new password is re-hashed.
    ///
    /// A malformed id cannot name an existing user and is reported as
    /// `NotFound`. Email uniqueness is left to the store.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: UpdateUser) -> UserResult<User> {
        let mut user = self.existing(id).await?;

        if let Some(email) = input.email.filter(|e| !e.is_empty()) {
            user.email = email;
        }
        if let Some(password) = input.password.filter(|p| !p.is_empty()) {
            user.password = hash_password(&password)?;
        }

        self.repository.save(user).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> UserResult<()> {
        let not_found = || UserError::NotFound(id.to_string());
        let object_id = parse_user_id(id).map_err(|_| not_found())?;

        match self.repository.delete_by_id(object_id).await? {
            0 => Err(not_found()),
            _ => Ok(()),
        }
    }

    /// Flips `active` to true once the password checks out.
    ///
    /// Activating an already active account succeeds and changes nothing.
    #[instrument(skip(self, password))]
    pub async fn activate_account(&self, email: &str, password: &str) -> UserResult<User> {
        let mut user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::NotFound(email.to_string()))?;

        if !verify_password(password, &user.password)? {
            tracing::warn!(user_id = %user.id, "Activation rejected: password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        user.active = true;
        let user = self.repository.save(user).await?;
        tracing::info!(user_id = %user.id, "Account activated");
        Ok(user)
    }

    async fn existing(&self, id: &str) -> UserResult<User> {
        let not_found = || UserError::NotFound(id.to_string());
        let object_id = parse_user_id(id).map_err(|_| not_found())?;

        self.repository
            .find_by_id(object_id)
            .await?
            .ok_or_else(not_found)
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
