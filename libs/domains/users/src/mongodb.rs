//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::IndexOptions,
};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};
use crate::repository::UserRepository;

pub const COLLECTION: &str = "users";

/// Users stored one document per user in the `users` collection.
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<User>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Creates the unique index on `email`. Idempotent; run at startup.
    #[instrument(skip(self))]
    pub async fn create_indexes(&self) -> UserResult<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(email_index).await?;
        tracing::info!(collection = %self.collection.name(), "User indexes ensured");
        Ok(())
    }

    fn by_id(id: ObjectId) -> Document {
        doc! { "_id": id }
    }

    fn active_filter() -> Document {
        doc! { "active": true }
    }

    /// ObjectIds grow with creation time, so `_id` order is insertion order.
    fn insertion_order() -> Document {
        doc! { "_id": 1 }
    }

    async fn find_many(&self, filter: Document) -> UserResult<Vec<User>> {
        let cursor = self
            .collection
            .find(filter)
            .sort(Self::insertion_order())
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn insert(&self, input: NewUser) -> UserResult<User> {
        tracing::info!("Creating user");
        let user = User::new(input);

        self.collection
            .insert_one(&user)
            .await
            .map_err(|e| UserError::from_write(e, &user.email))?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(Self::by_id(id)).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn find_active(&self) -> UserResult<Vec<User>> {
        self.find_many(Self::active_filter()).await
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> UserResult<Vec<User>> {
        self.find_many(doc! {}).await
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn save(&self, user: User) -> UserResult<User> {
        tracing::info!("Updating user");

        self.collection
            .replace_one(Self::by_id(user.id), &user)
            .upsert(true)
            .await
            .map_err(|e| UserError::from_write(e, &user.email))?;

        tracing::info!("User updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: ObjectId) -> UserResult<u64> {
        tracing::info!("Removing user");
        let result = self.collection.delete_one(Self::by_id(id)).await?;

        if result.deleted_count > 0 {
            tracing::info!("User removed");
        }
        Ok(result.deleted_count)
    }
}
