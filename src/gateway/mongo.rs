use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use tracing::info;

use super::{Gateway, GatewayError};
use crate::config::Config;
use crate::schemas::{SplitRecord, TokenRecord, UserRecord};

const USERS: &str = "users";
const TOKENS: &str = "tokens";
const SPLITS: &str = "splits";

const DUPLICATE_KEY: i32 = 11000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
// Two rows are enough to tell a unique token from an ambiguous one.
const TOKEN_MATCH_LIMIT: i64 = 2;

impl From<mongodb::error::Error> for GatewayError {
    fn from(err: mongodb::error::Error) -> Self {
        let duplicate = matches!(
            err.kind.as_ref(),
            ErrorKind::Write(WriteFailure::WriteError(write_error))
                if write_error.code == DUPLICATE_KEY
        );
        if duplicate {
            GatewayError::Duplicate
        } else {
            GatewayError::Database(err)
        }
    }
}

#[derive(Clone)]
pub struct MongoGateway {
    db: Database,
}

impl MongoGateway {
    /// Connects, checks the server answers, and makes sure the indexes the
    /// queries rely on exist.
    pub async fn connect(config: &Config) -> Result<Self, GatewayError> {
        let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);
        options.app_name = Some("billsplit".to_string());

        let client = Client::with_options(options)?;
        let db = client.database(&config.database_name);
        db.run_command(doc! { "ping": 1 }, None).await?;
        info!("Connected to database {}", config.database_name);

        let gateway = Self { db };
        gateway.ensure_indexes().await?;
        Ok(gateway)
    }

    async fn ensure_indexes(&self) -> Result<(), GatewayError> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
                None,
            )
            .await?;
        self.tokens()
            .create_index(IndexModel::builder().keys(doc! { "token": 1 }).build(), None)
            .await?;
        self.splits()
            .create_indexes(
                vec![
                    IndexModel::builder()
                        .keys(doc! { "id": 1 })
                        .options(unique())
                        .build(),
                    IndexModel::builder().keys(doc! { "shared_id": 1 }).build(),
                ],
                None,
            )
            .await?;
        Ok(())
    }

    fn users(&self) -> Collection<UserRecord> {
        self.db.collection(USERS)
    }

    fn tokens(&self) -> Collection<TokenRecord> {
        self.db.collection(TOKENS)
    }

    fn splits(&self) -> Collection<SplitRecord> {
        self.db.collection(SPLITS)
    }
}

#[async_trait]
impl Gateway for MongoGateway {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), GatewayError> {
        self.users().insert_one(user, None).await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, GatewayError> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn insert_token(&self, token: &TokenRecord) -> Result<(), GatewayError> {
        self.tokens().insert_one(token, None).await?;
        Ok(())
    }

    async fn find_tokens(&self, token: &str) -> Result<Vec<TokenRecord>, GatewayError> {
        let options = FindOptions::builder().limit(TOKEN_MATCH_LIMIT).build();
        let cursor = self.tokens().find(doc! { "token": token }, options).await?;
        let tokens: Vec<TokenRecord> = cursor.try_collect().await?;
        Ok(tokens)
    }

    async fn insert_split(&self, split: &SplitRecord) -> Result<(), GatewayError> {
        self.splits().insert_one(split, None).await?;
        Ok(())
    }

    async fn delete_shared_splits(
        &self,
        shared_id: &str,
        user_id: &str,
    ) -> Result<u64, GatewayError> {
        let result = self
            .splits()
            .delete_many(doc! { "shared_id": shared_id, "user_id": user_id }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_split(&self, id: &str, user_id: &str) -> Result<u64, GatewayError> {
        let result = self
            .splits()
            .delete_many(doc! { "id": id, "user_id": user_id }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn mark_split_paid(&self, id: &str, name: &str) -> Result<u64, GatewayError> {
        let result = self
            .splits()
            .update_many(
                doc! { "id": id, "name": name },
                doc! { "$set": { "paid": true } },
                None,
            )
            .await?;
        Ok(result.matched_count)
    }

    async fn mark_shared_splits_paid(
        &self,
        shared_id: &str,
        name: &str,
    ) -> Result<u64, GatewayError> {
        let result = self
            .splits()
            .update_many(
                doc! { "shared_id": shared_id, "name": name },
                doc! { "$set": { "paid": true } },
                None,
            )
            .await?;
        Ok(result.matched_count)
    }
}
