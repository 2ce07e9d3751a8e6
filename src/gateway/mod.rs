//! Persistence seam. Every handler talks to storage through [`Gateway`].

use async_trait::async_trait;
use thiserror::Error;

use crate::schemas::{SplitRecord, TokenRecord, UserRecord};

pub mod memory;
pub mod mongo;

pub use memory::MemoryGateway;
pub use mongo::MongoGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("duplicate key")]
    Duplicate,
    #[error("database error: {0}")]
    Database(mongodb::error::Error),
    #[error("storage unavailable")]
    Unavailable,
}

/// The named queries the service issues.
///
/// Counts returned by the update and delete queries are the number of rows the
/// filter matched, so marking an already paid split still reports it.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), GatewayError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, GatewayError>;

    async fn insert_token(&self, token: &TokenRecord) -> Result<(), GatewayError>;

    /// Returns at most two rows, enough to tell a unique match from an
    /// ambiguous one.
    async fn find_tokens(&self, token: &str) -> Result<Vec<TokenRecord>, GatewayError>;

    async fn insert_split(&self, split: &SplitRecord) -> Result<(), GatewayError>;

    async fn delete_shared_splits(&self, shared_id: &str, user_id: &str)
        -> Result<u64, GatewayError>;

    async fn delete_split(&self, id: &str, user_id: &str) -> Result<u64, GatewayError>;

    async fn mark_split_paid(&self, id: &str, name: &str) -> Result<u64, GatewayError>;

    async fn mark_shared_splits_paid(&self, shared_id: &str, name: &str)
        -> Result<u64, GatewayError>;
}
