use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Gateway, GatewayError};
use crate::schemas::{SplitRecord, TokenRecord, UserRecord};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    tokens: Vec<TokenRecord>,
    splits: Vec<SplitRecord>,
}

/// Process-local storage with the same uniqueness rules as the database:
/// unique user emails and unique split ids.
#[derive(Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
    user_faults: AtomicBool,
    token_faults: AtomicBool,
    split_faults: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// While enabled every user query fails as if the database were down.
    pub fn set_user_faults(&self, enabled: bool) {
        self.user_faults.store(enabled, Ordering::SeqCst);
    }

    pub fn set_token_faults(&self, enabled: bool) {
        self.token_faults.store(enabled, Ordering::SeqCst);
    }

    pub fn set_split_faults(&self, enabled: bool) {
        self.split_faults.store(enabled, Ordering::SeqCst);
    }

    pub async fn splits(&self) -> Vec<SplitRecord> {
        self.tables.read().await.splits.clone()
    }

    fn check(faults: &AtomicBool) -> Result<(), GatewayError> {
        if faults.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable);
        }
        Ok(())
    }

    fn check_users(&self) -> Result<(), GatewayError> {
        Self::check(&self.user_faults)
    }

    fn check_tokens(&self) -> Result<(), GatewayError> {
        Self::check(&self.token_faults)
    }

    fn check_splits(&self) -> Result<(), GatewayError> {
        Self::check(&self.split_faults)
    }

    async fn mark_paid(&self, matches: impl Fn(&SplitRecord) -> bool + Send) -> u64 {
        let mut tables = self.tables.write().await;
        let mut matched = 0;
        for split in tables.splits.iter_mut() {
            if matches(split) {
                split.paid = true;
                matched += 1;
            }
        }
        matched
    }

    async fn delete(&self, matches: impl Fn(&SplitRecord) -> bool + Send) -> u64 {
        let mut tables = self.tables.write().await;
        let before = tables.splits.len();
        tables.splits.retain(|split| !matches(split));
        (before - tables.splits.len()) as u64
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn insert_user(&self, user: &UserRecord) -> Result<(), GatewayError> {
        self.check_users()?;
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|existing| existing.email == user.email) {
            return Err(GatewayError::Duplicate);
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, GatewayError> {
        self.check_users()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.email == email).cloned())
    }

    async fn insert_token(&self, token: &TokenRecord) -> Result<(), GatewayError> {
        self.check_tokens()?;
        self.tables.write().await.tokens.push(token.clone());
        Ok(())
    }

    async fn find_tokens(&self, token: &str) -> Result<Vec<TokenRecord>, GatewayError> {
        self.check_tokens()?;
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .iter()
            .filter(|record| record.token == token)
            .take(2)
            .cloned()
            .collect())
    }

    async fn insert_split(&self, split: &SplitRecord) -> Result<(), GatewayError> {
        self.check_splits()?;
        let mut tables = self.tables.write().await;
        if tables.splits.iter().any(|existing| existing.id == split.id) {
            return Err(GatewayError::Duplicate);
        }
        tables.splits.push(split.clone());
        Ok(())
    }

    async fn delete_shared_splits(
        &self,
        shared_id: &str,
        user_id: &str,
    ) -> Result<u64, GatewayError> {
        self.check_splits()?;
        Ok(self
            .delete(|split| split.shared_id == shared_id && split.user_id == user_id)
            .await)
    }

    async fn delete_split(&self, id: &str, user_id: &str) -> Result<u64, GatewayError> {
        self.check_splits()?;
        Ok(self
            .delete(|split| split.id == id && split.user_id == user_id)
            .await)
    }

    async fn mark_split_paid(&self, id: &str, name: &str) -> Result<u64, GatewayError> {
        self.check_splits()?;
        Ok(self
            .mark_paid(|split| split.id == id && split.name == name)
            .await)
    }

    async fn mark_shared_splits_paid(
        &self,
        shared_id: &str,
        name: &str,
    ) -> Result<u64, GatewayError> {
        self.check_splits()?;
        Ok(self
            .mark_paid(|split| split.shared_id == shared_id && split.name == name)
            .await)
    }
}
