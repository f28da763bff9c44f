//! Account storage seam.
//!
//! The enforcer needs the account's plan name, its override record and the
//! current member and agent counts. Implement [`AccountStore`] over your
//! database; [`InMemoryAccountStore`] covers development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{LimitsError, Result};
use crate::limits::PlanOverrides;

/// An account's plan assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    /// Plan name as stored. Names outside the catalog are evaluated as `free`.
    pub plan: String,
    /// Custom contract adjustments, set by an administrator.
    #[serde(default)]
    pub overrides: Option<PlanOverrides>,
}

impl Account {
    pub fn new(id: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plan: plan.into(),
            overrides: None,
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: PlanOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

/// Storage for accounts and their usage counts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Get an account by ID.
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>>;

    /// Create or replace an account.
    async fn save_account(&self, account: &Account) -> Result<()>;

    /// Replace an account's overrides. `None` clears them.
    async fn set_overrides(
        &self,
        account_id: &str,
        overrides: Option<PlanOverrides>,
    ) -> Result<()>;

    /// Current members, including pending invitations.
    async fn member_count(&self, account_id: &str) -> Result<u64>;

    /// Currently registered agents.
    async fn agent_count(&self, account_id: &str) -> Result<u64>;
}

#[derive(Default)]
struct AccountRecord {
    account: Option<Account>,
    members: u64,
    agents: u64,
}

/// In-memory account store
///
/// Suitable for development and testing. Data is lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    records: Arc<RwLock<HashMap<String, AccountRecord>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the member count for an account.
    pub async fn set_member_count(&self, account_id: &str, count: u64) {
        let mut records = self.records.write().await;
        records.entry(account_id.to_string()).or_default().members = count;
    }

    /// Set the agent count for an account.
    pub async fn set_agent_count(&self, account_id: &str, count: u64) {
        let mut records = self.records.write().await;
        records.entry(account_id.to_string()).or_default().agents = count;
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let records = self.records.read().await;
        Ok(records.get(account_id).and_then(|r| r.account.clone()))
    }

    async fn save_account(&self, account: &Account) -> Result<()> {
        let mut records = self.records.write().await;
        records.entry(account.id.clone()).or_default().account = Some(account.clone());
        Ok(())
    }

    async fn set_overrides(
        &self,
        account_id: &str,
        overrides: Option<PlanOverrides>,
    ) -> Result<()> {
        let mut records = self.records.write().await;
        let account = records
            .get_mut(account_id)
            .and_then(|r| r.account.as_mut())
            .ok_or_else(|| LimitsError::not_found(format!("account '{}'", account_id)))?;
        account.overrides = overrides;
        Ok(())
    }

    async fn member_count(&self, account_id: &str) -> Result<u64> {
        let records = self.records.read().await;
        Ok(records.get(account_id).map_or(0, |r| r.members))
    }

    async fn agent_count(&self, account_id: &str) -> Result<u64> {
        let records = self.records.read().await;
        Ok(records.get(account_id).map_or(0, |r| r.agents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Quota;

    #[tokio::test]
    async fn test_save_and_get() {
        let store = InMemoryAccountStore::new();
        assert_eq!(store.get_account("acct_1").await.unwrap(), None);

        let account = Account::new("acct_1", "pro");
        store.save_account(&account).await.unwrap();
        assert_eq!(store.get_account("acct_1").await.unwrap(), Some(account));
    }

    #[tokio::test]
    async fn test_set_overrides() {
        let store = InMemoryAccountStore::new();
        store.save_account(&Account::new("acct_1", "pro")).await.unwrap();

        let overrides = PlanOverrides::new().max_seats(Quota::Limited(40));
        store.set_overrides("acct_1", Some(overrides)).await.unwrap();
        let account = store.get_account("acct_1").await.unwrap().unwrap();
        assert_eq!(account.overrides, Some(overrides));

        store.set_overrides("acct_1", None).await.unwrap();
        let account = store.get_account("acct_1").await.unwrap().unwrap();
        assert_eq!(account.overrides, None);
    }

    #[tokio::test]
    async fn test_set_overrides_unknown_account() {
        let store = InMemoryAccountStore::new();
        let err = store.set_overrides("missing", None).await.unwrap_err();
        assert!(matches!(err, LimitsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_counts_default_to_zero() {
        let store = InMemoryAccountStore::new();
        assert_eq!(store.member_count("acct_1").await.unwrap(), 0);

        store.set_member_count("acct_1", 4).await;
        store.set_agent_count("acct_1", 9).await;
        assert_eq!(store.member_count("acct_1").await.unwrap(), 4);
        assert_eq!(store.agent_count("acct_1").await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_counts_survive_account_save() {
        let store = InMemoryAccountStore::new();
        store.set_member_count("acct_1", 2).await;
        store.save_account(&Account::new("acct_1", "starter")).await.unwrap();
        assert_eq!(store.member_count("acct_1").await.unwrap(), 2);
    }
}
