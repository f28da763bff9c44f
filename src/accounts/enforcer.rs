//! Account-backed limit enforcement.
//!
//! Wraps the pure checks in [`crate::limits`] with account lookup, turning
//! denials into [`LimitsError`]s that render as HTTP responses.
//!
//! # Example
//!
//! ```rust,ignore
//! use vex_limits::accounts::{InMemoryAccountStore, LimitsEnforcer};
//! use vex_limits::EnforcementConfig;
//!
//! let enforcer = LimitsEnforcer::new(store, EnforcementConfig::default());
//!
//! // In an invite handler
//! enforcer.ensure_can_add_seats(&org_id, 1).await?;
//! ```

use crate::config::EnforcementConfig;
use crate::error::{LimitsError, Result};
use crate::limits::{
    Admission, Feature, PlanLimits, PlanOverrides, PlanTier, Resource, UsageDecision, UsageMetric,
    can_add_agent, can_add_seat, check_rate, evaluate_usage, get_plan_limits,
};

use super::storage::{Account, AccountStore};

/// Enforces plan limits for stored accounts.
pub struct LimitsEnforcer<S: AccountStore> {
    store: S,
    config: EnforcementConfig,
}

impl<S: AccountStore> LimitsEnforcer<S> {
    /// Create a new enforcer.
    #[must_use]
    pub fn new(store: S, config: EnforcementConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check if denials are enforced (as opposed to only logged).
    #[must_use]
    pub fn is_enforcing(&self) -> bool {
        self.config.enabled
    }

    /// Effective limits for an account: its plan with overrides applied.
    pub async fn effective_limits(&self, account_id: &str) -> Result<PlanLimits> {
        let account = self.account(account_id).await?;
        Ok(limits_for(&account))
    }

    /// Fail unless `count` more members fit on the account's plan.
    pub async fn ensure_can_add_seats(&self, account_id: &str, count: u64) -> Result<()> {
        let account = self.account(account_id).await?;
        let members = self.store.member_count(account_id).await?;

        let admission = can_add_seat(&account.plan, members, count, account.overrides.as_ref());
        tracing::debug!(
            account_id = %account_id,
            plan = %account.plan,
            members,
            adding = count,
            allowed = admission.is_allowed(),
            "Seat check"
        );
        self.gate(account_id, Resource::Seat, admission)
    }

    /// Fail unless `count` more agents fit on the account's plan.
    pub async fn ensure_can_add_agents(&self, account_id: &str, count: u64) -> Result<()> {
        let account = self.account(account_id).await?;
        let agents = self.store.agent_count(account_id).await?;

        let admission = can_add_agent(&account.plan, agents, count, account.overrides.as_ref());
        tracing::debug!(
            account_id = %account_id,
            plan = %account.plan,
            agents,
            adding = count,
            allowed = admission.is_allowed(),
            "Agent check"
        );
        self.gate(account_id, Resource::Agent, admission)
    }

    /// Fail unless one more request fits in the current minute.
    pub async fn ensure_rate(&self, account_id: &str, requests_in_current_minute: u64) -> Result<()> {
        let limits = self.effective_limits(account_id).await?;
        let admission = check_rate(&limits, requests_in_current_minute);
        self.gate(account_id, Resource::Request, admission)
    }

    /// Evaluate metered usage for an account.
    ///
    /// Returns the decision when usage is accepted, possibly as billable
    /// overage. A rejection becomes [`LimitsError::QuotaExceeded`], or
    /// [`LimitsError::FeatureNotIncluded`] for corrections on plans without
    /// them. In shadow mode the rejected decision is returned as a value.
    pub async fn ensure_usage(
        &self,
        account_id: &str,
        metric: UsageMetric,
        used_this_month: u64,
        requested: u64,
    ) -> Result<UsageDecision> {
        let limits = self.effective_limits(account_id).await?;
        let decision = evaluate_usage(&limits, metric, used_this_month, requested);

        let rejection = match &decision {
            UsageDecision::Within { .. } => None,
            UsageDecision::Overage { billable_units } => {
                tracing::info!(
                    account_id = %account_id,
                    metric = %metric,
                    billable_units,
                    "Usage above quota billed as overage"
                );
                None
            }
            UsageDecision::Rejected { reason } => Some(reason.clone()),
        };

        if let Some(reason) = rejection {
            let err = if metric == UsageMetric::Corrections && !limits.corrections_enabled {
                LimitsError::FeatureNotIncluded(reason)
            } else {
                LimitsError::QuotaExceeded(reason)
            };
            self.deny_or_pass(account_id, err)?;
        }

        Ok(decision)
    }

    /// Fail unless the account's plan includes `feature`.
    pub async fn ensure_feature(&self, account_id: &str, feature: Feature) -> Result<()> {
        let account = self.account(account_id).await?;
        let limits = limits_for(&account);
        if limits.has_feature(feature) {
            return Ok(());
        }

        let err = LimitsError::FeatureNotIncluded(format!(
            "The {} feature is not included in the {} plan.",
            feature,
            PlanTier::resolve(&account.plan)
        ));
        self.deny_or_pass(account_id, err)
    }

    /// Replace an account's overrides. Empty overrides are stored as `None`.
    pub async fn update_overrides(
        &self,
        account_id: &str,
        overrides: Option<PlanOverrides>,
    ) -> Result<()> {
        let overrides = overrides.filter(|o| !o.is_empty());
        self.store.set_overrides(account_id, overrides).await?;
        tracing::info!(
            account_id = %account_id,
            cleared = overrides.is_none(),
            "Plan overrides updated"
        );
        Ok(())
    }

    async fn account(&self, account_id: &str) -> Result<Account> {
        self.store
            .get_account(account_id)
            .await?
            .ok_or_else(|| LimitsError::not_found(format!("account '{}'", account_id)))
    }

    fn gate(&self, account_id: &str, resource: Resource, admission: Admission) -> Result<()> {
        match admission.into_result(resource) {
            Ok(()) => Ok(()),
            Err(err) => self.deny_or_pass(account_id, err),
        }
    }

    fn deny_or_pass(&self, account_id: &str, err: LimitsError) -> Result<()> {
        if self.config.enabled {
            tracing::warn!(account_id = %account_id, error = %err, "Plan limit denied operation");
            Err(err)
        } else {
            tracing::warn!(
                account_id = %account_id,
                error = %err,
                "Plan limit would deny operation (enforcement disabled)"
            );
            Ok(())
        }
    }
}

fn limits_for(account: &Account) -> PlanLimits {
    get_plan_limits(&account.plan, account.overrides.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::InMemoryAccountStore;
    use crate::limits::{PRO, Quota};

    async fn enforcer_with(account: Account) -> LimitsEnforcer<InMemoryAccountStore> {
        let store = InMemoryAccountStore::new();
        store.save_account(&account).await.unwrap();
        LimitsEnforcer::new(store, EnforcementConfig::default())
    }

    #[tokio::test]
    async fn test_effective_limits_missing_account() {
        let enforcer = LimitsEnforcer::new(InMemoryAccountStore::new(), EnforcementConfig::default());
        let err = enforcer.effective_limits("nope").await.unwrap_err();
        assert!(matches!(err, LimitsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_effective_limits_applies_overrides() {
        let overrides = PlanOverrides::new().max_seats(Quota::Limited(50));
        let enforcer = enforcer_with(Account::new("acct", "pro").with_overrides(overrides)).await;

        let limits = enforcer.effective_limits("acct").await.unwrap();
        assert_eq!(limits, PlanLimits { max_seats: Quota::Limited(50), ..PRO });
    }

    #[tokio::test]
    async fn test_seat_denial() {
        let enforcer = enforcer_with(Account::new("acct", "starter")).await;
        enforcer.store().set_member_count("acct", 3).await;

        let err = enforcer.ensure_can_add_seats("acct", 1).await.unwrap_err();
        assert!(matches!(err, LimitsError::SeatLimitReached(_)));
    }

    #[tokio::test]
    async fn test_shadow_mode_allows() {
        let store = InMemoryAccountStore::new();
        store.save_account(&Account::new("acct", "starter")).await.unwrap();
        store.set_member_count("acct", 3).await;
        let enforcer = LimitsEnforcer::new(store, EnforcementConfig::shadow());

        assert!(!enforcer.is_enforcing());
        assert!(enforcer.ensure_can_add_seats("acct", 1).await.is_ok());
        assert!(enforcer.ensure_feature("acct", Feature::SlackAlerts).await.is_ok());
    }

    #[tokio::test]
    async fn test_corrections_feature_error() {
        let enforcer = enforcer_with(Account::new("acct", "free")).await;
        let err = enforcer
            .ensure_usage("acct", UsageMetric::Corrections, 0, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LimitsError::FeatureNotIncluded(_)));
    }

    #[tokio::test]
    async fn test_update_overrides_drops_empty() {
        let enforcer = enforcer_with(Account::new("acct", "team")).await;
        enforcer
            .update_overrides("acct", Some(PlanOverrides::new()))
            .await
            .unwrap();

        let account = enforcer.store().get_account("acct").await.unwrap().unwrap();
        assert_eq!(account.overrides, None);
    }
}
