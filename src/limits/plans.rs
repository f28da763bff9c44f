//! Plan catalog and per-tier limits.
//!
//! The catalog is fixed at compile time: each tier maps to a constant
//! [`PlanLimits`] record. Plan names arrive from storage and requests as
//! arbitrary strings, so lookups never fail: an unrecognized name resolves to
//! the `free` tier, which is the most restrictive one.
//!
//! # Example
//!
//! ```rust
//! use vex_limits::limits::{get_plan_limits, PlanOverrides, Quota};
//!
//! let pro = get_plan_limits("pro", None);
//! assert_eq!(pro.max_seats, Quota::Limited(10));
//!
//! let custom = PlanOverrides { max_seats: Some(Quota::Limited(50)), ..Default::default() };
//! let contract = get_plan_limits("pro", Some(&custom));
//! assert_eq!(contract.max_seats, Quota::Limited(50));
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::overrides::PlanOverrides;
use super::quota::Quota;

/// A known pricing tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Starter,
    Pro,
    Team,
    Enterprise,
}

impl PlanTier {
    /// Every tier, cheapest first.
    pub const ALL: [PlanTier; 5] = [
        PlanTier::Free,
        PlanTier::Starter,
        PlanTier::Pro,
        PlanTier::Team,
        PlanTier::Enterprise,
    ];

    /// Plan name as stored on account records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Team => "team",
            Self::Enterprise => "enterprise",
        }
    }

    /// Resolve a plan name, falling back to [`PlanTier::Free`] for names
    /// outside the catalog.
    #[must_use]
    pub fn resolve(plan: &str) -> Self {
        plan.parse().unwrap_or(Self::Free)
    }

    /// The catalog record for this tier.
    #[must_use]
    pub fn limits(&self) -> &'static PlanLimits {
        &CATALOG[*self as usize]
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            "team" => Ok(Self::Team),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(UnknownPlan(other.to_string())),
        }
    }
}

/// A plan name with no catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan '{0}'")]
pub struct UnknownPlan(pub String);

/// Quotas and feature flags for one pricing tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    /// Observations ingested per calendar month.
    pub observations_per_month: Quota,
    /// Verifications run per calendar month.
    pub verifications_per_month: Quota,
    /// Corrections issued per calendar month.
    pub corrections_per_month: Quota,
    /// Requests-per-minute ceiling for the API.
    pub max_rpm: u32,
    /// Registered agents.
    pub max_agents: Quota,
    /// Team members.
    pub max_seats: Quota,
    pub corrections_enabled: bool,
    pub webhook_alerts: bool,
    pub slack_alerts: bool,
    /// Days of history kept before purge.
    pub retention_days: u32,
    /// Whether usage above a monthly quota is billed as overage instead of
    /// being rejected.
    pub overage_allowed: bool,
}

/// A gated feature on a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Corrections,
    WebhookAlerts,
    SlackAlerts,
}

impl Feature {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Corrections => "corrections",
            Self::WebhookAlerts => "webhook_alerts",
            Self::SlackAlerts => "slack_alerts",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PlanLimits {
    /// Check if a feature flag is on.
    #[must_use]
    pub const fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::Corrections => self.corrections_enabled,
            Feature::WebhookAlerts => self.webhook_alerts,
            Feature::SlackAlerts => self.slack_alerts,
        }
    }

    /// Oldest instant still inside the retention window at `now`.
    #[must_use]
    pub fn retention_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.retention_days))
    }

    /// Check whether a record created at `created_at` has aged out.
    #[must_use]
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        created_at < self.retention_cutoff(now)
    }
}

pub const FREE: PlanLimits = PlanLimits {
    observations_per_month: Quota::Limited(10_000),
    verifications_per_month: Quota::Limited(1_000),
    corrections_per_month: Quota::Limited(0),
    max_rpm: 60,
    max_agents: Quota::Unlimited,
    max_seats: Quota::Limited(1),
    corrections_enabled: false,
    webhook_alerts: false,
    slack_alerts: false,
    retention_days: 7,
    overage_allowed: false,
};

pub const STARTER: PlanLimits = PlanLimits {
    observations_per_month: Quota::Limited(100_000),
    verifications_per_month: Quota::Limited(10_000),
    corrections_per_month: Quota::Limited(1_000),
    max_rpm: 300,
    max_agents: Quota::Unlimited,
    max_seats: Quota::Limited(3),
    corrections_enabled: true,
    webhook_alerts: true,
    slack_alerts: false,
    retention_days: 30,
    overage_allowed: true,
};

pub const PRO: PlanLimits = PlanLimits {
    observations_per_month: Quota::Limited(1_000_000),
    verifications_per_month: Quota::Limited(100_000),
    corrections_per_month: Quota::Limited(10_000),
    max_rpm: 1_000,
    max_agents: Quota::Unlimited,
    max_seats: Quota::Limited(10),
    corrections_enabled: true,
    webhook_alerts: true,
    slack_alerts: true,
    retention_days: 90,
    overage_allowed: true,
};

pub const TEAM: PlanLimits = PlanLimits {
    observations_per_month: Quota::Limited(5_000_000),
    verifications_per_month: Quota::Limited(500_000),
    corrections_per_month: Quota::Limited(50_000),
    max_rpm: 3_000,
    max_agents: Quota::Unlimited,
    max_seats: Quota::Limited(25),
    corrections_enabled: true,
    webhook_alerts: true,
    slack_alerts: true,
    retention_days: 180,
    overage_allowed: true,
};

pub const ENTERPRISE: PlanLimits = PlanLimits {
    observations_per_month: Quota::Unlimited,
    verifications_per_month: Quota::Unlimited,
    corrections_per_month: Quota::Unlimited,
    max_rpm: 10_000,
    max_agents: Quota::Unlimited,
    max_seats: Quota::Unlimited,
    corrections_enabled: true,
    webhook_alerts: true,
    slack_alerts: true,
    retention_days: 365,
    overage_allowed: true,
};

// Indexed by `PlanTier as usize`; order must match the enum.
static CATALOG: [PlanLimits; 5] = [FREE, STARTER, PRO, TEAM, ENTERPRISE];

/// Iterate over every tier with its catalog record.
pub fn catalog() -> impl Iterator<Item = (PlanTier, &'static PlanLimits)> {
    PlanTier::ALL.into_iter().map(|tier| (tier, tier.limits()))
}

/// Effective limits for a plan name with optional account overrides.
///
/// Unknown plan names get the `free` record. Only fields set on `overrides`
/// replace the base values.
#[must_use]
pub fn get_plan_limits(plan: &str, overrides: Option<&PlanOverrides>) -> PlanLimits {
    let base = PlanTier::resolve(plan).limits();
    match overrides {
        Some(overrides) => base.with_overrides(overrides),
        None => *base,
    }
}
