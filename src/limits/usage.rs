//! Monthly quota and rate-ceiling evaluation.
//!
//! Plans either bill usage above a monthly quota as overage or reject it,
//! depending on `overage_allowed`. Corrections are additionally gated by the
//! `corrections_enabled` flag.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::admission::{count_noun, Admission};
use super::plans::PlanLimits;
use super::quota::Quota;

/// A metered monthly resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageMetric {
    Observations,
    Verifications,
    Corrections,
}

impl UsageMetric {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Observations => "observations",
            Self::Verifications => "verifications",
            Self::Corrections => "corrections",
        }
    }

    /// The monthly quota for this metric on a plan.
    #[must_use]
    pub const fn quota(&self, limits: &PlanLimits) -> Quota {
        match self {
            Self::Observations => limits.observations_per_month,
            Self::Verifications => limits.verifications_per_month,
            Self::Corrections => limits.corrections_per_month,
        }
    }
}

impl fmt::Display for UsageMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating metered usage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum UsageDecision {
    /// Fits inside the quota. `remaining` is `None` for unlimited quotas.
    Within { remaining: Option<u64> },
    /// Exceeds the quota on a plan that bills overage.
    Overage { billable_units: u64 },
    /// Exceeds the quota, or the feature is off.
    Rejected { reason: String },
}

impl UsageDecision {
    /// Check if the usage may be accepted (billed or not).
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Evaluate `requested` more units of `metric` given `used_this_month`.
#[must_use]
pub fn evaluate_usage(
    limits: &PlanLimits,
    metric: UsageMetric,
    used_this_month: u64,
    requested: u64,
) -> UsageDecision {
    if metric == UsageMetric::Corrections && !limits.corrections_enabled {
        return UsageDecision::Rejected {
            reason: "Corrections are not included in this plan.".to_string(),
        };
    }

    let cap = match metric.quota(limits) {
        Quota::Unlimited => return UsageDecision::Within { remaining: None },
        Quota::Limited(cap) => cap,
    };

    let total = used_this_month.saturating_add(requested);
    if total <= cap {
        return UsageDecision::Within { remaining: Some(cap - total) };
    }

    if limits.overage_allowed {
        // Only the part of this request above the cap; earlier overage was
        // already billed.
        let billable_units = total - cap.max(used_this_month);
        UsageDecision::Overage { billable_units }
    } else {
        UsageDecision::Rejected {
            reason: format!(
                "Monthly {} quota of {} reached ({} used).",
                metric,
                cap,
                used_this_month
            ),
        }
    }
}

/// Check one more request against the plan's requests-per-minute ceiling.
#[must_use]
pub fn check_rate(limits: &PlanLimits, requests_in_current_minute: u64) -> Admission {
    let ceiling = u64::from(limits.max_rpm);
    if Quota::Limited(ceiling).admits(requests_in_current_minute, 1) {
        Admission::Allowed
    } else {
        Admission::Denied {
            reason: format!(
                "Rate limit of {} per minute exceeded.",
                count_noun(ceiling, "request", "requests")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::plans::{ENTERPRISE, FREE, STARTER};

    #[test]
    fn test_within_quota() {
        let decision = evaluate_usage(&FREE, UsageMetric::Observations, 9_000, 500);
        assert_eq!(decision, UsageDecision::Within { remaining: Some(500) });

        let exact = evaluate_usage(&FREE, UsageMetric::Observations, 9_000, 1_000);
        assert_eq!(exact, UsageDecision::Within { remaining: Some(0) });
    }

    #[test]
    fn test_unlimited_quota() {
        let decision = evaluate_usage(&ENTERPRISE, UsageMetric::Verifications, u64::MAX, 1);
        assert_eq!(decision, UsageDecision::Within { remaining: None });
    }

    #[test]
    fn test_hard_reject_without_overage() {
        let decision = evaluate_usage(&FREE, UsageMetric::Verifications, 1_000, 1);
        assert_eq!(
            decision,
            UsageDecision::Rejected {
                reason: "Monthly verifications quota of 1000 reached (1000 used).".to_string()
            }
        );
        assert!(!decision.is_accepted());
    }

    #[test]
    fn test_overage_bills_only_excess() {
        // Crosses the cap: 99_990 + 20 = 100_010, 10 units over
        let crossing = evaluate_usage(&STARTER, UsageMetric::Observations, 99_990, 20);
        assert_eq!(crossing, UsageDecision::Overage { billable_units: 10 });

        // Already over: every unit is billable
        let over = evaluate_usage(&STARTER, UsageMetric::Observations, 150_000, 20);
        assert_eq!(over, UsageDecision::Overage { billable_units: 20 });
        assert!(over.is_accepted());
    }

    #[test]
    fn test_corrections_gated_by_feature() {
        let decision = evaluate_usage(&FREE, UsageMetric::Corrections, 0, 1);
        assert!(matches!(decision, UsageDecision::Rejected { .. }));

        let allowed = evaluate_usage(&STARTER, UsageMetric::Corrections, 0, 1);
        assert_eq!(allowed, UsageDecision::Within { remaining: Some(999) });
    }

    #[test]
    fn test_rate_ceiling() {
        assert!(check_rate(&FREE, 59).is_allowed());
        let denied = check_rate(&FREE, 60);
        assert_eq!(denied.reason(), Some("Rate limit of 60 requests per minute exceeded."));
    }

    #[test]
    fn test_decision_wire_shape() {
        let json = serde_json::to_value(UsageDecision::Overage { billable_units: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "decision": "overage", "billable_units": 3 }));
    }
}
