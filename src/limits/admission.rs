//! Seat and agent admission checks.
//!
//! These answer "may this account add N more?" against the effective plan
//! limits. A denial is an ordinary value carrying a readable reason; the
//! caller decides how to surface it (reject an invite, return a 403, ...).

use serde::{Deserialize, Serialize};

use super::overrides::PlanOverrides;
use super::plans::{get_plan_limits, PlanTier};
use super::quota::Quota;
use crate::error::{LimitsError, Result};

/// Outcome of an admission check.
///
/// Serializes as `{"allowed":true}` or `{"allowed":false,"reason":"..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AdmissionWire", from = "AdmissionWire")]
pub enum Admission {
    Allowed,
    Denied { reason: String },
}

#[derive(Clone, Serialize, Deserialize)]
struct AdmissionWire {
    allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl From<Admission> for AdmissionWire {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Allowed => Self { allowed: true, reason: None },
            Admission::Denied { reason } => Self { allowed: false, reason: Some(reason) },
        }
    }
}

impl From<AdmissionWire> for Admission {
    fn from(wire: AdmissionWire) -> Self {
        if wire.allowed {
            Admission::Allowed
        } else {
            Admission::Denied { reason: wire.reason.unwrap_or_default() }
        }
    }
}

impl Admission {
    /// Check if the operation may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The denial reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied { reason } => Some(reason),
        }
    }

    /// Turn a denial into the matching [`LimitsError`].
    pub fn into_result(self, resource: Resource) -> Result<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied { reason } => Err(match resource {
                Resource::Seat => LimitsError::SeatLimitReached(reason),
                Resource::Agent => LimitsError::AgentLimitReached(reason),
                Resource::Request => LimitsError::RateLimited(reason),
            }),
        }
    }
}

/// A countable resource guarded by an admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Seat,
    Agent,
    Request,
}

/// Check whether `seats_to_add` more members fit on the plan.
#[must_use]
pub fn can_add_seat(
    plan: &str,
    current_member_count: u64,
    seats_to_add: u64,
    overrides: Option<&PlanOverrides>,
) -> Admission {
    let limits = get_plan_limits(plan, overrides);
    admit(limits.max_seats, current_member_count, seats_to_add, || {
        let cap = limits.max_seats.cap().unwrap_or_default();
        format!(
            "The {} plan allows up to {}. This account already has {}.",
            PlanTier::resolve(plan),
            count_noun(cap, "seat", "seats"),
            count_noun(current_member_count, "member", "members"),
        )
    })
}

/// [`can_add_seat`] for a single new member.
#[must_use]
pub fn can_add_one_seat(
    plan: &str,
    current_member_count: u64,
    overrides: Option<&PlanOverrides>,
) -> Admission {
    can_add_seat(plan, current_member_count, 1, overrides)
}

/// Check whether `agents_to_add` more agents fit on the plan.
#[must_use]
pub fn can_add_agent(
    plan: &str,
    current_agent_count: u64,
    agents_to_add: u64,
    overrides: Option<&PlanOverrides>,
) -> Admission {
    let limits = get_plan_limits(plan, overrides);
    admit(limits.max_agents, current_agent_count, agents_to_add, || {
        let cap = limits.max_agents.cap().unwrap_or_default();
        format!(
            "The {} plan allows up to {}. This account already has {}.",
            PlanTier::resolve(plan),
            count_noun(cap, "agent", "agents"),
            count_noun(current_agent_count, "agent", "agents"),
        )
    })
}

/// [`can_add_agent`] for a single new agent.
#[must_use]
pub fn can_add_one_agent(
    plan: &str,
    current_agent_count: u64,
    overrides: Option<&PlanOverrides>,
) -> Admission {
    can_add_agent(plan, current_agent_count, 1, overrides)
}

fn admit(quota: Quota, current: u64, adding: u64, reason: impl FnOnce() -> String) -> Admission {
    if quota.admits(current, adding) {
        Admission::Allowed
    } else {
        Admission::Denied { reason: reason() }
    }
}

pub(crate) fn count_noun(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_seat_cap() {
        let result = can_add_seat("starter", 3, 1, None);
        assert!(!result.is_allowed());
        assert_eq!(
            result.reason(),
            Some("The starter plan allows up to 3 seats. This account already has 3 members.")
        );

        assert!(can_add_seat("starter", 2, 1, None).is_allowed());
        assert!(!can_add_seat("starter", 1, 3, None).is_allowed());
    }

    #[test]
    fn test_enterprise_unlimited_seats() {
        assert_eq!(can_add_seat("enterprise", 999, 50, None), Admission::Allowed);
    }

    #[test]
    fn test_singular_wording() {
        let result = can_add_one_seat("free", 1, None);
        assert_eq!(
            result.reason(),
            Some("The free plan allows up to 1 seat. This account already has 1 member.")
        );
    }

    #[test]
    fn test_unknown_plan_reports_free() {
        let result = can_add_one_seat("bogus", 1, None);
        assert!(result.reason().unwrap().starts_with("The free plan"));
    }

    #[test]
    fn test_agents_unlimited_on_every_plan() {
        assert!(can_add_agent("free", 10_000, 1, None).is_allowed());
        assert!(can_add_one_agent("starter", u64::MAX, None).is_allowed());
    }

    #[test]
    fn test_agent_cap_from_overrides() {
        let overrides = PlanOverrides::new().max_agents(Quota::Limited(2));

        assert!(can_add_one_agent("pro", 1, Some(&overrides)).is_allowed());
        let denied = can_add_one_agent("pro", 2, Some(&overrides));
        assert_eq!(
            denied.reason(),
            Some("The pro plan allows up to 2 agents. This account already has 2 agents.")
        );

        let single = PlanOverrides::new().max_agents(Quota::Limited(1));
        assert_eq!(
            can_add_one_agent("team", 1, Some(&single)).reason(),
            Some("The team plan allows up to 1 agent. This account already has 1 agent.")
        );
    }

    #[test]
    fn test_zero_cap_denies_everything() {
        let overrides = PlanOverrides::new().max_seats(Quota::Limited(0));
        let result = can_add_one_seat("team", 0, Some(&overrides));
        assert_eq!(
            result.reason(),
            Some("The team plan allows up to 0 seats. This account already has 0 members.")
        );
    }

    #[test]
    fn test_checks_are_idempotent() {
        let first = can_add_seat("starter", 3, 1, None);
        let second = can_add_seat("starter", 3, 1, None);
        assert_eq!(first, second);

        let first = can_add_agent("free", 10, 2, None);
        let second = can_add_agent("free", 10, 2, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_result() {
        assert!(Admission::Allowed.into_result(Resource::Seat).is_ok());

        let err = can_add_one_seat("free", 1, None)
            .into_result(Resource::Seat)
            .unwrap_err();
        assert!(matches!(err, LimitsError::SeatLimitReached(_)));
    }

    #[test]
    fn test_wire_shape() {
        let allowed = serde_json::to_value(Admission::Allowed).unwrap();
        assert_eq!(allowed, serde_json::json!({ "allowed": true }));

        let denied = serde_json::to_value(Admission::Denied { reason: "full".into() }).unwrap();
        assert_eq!(denied, serde_json::json!({ "allowed": false, "reason": "full" }));

        let parsed: Admission = serde_json::from_value(denied).unwrap();
        assert_eq!(parsed.reason(), Some("full"));
    }

    #[test]
    fn test_count_noun() {
        assert_eq!(count_noun(0, "seat", "seats"), "0 seats");
        assert_eq!(count_noun(1, "seat", "seats"), "1 seat");
        assert_eq!(count_noun(2, "seat", "seats"), "2 seats");
    }
}
