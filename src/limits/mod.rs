//! Plan limits evaluation.
//!
//! Everything here is pure: lookups and checks read the constant plan
//! catalog and their arguments, nothing else.
//!
//! # Example
//!
//! ```rust
//! use vex_limits::limits::{can_add_seat, Admission};
//!
//! // Starter includes three seats
//! assert!(can_add_seat("starter", 2, 1, None).is_allowed());
//!
//! match can_add_seat("starter", 3, 1, None) {
//!     Admission::Allowed => unreachable!(),
//!     Admission::Denied { reason } => println!("invite rejected: {reason}"),
//! }
//! ```

mod admission;
mod overrides;
mod plans;
mod quota;
mod usage;

pub use admission::{
    Admission, Resource, can_add_agent, can_add_one_agent, can_add_one_seat, can_add_seat,
};
pub use overrides::PlanOverrides;
pub use plans::{
    ENTERPRISE, FREE, Feature, PRO, PlanLimits, PlanTier, STARTER, TEAM, UnknownPlan, catalog,
    get_plan_limits,
};
pub use quota::{InvalidQuota, Quota, UNLIMITED};
pub use usage::{UsageDecision, UsageMetric, check_rate, evaluate_usage};
