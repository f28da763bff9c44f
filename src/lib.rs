//! vex-limits - plan catalog and quota enforcement for Vex
//!
//! Maps a plan name plus optional per-account overrides to a structured
//! quota and feature record, and decides whether an account may add seats,
//! agents, metered usage or requests.
//!
//! # Features
//!
//! - **Catalog**: constant limits for `free`, `starter`, `pro`, `team` and
//!   `enterprise`; unknown names are evaluated as `free`
//! - **Overrides**: per-account partial records for custom contracts
//! - **Admission**: seat, agent and rate checks returning readable denials
//! - **Usage**: monthly quota evaluation with overage billing
//! - **Enforcement**: account-store backed checks with a shadow mode
//!
//! # Quick Start
//!
//! ```rust
//! use vex_limits::limits::{can_add_seat, get_plan_limits, Quota};
//!
//! let starter = get_plan_limits("starter", None);
//! assert_eq!(starter.max_seats, Quota::Limited(3));
//!
//! let admission = can_add_seat("starter", 3, 1, None);
//! assert!(!admission.is_allowed());
//! ```

pub mod accounts;
mod config;
mod error;
pub mod limits;
pub mod utils;

pub use accounts::{Account, AccountStore, InMemoryAccountStore, LimitsEnforcer};
pub use config::{Config, ConfigBuilder, EnforcementConfig, LoggingConfig};
pub use error::{ErrorResponse, LimitsError, Result};
pub use limits::{
    Admission, Feature, PlanLimits, PlanOverrides, PlanTier, Quota, UsageDecision, UsageMetric,
    can_add_agent, can_add_seat, get_plan_limits,
};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "vex_limits=debug")
/// - `VEX_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing with a custom configuration
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
