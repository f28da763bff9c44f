//! Account-backed plan enforcement.
//!
//! Connects the pure limit checks to stored accounts: plan name, overrides
//! and live member and agent counts come from an [`AccountStore`].

mod enforcer;
mod storage;

pub use enforcer::LimitsEnforcer;
pub use storage::{Account, AccountStore, InMemoryAccountStore};
