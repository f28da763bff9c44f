//! Countable plan limits.
//!
//! A [`Quota`] is either unlimited or capped at a fixed count. On the wire it
//! is a plain integer with `-1` standing for "unlimited", which keeps stored
//! plan and override records compatible with the rest of the platform.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wire sentinel for an unlimited quota.
pub const UNLIMITED: i64 = -1;

/// A countable limit on a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quota {
    /// No cap.
    Unlimited,
    /// Capped at the given count.
    Limited(u64),
}

impl Quota {
    /// Check if this quota has no cap.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// The cap, or `None` when unlimited.
    #[must_use]
    pub const fn cap(&self) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::Limited(max) => Some(*max),
        }
    }

    /// Check whether `current + adding` stays within the quota.
    ///
    /// Saturates instead of overflowing, so huge inputs are denied rather
    /// than wrapping around.
    #[must_use]
    pub const fn admits(&self, current: u64, adding: u64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(max) => current.saturating_add(adding) <= *max,
        }
    }

    /// Integer form used in stored records.
    #[must_use]
    pub const fn to_wire(self) -> i64 {
        match self {
            Self::Unlimited => UNLIMITED,
            Self::Limited(max) => {
                if max > i64::MAX as u64 {
                    i64::MAX
                } else {
                    max as i64
                }
            }
        }
    }

    /// Parse the integer form. Any negative value other than `-1` is rejected.
    pub fn from_wire(value: i64) -> Result<Self, InvalidQuota> {
        match value {
            UNLIMITED => Ok(Self::Unlimited),
            v if v >= 0 => Ok(Self::Limited(v as u64)),
            v => Err(InvalidQuota(v)),
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limited(max) => write!(f, "{}", max),
        }
    }
}

/// A quota integer outside the accepted range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid quota value {0}: expected -1 (unlimited) or a non-negative count")]
pub struct InvalidQuota(pub i64);

impl Serialize for Quota {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Quota {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Quota::from_wire(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_boundary() {
        let quota = Quota::Limited(3);
        assert!(quota.admits(2, 1));
        assert!(!quota.admits(3, 1));
        assert!(quota.admits(0, 3));
        assert!(quota.admits(3, 0));
    }

    #[test]
    fn test_admits_saturates() {
        assert!(!Quota::Limited(10).admits(u64::MAX, 1));
        assert!(Quota::Unlimited.admits(u64::MAX, u64::MAX));
    }

    #[test]
    fn test_wire_form() {
        assert_eq!(serde_json::to_string(&Quota::Unlimited).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&Quota::Limited(25)).unwrap(), "25");

        let unlimited: Quota = serde_json::from_str("-1").unwrap();
        assert_eq!(unlimited, Quota::Unlimited);
        let zero: Quota = serde_json::from_str("0").unwrap();
        assert_eq!(zero, Quota::Limited(0));
    }

    #[test]
    fn test_rejects_other_negatives() {
        assert_eq!(Quota::from_wire(-2), Err(InvalidQuota(-2)));
        assert!(serde_json::from_str::<Quota>("-5").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Quota::Unlimited.to_string(), "unlimited");
        assert_eq!(Quota::Limited(1_000).to_string(), "1000");
    }
}
