//! Per-account overrides on top of a base plan.
//!
//! Custom contracts adjust individual limits without introducing new tiers.
//! An override record has the same fields as [`PlanLimits`], each optional;
//! a missing or `null` field keeps the base plan's value.

use serde::{Deserialize, Serialize};

use super::plans::PlanLimits;
use super::quota::Quota;
use crate::error::Result;

/// Partial replacement for a plan's limits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations_per_month: Option<Quota>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifications_per_month: Option<Quota>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrections_per_month: Option<Quota>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_agents: Option<Quota>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_seats: Option<Quota>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrections_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_alerts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack_alerts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overage_allowed: Option<bool>,
}

impl PlanOverrides {
    /// Create an empty override record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from their stored JSON form.
    ///
    /// `null` is treated as "no overrides". Unknown keys are ignored.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        if json.is_null() {
            return Ok(Self::default());
        }
        Ok(Self::deserialize(json)?)
    }

    /// Check if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Override the seat cap.
    #[must_use]
    pub fn max_seats(mut self, quota: Quota) -> Self {
        self.max_seats = Some(quota);
        self
    }

    /// Override the agent cap.
    #[must_use]
    pub fn max_agents(mut self, quota: Quota) -> Self {
        self.max_agents = Some(quota);
        self
    }

    /// Override the requests-per-minute ceiling.
    #[must_use]
    pub fn max_rpm(mut self, rpm: u32) -> Self {
        self.max_rpm = Some(rpm);
        self
    }

    /// Override the retention window.
    #[must_use]
    pub fn retention_days(mut self, days: u32) -> Self {
        self.retention_days = Some(days);
        self
    }
}

impl PlanLimits {
    /// Apply overrides field by field, returning the merged record.
    #[must_use]
    pub fn with_overrides(&self, overrides: &PlanOverrides) -> PlanLimits {
        PlanLimits {
            observations_per_month: overrides
                .observations_per_month
                .unwrap_or(self.observations_per_month),
            verifications_per_month: overrides
                .verifications_per_month
                .unwrap_or(self.verifications_per_month),
            corrections_per_month: overrides
                .corrections_per_month
                .unwrap_or(self.corrections_per_month),
            max_rpm: overrides.max_rpm.unwrap_or(self.max_rpm),
            max_agents: overrides.max_agents.unwrap_or(self.max_agents),
            max_seats: overrides.max_seats.unwrap_or(self.max_seats),
            corrections_enabled: overrides
                .corrections_enabled
                .unwrap_or(self.corrections_enabled),
            webhook_alerts: overrides.webhook_alerts.unwrap_or(self.webhook_alerts),
            slack_alerts: overrides.slack_alerts.unwrap_or(self.slack_alerts),
            retention_days: overrides.retention_days.unwrap_or(self.retention_days),
            overage_allowed: overrides.overage_allowed.unwrap_or(self.overage_allowed),
        }
    }
}
