// =============================================================================
// usage.rs - THE PAYWALL BOUNCER
// =============================================================================
//
// Free users get a handful of deep dives per session. After that, a polite
// upsell instead of an answer. Upgrading lifts the cap for good.
//
// The check and the increment happen under one lock, so two deep dives
// racing for the last free slot cannot both get it. A rejected request never
// reaches the model gateway; that ordering lives in the report source.
//
// Nothing here is persisted. Restart the process, get your free dives back.
// =============================================================================

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Subscription tier.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Premium,
    Enterprise,
}

impl PlanTier {
    pub fn plan_name(self) -> &'static str {
        match self {
            PlanTier::Free => "Citizen Watchdog",
            PlanTier::Pro => "Democracy Investigator",
            PlanTier::Premium => "Transparency Champion",
            PlanTier::Enterprise => "Media & NGO",
        }
    }
}

/// Tiers a user can upgrade to. Nobody upgrades to free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeTier {
    Pro,
    Premium,
    Enterprise,
}

impl From<UpgradeTier> for PlanTier {
    fn from(tier: UpgradeTier) -> Self {
        match tier {
            UpgradeTier::Pro => PlanTier::Pro,
            UpgradeTier::Premium => PlanTier::Premium,
            UpgradeTier::Enterprise => PlanTier::Enterprise,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown upgrade tier '{0}' (expected pro, premium or enterprise)")]
pub struct UnknownTier(pub String);

impl FromStr for UpgradeTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pro" => Ok(UpgradeTier::Pro),
            "premium" => Ok(UpgradeTier::Premium),
            "enterprise" => Ok(UpgradeTier::Enterprise),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

/// Features that sit behind the paywall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    DeepDive,
    RealTimeAlerts,
    HistoricalAnalysis,
    ApiAccess,
}

impl Feature {
    /// Name shown on the paywall.
    pub fn display_name(self) -> &'static str {
        match self {
            Feature::DeepDive => "Deep Dive Investigation",
            Feature::RealTimeAlerts => "Real-time Alerts",
            Feature::HistoricalAnalysis => "Historical Analysis",
            Feature::ApiAccess => "API Access",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown feature '{0}'")]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deep-dive" => Ok(Feature::DeepDive),
            "real-time-alerts" => Ok(Feature::RealTimeAlerts),
            "historical-analysis" => Ok(Feature::HistoricalAnalysis),
            "api-access" => Ok(Feature::ApiAccess),
            _ => Err(UnknownFeature(s.to_string())),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What the user sees instead of the feature.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaywallPrompt {
    pub feature: &'static str,
    pub current_plan: &'static str,
    pub deep_dives_used: u32,
    pub deep_dives_limit: Option<u32>,
    pub upgrade_tiers: [PlanTier; 3],
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub deep_dives_used: u32,
    /// `None` means unlimited.
    pub deep_dives_limit: Option<u32>,
    pub deep_dives_remaining: Option<u32>,
    pub plan_name: &'static str,
    pub plan_tier: PlanTier,
    pub alerts_enabled: bool,
    /// The paywall currently showing, if any.
    pub paywall: Option<PaywallPrompt>,
}

struct UsageState {
    used: u32,
    limit: Option<u32>,
    tier: PlanTier,
    alerts_enabled: bool,
    paywall: Option<Feature>,
}

impl UsageState {
    fn prompt(&self, feature: Feature) -> PaywallPrompt {
        PaywallPrompt {
            feature: feature.display_name(),
            current_plan: self.tier.plan_name(),
            deep_dives_used: self.used,
            deep_dives_limit: self.limit,
            upgrade_tiers: [PlanTier::Pro, PlanTier::Premium, PlanTier::Enterprise],
        }
    }

    fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            deep_dives_used: self.used,
            deep_dives_limit: self.limit,
            deep_dives_remaining: self.limit.map(|l| l.saturating_sub(self.used)),
            plan_name: self.tier.plan_name(),
            plan_tier: self.tier,
            alerts_enabled: self.alerts_enabled,
            paywall: self.paywall.map(|f| self.prompt(f)),
        }
    }

    fn reject(&mut self, feature: Feature) -> PaywallPrompt {
        self.paywall = Some(feature);
        self.prompt(feature)
    }
}

/// Session-scoped usage gate. Shared by every request handler.
pub struct UsageCounter {
    state: Mutex<UsageState>,
}

impl UsageCounter {
    /// Fresh free-tier session: nothing used, `limit` deep dives available.
    pub fn new(limit: u32) -> Self {
        Self {
            state: Mutex::new(UsageState {
                used: 0,
                limit: Some(limit),
                tier: PlanTier::Free,
                alerts_enabled: false,
                paywall: None,
            }),
        }
    }

    /// Claim one deep dive. On success the slot is already counted. Paid
    /// plans have no limit and are not counted at all.
    pub fn try_begin_deep_dive(&self) -> Result<UsageSnapshot, PaywallPrompt> {
        let mut state = self.state.lock();
        let limit = state.limit;
        match limit {
            Some(limit) if state.used >= limit => {
                info!(used = state.used, limit, "Deep dive refused, free limit reached");
                Err(state.reject(Feature::DeepDive))
            }
            Some(_) => {
                state.used += 1;
                Ok(state.snapshot())
            }
            None => Ok(state.snapshot()),
        }
    }

    /// Access check for the tier-gated features. Deep dives go through
    /// [`UsageCounter::try_begin_deep_dive`] instead, which also counts.
    pub fn check_feature(&self, feature: Feature) -> Result<(), PaywallPrompt> {
        let mut state = self.state.lock();
        let allowed = match feature {
            Feature::DeepDive => state.limit.map_or(true, |limit| state.used < limit),
            Feature::RealTimeAlerts | Feature::HistoricalAnalysis => state.tier != PlanTier::Free,
            Feature::ApiAccess => matches!(state.tier, PlanTier::Premium | PlanTier::Enterprise),
        };
        if allowed {
            Ok(())
        } else {
            Err(state.reject(feature))
        }
    }

    /// Lift the deep-dive cap, switch plans, turn on alerts, hide the paywall.
    pub fn upgrade(&self, tier: UpgradeTier) -> UsageSnapshot {
        let mut state = self.state.lock();
        state.tier = tier.into();
        state.limit = None;
        state.alerts_enabled = true;
        state.paywall = None;
        info!(plan = state.tier.plan_name(), "Plan upgraded");
        state.snapshot()
    }

    pub fn dismiss_paywall(&self) {
        self.state.lock().paywall = None;
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        self.state.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_fresh() {
        let usage = UsageCounter::new(3);
        let snap = usage.snapshot();
        assert_eq!(snap.deep_dives_used, 0);
        assert_eq!(snap.deep_dives_limit, Some(3));
        assert_eq!(snap.plan_name, "Citizen Watchdog");
        assert!(snap.paywall.is_none());
    }

    #[test]
    fn test_three_then_paywall_then_upgrade() {
        let usage = UsageCounter::new(3);
        for expected in 1..=3 {
            assert_eq!(usage.try_begin_deep_dive().unwrap().deep_dives_used, expected);
        }

        let prompt = usage.try_begin_deep_dive().unwrap_err();
        assert_eq!(prompt.feature, "Deep Dive Investigation");
        assert_eq!(usage.snapshot().deep_dives_used, 3);
        assert!(usage.snapshot().paywall.is_some());

        let snap = usage.upgrade(UpgradeTier::Pro);
        assert_eq!(snap.plan_name, "Democracy Investigator");
        assert_eq!(snap.deep_dives_limit, None);
        assert!(snap.alerts_enabled);
        assert!(snap.paywall.is_none());
        assert!(usage.try_begin_deep_dive().is_ok());
    }

    #[test]
    fn test_paid_plan_dives_are_not_counted() {
        let usage = UsageCounter::new(3);
        usage.try_begin_deep_dive().unwrap();
        usage.upgrade(UpgradeTier::Premium);
        for _ in 0..5 {
            let snap = usage.try_begin_deep_dive().unwrap();
            assert_eq!(snap.deep_dives_used, 1);
            assert_eq!(snap.deep_dives_remaining, None);
        }
    }

    #[test]
    fn test_tier_gated_features() {
        let usage = UsageCounter::new(3);
        assert!(usage.check_feature(Feature::RealTimeAlerts).is_err());
        assert!(usage.check_feature(Feature::HistoricalAnalysis).is_err());
        assert!(usage.check_feature(Feature::DeepDive).is_ok());

        usage.upgrade(UpgradeTier::Pro);
        assert!(usage.check_feature(Feature::RealTimeAlerts).is_ok());
        assert_eq!(
            usage.check_feature(Feature::ApiAccess).unwrap_err().feature,
            "API Access"
        );

        usage.upgrade(UpgradeTier::Enterprise);
        assert!(usage.check_feature(Feature::ApiAccess).is_ok());
        assert_eq!(usage.snapshot().plan_name, "Media & NGO");
    }

    #[test]
    fn test_parse_upgrade_tier() {
        assert_eq!("Premium".parse::<UpgradeTier>(), Ok(UpgradeTier::Premium));
        assert!("free".parse::<UpgradeTier>().is_err());
        assert_eq!("api-access".parse::<Feature>(), Ok(Feature::ApiAccess));
    }

    #[test]
    fn test_concurrent_claims_never_exceed_limit() {
        let usage = Arc::new(UsageCounter::new(3));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let usage = usage.clone();
                std::thread::spawn(move || usage.try_begin_deep_dive().is_ok())
            })
            .collect();
        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(granted, 3);
        assert_eq!(usage.snapshot().deep_dives_used, 3);
    }
}
