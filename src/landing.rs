// =============================================================================
// landing.rs - THE FRONT PAGE
// =============================================================================
//
// Static content for the landing screen: the quick-pick locations under the
// search box and the "global hotspots" cards. Same in live and demo mode.
// =============================================================================

use serde::Serialize;

use crate::models::{GovernmentLevel, RegionalTrend, RiskBand};
use crate::routes::slugify;

/// A one-click shortcut under the search box.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PopularLocation {
    pub flag: &'static str,
    pub name: &'static str,
    /// Country the place belongs to (itself, for countries).
    pub country: &'static str,
    /// State or province for cities, when it makes sense.
    pub region: Option<&'static str>,
    pub level: GovernmentLevel,
}

/// A country card on the landing page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub flag: &'static str,
    pub country: &'static str,
    pub risk: u32,
    pub band: RiskBand,
    pub trend: RegionalTrend,
    /// Where clicking the card goes.
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingView {
    pub mode: &'static str,
    pub popular_locations: Vec<PopularLocation>,
    pub global_hotspots: Vec<Hotspot>,
}

pub fn popular_locations() -> Vec<PopularLocation> {
    use GovernmentLevel::*;

    const fn loc(
        flag: &'static str,
        name: &'static str,
        country: &'static str,
        region: Option<&'static str>,
        level: GovernmentLevel,
    ) -> PopularLocation {
        PopularLocation { flag, name, country, region, level }
    }

    vec![
        loc("🇺🇸", "United States", "United States", None, Country),
        loc("🇧🇷", "Brazil", "Brazil", None, Country),
        loc("🇷🇸", "Serbia", "Serbia", None, Country),
        loc("🇳🇬", "Nigeria", "Nigeria", None, Country),
        loc("🇮🇳", "India", "India", None, Country),
        loc("🇵🇭", "Philippines", "Philippines", None, Country),
        loc("🏛️", "California", "United States", None, State),
        loc("🏛️", "Texas", "United States", None, State),
        loc("🏙️", "New York City", "United States", Some("New York"), City),
        loc("🏙️", "Los Angeles", "United States", Some("California"), City),
        loc("🏙️", "London", "United Kingdom", Some("England"), City),
        loc("🏙️", "São Paulo", "Brazil", Some("São Paulo"), City),
    ]
}

pub fn global_hotspots() -> Vec<Hotspot> {
    [
        ("🇺🇸", "United States", 67, RegionalTrend::Up),
        ("🇧🇷", "Brazil", 74, RegionalTrend::Up),
        ("🇭🇺", "Hungary", 82, RegionalTrend::Up),
        ("🇵🇭", "Philippines", 71, RegionalTrend::Stable),
        ("🇵🇱", "Poland", 58, RegionalTrend::Down),
        ("🇮🇳", "India", 63, RegionalTrend::Up),
    ]
    .into_iter()
    .map(|(flag, country, risk, trend)| Hotspot {
        flag,
        country,
        risk,
        band: RiskBand::from_score(risk),
        trend,
        href: format!("/dashboard/{}", slugify(country)),
    })
    .collect()
}

pub fn landing_view(mode: &'static str) -> LandingView {
    LandingView {
        mode,
        popular_locations: popular_locations(),
        global_hotspots: global_hotspots(),
    }
}
