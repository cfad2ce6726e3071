// =============================================================================
// models.rs - THE SHAPES OF GOVERNMENT INTELLIGENCE
// =============================================================================
//
// Everything the language model is asked to produce, and everything the demo
// fixtures hand back, lands in one of these structs. They are plain values:
// built once by the decoder (or the demo generator), handed to the dashboard,
// never mutated, never persisted.
//
// Wire names are camelCase because that is what the prompts ask the model to
// emit. Field-by-field policy for sloppy model output:
//
//   - a MISSING field becomes its zero value (every struct is serde(default))
//   - a NULL field counts as missing (the decoder drops nulls first)
//   - integer scores and counts accept fractions and round them; a negative
//     number becomes 0
//   - a field with the WRONG TYPE, or an enum value outside the documented
//     set, fails the whole decode
//   - scores documented as 0..=100 are clamped after decoding (Normalize)
// =============================================================================

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Upper bound for every score, risk, confidence, and percentage field.
pub const MAX_SCORE: u32 = 100;

fn clamp_score(value: &mut u32) {
    if *value > MAX_SCORE {
        *value = MAX_SCORE;
    }
}

/// Integer field that tolerates `62.5` (rounds to 63) and `-4` (becomes 0).
/// Strings, booleans and non-finite numbers are still type errors.
fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    struct WholeNumber<T>(PhantomData<T>);

    impl<'de, T: TryFrom<u64>> Visitor<'de> for WholeNumber<T> {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
            T::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
            self.visit_u64(u64::try_from(v).unwrap_or(0))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<T, E> {
            if !v.is_finite() {
                return Err(E::invalid_value(Unexpected::Float(v), &self));
            }
            // saturating cast; negatives land on 0
            self.visit_u64(v.round() as u64)
        }
    }

    deserializer.deserialize_any(WholeNumber(PhantomData))
}

/// Post-decode fixups that keep every score in range no matter what
/// the model sent. Implemented by every top-level result shape.
pub trait Normalize {
    fn normalize(&mut self);
}

impl<T: Normalize> Normalize for Vec<T> {
    fn normalize(&mut self) {
        self.iter_mut().for_each(Normalize::normalize);
    }
}

// =============================================================================
// National report
// =============================================================================

/// Lifecycle status of a tracked bill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Red flags found. Somebody should be reading this one closely.
    Suspicious,
    /// Nothing damning yet, but worth watching.
    #[default]
    Monitoring,
    /// Looks clean.
    Clear,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillStatus::Suspicious => write!(f, "suspicious"),
            BillStatus::Monitoring => write!(f, "monitoring"),
            BillStatus::Clear => write!(f, "clear"),
        }
    }
}

/// A piece of legislation moving through a legislature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Bill {
    /// Identifier such as "HR-2024-7832".
    pub id: String,
    pub title: String,
    pub status: BillStatus,
    /// Free-text stage label ("Committee Markup", "Senate Floor", ...).
    pub stage: String,
    /// 0..=100, higher is worse.
    #[serde(deserialize_with = "whole_number")]
    pub risk_score: u32,
    /// Short issue tags.
    pub issues: Vec<String>,
    pub description: String,
    /// ISO date as a string. Not parsed here; the activity feed parses it.
    pub date_introduced: String,
    pub sponsor: String,
    pub summary: String,
    pub red_flags: Vec<String>,
    /// Percentage of public support, 0..=100.
    #[serde(deserialize_with = "whole_number")]
    pub public_support: u32,
    /// Lobbying spend in whole currency units.
    #[serde(deserialize_with = "whole_number")]
    pub lobbying_spending: u64,
}

impl Normalize for Bill {
    fn normalize(&mut self) {
        clamp_score(&mut self.risk_score);
        clamp_score(&mut self.public_support);
    }
}

/// Severity class of an alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    #[default]
    Info,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Critical => write!(f, "critical"),
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Info => write!(f, "info"),
        }
    }
}

/// Something the report thinks a citizen should know about right now.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Alert {
    #[serde(deserialize_with = "whole_number")]
    pub id: u32,
    #[serde(rename = "type")]
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
    /// Relative label like "2 hours ago". NOT a timestamp; see
    /// `relative_time::parse_offset` for how it gets ordered.
    pub time: String,
    /// Confidence percentage, 0..=100.
    #[serde(deserialize_with = "whole_number")]
    pub confidence: u32,
    /// Where the alert came from ("Legislative tracking", ...).
    pub source: String,
    pub action_required: bool,
    /// Bill identifiers this alert refers to.
    pub related_bills: Vec<String>,
}

impl Normalize for Alert {
    fn normalize(&mut self) {
        clamp_score(&mut self.confidence);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternSeverity {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternTrend {
    Increasing,
    #[default]
    Stable,
    Decreasing,
}

/// A recurring corruption pattern spotted across legislation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CorruptionPattern {
    /// Pattern label, e.g. "Midnight Legislation".
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub severity: PatternSeverity,
    #[serde(deserialize_with = "whole_number")]
    pub instances: u32,
    pub trend: PatternTrend,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegionalTrend {
    Up,
    Down,
    #[default]
    Stable,
}

/// Per-region slice of the national picture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionalBreakdown {
    pub name: String,
    #[serde(deserialize_with = "whole_number")]
    pub risk: u32,
    #[serde(deserialize_with = "whole_number")]
    pub alerts: u32,
    pub trend: RegionalTrend,
    /// Human label such as "39M".
    pub population: String,
    pub key_issues: Vec<String>,
}

impl Normalize for RegionalBreakdown {
    fn normalize(&mut self) {
        clamp_score(&mut self.risk);
    }
}

/// The three named roles every national report carries. Wire names are
/// snake_case because that is how the prompt spells them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CurrentLeaders {
    pub head_of_state: String,
    pub head_of_government: String,
    pub legislature_leader: String,
}

/// Top-level result for a country query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct GovernmentReport {
    pub country: String,
    pub display_name: String,
    pub government_type: String,
    /// Ordered, e.g. ["House of Representatives", "Senate"].
    pub legislative_bodies: Vec<String>,
    pub current_leaders: CurrentLeaders,
    pub recent_activity: Vec<String>,
    /// Always 0..=100 once normalized.
    #[serde(deserialize_with = "whole_number")]
    pub corruption_risk: u32,
    pub political_context: String,
    pub upcoming_elections: String,
    pub key_issues: Vec<String>,
    pub active_bills: Vec<Bill>,
    pub alerts: Vec<Alert>,
    pub corruption_patterns: Vec<CorruptionPattern>,
    pub regional_data: Vec<RegionalBreakdown>,
}

impl Normalize for GovernmentReport {
    fn normalize(&mut self) {
        clamp_score(&mut self.corruption_risk);
        self.active_bills.normalize();
        self.alerts.normalize();
        self.regional_data.normalize();
    }
}

// =============================================================================
// Deep dives
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    News,
    Official,
    Analysis,
    Document,
    Social,
}

/// A citation attached to a deep-dive. Whether the URL actually resolves is
/// entirely between the model and its conscience.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Source {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(deserialize_with = "whole_number")]
    pub credibility: u32,
    pub date: String,
    pub summary: String,
    #[serde(deserialize_with = "whole_number")]
    pub relevance: u32,
}

impl Normalize for Source {
    fn normalize(&mut self) {
        clamp_score(&mut self.credibility);
        clamp_score(&mut self.relevance);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    #[serde(deserialize_with = "whole_number")]
    pub score: u32,
    pub factors: Vec<String>,
}

/// Result of a free-form investigation into one topic in one place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DeepDiveResult {
    pub topic: String,
    pub location: String,
    /// Two or three paragraphs of narrative.
    pub analysis: String,
    pub key_findings: Vec<String>,
    pub sources: Vec<Source>,
    pub follow_up_prompts: Vec<String>,
    pub risk_assessment: RiskAssessment,
    pub actionable_insights: Vec<String>,
    pub related_topics: Vec<String>,
}

impl Normalize for DeepDiveResult {
    fn normalize(&mut self) {
        clamp_score(&mut self.risk_assessment.score);
        self.sources.normalize();
    }
}

// =============================================================================
// Geography
// =============================================================================

/// Which tier of government a deep-dive targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum GovernmentLevel {
    #[default]
    Country,
    State,
    City,
}

impl fmt::Display for GovernmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GovernmentLevel::Country => write!(f, "country"),
            GovernmentLevel::State => write!(f, "state"),
            GovernmentLevel::City => write!(f, "city"),
        }
    }
}

impl std::str::FromStr for GovernmentLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "country" | "national" => Ok(GovernmentLevel::Country),
            "state" | "province" | "region" => Ok(GovernmentLevel::State),
            "city" | "local" | "municipal" => Ok(GovernmentLevel::City),
            other => Err(format!("unknown government level '{other}'")),
        }
    }
}

/// Country-tier profile card. Not the full national report; see GovernmentReport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CountryData {
    pub name: String,
    /// ISO code, "XX" when unknown.
    pub code: String,
    pub flag: String,
    /// (latitude, longitude)
    pub coordinates: (f64, f64),
    pub population: String,
    pub government_type: String,
    #[serde(deserialize_with = "whole_number")]
    pub corruption_risk: u32,
    pub key_issues: Vec<String>,
    pub recent_activity: Vec<String>,
}

impl Normalize for CountryData {
    fn normalize(&mut self) {
        clamp_score(&mut self.corruption_risk);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateGovernmentLevel {
    #[default]
    State,
    Province,
    Region,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct StateData {
    pub name: String,
    pub code: String,
    pub country: String,
    pub coordinates: (f64, f64),
    pub population: String,
    pub government_level: StateGovernmentLevel,
    #[serde(deserialize_with = "whole_number")]
    pub corruption_risk: u32,
    pub key_issues: Vec<String>,
    pub major_cities: Vec<String>,
    pub governor: Option<String>,
    pub legislature: Option<String>,
    pub recent_activity: Vec<String>,
}

impl Normalize for StateData {
    fn normalize(&mut self) {
        clamp_score(&mut self.corruption_risk);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CityGovernmentLevel {
    #[default]
    Municipal,
    Metropolitan,
    County,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalOfficial {
    pub name: String,
    pub position: String,
    pub party: Option<String>,
    pub term_start: String,
    pub term_end: String,
    pub contact_info: Option<String>,
    pub recent_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    #[default]
    Proposed,
    UnderReview,
    Passed,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalPolicy {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: PolicyStatus,
    pub date_introduced: String,
    pub sponsor: String,
    #[serde(deserialize_with = "whole_number")]
    pub risk_score: u32,
    #[serde(deserialize_with = "whole_number")]
    pub public_support: u32,
    pub estimated_cost: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocalActivityKind {
    Zoning,
    Budget,
    Contract,
    Ordinance,
    Permit,
    #[default]
    Meeting,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Yes,
    No,
    #[default]
    Abstain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct CouncilVote {
    pub member: String,
    pub vote: Vote,
    pub reason: Option<String>,
}

/// A single council/municipal action: a rezoning, a contract, a meeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalActivity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LocalActivityKind,
    pub title: String,
    pub description: String,
    pub date: String,
    pub amount: Option<u64>,
    pub beneficiary: Option<String>,
    #[serde(deserialize_with = "whole_number")]
    pub risk_score: u32,
    pub public_meeting_date: Option<String>,
    pub voting_record: Vec<CouncilVote>,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CityData {
    pub name: String,
    pub state: String,
    pub country: String,
    pub coordinates: (f64, f64),
    pub population: String,
    pub government_level: CityGovernmentLevel,
    #[serde(deserialize_with = "whole_number")]
    pub corruption_risk: u32,
    pub key_issues: Vec<String>,
    pub local_officials: Vec<LocalOfficial>,
    pub active_policies: Vec<LocalPolicy>,
    pub recent_activity: Vec<LocalActivity>,
    pub budget_size: Option<String>,
    pub major_industries: Vec<String>,
}

impl Normalize for CityData {
    fn normalize(&mut self) {
        clamp_score(&mut self.corruption_risk);
        for policy in &mut self.active_policies {
            clamp_score(&mut policy.risk_score);
            clamp_score(&mut policy.public_support);
        }
        for activity in &mut self.recent_activity {
            clamp_score(&mut activity.risk_score);
        }
    }
}

// =============================================================================
// Location search
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchLevel {
    #[default]
    National,
    State,
    Local,
}

/// One suggestion from the location search box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationSearchResult {
    pub name: String,
    pub country: String,
    pub region: Option<String>,
    pub flag: String,
    pub government_level: SearchLevel,
    /// Relevance in 0.0..=1.0 (a fraction, unlike every other score here).
    pub confidence: f64,
}

impl Normalize for LocationSearchResult {
    fn normalize(&mut self) {
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }
}

// =============================================================================
// Risk bands
// =============================================================================

/// The label every dashboard puts next to a risk number.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Above 70 is High, above 40 is Medium, anything else is Low.
    pub fn from_score(score: u32) -> Self {
        if score > 70 {
            RiskBand::High
        } else if score > 40 {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskBand::Low => write!(f, "Low"),
            RiskBand::Medium => write!(f, "Medium"),
            RiskBand::High => write!(f, "High"),
        }
    }
}
