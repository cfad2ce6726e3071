// =============================================================================
// query.rs - THE QUESTION WRITER
// =============================================================================
//
// Turns "what does the user want to know" into two blocks of text the model
// can act on: a system instruction that spells out the exact JSON shape we
// expect back, and a user instruction that names the place (and, for deep
// dives, the topic and any earlier analysis to build on).
//
// Pure text in, pure text out. No network, no clocks, no randomness.
// The sampling parameters are fixed per report kind: structured reports run
// cooler than narrative deep dives.
// =============================================================================

use serde::Serialize;
use std::fmt;

use crate::models::GovernmentLevel;

/// The kinds of question the engine knows how to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Country,
    CountryProfile,
    State,
    City,
    DeepDive,
    LocationSearch,
    CityListing,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Country => write!(f, "country"),
            ReportKind::CountryProfile => write!(f, "country-profile"),
            ReportKind::State => write!(f, "state"),
            ReportKind::City => write!(f, "city"),
            ReportKind::DeepDive => write!(f, "deep-dive"),
            ReportKind::LocationSearch => write!(f, "location-search"),
            ReportKind::CityListing => write!(f, "city-listing"),
        }
    }
}

/// Everything a deep-dive investigation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepDiveRequest {
    pub location: String,
    pub topic: String,
    pub level: GovernmentLevel,
    /// Analysis text from the previous dive on the same screen, so a follow-up
    /// can build on it. Included verbatim when present.
    pub previous_context: Option<String>,
}

/// One question for the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRequest {
    Country { country: String },
    CountryProfile { country: String },
    State { country: String, state: String },
    City { country: String, state: String, city: String },
    DeepDive(DeepDiveRequest),
    LocationSearch { query: String },
    CityListing { country: String, state: String },
}

impl ReportRequest {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportRequest::Country { .. } => ReportKind::Country,
            ReportRequest::CountryProfile { .. } => ReportKind::CountryProfile,
            ReportRequest::State { .. } => ReportKind::State,
            ReportRequest::City { .. } => ReportKind::City,
            ReportRequest::DeepDive(_) => ReportKind::DeepDive,
            ReportRequest::LocationSearch { .. } => ReportKind::LocationSearch,
            ReportRequest::CityListing { .. } => ReportKind::CityListing,
        }
    }
}

/// Fixed sampling parameters sent alongside a prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the provider for a guaranteed JSON object response.
    pub json_mode: bool,
}

impl SamplingParams {
    /// Defaults per report kind.
    pub fn for_kind(kind: ReportKind) -> Self {
        let (model, temperature, max_tokens, json_mode) = match kind {
            ReportKind::Country => ("gpt-4", 0.3, 8192, false),
            ReportKind::CountryProfile => ("gpt-4o", 0.3, 1000, true),
            ReportKind::State => ("gpt-4o", 0.3, 1200, true),
            ReportKind::City => ("gpt-4o", 0.3, 3000, true),
            ReportKind::DeepDive => ("gpt-4", 0.4, 3000, false),
            ReportKind::LocationSearch => ("gpt-4", 0.3, 1000, false),
            ReportKind::CityListing => ("gpt-4o", 0.3, 2000, true),
        };
        SamplingParams {
            model: model.to_string(),
            temperature,
            max_tokens,
            json_mode,
        }
    }
}

/// A fully assembled, ready-to-send instruction pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: ReportKind,
    pub system: String,
    pub user: String,
    pub params: SamplingParams,
}

impl Prompt {
    /// Swap the model name, keeping everything else.
    pub fn with_model(mut self, model: Option<&str>) -> Self {
        if let Some(model) = model {
            self.params.model = model.to_string();
        }
        self
    }
}

/// Build the prompt for a request.
pub fn build_prompt(request: &ReportRequest) -> Prompt {
    let kind = request.kind();
    let (system, user) = match request {
        ReportRequest::Country { country } => {
            (COUNTRY_SYSTEM.to_string(), country_user(country))
        }
        ReportRequest::CountryProfile { country } => (
            COUNTRY_PROFILE_SYSTEM.to_string(),
            format!("Analyze country: {country}"),
        ),
        ReportRequest::State { country, state } => {
            (STATE_SYSTEM.to_string(), state_user(country, state))
        }
        ReportRequest::City { country, state, city } => {
            (CITY_SYSTEM.to_string(), city_user(country, state, city))
        }
        ReportRequest::DeepDive(dive) => (DEEP_DIVE_SYSTEM.to_string(), deep_dive_user(dive)),
        ReportRequest::LocationSearch { query } => (
            LOCATION_SEARCH_SYSTEM.to_string(),
            format!("Search for locations matching: \"{query}\""),
        ),
        ReportRequest::CityListing { country, state } => (
            CITY_LISTING_SYSTEM.to_string(),
            format!("List major cities for: {state}, {country}"),
        ),
    };

    Prompt {
        kind,
        system,
        user,
        params: SamplingParams::for_kind(kind),
    }
}

// =============================================================================
// User instructions
// =============================================================================

fn country_user(country: &str) -> String {
    format!(
        "Conduct a COMPREHENSIVE government analysis for: {country}

DEEP RESEARCH REQUIRED:
1. Current government structure, officials, and political dynamics
2. Specific recent legislation with detailed analysis
3. Active corruption concerns and patterns
4. Regional political variations and local issues
5. Current political controversies and scandals
6. Lobbying activities and corporate influence
7. Upcoming elections and political calendar
8. Citizen concerns and protest movements
9. Media freedom and transparency issues
10. International relations affecting domestic policy

Provide SPECIFIC, DETAILED, and REALISTIC analysis with actual political intelligence."
    )
}

fn state_user(country: &str, state: &str) -> String {
    format!(
        "Analyze state/region: {state} in {country}. Include:
1. Current state government structure and leadership
2. Recent state legislation and policies
3. State-specific corruption risks and patterns
4. Major cities and their political significance
5. Regional economic interests and lobbying
6. Interstate political relationships and influences"
    )
}

fn city_user(country: &str, state: &str, city: &str) -> String {
    format!(
        "Conduct comprehensive municipal analysis for {city}, {state}, {country}:

1. Municipal government structure (mayor, city council, departments)
2. Current local officials and their backgrounds
3. Active municipal policies and ordinances
4. Recent city council activities and voting patterns
5. Local development projects and zoning decisions
6. Municipal budget allocation and spending patterns
7. Local business influence and permit processes
8. Community issues and citizen concerns
9. Corruption risks specific to local government
10. Major industries and economic interests

Provide specific, realistic details about local governance and political dynamics."
    )
}

fn deep_dive_user(dive: &DeepDiveRequest) -> String {
    let mut out = format!(
        "Conduct a deep-dive investigation on: \"{}\" in {} ({} level).\n\n",
        dive.topic, dive.location, dive.level
    );

    // No context means no section at all, not an empty one.
    if let Some(context) = dive.previous_context.as_deref().filter(|c| !c.trim().is_empty()) {
        out.push_str("Previous context: ");
        out.push_str(context);
        out.push_str("\n\n");
    }

    out.push_str(DEEP_DIVE_FOCUS);
    out
}

const DEEP_DIVE_FOCUS: &str = "Focus on:
1. Current political dynamics and recent developments
2. Key players and their motivations
3. Financial interests and lobbying influences
4. Potential corruption or transparency issues
5. Citizen impact and democratic implications
6. Specific, actionable findings

Provide realistic sources that citizens could actually follow up on, including:
- News articles from credible outlets
- Official government documents and websites
- Analysis from think tanks or academic institutions
- Social media or public statements from officials
- Financial disclosure documents

Make the analysis specific, detailed, and actionable for concerned citizens.";

// =============================================================================
// System instructions: the target JSON shapes, in prose
// =============================================================================

const COUNTRY_SYSTEM: &str = r#"You are an expert government analyst and corruption investigator. Conduct a COMPREHENSIVE analysis of the specified government, including deep research into current legislation, political patterns, and corruption risks.

THINK STEP BY STEP and provide detailed, realistic analysis:

1. Research the current government structure thoroughly
2. Identify specific recent bills and legislation (with real-sounding names and details)
3. Analyze corruption patterns and political controversies
4. Generate realistic alerts based on actual political dynamics
5. Assess regional variations and local government issues
6. Provide specific, actionable intelligence

Return ONLY JSON with this exact structure:
{
  "country": "Country name",
  "displayName": "Display name",
  "governmentType": "Federal Democratic Republic",
  "legislativeBodies": ["Body 1", "Body 2"],
  "currentLeaders": {
    "head_of_state": "Specific name and title",
    "head_of_government": "Specific name and title",
    "legislature_leader": "Specific name and title"
  },
  "recentActivity": ["Specific recent bill 1", "Specific recent bill 2", "Specific recent bill 3"],
  "corruptionRisk": 65,
  "politicalContext": "Detailed current political situation with specific issues",
  "upcomingElections": "Specific election information with dates",
  "keyIssues": ["Specific Issue 1", "Specific Issue 2", "Specific Issue 3"],
  "activeBills": [
    {
      "id": "HR-2024-001",
      "title": "Specific Bill Title",
      "status": "suspicious|monitoring|clear",
      "stage": "Committee Review|Floor Vote|Signed",
      "riskScore": 85,
      "issues": ["Midnight introduction", "Corporate benefits"],
      "description": "Detailed description of what the bill does",
      "dateIntroduced": "2024-01-15",
      "sponsor": "Specific politician name",
      "summary": "Brief summary of bill contents",
      "redFlags": ["Specific red flag 1", "Specific red flag 2"],
      "publicSupport": 23,
      "lobbyingSpending": 2400000
    }
  ],
  "alerts": [
    {
      "id": 1,
      "type": "critical|warning|info",
      "title": "Specific Alert Title",
      "description": "Detailed description of the concern",
      "time": "2 hours ago",
      "confidence": 89,
      "source": "Legislative tracking|News analysis|Pattern detection",
      "actionRequired": true,
      "relatedBills": ["HR-2024-001"]
    }
  ],
  "corruptionPatterns": [
    {
      "type": "Midnight Legislation",
      "description": "Detailed pattern description",
      "severity": "high|medium|low",
      "instances": 5,
      "trend": "increasing|stable|decreasing",
      "examples": ["Specific example 1", "Specific example 2"]
    }
  ],
  "regionalData": [
    {
      "name": "Region Name",
      "risk": 67,
      "alerts": 3,
      "trend": "up|down|stable",
      "population": "2.1M",
      "keyIssues": ["Issue 1", "Issue 2"]
    }
  ]
}

Make everything SPECIFIC and REALISTIC. Use actual political dynamics, real-sounding bill names, and genuine corruption patterns. Corruption risk should be 0-100 (higher = more risk)."#;

const COUNTRY_PROFILE_SYSTEM: &str = r#"You are a geopolitical analyst specializing in country-level government analysis. Provide comprehensive country analysis with focus on corruption risks and political dynamics.

Return JSON with this exact structure:
{
  "name": "Country Name",
  "code": "ISO code",
  "flag": "🇺🇸",
  "coordinates": [latitude, longitude],
  "population": "330M",
  "governmentType": "Federal Democratic Republic",
  "corruptionRisk": 67,
  "keyIssues": ["Issue 1", "Issue 2", "Issue 3"],
  "recentActivity": ["Activity 1", "Activity 2", "Activity 3"]
}

Focus on current political climate, corruption patterns, and democratic health."#;

const STATE_SYSTEM: &str = r#"You are a regional political analyst specializing in state/provincial government analysis. Analyze state-level political dynamics, corruption risks, and governance issues.

Return JSON with this exact structure:
{
  "name": "State Name",
  "code": "State Code",
  "country": "Country Name",
  "coordinates": [latitude, longitude],
  "population": "39M",
  "governmentLevel": "state|province|region",
  "corruptionRisk": 45,
  "keyIssues": ["Housing", "Climate", "Economy"],
  "majorCities": ["City 1", "City 2", "City 3"],
  "governor": "Governor Name",
  "legislature": "State Legislature Name",
  "recentActivity": ["Recent bill 1", "Recent policy 2", "Recent controversy 3"]
}

Focus on state-specific political issues, local corruption patterns, and regional governance challenges."#;

const CITY_SYSTEM: &str = r#"You are a municipal government analyst specializing in city-level political analysis. Analyze local government structure, corruption risks, and civic issues.

Return JSON with this exact structure:
{
  "name": "City Name",
  "state": "State Name",
  "country": "Country Name",
  "coordinates": [latitude, longitude],
  "population": "2.1M",
  "governmentLevel": "municipal|metropolitan|county",
  "corruptionRisk": 52,
  "keyIssues": ["Housing", "Transportation", "Development"],
  "localOfficials": [
    {
      "name": "Mayor Name",
      "position": "Mayor",
      "party": "Party",
      "termStart": "2022-01-01",
      "termEnd": "2026-01-01",
      "contactInfo": "mayor@city.gov",
      "recentActions": ["Action 1", "Action 2"]
    }
  ],
  "activePolicies": [
    {
      "id": "POLICY-001",
      "title": "Policy Title",
      "description": "Policy description",
      "status": "proposed|under_review|passed|rejected",
      "dateIntroduced": "2024-01-15",
      "sponsor": "Council Member Name",
      "riskScore": 25,
      "publicSupport": 67,
      "estimatedCost": 5000000
    }
  ],
  "recentActivity": [
    {
      "id": "ACT-001",
      "type": "zoning|budget|contract|ordinance|permit|meeting",
      "title": "Activity Title",
      "description": "Activity description",
      "date": "2024-01-15",
      "amount": 1000000,
      "beneficiary": "Company Name",
      "riskScore": 45,
      "publicMeetingDate": "2024-01-20",
      "votingRecord": [
        {
          "member": "Council Member",
          "vote": "yes|no|abstain",
          "reason": "Voting reason"
        }
      ],
      "documents": ["Document 1", "Document 2"]
    }
  ],
  "budgetSize": "$2.5B",
  "majorIndustries": ["Tech", "Finance", "Tourism"]
}

Focus on municipal governance, local corruption patterns, development projects, and citizen concerns."#;

const DEEP_DIVE_SYSTEM: &str = r#"You are an investigative journalist and political analyst specializing in deep-dive government investigations. Conduct thorough research and analysis on specific political topics.

Your task is to:
1. Provide comprehensive analysis of the specified topic
2. Generate realistic, credible sources with actual-sounding URLs
3. Identify key findings and patterns
4. Assess corruption/democratic risks
5. Suggest actionable insights for citizens
6. Recommend follow-up investigation topics

Return JSON with this exact structure:
{
  "topic": "Topic being investigated",
  "location": "Location name",
  "analysis": "Detailed analysis (2-3 paragraphs)",
  "keyFindings": ["Finding 1", "Finding 2", "Finding 3"],
  "sources": [
    {
      "id": "source-1",
      "title": "Realistic article title",
      "url": "https://realistic-news-site.com/article-url",
      "type": "news|official|analysis|document|social",
      "credibility": 85,
      "date": "2024-01-15",
      "summary": "Brief summary of the source content",
      "relevance": 92
    }
  ],
  "followUpPrompts": ["Follow-up question 1", "Follow-up question 2"],
  "riskAssessment": {
    "level": "low|medium|high|critical",
    "score": 65,
    "factors": ["Risk factor 1", "Risk factor 2"]
  },
  "actionableInsights": ["Action 1", "Action 2"],
  "relatedTopics": ["Related topic 1", "Related topic 2"]
}

Make everything realistic and specific to the location and government level."#;

const LOCATION_SEARCH_SYSTEM: &str = r#"You are a location search assistant. Given a search query, return relevant locations (countries, states, cities) that have democratic governments worth monitoring.

Return results as a JSON array with this exact structure:
[
  {
    "name": "Location Name",
    "country": "Country Name",
    "region": "State/Province (if applicable)",
    "flag": "🇺🇸",
    "governmentLevel": "national|state|local",
    "confidence": 0.95
  }
]

Prioritize:
1. Countries with active democracies
2. Major states/provinces with significant legislative activity
3. Major cities with important local governments
4. Locations currently in political news

Always include the flag emoji. Confidence should be 0-1 based on relevance to query."#;

const CITY_LISTING_SYSTEM: &str = r#"List major cities for a state/province with basic municipal information.

Return a JSON object with a "cities" array using this simplified city structure:
{
  "cities": [
    {
      "name": "City Name",
      "state": "State Name",
      "country": "Country Name",
      "coordinates": [lat, lng],
      "population": "Population",
      "governmentLevel": "municipal|metropolitan|county",
      "corruptionRisk": 35,
      "keyIssues": ["Issue 1", "Issue 2"],
      "localOfficials": [],
      "activePolicies": [],
      "recentActivity": [],
      "budgetSize": "$500M",
      "majorIndustries": ["Industry 1", "Industry 2"]
    }
  ]
}

Include 5-20 major cities depending on state size."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn dive(previous_context: Option<&str>) -> ReportRequest {
        ReportRequest::DeepDive(DeepDiveRequest {
            location: "Springfield".to_string(),
            topic: "Follow the Money Trail".to_string(),
            level: GovernmentLevel::City,
            previous_context: previous_context.map(str::to_string),
        })
    }

    #[test]
    fn test_country_prompt_names_the_location() {
        let prompt = build_prompt(&ReportRequest::Country { country: "Brazil".to_string() });
        assert_eq!(prompt.kind, ReportKind::Country);
        assert!(prompt.user.contains("Brazil"));
        assert!(prompt.system.contains("\"corruptionRisk\""));
    }

    #[test]
    fn test_deep_dive_includes_previous_context_verbatim() {
        let context = "Earlier we found $2.3M in contributions.";
        let prompt = build_prompt(&dive(Some(context)));
        assert!(prompt.user.contains(&format!("Previous context: {context}")));
        assert!(prompt.user.contains("Follow the Money Trail"));
        assert!(prompt.user.contains("(city level)"));
    }

    #[test]
    fn test_deep_dive_without_context_has_no_context_section() {
        let prompt = build_prompt(&dive(None));
        assert!(!prompt.user.contains("Previous context"));
        // and no blank placeholder left behind
        assert!(!prompt.user.contains("\n\n\n"));
    }

    #[test]
    fn test_blank_context_is_treated_as_absent() {
        let prompt = build_prompt(&dive(Some("   ")));
        assert!(!prompt.user.contains("Previous context"));
    }

    #[test]
    fn test_structured_reports_run_cooler_than_deep_dives() {
        let dive_temp = SamplingParams::for_kind(ReportKind::DeepDive).temperature;
        for kind in [ReportKind::Country, ReportKind::CountryProfile, ReportKind::State, ReportKind::City] {
            assert!(SamplingParams::for_kind(kind).temperature < dive_temp);
        }
    }

    #[test]
    fn test_geographic_reports_use_json_mode() {
        assert!(SamplingParams::for_kind(ReportKind::State).json_mode);
        assert!(SamplingParams::for_kind(ReportKind::City).json_mode);
        assert!(!SamplingParams::for_kind(ReportKind::Country).json_mode);
    }

    #[test]
    fn test_country_profile_prompt() {
        let prompt = build_prompt(&ReportRequest::CountryProfile { country: "Kenya".to_string() });
        assert_eq!(prompt.kind, ReportKind::CountryProfile);
        assert_eq!(prompt.user, "Analyze country: Kenya");
        assert!(prompt.params.json_mode);
        assert_eq!(prompt.params.max_tokens, 1000);
    }

    #[test]
    fn test_model_override() {
        let prompt = build_prompt(&ReportRequest::State {
            country: "United States".to_string(),
            state: "Texas".to_string(),
        })
        .with_model(Some("gpt-4o-mini"));
        assert_eq!(prompt.params.model, "gpt-4o-mini");
        assert!(prompt.user.contains("Texas in United States"));
    }
}
