// =============================================================================
// suggestions.rs - "WHAT SHOULD I ASK?"
// =============================================================================
//
// Not everybody arrives knowing which thread to pull. Every dashboard offers
// a short menu of investigations: four that make sense anywhere, plus two
// that only make sense at that tier of government.
// =============================================================================

use serde::Serialize;

use crate::models::GovernmentLevel;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Investigation,
    Analysis,
    Tracking,
    Comparison,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

/// One suggested deep-dive. `title` doubles as the topic sent to the model.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveSuggestion {
    pub id: &'static str,
    pub title: &'static str,
    pub description: String,
    pub category: Category,
    pub complexity: Complexity,
    pub estimated_time: &'static str,
}

fn suggestion(
    id: &'static str,
    title: &'static str,
    description: String,
    category: Category,
    complexity: Complexity,
    estimated_time: &'static str,
) -> DeepDiveSuggestion {
    DeepDiveSuggestion { id, title, description, category, complexity, estimated_time }
}

fn plural(level: GovernmentLevel) -> &'static str {
    match level {
        GovernmentLevel::Country => "countries",
        GovernmentLevel::State => "states",
        GovernmentLevel::City => "cities",
    }
}

pub fn suggestions_for(location: &str, level: GovernmentLevel) -> Vec<DeepDiveSuggestion> {
    use Category::*;
    use Complexity::*;

    let mut out = vec![
        suggestion(
            "follow-money",
            "Follow the Money Trail",
            format!("Trace financial flows and lobbying spending in {location}. Who's funding what?"),
            Investigation,
            Advanced,
            "5-10 min",
        ),
        suggestion(
            "voting-patterns",
            "Analyze Voting Patterns",
            format!("Deep dive into how officials in {location} vote and what influences their decisions."),
            Analysis,
            Intermediate,
            "3-5 min",
        ),
        suggestion(
            "compare-regions",
            "Compare with Similar Regions",
            format!(
                "How does {location} compare to similar {} in corruption and governance?",
                plural(level)
            ),
            Comparison,
            Basic,
            "2-3 min",
        ),
        suggestion(
            "track-legislation",
            "Track Active Legislation",
            format!("Monitor all current bills and policies moving through {location}'s government."),
            Tracking,
            Intermediate,
            "4-6 min",
        ),
    ];

    match level {
        GovernmentLevel::City => out.extend([
            suggestion(
                "development-projects",
                "Development & Zoning Deep Dive",
                format!("Investigate development projects, zoning changes, and real estate interests in {location}."),
                Investigation,
                Advanced,
                "6-8 min",
            ),
            suggestion(
                "local-contracts",
                "Municipal Contracts Analysis",
                "Examine city contracts, vendor relationships, and procurement processes.".to_string(),
                Investigation,
                Intermediate,
                "4-6 min",
            ),
        ]),
        GovernmentLevel::State => out.extend([
            suggestion(
                "state-federal-alignment",
                "State vs Federal Policy Alignment",
                format!("Analyze how {location} state policies align or conflict with federal initiatives."),
                Analysis,
                Intermediate,
                "4-5 min",
            ),
            suggestion(
                "interstate-influence",
                "Interstate Political Influence",
                "Investigate cross-state political coordination and influence networks.".to_string(),
                Investigation,
                Advanced,
                "7-10 min",
            ),
        ]),
        GovernmentLevel::Country => out.extend([
            suggestion(
                "international-influence",
                "Foreign Influence Investigation",
                "Examine foreign lobbying, international agreements, and external political influence.".to_string(),
                Investigation,
                Advanced,
                "8-12 min",
            ),
            suggestion(
                "democratic-health",
                "Democratic Health Assessment",
                "Comprehensive analysis of democratic institutions and their effectiveness.".to_string(),
                Analysis,
                Advanced,
                "10-15 min",
            ),
        ]),
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(level: GovernmentLevel) -> Vec<&'static str> {
        suggestions_for("Austin", level).iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_base_prompts_come_first() {
        for level in [GovernmentLevel::Country, GovernmentLevel::State, GovernmentLevel::City] {
            let ids = ids(level);
            assert_eq!(ids.len(), 6);
            assert_eq!(
                &ids[..4],
                &["follow-money", "voting-patterns", "compare-regions", "track-legislation"]
            );
        }
    }

    #[test]
    fn test_level_specific_prompts() {
        assert_eq!(&ids(GovernmentLevel::City)[4..], &["development-projects", "local-contracts"]);
        assert_eq!(
            &ids(GovernmentLevel::State)[4..],
            &["state-federal-alignment", "interstate-influence"]
        );
        assert_eq!(
            &ids(GovernmentLevel::Country)[4..],
            &["international-influence", "democratic-health"]
        );
    }

    #[test]
    fn test_location_is_embedded() {
        let compare = &suggestions_for("Austin", GovernmentLevel::City)[2];
        assert_eq!(
            compare.description,
            "How does Austin compare to similar cities in corruption and governance?"
        );
    }
}
