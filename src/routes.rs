// =============================================================================
// routes.rs - URLS IN, INTENTIONS OUT
// =============================================================================
//
// The dashboard's address space:
//
//   GET  /                                       landing page data
//   GET  /search?q=<text>                        location search
//   GET  /dashboard/<country>[?view=all]         national report
//   GET  /profile/<country>                      country card
//   GET  /dashboard/<country>/<state>            state report + its cities
//   GET  /dashboard/<country>/<state>/<city>     municipal report
//   GET  /deep-dive?location=&topic=&level=&context=
//   GET  /usage                                  paywall counter
//   POST /upgrade/<tier>                         lift the paywall
//   GET  /access/<feature>                       may this plan use it?
//   POST /paywall/dismiss                        close the upsell
//
// Place names travel as lower-kebab-case slugs ("united-states") and come
// back out title-cased ("United States") before anyone prompts a model with
// them.
// =============================================================================

use thiserror::Error;
use url::Url;

use crate::models::GovernmentLevel;
use crate::query::DeepDiveRequest;
use crate::usage::{Feature, UnknownFeature, UnknownTier, UpgradeTier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Search { query: String },
    Country { country: String, view_all: bool },
    CountryProfile { country: String },
    State { country: String, state: String },
    City { country: String, state: String, city: String },
    DeepDive(DeepDiveRequest),
    Usage,
    Upgrade(UpgradeTier),
    Access(Feature),
    DismissPaywall,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route for {method} {path}")]
    NotFound { method: String, path: String },
    #[error("malformed request target '{0}'")]
    Malformed(String),
    #[error("missing query parameter '{0}'")]
    MissingParam(&'static str),
    #[error("invalid value for '{name}': {reason}")]
    InvalidParam { name: &'static str, reason: String },
    #[error(transparent)]
    UnknownTier(#[from] UnknownTier),
    #[error(transparent)]
    UnknownFeature(#[from] UnknownFeature),
}

/// Lower-case, whitespace runs become single dashes.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Undo a slug: percent-decode, dashes to spaces, capitalise each word.
pub fn display_name(segment: &str) -> String {
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    decoded
        .split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a method and request target (`/path?query`) into a route.
pub fn parse(method: &str, target: &str) -> Result<Route, RouteError> {
    let url = Url::parse("http://watchdog.local")
        .and_then(|base| base.join(target))
        .map_err(|_| RouteError::Malformed(target.to_string()))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let not_found = || RouteError::NotFound {
        method: method.to_string(),
        path: url.path().to_string(),
    };

    let query = |name: &str| -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    match (method, segments.as_slice()) {
        ("GET", []) => Ok(Route::Landing),
        ("GET", ["search"]) => Ok(Route::Search {
            query: query("q").ok_or(RouteError::MissingParam("q"))?,
        }),
        ("GET", ["dashboard", country]) => Ok(Route::Country {
            country: display_name(country),
            view_all: query("view").is_some_and(|v| v == "all"),
        }),
        ("GET", ["profile", country]) => Ok(Route::CountryProfile {
            country: display_name(country),
        }),
        ("GET", ["dashboard", country, state]) => Ok(Route::State {
            country: display_name(country),
            state: display_name(state),
        }),
        ("GET", ["dashboard", country, state, city]) => Ok(Route::City {
            country: display_name(country),
            state: display_name(state),
            city: display_name(city),
        }),
        ("GET", ["deep-dive"]) => {
            let location = required(query("location"), "location")?;
            let topic = required(query("topic"), "topic")?;
            let level = match query("level") {
                Some(raw) => raw.parse::<GovernmentLevel>().map_err(|reason| {
                    RouteError::InvalidParam { name: "level", reason }
                })?,
                None => GovernmentLevel::default(),
            };
            Ok(Route::DeepDive(DeepDiveRequest {
                location,
                topic,
                level,
                previous_context: query("context").filter(|c| !c.trim().is_empty()),
            }))
        }
        ("GET", ["usage"]) => Ok(Route::Usage),
        ("POST", ["upgrade", tier]) => Ok(Route::Upgrade(tier.parse()?)),
        ("GET", ["access", feature]) => Ok(Route::Access(feature.parse()?)),
        ("POST", ["paywall", "dismiss"]) => Ok(Route::DismissPaywall),
        _ => Err(not_found()),
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, RouteError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(RouteError::MissingParam(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        assert_eq!(slugify("United States"), "united-states");
        assert_eq!(slugify("  New   York  City "), "new-york-city");
        assert_eq!(display_name("united-states"), "United States");
        assert_eq!(display_name(&slugify("São Paulo")), "São Paulo");
    }

    #[test]
    fn test_display_name_percent_decodes() {
        assert_eq!(display_name("s%C3%A3o-paulo"), "São Paulo");
        assert_eq!(display_name("new%20york"), "New York");
    }

    #[test]
    fn test_dashboard_routes() {
        assert_eq!(
            parse("GET", "/dashboard/united-states").unwrap(),
            Route::Country { country: "United States".to_string(), view_all: false }
        );
        assert_eq!(
            parse("GET", "/dashboard/brazil?view=all").unwrap(),
            Route::Country { country: "Brazil".to_string(), view_all: true }
        );
        assert_eq!(
            parse("GET", "/dashboard/united-states/texas/").unwrap(),
            Route::State { country: "United States".to_string(), state: "Texas".to_string() }
        );
        assert_eq!(
            parse("GET", "/dashboard/united-states/california/los-angeles").unwrap(),
            Route::City {
                country: "United States".to_string(),
                state: "California".to_string(),
                city: "Los Angeles".to_string(),
            }
        );
    }

    #[test]
    fn test_deep_dive_route() {
        let route = parse(
            "GET",
            "/deep-dive?location=Austin&topic=Follow+the+Money+Trail&level=city&context=Earlier%20findings",
        )
        .unwrap();
        assert_eq!(
            route,
            Route::DeepDive(DeepDiveRequest {
                location: "Austin".to_string(),
                topic: "Follow the Money Trail".to_string(),
                level: GovernmentLevel::City,
                previous_context: Some("Earlier findings".to_string()),
            })
        );
    }

    #[test]
    fn test_deep_dive_requires_location_and_topic() {
        assert_eq!(
            parse("GET", "/deep-dive?topic=x"),
            Err(RouteError::MissingParam("location"))
        );
        assert_eq!(
            parse("GET", "/deep-dive?location=Austin&topic=%20"),
            Err(RouteError::MissingParam("topic"))
        );
        assert!(matches!(
            parse("GET", "/deep-dive?location=a&topic=b&level=galactic"),
            Err(RouteError::InvalidParam { name: "level", .. })
        ));
    }

    #[test]
    fn test_upgrade_and_misc() {
        assert_eq!(parse("POST", "/upgrade/premium").unwrap(), Route::Upgrade(UpgradeTier::Premium));
        assert!(matches!(parse("POST", "/upgrade/free"), Err(RouteError::UnknownTier(_))));
        assert_eq!(parse("GET", "/").unwrap(), Route::Landing);
        assert_eq!(parse("GET", "/usage").unwrap(), Route::Usage);
        assert_eq!(
            parse("GET", "/profile/south-africa").unwrap(),
            Route::CountryProfile { country: "South Africa".to_string() }
        );
        assert_eq!(
            parse("GET", "/access/real-time-alerts").unwrap(),
            Route::Access(Feature::RealTimeAlerts)
        );
        assert!(matches!(parse("GET", "/access/telepathy"), Err(RouteError::UnknownFeature(_))));
        assert_eq!(parse("POST", "/paywall/dismiss").unwrap(), Route::DismissPaywall);
        assert!(matches!(parse("GET", "/upgrade/pro"), Err(RouteError::NotFound { .. })));
        assert!(matches!(parse("GET", "/nowhere"), Err(RouteError::NotFound { .. })));
        assert_eq!(parse("GET", "/search"), Err(RouteError::MissingParam("q")));
    }
}
