// =============================================================================
// decoder.rs - TURNING MODEL PROSE BACK INTO TYPES
// =============================================================================
//
// The model was asked for JSON. It usually complies. When it doesn't, we do
// not guess: malformed or truncated text is a DecodeError and the caller gets
// nothing, never half an object.
//
// Missing fields are fine (zero values, see models.rs), and an explicit
// `null` is read as missing. Wrong types and made-up enum values are not.
// =============================================================================

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    CityData, CountryData, DeepDiveResult, GovernmentReport, LocationSearchResult, Normalize,
    StateData,
};

/// The search box never shows more than this many suggestions.
pub const MAX_SEARCH_RESULTS: usize = 8;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("model output is not valid JSON for {target}: {source}")]
    Json {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse `raw` as `T` and normalize it.
pub fn decode<T: DeserializeOwned + Normalize>(raw: &str) -> Result<T, DecodeError> {
    let json_error = |source: serde_json::Error| DecodeError::Json {
        target: std::any::type_name::<T>(),
        source,
    };

    let mut tree: Value = serde_json::from_str(raw).map_err(json_error)?;
    drop_nulls(&mut tree);
    let mut value: T = serde_json::from_value(tree).map_err(json_error)?;
    value.normalize();
    Ok(value)
}

/// Remove every `"key": null` member, at any depth, so it decodes as absent.
/// Nulls inside arrays stay put.
fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(members) => {
            members.retain(|_, v| !v.is_null());
            members.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_nulls),
        _ => {}
    }
}

pub fn decode_government_report(raw: &str) -> Result<GovernmentReport, DecodeError> {
    decode(raw)
}

pub fn decode_country(raw: &str) -> Result<CountryData, DecodeError> {
    decode(raw)
}

pub fn decode_state(raw: &str) -> Result<StateData, DecodeError> {
    decode(raw)
}

pub fn decode_city(raw: &str) -> Result<CityData, DecodeError> {
    decode(raw)
}

pub fn decode_deep_dive(raw: &str) -> Result<DeepDiveResult, DecodeError> {
    decode(raw)
}

/// JSON mode only hands back objects, so a city listing may arrive either as
/// a bare array or wrapped as `{"cities": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CityListing {
    Bare(Vec<CityData>),
    Wrapped { cities: Vec<CityData> },
}

impl Normalize for CityListing {
    fn normalize(&mut self) {
        match self {
            CityListing::Bare(cities) | CityListing::Wrapped { cities } => cities.normalize(),
        }
    }
}

pub fn decode_city_listing(raw: &str) -> Result<Vec<CityData>, DecodeError> {
    match decode::<CityListing>(raw)? {
        CityListing::Bare(cities) | CityListing::Wrapped { cities } => Ok(cities),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResults {
    Bare(Vec<LocationSearchResult>),
    Wrapped { results: Vec<LocationSearchResult> },
}

impl Normalize for SearchResults {
    fn normalize(&mut self) {
        match self {
            SearchResults::Bare(results) | SearchResults::Wrapped { results } => {
                results.normalize()
            }
        }
    }
}

/// Search results, at most [`MAX_SEARCH_RESULTS`] of them.
pub fn decode_location_search(raw: &str) -> Result<Vec<LocationSearchResult>, DecodeError> {
    let mut results = match decode::<SearchResults>(raw)? {
        SearchResults::Bare(results) | SearchResults::Wrapped { results } => results,
    };
    results.truncate(MAX_SEARCH_RESULTS);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn test_report_round_trip() {
        let report = demo::government_report("United States");
        let raw = serde_json::to_string(&report).unwrap();
        assert_eq!(decode_government_report(&raw).unwrap(), report);
    }

    #[test]
    fn test_deep_dive_round_trip() {
        let dive = demo::deep_dive("Austin", "Follow the Money Trail");
        let raw = serde_json::to_string(&dive).unwrap();
        assert_eq!(decode_deep_dive(&raw).unwrap(), dive);
    }

    #[test]
    fn test_truncated_json_is_rejected() {
        let raw = serde_json::to_string(&demo::government_report("Brazil")).unwrap();
        let truncated = &raw[..raw.len() / 2];
        assert!(matches!(
            decode_government_report(truncated),
            Err(DecodeError::Json { .. })
        ));
    }

    #[test]
    fn test_prose_is_rejected() {
        assert!(decode_state("Sure! Here is the analysis you asked for.").is_err());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(decode_government_report(r#"{"corruptionRisk": "very high"}"#).is_err());
    }

    #[test]
    fn test_out_of_range_risk_is_clamped() {
        let report = decode_government_report(r#"{"country": "X", "corruptionRisk": 340}"#).unwrap();
        assert_eq!(report.corruption_risk, 100);
        assert!(report.active_bills.is_empty());
    }

    #[test]
    fn test_null_fields_read_as_missing() {
        let report = decode_government_report(
            r#"{"country": "Brazil", "corruptionRisk": 60, "upcomingElections": null,
                "currentLeaders": null,
                "activeBills": [{"id": "B-1", "lobbyingSpending": null, "status": null}]}"#,
        )
        .unwrap();
        assert_eq!(report.country, "Brazil");
        assert_eq!(report.corruption_risk, 60);
        assert_eq!(report.upcoming_elections, "");
        assert_eq!(report.active_bills[0].lobbying_spending, 0);
        assert_eq!(report.active_bills[0].status, crate::models::BillStatus::Monitoring);

        let state = decode_state(r#"{"name": "Texas", "governor": null}"#).unwrap();
        assert_eq!(state.governor, None);
    }

    #[test]
    fn test_fractional_risk_is_rounded() {
        let report = decode_government_report(r#"{"country": "Brazil", "corruptionRisk": 62.5}"#).unwrap();
        assert_eq!(report.corruption_risk, 63);

        let city = decode_city(r#"{"name": "Austin", "corruptionRisk": 140.9}"#).unwrap();
        assert_eq!(city.corruption_risk, 100);
    }

    #[test]
    fn test_country_profile_decodes() {
        let country = decode_country(
            r#"{"name": "Kenya", "code": "KE", "coordinates": [-1.29, 36.82], "corruptionRisk": 58.4, "flag": null}"#,
        )
        .unwrap();
        assert_eq!(country.code, "KE");
        assert_eq!(country.coordinates, (-1.29, 36.82));
        assert_eq!(country.corruption_risk, 58);
        assert_eq!(country.flag, "");
    }

    #[test]
    fn test_null_top_level_is_rejected() {
        assert!(matches!(decode_government_report("null"), Err(DecodeError::Json { .. })));
    }

    #[test]
    fn test_city_listing_accepts_both_shapes() {
        let bare = r#"[{"name": "Austin", "corruptionRisk": 30}]"#;
        let wrapped = r#"{"cities": [{"name": "Austin", "corruptionRisk": 130}, {"name": "Dallas"}]}"#;
        assert_eq!(decode_city_listing(bare).unwrap()[0].name, "Austin");

        let cities = decode_city_listing(wrapped).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].corruption_risk, 100);
    }

    #[test]
    fn test_location_search_truncates() {
        let many: Vec<_> = (0..12)
            .map(|i| serde_json::json!({"name": format!("Place {i}"), "confidence": 1.7}))
            .collect();
        let raw = serde_json::Value::Array(many).to_string();
        let results = decode_location_search(&raw).unwrap();
        assert_eq!(results.len(), MAX_SEARCH_RESULTS);
        assert_eq!(results[0].confidence, 1.0);
    }
}
