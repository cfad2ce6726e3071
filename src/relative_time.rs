// =============================================================================
// relative_time.rs - "4 hours ago" TO SOMETHING YOU CAN SORT
// =============================================================================
//
// Alerts carry human labels, not timestamps. To put them in a feed next to
// bills we need an offset from "now". The recognised form is
//
//     <digits> <unit>[s] ago        unit = minute | hour | day
//
// anywhere in the label, case-insensitive, spaces optional. Anything else
// ("just now", "yesterday", "last week") is an offset of zero, which sorts it
// as the freshest thing in the feed.
// =============================================================================

use aho_corasick::{AhoCorasick, MatchKind};
use std::sync::LazyLock;
use std::time::Duration;

/// Unit name and its length in seconds. Order matches the automaton patterns.
const UNITS: [(&str, u64); 3] = [("minute", 60), ("hour", 3_600), ("day", 86_400)];

static UNIT_AUTOMATON: LazyLock<Option<AhoCorasick>> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostFirst)
        .build(UNITS.iter().map(|(name, _)| name))
        .ok()
});

/// Offset a relative label describes. Unrecognised labels are zero.
pub fn parse_offset(label: &str) -> Duration {
    let Some(automaton) = UNIT_AUTOMATON.as_ref() else {
        return Duration::ZERO;
    };
    let bytes = label.as_bytes();

    for unit in automaton.find_iter(label) {
        let Some(count) = count_before(&bytes[..unit.start()]) else {
            continue;
        };
        if !ago_after(&bytes[unit.end()..]) {
            continue;
        }
        let (_, seconds) = UNITS[unit.pattern().as_usize()];
        return Duration::from_secs(count.saturating_mul(seconds));
    }

    Duration::ZERO
}

/// The run of digits directly before `head`'s end, ignoring spaces between
/// the number and the unit.
fn count_before(head: &[u8]) -> Option<u64> {
    let trimmed = head.trim_ascii_end();
    let digits_start = trimmed
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let digits = &trimmed[digits_start..];
    if digits.is_empty() {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Optional plural `s`, optional spaces, then `ago`.
fn ago_after(tail: &[u8]) -> bool {
    let tail = match tail.first() {
        Some(b's' | b'S') => &tail[1..],
        _ => tail,
    };
    let tail = tail.trim_ascii_start();
    tail.len() >= 3 && tail[..3].eq_ignore_ascii_case(b"ago")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(parse_offset("4 hours ago"), Duration::from_secs(4 * 3600));
        assert_eq!(parse_offset("1 day ago"), Duration::from_secs(86_400));
        assert_eq!(parse_offset("15 minutes ago"), Duration::from_secs(900));
        assert_eq!(parse_offset("1 minute ago"), Duration::from_secs(60));
    }

    #[test]
    fn test_spacing_and_case() {
        assert_eq!(parse_offset("2hours ago"), Duration::from_secs(7200));
        assert_eq!(parse_offset("3 DAYS AGO"), Duration::from_secs(3 * 86_400));
        assert_eq!(parse_offset("12   hours   ago"), Duration::from_secs(12 * 3600));
    }

    #[test]
    fn test_found_anywhere_in_label() {
        assert_eq!(
            parse_offset("Updated 8 hours ago via pattern detection"),
            Duration::from_secs(8 * 3600)
        );
    }

    #[test]
    fn test_unrecognised_is_zero() {
        for label in ["just now", "yesterday", "", "today", "hours ago", "2 weeks ago", "5 hours"] {
            assert_eq!(parse_offset(label), Duration::ZERO, "label {label:?}");
        }
    }

    #[test]
    fn test_ordering_follows_offsets() {
        assert!(parse_offset("4 hours ago") < parse_offset("8 hours ago"));
        assert!(parse_offset("8 hours ago") < parse_offset("1 day ago"));
    }
}
