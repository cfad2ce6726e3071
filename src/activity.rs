// =============================================================================
// activity.rs - ONE FEED TO SCROLL THEM ALL
// =============================================================================
//
// Alerts and bills live in separate lists in the report. The dashboard wants
// one "what happened lately" feed, newest first. Alerts only know "4 hours
// ago"; bills only know the day they were introduced. Both get turned into a
// real timestamp and merged.
// =============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{Alert, Bill};
use crate::relative_time::parse_offset;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Alert,
    Bill,
}

/// One row in the activity feed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub kind: ActivityKind,
    /// Alert id or bill id, as text.
    pub reference: String,
    pub title: String,
    pub description: String,
    /// "critical" / "warning" / "info" for alerts, bill status for bills.
    pub tag: String,
    pub timestamp: DateTime<Utc>,
    /// Deep-dive topic used when the row is clicked.
    pub investigate_topic: String,
}

/// Merge alerts and bills into one feed, newest first, at most `max_items`.
pub fn build_feed(
    alerts: &[Alert],
    bills: &[Bill],
    now: DateTime<Utc>,
    max_items: usize,
) -> Vec<ActivityItem> {
    let alert_items = alerts.iter().map(|alert| ActivityItem {
        kind: ActivityKind::Alert,
        reference: alert.id.to_string(),
        title: alert.title.clone(),
        description: alert.description.clone(),
        tag: alert.severity.to_string(),
        timestamp: alert_timestamp(&alert.time, now),
        investigate_topic: format!("Alert investigation: {}", alert.title),
    });

    let bill_items = bills.iter().map(|bill| ActivityItem {
        kind: ActivityKind::Bill,
        reference: bill.id.clone(),
        title: bill.title.clone(),
        description: format!("{} - {}", bill.stage, bill.sponsor),
        tag: bill.status.to_string(),
        timestamp: bill_timestamp(&bill.date_introduced, now),
        investigate_topic: format!("Bill analysis: {}", bill.title),
    });

    let mut feed: Vec<ActivityItem> = alert_items.chain(bill_items).collect();
    // stable: equal timestamps keep alerts ahead of bills
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed.truncate(max_items);
    feed
}

fn alert_timestamp(label: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    chrono::Duration::from_std(parse_offset(label))
        .ok()
        .and_then(|offset| now.checked_sub_signed(offset))
        .unwrap_or(now)
}

/// Midnight UTC on the introduction date, or `now` if the date is unreadable.
fn bill_timestamp(date: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_alerts_stamped_relative_to_now() {
        let report = demo::government_report("United States");
        let feed = build_feed(&report.alerts, &[], now(), 10);
        let ids: Vec<_> = feed.iter().map(|i| i.reference.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(feed[0].timestamp, now() - chrono::Duration::hours(4));
        assert_eq!(feed[2].tag, "info");
        assert_eq!(
            feed[1].investigate_topic,
            "Alert investigation: Defense Spending Irregularity"
        );
    }

    #[test]
    fn test_feed_is_newest_first_and_truncated() {
        let report = demo::government_report("United States");
        let feed = build_feed(&report.alerts, &report.active_bills, now(), 5);
        assert_eq!(feed.len(), 5);
        assert!(feed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        // alerts are hours old; the newest bill is from 2024-03-12
        assert_eq!(feed[3].reference, "HR-2024-6789");
        assert_eq!(feed[4].reference, "HR-2024-9234");
    }

    #[test]
    fn test_unparseable_bill_date_falls_back_to_now() {
        let bill = Bill {
            id: "X-1".to_string(),
            date_introduced: "sometime in spring".to_string(),
            ..Default::default()
        };
        let feed = build_feed(&[], &[bill], now(), 10);
        assert_eq!(feed[0].timestamp, now());
    }

    #[test]
    fn test_unknown_alert_label_is_now() {
        let alert = Alert {
            id: 9,
            time: "just now".to_string(),
            ..Default::default()
        };
        let feed = build_feed(&[alert], &[], now(), 10);
        assert_eq!(feed[0].timestamp, now());
    }
}
