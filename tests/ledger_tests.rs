use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use taskpulse::ledger::{StatsLedger, RETENTION_DAYS};
use taskpulse::models::date_key;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_completion_creates_and_increments() {
    let mut ledger = StatsLedger::new();
    ledger.record_completion("2025-03-10");
    ledger.record_completion("2025-03-10");
    ledger.record_completion("2025-03-11");
    assert_eq!(ledger.count("2025-03-10"), 2);
    assert_eq!(ledger.count("2025-03-11"), 1);
    assert_eq!(ledger.count("2025-03-12"), 0);
    assert_eq!(ledger.total(), 3);
}

#[test]
fn test_uncompletion_floors_at_zero() {
    let mut ledger = StatsLedger::new();
    assert!(!ledger.record_uncompletion("2025-03-10"));
    assert!(ledger.is_empty());

    ledger.record_completion("2025-03-10");
    assert!(ledger.record_uncompletion("2025-03-10"));
    assert!(!ledger.record_uncompletion("2025-03-10"));
    assert_eq!(ledger.count("2025-03-10"), 0);
}

#[test]
fn test_last_7_days_window() {
    let mut ledger = StatsLedger::new();
    ledger.record_completion("2025-03-04");
    ledger.record_completion("2025-03-10");
    ledger.record_completion("2025-03-10");
    ledger.record_completion("2025-03-03");

    let window = ledger.last_7_days(day(2025, 3, 10));
    assert_eq!(window.len(), 7);

    let days: Vec<_> = window.clone().collect();
    assert_eq!(days[0].key, "2025-03-04");
    assert_eq!(days[6].key, "2025-03-10");
    let counts: Vec<u32> = days.iter().map(|d| d.count).collect();
    assert_eq!(counts, vec![1, 0, 0, 0, 0, 0, 2]);

    // Walking the cloned window again yields the same days.
    let again: Vec<_> = window.collect();
    assert_eq!(days, again);
}

#[test]
fn test_window_spans_month_boundary() {
    let ledger = StatsLedger::new();
    let keys: Vec<String> = ledger.last_7_days(day(2024, 3, 2)).map(|d| d.key).collect();
    assert_eq!(
        keys,
        vec!["2024-02-25", "2024-02-26", "2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01", "2024-03-02"]
    );
}

#[test]
fn test_serializes_as_plain_map() {
    let mut ledger = StatsLedger::new();
    ledger.record_completion("2025-03-10");
    assert_eq!(serde_json::to_string(&ledger).unwrap(), r#"{"2025-03-10":1}"#);
}

fn ledger_strategy() -> impl Strategy<Value = (StatsLedger, NaiveDate)> {
    (0i64..120, prop::collection::vec((0i64..90, 0i64..5), 0..40)).prop_map(|(base, entries)| {
        let reference = day(2025, 1, 1) + Duration::days(base);
        let ledger = entries
            .into_iter()
            .map(|(back, count)| (date_key(reference - Duration::days(back)), count))
            .collect::<StatsLedger>();
        (ledger, reference)
    })
}

proptest! {
    #[test]
    fn uncompletion_never_goes_below_zero(
        ops in prop::collection::vec((any::<bool>(), 0u8..3), 0..60)
    ) {
        let keys = ["2025-03-08", "2025-03-09", "2025-03-10"];
        let mut ledger = StatsLedger::new();
        let mut expected = [0u32; 3];
        for (complete, k) in ops {
            let k = usize::from(k);
            if complete {
                ledger.record_completion(keys[k]);
                expected[k] += 1;
            } else {
                ledger.record_uncompletion(keys[k]);
                expected[k] = expected[k].saturating_sub(1);
            }
        }
        for (k, key) in keys.iter().enumerate() {
            prop_assert_eq!(ledger.count(key), expected[k]);
        }
    }

    #[test]
    fn purge_keeps_exactly_the_recent_window((ledger, reference) in ledger_strategy()) {
        let cutoff = date_key(reference - Duration::days(RETENTION_DAYS));
        let mut swept = ledger.clone();
        let removed = swept.purge_older_than(RETENTION_DAYS, reference);

        prop_assert!(swept.iter().all(|(key, _)| key >= cutoff.as_str()));
        for (key, count) in ledger.iter() {
            if key >= cutoff.as_str() {
                prop_assert_eq!(swept.count(key), count);
            }
        }
        prop_assert_eq!(removed, ledger.len() - swept.len());
    }
}
