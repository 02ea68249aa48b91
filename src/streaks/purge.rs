use chrono::{Datelike, NaiveDateTime};
use tracing::{debug, info};

use super::{CompanyRecord, StreakPolicy};

/// Drop records that are stale or have no company name.
///
/// Does nothing on the policy's quiet days and returns `false`; the board is
/// not refreshed then, so old-looking entries are still current. Survivors
/// keep their relative order.
pub fn purge(records: &mut Vec<CompanyRecord>, now: NaiveDateTime, policy: &StreakPolicy) -> bool {
    let day = now.weekday();
    if policy.is_quiet_day(day) {
        debug!("Skipping purge on {}", day);
        return false;
    }

    let threshold = now - policy.max_age;
    let before = records.len();
    records.retain(|r| !r.is_blank() && r.date >= threshold);

    info!(
        "Purged {} of {} records last seen before {}",
        before - records.len(),
        before,
        threshold
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaks::record::parse_date;
    use chrono::Duration;

    fn at(s: &str) -> NaiveDateTime {
        parse_date(s).unwrap()
    }

    fn rec(company: &str, date: &str) -> CompanyRecord {
        CompanyRecord::new(company, "1.00", at(date), 2)
    }

    fn sample() -> Vec<CompanyRecord> {
        vec![
            rec("OLD", "2024-01-01 09:00:00"),
            rec("KEEP", "2024-01-09 09:00:00"),
            rec("  ", "2024-01-10 09:00:00"),
            rec("EDGE", "2024-01-08 12:00:00"),
            rec("FRESH", "2024-01-10 08:00:00"),
        ]
    }

    fn names(records: &[CompanyRecord]) -> Vec<&str> {
        records.iter().map(|r| r.company.as_str()).collect()
    }

    #[test]
    fn quiet_days_leave_records_alone() {
        let policy = StreakPolicy::default();
        // 2024-01-06 Sat, 07 Sun, 08 Mon
        for day in ["2024-01-06 12:00:00", "2024-01-07 12:00:00", "2024-01-08 12:00:00"] {
            let mut records = sample();
            assert!(!purge(&mut records, at(day), &policy));
            assert_eq!(records, sample());
        }
    }

    #[test]
    fn removes_stale_and_blank_in_order() {
        let policy = StreakPolicy::default();
        let mut records = sample();
        // Wednesday; threshold is Monday 12:00
        assert!(purge(&mut records, at("2024-01-10 12:00:00"), &policy));
        assert_eq!(names(&records), vec!["KEEP", "EDGE", "FRESH"]);
    }

    #[test]
    fn record_exactly_at_threshold_survives() {
        let policy = StreakPolicy::default();
        let mut records = vec![rec("EDGE", "2024-01-08 12:00:00")];
        purge(&mut records, at("2024-01-10 12:00:00"), &policy);
        assert_eq!(records.len(), 1);

        purge(&mut records, at("2024-01-10 12:00:01"), &policy);
        assert!(records.is_empty());
    }

    #[test]
    fn longer_max_age_keeps_more() {
        let policy = StreakPolicy {
            max_age: Duration::days(7),
            ..StreakPolicy::default()
        };
        let mut records = sample();
        purge(&mut records, at("2024-01-10 12:00:00"), &policy);
        assert_eq!(names(&records), vec!["KEEP", "EDGE", "FRESH"]);

        let mut records = sample();
        purge(&mut records, at("2024-01-05 12:00:00"), &policy);
        // Friday: OLD is four days old, the blank one still goes
        assert_eq!(names(&records), vec!["OLD", "KEEP", "EDGE", "FRESH"]);
    }

    #[test]
    fn blank_removed_even_when_fresh() {
        let policy = StreakPolicy::default();
        let mut records = vec![rec("", "2024-01-10 11:00:00"), rec("A", "2024-01-10 11:00:00")];
        purge(&mut records, at("2024-01-10 12:00:00"), &policy);
        assert_eq!(names(&records), vec!["A"]);
    }
}
