pub mod purge;
pub mod reconcile;
pub mod record;

use chrono::{Duration, Local, NaiveDateTime, Timelike, Weekday};

pub use purge::purge;
pub use reconcile::reconcile;
pub use record::CompanyRecord;

/// Tunables for counting and aging out companies.
#[derive(Debug, Clone)]
pub struct StreakPolicy {
    /// Count given to a company the first cycle it is seen.
    pub initial_count: u32,
    /// Records last seen longer ago than this are purged.
    pub max_age: Duration,
    /// The board is not refreshed on these days, so nothing is purged.
    pub quiet_days: Vec<Weekday>,
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            initial_count: 1,
            max_age: Duration::days(2),
            quiet_days: vec![Weekday::Sat, Weekday::Sun, Weekday::Mon],
        }
    }
}

impl StreakPolicy {
    pub fn is_quiet_day(&self, day: Weekday) -> bool {
        self.quiet_days.contains(&day)
    }
}

/// Current local time at whole-second precision, matching what the store keeps.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
