use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use super::{CompanyRecord, StreakPolicy};

/// Merge this cycle's observations into the stored records.
///
/// On the first run `current` is the whole story and comes back untouched.
/// Otherwise every stored record is kept; the ones seen again take the new
/// price, `now` as their date and one more count. Companies not stored yet
/// are appended in the order first seen with `policy.initial_count`.
///
/// If `current` names a company twice, the later row's price wins.
pub fn reconcile(
    current: Vec<CompanyRecord>,
    stored: Vec<CompanyRecord>,
    is_first_run: bool,
    now: NaiveDateTime,
    policy: &StreakPolicy,
) -> Vec<CompanyRecord> {
    if is_first_run {
        return current;
    }

    let latest: HashMap<&str, &CompanyRecord> =
        current.iter().map(|r| (r.company.as_str(), r)).collect();
    let known: HashSet<String> = stored.iter().map(|r| r.company.clone()).collect();

    let mut merged = stored;
    for record in merged.iter_mut() {
        if let Some(seen) = latest.get(record.company.as_str()) {
            record.price = seen.price.clone();
            record.date = now;
            record.count += 1;
        }
    }

    let mut appended: HashSet<&str> = HashSet::new();
    for record in &current {
        let name = record.company.as_str();
        if known.contains(name) || !appended.insert(name) {
            continue;
        }
        let price = latest.get(name).map_or(&record.price, |r| &r.price);
        merged.push(CompanyRecord::new(name, price.as_str(), now, policy.initial_count));
    }

    merged
}
