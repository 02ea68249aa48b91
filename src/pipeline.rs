use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use reqwest::Client;
use tracing::info;

use crate::error::TrackerError;
use crate::fetch::{self, FetchOptions};
use crate::parser;
use crate::store;
use crate::streaks::{self, StreakPolicy};

/// Everything one update cycle needs.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub url: String,
    pub store_path: PathBuf,
    pub policy: StreakPolicy,
    pub fetch: FetchOptions,
}

/// What an update cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub first_run: bool,
    pub observed: usize,
    /// Records removed by the purge, `None` when it did not run.
    pub purged: Option<usize>,
    pub matched: usize,
    pub added: usize,
    pub total: usize,
}

impl CycleReport {
    pub fn print(&self) {
        if self.first_run {
            println!("Seeded store with {} companies.", self.total);
            return;
        }
        let purged = match self.purged {
            Some(n) => format!("{} purged", n),
            None => "purge skipped".to_string(),
        };
        println!(
            "Observed {} companies: {} matched, {} new, {}. Store now holds {}.",
            self.observed, self.matched, self.added, purged, self.total
        );
    }
}

/// fetch → extract → purge → reconcile → save.
pub async fn run_cycle(client: &Client, config: &CycleConfig) -> Result<CycleReport, TrackerError> {
    let html = fetch::fetch_board(client, &config.url).await?;
    apply_snapshot(&html, &config.url, &config.store_path, streaks::now(), &config.policy)
}

/// Everything after the fetch. Refuses to touch the store when the page
/// yields no companies.
pub fn apply_snapshot(
    html: &str,
    source: &str,
    store_path: &Path,
    now: NaiveDateTime,
    policy: &StreakPolicy,
) -> Result<CycleReport, TrackerError> {
    let current = parser::process_page(html, now, policy.initial_count);
    if current.is_empty() {
        return Err(TrackerError::EmptySnapshot(source.to_string()));
    }
    let observed = current.len();

    let (mut stored, first_run) = store::load_or_init(store_path, current.clone())?;

    let purged = if first_run {
        None
    } else {
        let before = stored.len();
        streaks::purge(&mut stored, now, policy).then(|| before - stored.len())
    };

    let known: HashSet<&str> = stored.iter().map(|r| r.company.as_str()).collect();
    let matched = current
        .iter()
        .map(|r| r.company.as_str())
        .collect::<HashSet<_>>()
        .intersection(&known)
        .count();

    let stored_len = stored.len();
    let merged = streaks::reconcile(current, stored, first_run, now, policy);
    store::save(store_path, &merged)?;

    let report = CycleReport {
        first_run,
        observed,
        purged,
        matched: if first_run { 0 } else { matched },
        added: if first_run { merged.len() } else { merged.len() - stored_len },
        total: merged.len(),
    };
    info!(?report, "Update cycle complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::streaks::record::parse_date;
    use crate::streaks::CompanyRecord;
    use httpmock::{Method::GET, MockServer};
    use std::fs;
    use tempfile::tempdir;

    fn at(s: &str) -> NaiveDateTime {
        parse_date(s).unwrap()
    }

    fn board() -> String {
        fs::read_to_string("tests/fixtures/breakout_board.html").unwrap()
    }

    // 2024-01-10 is a Wednesday
    fn wednesday() -> NaiveDateTime {
        at("2024-01-10 09:15:00")
    }

    #[test]
    fn first_run_seeds_from_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("companies.json");

        let report = apply_snapshot(&board(), "fixture", &path, wednesday(), &StreakPolicy::default()).unwrap();

        assert!(report.first_run);
        assert_eq!(report.total, 5);
        let stored = store::load(&path).unwrap().unwrap();
        assert_eq!(stored.len(), 5);
        assert!(stored.iter().all(|r| r.count == 1 && r.date == wednesday()));
    }

    #[test]
    fn later_run_merges_and_purges() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("companies.json");
        store::save(
            &path,
            &[
                CompanyRecord::new("GTCH", "0.0003", at("2024-01-09 09:15:00"), 6),
                CompanyRecord::new("STALE", "3.00", at("2024-01-02 09:15:00"), 9),
                CompanyRecord::new("QUIET", "0.50", at("2024-01-09 09:15:00"), 2),
                CompanyRecord::new(" ", "", at("2024-01-09 09:15:00"), 1),
            ],
        )
        .unwrap();

        let report = apply_snapshot(&board(), "fixture", &path, wednesday(), &StreakPolicy::default()).unwrap();

        assert_eq!(
            report,
            CycleReport {
                first_run: false,
                observed: 5,
                purged: Some(2),
                matched: 1,
                added: 4,
                total: 6,
            }
        );
        let stored = store::load(&path).unwrap().unwrap();
        assert_eq!(stored[0], CompanyRecord::new("GTCH", "0.0004", wednesday(), 7));
        assert_eq!(stored[1], CompanyRecord::new("QUIET", "0.50", at("2024-01-09 09:15:00"), 2));
        let names: Vec<&str> = stored.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(names, vec!["GTCH", "QUIET", "HMBL", "AB&amp;C", "TSNP", "ALPP"]);
    }

    #[test]
    fn monday_keeps_stale_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("companies.json");
        store::save(&path, &[CompanyRecord::new("STALE", "3.00", at("2024-01-02 09:15:00"), 9)]).unwrap();

        let report = apply_snapshot(
            &board(),
            "fixture",
            &path,
            at("2024-01-08 09:15:00"),
            &StreakPolicy::default(),
        )
        .unwrap();

        assert_eq!(report.purged, None);
        assert_eq!(report.total, 6);
    }

    #[test]
    fn empty_page_leaves_store_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("companies.json");
        let seeded = vec![CompanyRecord::new("GTCH", "0.0003", at("2024-01-09 09:15:00"), 6)];
        store::save(&path, &seeded).unwrap();

        let err = apply_snapshot(
            "<html><body>Down for maintenance</body></html>",
            "fixture",
            &path,
            wednesday(),
            &StreakPolicy::default(),
        )
        .unwrap_err();

        assert!(matches!(err, TrackerError::EmptySnapshot(_)));
        assert_eq!(store::load(&path).unwrap(), Some(seeded));
    }

    #[test]
    fn empty_page_does_not_create_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("companies.json");

        let err = apply_snapshot("", "fixture", &path, wednesday(), &StreakPolicy::default()).unwrap_err();

        assert!(matches!(err, TrackerError::EmptySnapshot(_)));
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_store_aborts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("companies.json");
        fs::write(&path, "not json").unwrap();

        let err = apply_snapshot(&board(), "fixture", &path, wednesday(), &StreakPolicy::default()).unwrap_err();

        assert!(matches!(err, TrackerError::Store(StoreError::Corrupt { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }

    #[tokio::test]
    async fn full_cycle_over_http() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/boards/breakoutboards.aspx");
            then.status(200).body(board());
        });
        let dir = tempdir().unwrap();
        let config = CycleConfig {
            url: server.url("/boards/breakoutboards.aspx"),
            store_path: dir.path().join("companies.json"),
            policy: StreakPolicy::default(),
            fetch: FetchOptions::default(),
        };
        let client = fetch::build_client(&config.fetch).unwrap();

        let first = run_cycle(&client, &config).await.unwrap();
        assert!(first.first_run);

        let second = run_cycle(&client, &config).await.unwrap();
        assert!(!second.first_run);
        assert_eq!(second.matched, 5);
        assert_eq!(second.added, 0);

        let stored = store::load(&config.store_path).unwrap().unwrap();
        assert!(stored.iter().all(|r| r.count == 2));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_store_alone() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/board");
            then.status(500);
        });
        let dir = tempdir().unwrap();
        let config = CycleConfig {
            url: server.url("/board"),
            store_path: dir.path().join("companies.json"),
            policy: StreakPolicy::default(),
            fetch: FetchOptions::default(),
        };
        let client = fetch::build_client(&config.fetch).unwrap();

        assert!(run_cycle(&client, &config).await.is_err());
        assert!(!config.store_path.exists());
    }
}
