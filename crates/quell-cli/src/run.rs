//! Run orchestration: fetch, evaluate, persist, execute, report.

use std::thread::sleep;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use quell_core::config::QuellConfig;
use quell_core::errors::{ApiError, RunError};
use quell_core::traits::TicketApi;
use quell_core::types::{RunStats, Ticket};
use quell_engine::{DecisionExecutor, PairEvaluator};
use quell_storage::HistoryStore;
use tracing::{info, warn};

/// Fetch attempts before the run is declared failed.
const FETCH_ATTEMPTS: u32 = 3;
/// First retry delay; doubles per attempt.
const FETCH_BACKOFF: StdDuration = StdDuration::from_millis(500);

/// Per-invocation switches that are not configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub projects: Vec<String>,
    pub dry_run: bool,
    pub force: bool,
}

/// Execute one batch run to completion.
///
/// History is persisted after evaluation but before any cancel/comment, so
/// a crash mid-execution never re-scores (or re-comments) a pair on the
/// next scheduled run.
pub fn run<A: TicketApi + ?Sized>(
    api: &A,
    config: &QuellConfig,
    opts: &RunOptions,
) -> Result<RunStats, RunError> {
    let created_since = Utc::now() - Duration::days(i64::from(config.scan.days_back));
    info!(
        projects = %opts.projects.join(", "),
        days_back = config.scan.days_back,
        dry_run = opts.dry_run,
        threshold = config.scoring.confidence_threshold,
        "starting run"
    );

    let tickets = fetch_with_retry(api, &opts.projects, created_since)?;
    info!(count = tickets.len(), "fetched tickets");

    let mut history = HistoryStore::load(&config.history_path)?;

    let evaluator = PairEvaluator::new(&config.scoring, opts.force);
    let outcome = evaluator.evaluate(&tickets, &mut history);
    history.save()?;

    let executor = DecisionExecutor::new(api, opts.dry_run);
    let report = executor.execute(&outcome.duplicates);

    let stats = RunStats {
        tickets_scanned: tickets.len(),
        pairs_evaluated: outcome.pairs_evaluated,
        pairs_skipped: outcome.pairs_skipped,
        duplicates_found: outcome.duplicates.len(),
        tickets_cancelled: report.cancelled,
        action_errors: report.failures,
    };
    info!(%stats, "run complete");
    Ok(stats)
}

/// Fetch with bounded retry and doubling backoff. A fetch that never
/// succeeds aborts the run: no tickets means no work.
fn fetch_with_retry<A: TicketApi + ?Sized>(
    api: &A,
    projects: &[String],
    created_since: DateTime<Utc>,
) -> Result<Vec<Ticket>, ApiError> {
    let mut delay = FETCH_BACKOFF;
    let mut last_err = None;

    for attempt in 1..=FETCH_ATTEMPTS {
        match api.search(projects, created_since) {
            Ok(tickets) => return Ok(tickets),
            Err(e) => {
                warn!(attempt, error = %e, "ticket fetch failed");
                last_err = Some(e);
                if attempt < FETCH_ATTEMPTS {
                    sleep(delay);
                    delay *= 2;
                }
            }
        }
    }

    Err(last_err.unwrap_or(ApiError::Transport {
        message: "fetch failed with no recorded error".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quell_core::types::StatusCategory;
    use std::cell::RefCell;
    use std::path::PathBuf;

    struct FakeApi {
        tickets: Vec<Ticket>,
        fail_search: bool,
        search_calls: RefCell<u32>,
        cancelled: RefCell<Vec<String>>,
    }

    impl FakeApi {
        fn with_tickets(tickets: Vec<Ticket>) -> Self {
            Self {
                tickets,
                fail_search: false,
                search_calls: RefCell::new(0),
                cancelled: RefCell::new(Vec::new()),
            }
        }
    }

    impl TicketApi for FakeApi {
        fn search(
            &self,
            _projects: &[String],
            _created_since: DateTime<Utc>,
        ) -> Result<Vec<Ticket>, ApiError> {
            *self.search_calls.borrow_mut() += 1;
            if self.fail_search {
                return Err(ApiError::Transport {
                    message: "connection refused".to_string(),
                });
            }
            Ok(self.tickets.clone())
        }

        fn cancel(&self, ticket_id: &str) -> Result<(), ApiError> {
            self.cancelled.borrow_mut().push(ticket_id.to_string());
            Ok(())
        }

        fn comment(&self, _ticket_id: &str, _text: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn ticket(id: &str, subject: &str, offset_secs: i64) -> Ticket {
        Ticket {
            id: id.to_string(),
            subject: subject.to_string(),
            description: String::new(),
            created: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
            reporter: "fund-automation".to_string(),
            status: StatusCategory::Todo,
        }
    }

    fn config(history_path: PathBuf) -> QuellConfig {
        QuellConfig {
            history_path,
            ..QuellConfig::default()
        }
    }

    fn opts() -> RunOptions {
        RunOptions {
            projects: vec!["OPS".to_string()],
            dry_run: false,
            force: false,
        }
    }

    #[test]
    fn test_full_run_cancels_newer_duplicate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let api = FakeApi::with_tickets(vec![
            ticket("OPS-1", "Re: Capital call notice for Fund IV", 0),
            ticket("OPS-2", "FW: Capital call notice for Fund IV", 30),
        ]);
        let config = config(dir.path().join("history.json"));

        let stats = run(&api, &config, &opts()).expect("run");
        assert_eq!(stats.tickets_scanned, 2);
        assert_eq!(stats.pairs_evaluated, 1);
        assert_eq!(stats.duplicates_found, 1);
        assert_eq!(stats.tickets_cancelled, 1);
        assert_eq!(*api.cancelled.borrow(), vec!["OPS-2".to_string()]);
    }

    #[test]
    fn test_second_run_skips_adjudicated_pairs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tickets = vec![
            ticket("OPS-1", "Re: Capital call notice for Fund IV", 0),
            ticket("OPS-2", "FW: Capital call notice for Fund IV", 30),
        ];
        let config = config(dir.path().join("history.json"));

        let first = FakeApi::with_tickets(tickets.clone());
        run(&first, &config, &opts()).expect("first run");

        let second = FakeApi::with_tickets(tickets);
        let stats = run(&second, &config, &opts()).expect("second run");
        assert_eq!(stats.pairs_evaluated, 0);
        assert_eq!(stats.pairs_skipped, 1);
        assert_eq!(stats.duplicates_found, 0);
        assert!(second.cancelled.borrow().is_empty());
    }

    #[test]
    fn test_fetch_failure_is_fatal_after_retries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut api = FakeApi::with_tickets(Vec::new());
        api.fail_search = true;
        let config = config(dir.path().join("history.json"));

        let err = run(&api, &config, &opts()).unwrap_err();
        assert!(matches!(err, RunError::Fetch(_)));
        assert_eq!(*api.search_calls.borrow(), FETCH_ATTEMPTS);
    }

    #[test]
    fn test_dry_run_records_history_but_cancels_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let api = FakeApi::with_tickets(vec![
            ticket("OPS-1", "Re: Capital call notice for Fund IV", 0),
            ticket("OPS-2", "FW: Capital call notice for Fund IV", 30),
        ]);
        let config = config(dir.path().join("history.json"));
        let options = RunOptions {
            dry_run: true,
            ..opts()
        };

        let stats = run(&api, &config, &options).expect("run");
        assert_eq!(stats.duplicates_found, 1);
        assert_eq!(stats.tickets_cancelled, 1);
        assert!(api.cancelled.borrow().is_empty());

        let history = HistoryStore::load(&config.history_path).expect("history");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_run_with_no_duplicates_exits_clean() {
        let dir = tempfile::tempdir().expect("tempdir");
        let api = FakeApi::with_tickets(vec![
            ticket("OPS-1", "Invoice overdue", 0),
            ticket("OPS-2", "Server outage eu-west", 4 * 3600),
        ]);
        let config = config(dir.path().join("history.json"));

        let stats = run(&api, &config, &opts()).expect("run");
        assert_eq!(stats.duplicates_found, 0);
        assert_eq!(stats.tickets_cancelled, 0);
        assert_eq!(stats.action_errors, 0);
    }
}
