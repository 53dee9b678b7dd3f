//! Decision execution against the ticket system.
//!
//! For each confirmed duplicate pair the newer ticket is cancelled and the
//! older kept as canonical. Failures are isolated per pair: one bad cancel
//! or comment never aborts the remaining pairs.

use std::collections::HashMap;

use quell_core::traits::TicketApi;
use tracing::{info, warn};

use crate::evaluator::DuplicatePair;

/// Counters from one execution pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Tickets cancelled (or, in dry-run, that would have been).
    pub cancelled: usize,
    /// Targets skipped because they were already terminal or already
    /// cancelled earlier in this run.
    pub skipped: usize,
    /// Failed API actions.
    pub failures: usize,
}

/// Executes cancel-and-comment decisions for duplicate pairs.
pub struct DecisionExecutor<'a, A: TicketApi + ?Sized> {
    api: &'a A,
    dry_run: bool,
}

impl<'a, A: TicketApi + ?Sized> DecisionExecutor<'a, A> {
    pub fn new(api: &'a A, dry_run: bool) -> Self {
        Self { api, dry_run }
    }

    /// Act on every duplicate pair, isolate-and-continue on failure.
    ///
    /// Within a run at most one ticket of a mutually-duplicate cluster
    /// survives: once a ticket is cancelled here it is excluded as a later
    /// cancellation target, and later keep references to it are redirected
    /// to the ticket it was folded into, so the oldest ticket of the
    /// cluster is both the one kept and the one every comment points at.
    pub fn execute(&self, duplicates: &[DuplicatePair]) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        // cancelled ticket id -> the ticket it was folded into
        let mut folded_into: HashMap<String, String> = HashMap::new();

        for pair in duplicates {
            let cancel = &pair.newer;

            // The keep side of a pair may itself have been cancelled by an
            // earlier pair in a duplicate chain; follow the fold chain so
            // the comment names the ticket that actually survives.
            let mut keep_id = pair.older.id.clone();
            while let Some(next) = folded_into.get(&keep_id) {
                keep_id = next.clone();
            }

            if cancel.status.is_terminal() {
                info!(
                    ticket = %cancel.id,
                    "cancellation target already terminal, skipping"
                );
                report.skipped += 1;
                continue;
            }
            if folded_into.contains_key(&cancel.id) {
                info!(
                    ticket = %cancel.id,
                    "cancellation target already cancelled this run, skipping"
                );
                report.skipped += 1;
                continue;
            }

            if self.dry_run {
                info!(
                    keep = %keep_id,
                    cancel = %cancel.id,
                    score = pair.result.score,
                    "[dry-run] would cancel duplicate"
                );
                folded_into.insert(cancel.id.clone(), keep_id);
                report.cancelled += 1;
                continue;
            }

            let comment = comment_text(pair, &keep_id);
            if let Err(e) = self.api.comment(&cancel.id, &comment) {
                warn!(ticket = %cancel.id, error = %e, "failed to comment, continuing");
                report.failures += 1;
            }

            match self.api.cancel(&cancel.id) {
                Ok(()) => {
                    info!(keep = %keep_id, cancel = %cancel.id, "cancelled duplicate");
                    folded_into.insert(cancel.id.clone(), keep_id);
                    report.cancelled += 1;
                }
                Err(e) => {
                    warn!(ticket = %cancel.id, error = %e, "failed to cancel, continuing");
                    report.failures += 1;
                }
            }
        }

        report
    }
}

/// Explanation comment attached to the cancelled ticket. `keep_id` is the
/// surviving ticket, which in a duplicate chain may differ from the pair's
/// older side.
fn comment_text(pair: &DuplicatePair, keep_id: &str) -> String {
    let mut reasons = String::new();
    for reason in &pair.result.reasons {
        reasons.push_str("- ");
        reasons.push_str(reason);
        reasons.push('\n');
    }
    format!(
        "Automated duplicate detection\n\n\
         This ticket was identified as a duplicate of {} \
         (confidence {}).\n\n\
         Matched criteria:\n{}\n\
         If this was marked incorrectly, please reopen with an explanation.",
        keep_id, pair.result.score, reasons
    )
}
