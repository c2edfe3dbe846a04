//! Sequential test execution and counter bookkeeping.

use crate::checker::{self, CheckOutcome};
use crate::executor::HttpExecutor;
use crate::model::RunSummary;
use crate::reporter::Reporter;
use crate::resolver::ResolvedCase;
use tracing::{debug, instrument, warn};

/// Runs resolved cases strictly sequentially, in declaration order.
pub struct Runner {
    executor: Box<dyn HttpExecutor>,
    reporter: Reporter,
}

impl Runner {
    pub fn new(executor: Box<dyn HttpExecutor>, reporter: Reporter) -> Self {
        Self { executor, reporter }
    }

    /// Issue one request per declared method per non-skipped case
    /// and score each response.
    ///
    /// Transport-level failures (connection refused, DNS, timeout)
    /// are converted into a failed case instead of aborting the
    /// run, so one unreachable endpoint cannot sink a whole suite.
    #[instrument(skip(self, cases), fields(host = %host))]
    pub async fn run(&mut self, host: &str, cases: &[ResolvedCase]) -> RunSummary {
        let mut summary = RunSummary::default();

        self.reporter.banner(host);

        for case in cases {
            if case.skip {
                debug!("Skipping test '{}'", case.label);
                self.reporter.skipped(&case.label);
                summary.skipped += 1;
                continue;
            }

            for method in &case.methods {
                summary.total += 1;

                let label = if case.methods.len() > 1 {
                    format!("{} [{method}]", case.label)
                } else {
                    case.label.clone()
                };

                let outcome = match self
                    .executor
                    .execute(
                        *method,
                        &case.url,
                        &case.queries,
                        &case.headers,
                        &case.body,
                    )
                    .await
                {
                    Ok(response) => {
                        checker::evaluate(case.response.as_ref(), &response)
                    }
                    Err(err) => {
                        warn!("Request failed for '{}': {:#}", label, err);
                        CheckOutcome::Fail(format!("Request failed: {err:#}"))
                    }
                };

                if outcome.is_fail() {
                    summary.failed += 1;
                }
                self.reporter.case(&label, &outcome);
            }
        }

        self.reporter.summary(host, &summary);
        summary
    }
}
