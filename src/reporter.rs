//! Console reporting with OK/KO/SKIPPED markers.

use crate::checker::CheckOutcome;
use crate::model::RunSummary;
use std::io::Write;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Verbosity levels:
/// - 0: single `host: OK|KO` line, nothing else
/// - 1: per-case markers, no failure detail
/// - 2: per-case markers plus failure detail (default)
///
/// Threaded through the constructor on purpose, never process-wide
/// state. Renders into any writer so output is testable; write
/// errors on the console are ignored, as with `println!`.
pub struct Reporter {
    verbosity: u8,
    out: Box<dyn Write + Send>,
}

impl Reporter {
    /// Reporter writing to stdout.
    pub fn new(verbosity: u8) -> Self {
        Self::with_writer(verbosity, Box::new(std::io::stdout()))
    }

    pub fn with_writer(verbosity: u8, out: Box<dyn Write + Send>) -> Self {
        Self { verbosity, out }
    }

    pub fn banner(&mut self, host: &str) {
        if self.verbosity >= 1 {
            let _ = writeln!(self.out, "Testing {host}\n");
        }
    }

    /// One line per issued request.
    pub fn case(&mut self, label: &str, outcome: &CheckOutcome) {
        if self.verbosity == 0 {
            return;
        }
        let _ = match outcome {
            CheckOutcome::Unchecked => {
                writeln!(self.out, "{label}: {YELLOW}-{RESET}")
            }
            CheckOutcome::Pass => {
                writeln!(self.out, "{label}: {GREEN}OK{RESET}")
            }
            CheckOutcome::Fail(detail) => {
                if self.verbosity >= 2 {
                    writeln!(self.out, "{label}: {detail} {RED}KO{RESET}")
                } else {
                    writeln!(self.out, "{label}: {RED}KO{RESET}")
                }
            }
        };
    }

    pub fn skipped(&mut self, label: &str) {
        if self.verbosity >= 1 {
            let _ = writeln!(self.out, "{label}: {YELLOW}SKIPPED{RESET}");
        }
    }

    pub fn summary(&mut self, host: &str, summary: &RunSummary) {
        if self.verbosity == 0 {
            let _ = if summary.failed > 0 {
                writeln!(self.out, "{host}: {RED}KO{RESET}")
            } else {
                writeln!(self.out, "{host}: {GREEN}OK{RESET}")
            };
            return;
        }

        let _ = writeln!(
            self.out,
            "\nSummary {host}: {} tests ran",
            summary.total
        );
        let _ = writeln!(self.out, "{} : {GREEN}OK{RESET}", summary.passed());
        let _ = writeln!(self.out, "{} : {RED}KO{RESET}", summary.failed);
        if summary.skipped > 0 {
            let _ = writeln!(
                self.out,
                "{} : {YELLOW}SKIPPED{RESET}",
                summary.skipped
            );
        }
    }
}
