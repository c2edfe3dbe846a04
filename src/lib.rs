//! tauon: declarative JSON-based API conformance checker.
//!
//! Reads a JSON document describing HTTP endpoints and expected
//! responses, issues the described requests sequentially against a
//! target host, and reports OK/KO per test.

pub mod checker;
pub mod config;
pub mod executor;
pub mod model;
pub mod reporter;
pub mod resolver;
pub mod runner;

pub use checker::CheckOutcome;
pub use executor::{HttpExecutor, HttpResponse, ReqwestExecutor};
pub use model::*;
pub use reporter::Reporter;
pub use resolver::{resolve, ResolvedCase};
pub use runner::Runner;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
