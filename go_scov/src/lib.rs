//! # go-scov
//!
//! Runs `go test` with coverage enabled and fails when the resulting profile
//! contains any statement block that was never executed, even if every test
//! passed.
//!
//! ```bash
//! # Same arguments as go test
//! go-scov ./...
//!
//! # Separate go test flags that clash with go-scov's own options
//! go-scov -- -run TestParse ./parser
//!
//! # -h and -V print go-scov's own help and version unless they follow --
//! go-scov -- -h
//! ```
//!
//! ## Exit codes
//!
//! - `0`: tests passed and every statement is covered
//! - `1`: tests passed but uncovered statements were listed on stderr, or
//!   the `go` executable could not be started
//! - `2`: tests passed but the coverage profile could not be read
//! - any other value: the exit code of `go test` itself
//!
//! ## Environment Variables
//!
//! - `GO_SCOV_GO`: Go executable to run instead of `go` from `PATH`
//! - `RUST_LOG`: log filter for go-scov's own diagnostics (default `warn`)

pub mod app;
pub mod coverage;
pub mod error;
pub mod runner;

pub use app::{coverage_test, Settings};
pub use coverage::find_uncovered;
pub use error::{CoverageError, CoverageResult};
pub use runner::{ProcessRunner, SystemRunner};
