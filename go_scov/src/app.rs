use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::coverage;
use crate::error::{CoverageError, CoverageResult};
use crate::runner::{ProcessRunner, SystemRunner};

/// Go executable used when none is configured.
pub const DEFAULT_TOOL: &str = "go";

/// Where `go test` is told to write its coverage profile.
pub const DEFAULT_REPORT_PATH: &str = "coverage.out";

/// Exit code for a passing test run that left statements uncovered.
pub const UNCOVERED_EXIT_CODE: i32 = 1;

/// Exit code when the profile cannot be inspected after a passing run.
pub const ABORT_EXIT_CODE: i32 = 2;

/// Header written before the list of uncovered records.
pub const UNCOVERED_HEADER: &str = "Uncovered lines found:";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "go-scov",
    author,
    version,
    about = "Run go test with coverage and fail on any uncovered statement",
    long_about = None
)]
pub struct Args {
    /// Go executable used to run the tests
    #[arg(long = "go", env = "GO_SCOV_GO", value_name = "PATH", default_value = DEFAULT_TOOL)]
    pub go: String,

    /// Arguments passed through to `go test` (use `--` before arguments that
    /// would clash with the options above, including `-h` and `-V`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub test_args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub tool: String,
    pub report_path: PathBuf,
    pub working_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            working_dir: None,
        }
    }
}

impl From<Args> for Settings {
    fn from(value: Args) -> Self {
        Self {
            tool: value.go,
            ..Self::default()
        }
    }
}

impl Settings {
    /// Full argument list for the tool: `test`, the caller's arguments, then
    /// the coverage flags.
    pub fn test_command_args(&self, extra_args: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(extra_args.len() + 3);
        args.push("test".to_string());
        args.extend(extra_args.iter().cloned());
        args.push("-cover".to_string());
        args.push(format!("-coverprofile={}", self.report_path.display()));
        args
    }

    /// Location of the profile as seen from this process.
    pub fn report_location(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) => dir.join(&self.report_path),
            None => self.report_path.clone(),
        }
    }

    pub fn runner(&self) -> SystemRunner {
        match &self.working_dir {
            Some(dir) => SystemRunner::new().with_working_dir(dir),
            None => SystemRunner::new(),
        }
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Run the tests with coverage and turn uncovered records into a failure.
///
/// A failing test run returns its own exit code without looking at the
/// profile. After a passing run the profile must be readable; anything else
/// is an error.
pub fn coverage_test<R, W>(
    runner: &R,
    settings: &Settings,
    extra_args: &[String],
    diagnostics: &mut W,
) -> CoverageResult<i32>
where
    R: ProcessRunner,
    W: Write,
{
    let args = settings.test_command_args(extra_args);
    info!(tool = %settings.tool, ?args, "Running tests with coverage");

    let code = runner.run(&settings.tool, &args);
    if code != 0 {
        debug!(code, "Test run failed; skipping coverage inspection");
        return Ok(code);
    }

    let uncovered = coverage::find_uncovered(&settings.report_location())?;
    if uncovered.is_empty() {
        return Ok(0);
    }

    report_uncovered(&uncovered, diagnostics).map_err(CoverageError::Diagnostics)?;
    Ok(UNCOVERED_EXIT_CODE)
}

/// Run against real processes, reporting uncovered records on stderr.
pub fn run(settings: &Settings, extra_args: &[String]) -> CoverageResult<i32> {
    let runner = settings.runner();
    let stderr = io::stderr();
    let mut diagnostics = stderr.lock();
    coverage_test(&runner, settings, extra_args, &mut diagnostics)
}

fn report_uncovered<W: Write>(uncovered: &[String], out: &mut W) -> io::Result<()> {
    writeln!(out, "{UNCOVERED_HEADER}")?;
    for record in uncovered {
        writeln!(out, "{record}")?;
    }
    out.flush()
}
