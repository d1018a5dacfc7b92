use anyhow::Context;
use clap::Parser;
use go_scov::app::{self, Args, Settings};

fn main() {
    let args = Args::parse();
    app::init_tracing();

    let test_args = args.test_args.clone();
    let settings = Settings::from(args);
    let code = match app::run(&settings, &test_args)
        .context("coverage check aborted after a successful test run")
    {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            app::ABORT_EXIT_CODE
        }
    };

    std::process::exit(code)
}
