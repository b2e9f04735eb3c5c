//! Binary entry point: parses the CLI, builds a [`Config`] and [`Request`],
//! then drives either the core engine or the thread-per-client alternative
//! driver to completion and prints the Reporter summary line (§4.6).

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::error;

use loadbench::cli::Cli;
use loadbench::request::build_request;
use loadbench::{reporter, Engine};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // §6: `-h`/`-?`/`--help` print usage and exit *non-zero*; `-V`/`--version`
    // prints the bare version number and exits 0. Handled here rather than
    // via clap's built-ins, which do the opposite on both counts.
    if cli.help {
        let mut command = Cli::command();
        let _ = command.print_help();
        println!();
        return ExitCode::FAILURE;
    }
    if cli.version {
        println!("2.0");
        return ExitCode::SUCCESS;
    }

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_env("RUST_LOG")
        .init();

    let threaded = cli.threaded;

    let mut config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let request = match build_request(&mut config) {
        Ok(request) => request,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let summary = if threaded {
        let (totals, elapsed) = loadbench::threaded::run(config, request);
        reporter::format_summary_with_elapsed(totals, elapsed)
    } else {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("failed to start runtime: {e}");
                return ExitCode::FAILURE;
            }
        };

        let engine = Engine::new(config, request);
        let totals = runtime.block_on(engine.run());
        reporter::format_summary(totals)
    };

    println!("{summary}");
    ExitCode::SUCCESS
}
