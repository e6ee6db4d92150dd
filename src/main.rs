use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storedsafe_vault::cli::{commands, output, print_usage, Cli, RunConfig, EXIT_VAULT_ID_UNKNOWN};
use storedsafe_vault::session;

fn init_logging(config: &RunConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(config.log_filter()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

fn main() -> ExitCode {
    let failure = ExitCode::from(EXIT_VAULT_ID_UNKNOWN);

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            print_usage();
            return failure;
        }
    };

    if cli.version && !cli.help {
        commands::version::execute();
        return ExitCode::SUCCESS;
    }

    let Some(config) = cli.into_config() else {
        print_usage();
        return failure;
    };

    init_logging(&config);

    let rc_path = session::default_rc_path();
    let mut stdout = std::io::stdout().lock();

    match commands::get::execute(&config, &rc_path, &mut stdout) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => failure,
        Err(e) => {
            output::error(&e.to_string());
            failure
        }
    }
}
