use clap::Parser;
use connector_gen::cli::{exit_code, run_cli, Cli};
use connector_gen::logging::{init_logging_with_config, LogConfig};

fn main() {
    let cli = Cli::parse();

    let mut log = LogConfig::from_env();
    if cli.verbose {
        log.log_level = "debug".to_string();
    }
    if let Err(err) = init_logging_with_config(&log) {
        eprintln!("failed to initialize logging: {err}");
    }

    if let Err(err) = run_cli(&cli) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}
