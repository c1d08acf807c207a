use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cir_cli::args::Cli;
use cir_cli::commands::{self, EXIT_REJECTED};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }
    init_tracing(cli.log_json);

    match commands::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(EXIT_REJECTED)
        }
    }
}
