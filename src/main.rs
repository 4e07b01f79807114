mod cli;
mod error;
mod fetch;
mod fmt;
mod logging;
mod models;
mod selection;
mod series;
mod settings;
mod store;
mod tui;
mod view;

use clap::Parser;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => {
            let settings = cli::effective_settings(cli.endpoint.as_deref())?;
            logging::init_file(&settings.log_path())?;
            cli::dashboard::run(&settings, cli.month.as_deref(), cli.year)
        }
        Some(Commands::Summary) => {
            logging::init_stderr();
            let settings = cli::effective_settings(cli.endpoint.as_deref())?;
            cli::summary::run(&settings)
        }
        Some(Commands::Config {
            set_endpoint,
            timeout,
            no_timeout,
            log_file,
        }) => {
            logging::init_stderr();
            cli::config::run(cli::config::ConfigUpdate {
                endpoint: set_endpoint,
                timeout,
                no_timeout,
                log_file,
            })
        }
        Some(Commands::Status) => {
            logging::init_stderr();
            let settings = cli::effective_settings(cli.endpoint.as_deref())?;
            cli::status::run(&settings)
        }
    }
}
