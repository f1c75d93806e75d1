mod api;
mod audit_log;
mod cli;
mod config;
mod database;
mod error;
mod logging;
mod reconcile;
mod reports;
mod schema;
mod server;
mod stock;
mod web;

use cli::Cli;
use config::Config;
use directories::ProjectDirs;
use log::{debug, error};

fn main() {
    let Some(project_dirs) = ProjectDirs::from("", "", "phonestock") else {
        eprintln!("Could not determine the application data directory");
        std::process::exit(1);
    };

    let config = Config::load_config(&project_dirs);

    // Logging stops when the handle is dropped
    let _logger = match logging::setup_logging(&project_dirs, &config.logging) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("{} - continuing without file logging", err);
            None
        }
    };

    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

    if let Err(err) = Cli::handle_command_line(&project_dirs, &config) {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
