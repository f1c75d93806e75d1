use std::path::PathBuf;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use log::info;

use crate::config::Config;
use crate::database::Database;
use crate::error::StockError;
use crate::reports::{Report, ReportKind};

#[derive(Parser)]
#[command(
    name = "phonestock",
    version,
    about = "phonestock: Mobile phone stock, sales and audit tracking"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the web server (default if no command specified)
    Serve,

    /// Write a stock or audit report workbook to disk
    Export {
        /// Report to write: "stock" or "audit"
        #[arg(value_parser = parse_report_kind)]
        kind: ReportKind,

        /// Directory to write the workbook into (default: current directory)
        #[arg(long = "dir", short = 'd', default_value = ".")]
        dir: PathBuf,
    },
}

fn parse_report_kind(s: &str) -> Result<ReportKind, String> {
    s.parse::<ReportKind>().map_err(|e| e.to_string())
}

impl Cli {
    pub fn handle_command_line(project_dirs: &ProjectDirs, config: &Config) -> Result<(), StockError> {
        let args = Cli::parse();

        let db_dir = config.database.resolve_dir(project_dirs);
        let db = Database::open_in(&db_dir, config.database.pool_size)?;

        // Default to Serve if no command specified
        match args.command.unwrap_or(Command::Serve) {
            Command::Serve => Self::start_server(config, db),
            Command::Export { kind, dir } => Self::export(&db, kind, &dir),
        }
    }

    fn start_server(config: &Config, db: Database) -> Result<(), StockError> {
        let host = config.server.host.clone();
        let port = config.server.port;

        info!("Starting server on {}:{}", host, port);

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| StockError::Error(format!("Failed to create runtime: {}", e)))?;

        rt.block_on(async {
            let web_server = crate::server::WebServer::new(host, port, db);
            web_server.start().await
        })
    }

    fn export(db: &Database, kind: ReportKind, dir: &std::path::Path) -> Result<(), StockError> {
        let mut conn = db.get_connection()?;
        let report = Report::generate(&mut conn, kind)?;
        let path = report.write_to_dir(dir, chrono::Local::now().naive_local())?;

        println!("{}", path.display());
        Ok(())
    }
}
