use directories::ProjectDirs;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::config::LoggingConfig;
use crate::error::StockError;

const LOG_FILE_MAX_BYTES: u64 = 10 * 1024 * 1024;
const LOG_FILES_KEPT: usize = 7;

/// Starts file logging under `<data dir>/logs`. The returned handle must be
/// kept alive for the lifetime of the process or logging stops.
pub fn setup_logging(
    project_dirs: &ProjectDirs,
    logging: &LoggingConfig,
) -> Result<LoggerHandle, StockError> {
    let log_dir = project_dirs.data_local_dir().join("logs");

    let handle = Logger::try_with_str(logging.log_spec())
        .map_err(|e| StockError::Error(format!("Invalid log specification: {}", e)))?
        .log_to_file(
            FileSpec::default()
                .directory(&log_dir)
                .basename("phonestock"),
        )
        .rotate(
            Criterion::Size(LOG_FILE_MAX_BYTES),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(LOG_FILES_KEPT),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|e| StockError::Error(format!("Failed to start logger: {}", e)))?;

    Ok(handle)
}
