use std::path::Path;

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming,
};

/// Starts the global logger.
///
/// `RUST_LOG` overrides `base_level`. Without `log_dir` everything goes to
/// stderr; with one, records go to rotating files and warnings are also
/// copied to stderr. Stdout is left to the score listing.
///
/// Keep the returned handle alive for as long as logging is wanted.
pub fn setup_logging(
    base_level: &str,
    log_dir: Option<&Path>,
) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(base_level)?.format(flexi_logger::detailed_format);

    match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename("simplicity"))
            .duplicate_to_stderr(Duplicate::Warn)
            .rotate(
                Criterion::Size(1024 * 1024),
                Naming::Timestamps,
                Cleanup::KeepLogFiles(5),
            )
            .start(),
        None => logger.log_to_stderr().start(),
    }
}
