use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Resolves the log level: an explicit override wins, then `RUST_LOG`, then `Info`.
fn resolve_level(level_override: Option<LevelFilter>) -> LevelFilter {
    level_override.unwrap_or_else(|| {
        std::env::var("RUST_LOG")
            .map(|level| level.parse().unwrap_or(LevelFilter::Info))
            .unwrap_or(LevelFilter::Info)
    })
}

/// Sets up the application logger with console output.
///
/// Route search logs every dropped path at `debug`, so `RUST_LOG=debug` (or the
/// CLI's `--verbose`) is the way to see why a path produced no route.
///
/// # Errors
/// * If a global logger has already been installed
pub fn setup_logger(level_override: Option<LevelFilter>) -> Result<()> {
    Dispatch::new()
        .level(resolve_level(level_override))
        .chain(std::io::stderr())
        // Format log messages with time, level and emitting module
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ));
        })
        .apply()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        assert_eq!(
            resolve_level(Some(LevelFilter::Trace)),
            LevelFilter::Trace
        );
    }
}
