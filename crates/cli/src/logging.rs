use anyhow::{anyhow, Result};
use sitequote_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use tracing::Level;

/// Logs go to stderr so stdout stays one JSON outcome per command.
///
/// A config that fails to load still gets default logging; the command
/// itself reports the config failure.
pub fn init_from_env() -> Result<()> {
    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    init(&logging)
}

pub fn init(logging: &LoggingConfig) -> Result<()> {
    let level = logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use sitequote_core::config::{LogFormat, LoggingConfig};

    use super::init;

    #[test]
    fn second_install_reports_error_instead_of_panicking() {
        let logging = LoggingConfig { level: "debug".to_string(), format: LogFormat::Json };

        let _ = init(&logging);
        assert!(init(&logging).is_err());
    }
}
