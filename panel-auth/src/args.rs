use std::{borrow::Cow, fmt, io::IsTerminal, net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail};
use clap::{Parser, ValueEnum};
use config::Config;
use logforth::filter::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "panel-auth", version, long_about = concat!("panel-auth v", env!("CARGO_PKG_VERSION")))]
pub struct Args {
    /// IP address on which the authentication endpoint will listen.
    /// Default: 127.0.0.1:8080
    #[arg(short, long, env = "PANEL_AUTH_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "PANEL_AUTH_CONFIG_PATH", default_value = "./panel-auth.toml")]
    pub config: PathBuf,
    /// Set the logging level
    #[arg(long = "log", env = "PANEL_AUTH_LOG", default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
    /// Set the style of log output
    #[arg(long, env = "PANEL_AUTH_LOG_STYLE", default_value_t = LogStyle::default())]
    pub log_style: LogStyle,
}

impl Args {
    /// Loads the configuration file. Without a panel to sync from there is nothing to serve, so the file must exist.
    pub fn config(&self) -> anyhow::Result<Config> {
        if !self.config.exists() {
            bail!("Configuration file {} does not exist", self.config.display());
        }

        Config::load(&self.config)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Colorized text, used as the default with TTY output
    Color,
    /// Standard text, used as the default with non-TTY output
    Text,
    /// JSON objects
    Json,
}

impl Default for LogStyle {
    fn default() -> Self {
        if std::io::stdout().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Color => "color",
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Disable logging
    Off,
    /// Only log errors
    Error,
    /// Log errors, and warnings
    Warn,
    /// Log errors, warnings, and info messages
    #[default]
    Info,
    /// Log errors, warnings, info, and debug messages
    Debug,
    /// Log errors, warnings, info, debug, and trace messages
    Trace,
}

impl LogLevel {
    pub fn env_filter(self) -> anyhow::Result<EnvFilter> {
        let filter_str = match self {
            LogLevel::Off => Cow::Borrowed("off"),
            // Dependencies only report warnings, workspace crates use the selected level.
            level => Cow::Owned(format!(
                "warn,panel_auth={level},server={level},user_sync={level},config={level}"
            )),
        };

        EnvFilter::from_str(&filter_str).map_err(|e| anyhow!("Invalid log filter '{filter_str}': {e}"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "panel-auth",
            "--listen-address",
            "0.0.0.0:9000",
            "--config",
            "/etc/panel-auth.toml",
            "--log",
            "debug",
            "--log-style",
            "json",
        ])
        .unwrap();

        assert_eq!(args.listen_address, Some("0.0.0.0:9000".parse().unwrap()));
        assert_eq!(args.config, PathBuf::from("/etc/panel-auth.toml"));
        assert_eq!(args.log_level, LogLevel::Debug);
        assert_eq!(args.log_style, LogStyle::Json);
    }

    #[test]
    fn every_level_builds_a_filter() {
        for level in LogLevel::value_variants() {
            assert!(level.env_filter().is_ok(), "{level}");
        }
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel-auth.toml");

        let args = Args::try_parse_from(["panel-auth", "--config", path.to_str().unwrap()]).unwrap();
        let error = args.config().unwrap_err();

        assert_eq!(error.to_string(), format!("Configuration file {} does not exist", path.display()));
    }

    #[test]
    fn loads_existing_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[user_sync]\nurl = \"http://127.0.0.1:3000/api/users\"").unwrap();

        let args = Args::try_parse_from(["panel-auth", "--config", file.path().to_str().unwrap()]).unwrap();
        let config = args.config().unwrap();

        assert_eq!(
            config.user_sync.unwrap().url.as_str(),
            "http://127.0.0.1:3000/api/users"
        );
    }
}
