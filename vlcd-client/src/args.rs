//! Command-line argument parsing for bridge applications.
//!
//! This module is only available when the `cli` feature is enabled.
//!
//! # Examples
//!
//! ```no_run
//! use vlcd_client::args::Args;
//! use vlcd_client::Config;
//!
//! let args = Args::parse();
//! let config = Config::from_args(&args)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::{Config, ConfigBuilder};
use crate::errors::VlcdError;
use clap::Parser;
use std::path::PathBuf;

/// Virtual LCD bridge command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Device address (host:port)
    ///
    /// Overrides `connection.address` from the config file.
    #[arg(value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Configuration file path (TOML format)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to write PNG snapshots of the screen into
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Minimum interval between snapshots in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub snapshot_interval_ms: u64,

    /// Maximum accepted frame payload length in bytes
    #[arg(long, value_name = "BYTES")]
    pub max_payload: Option<usize>,

    /// Reconnect after the transport is lost
    #[arg(short = 'r', long)]
    pub reconnect: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse command-line arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse arguments from an iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }
}

impl Config {
    /// Create a configuration from command-line arguments.
    ///
    /// If a config file is given it is loaded first, then overridden by
    /// explicit command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the resulting configuration fails validation.
    pub fn from_args(args: &Args) -> Result<Self, VlcdError> {
        let base = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Self::merge_args(base, args)
    }

    /// Applies command-line overrides to `base` and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn merge_args(base: Config, args: &Args) -> Result<Self, VlcdError> {
        let mut builder = ConfigBuilder::from_config(base);
        if let Some(address) = &args.address {
            builder = builder.address(address.as_str());
        }
        if let Some(max) = args.max_payload {
            builder = builder.max_payload_len(max);
        }
        if args.reconnect {
            builder = builder.reconnect(true);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_args_parse_address() {
        let args = Args::try_parse_from(["vlcd-viewer", "10.0.0.2:7000"]).unwrap();
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.connection.address, "10.0.0.2:7000");
        assert!(!config.reconnect.enabled);
    }

    #[test]
    fn test_args_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[connection]\naddress = \"file:1\"\n\n[protocol]\nmax_payload_len = 4096"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let args = Args::try_parse_from([
            "vlcd-viewer",
            "--config",
            &path,
            "--max-payload",
            "1024",
            "-r",
        ])
        .unwrap();
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.connection.address, "file:1");
        assert_eq!(config.protocol.max_payload_len, 1024);
        assert!(config.reconnect.enabled);
    }

    #[test]
    fn test_missing_address_is_config_error() {
        let args = Args::try_parse_from(["vlcd-viewer"]).unwrap();
        assert!(matches!(
            Config::from_args(&args),
            Err(VlcdError::Config(_))
        ));
    }

    #[test]
    fn test_verbose_count() {
        let args = Args::try_parse_from(["vlcd-viewer", "-vv", "host:1"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.snapshot_interval_ms, 1000);
    }
}
