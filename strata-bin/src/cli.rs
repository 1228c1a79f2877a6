use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use strata_config::{
    Configuration, ConfigurationExt, ConfigurationProperties, EnvironmentVariables, Key, Listing, Search,
};
use strata_core::string_type;
use tracing::debug;

/// Inspect layered configuration: environment variables over property files.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about, long_about = None)]
pub struct Cli {
    /// `.properties` file to read; earlier files take precedence
    #[arg(short, long = "properties", global = true)]
    properties: Vec<PathBuf>,

    /// TOML file to read, below every properties file
    #[arg(short, long = "toml", global = true)]
    toml: Vec<PathBuf>,

    /// Prefix of the environment variables to consult
    #[arg(short, long, global = true, default_value = "")]
    env_prefix: String,

    /// Ignore environment variables
    #[arg(long, global = true)]
    no_env: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log level when RUST_LOG is unset (e.g. debug, info, warn)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dump the raw contents of every source, in priority order
    List,
    /// Resolve one property and show where it came from
    Get {
        /// Dotted property name, e.g. db.password
        key: String,
    },
    /// Show every location consulted for a property
    SearchPath {
        /// Dotted property name, e.g. db.password
        key: String,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        self.init_logging();
        let config = self.configuration()?;
        let mut out = std::io::stdout().lock();

        match &self.command {
            Commands::List => self.print_listing(&mut out, config.list())?,
            Commands::Get { key } => {
                let key = Key::new(key.as_str(), string_type());
                let value = config.get(&key)?;
                let location = config.location_of(&key);
                if self.json {
                    writeln!(out, "{}", json!({ "key": key.name(), "value": value, "location": location }))?;
                } else {
                    writeln!(out, "{value}")?;
                    if let Some(location) = location {
                        writeln!(out, "# from {location}")?;
                    }
                }
            }
            Commands::SearchPath { key } => {
                let key = Key::new(key.as_str(), string_type());
                let path = config.search_path(&key);
                if self.json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&path)?)?;
                } else {
                    for location in path {
                        let marker = if config.location_of(&key).as_ref() == Some(&location) { "*" } else { " " };
                        writeln!(out, "{marker} {location}")?;
                    }
                }
            }
        }
        Ok(())
    }

    fn init_logging(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.log_level));
        if self.log_json {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_target(true)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }

    /// Environment first, then properties files, then TOML files.
    fn configuration(&self) -> anyhow::Result<Search> {
        let mut search = Search::new();
        if !self.no_env {
            search = search.with(EnvironmentVariables::with_prefix(self.env_prefix.clone()));
        }
        for path in &self.properties {
            search = search.with(ConfigurationProperties::from_file(path)?);
        }
        for path in &self.toml {
            search = search.with(ConfigurationProperties::from_toml_file(path)?);
        }
        debug!(sources = search.len(), "configuration assembled");
        Ok(search)
    }

    fn print_listing(&self, out: &mut impl Write, listing: Listing) -> anyhow::Result<()> {
        if self.json {
            let sources: Vec<_> = listing
                .iter()
                .map(|(location, properties)| json!({ "location": location, "properties": properties }))
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&sources)?)?;
            return Ok(());
        }
        for (location, properties) in listing {
            writeln!(out, "# {location}")?;
            for (name, value) in properties {
                writeln!(out, "{name}={value}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
