use config::Config;
use serde::Deserialize;

use crate::error::Result;

const CONFIG_FILE: &str = "wgrep";
const ENV_PREFIX: &str = "WGREP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Defaults for the CLI. Layered: built-in defaults, then an optional
/// `wgrep.toml` (or .json/.yaml) in the working directory, then `WGREP_*`
/// environment variables. Command-line flags win over all of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub format: OutputFormat,
    /// Default field for `grep`.
    pub field: String,
    pub ignore_case: bool,
    /// tracing filter used when RUST_LOG is unset.
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            format: OutputFormat::Text,
            field: "body".to_string(),
            ignore_case: false,
            log: "warn".to_string(),
        }
    }
}

/// Values given on the command line. `None` leaves the layered setting alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub format: Option<OutputFormat>,
    pub field: Option<String>,
    pub ignore_case: Option<bool>,
}

/// Resolve a `--flag` / `--no-flag` pair. Neither given means no override.
pub fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

impl Settings {
    pub fn with_overrides(self, cli: Overrides) -> Self {
        Settings {
            format: cli.format.unwrap_or(self.format),
            field: cli.field.unwrap_or(self.field),
            ignore_case: cli.ignore_case.unwrap_or(self.ignore_case),
            log: self.log,
        }
    }

    pub fn load() -> Result<Self> {
        let cfg = Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: Config) -> Result<Self> {
        Ok(cfg.try_deserialize()?)
    }
}
