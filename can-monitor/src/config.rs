use can_source::SourceConfig;
use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "CANMON";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub skip_invalid: bool,
    pub limit: Option<u64>,
}

impl Config {
    /// Load configuration from an optional TOML file, then from environment
    /// variables such as `CANMON_SOURCE__KIND=serial`.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder.add_source(environment()).build()?.try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
