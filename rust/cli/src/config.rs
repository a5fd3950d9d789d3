use serde::{Deserialize, Serialize};
use std::fs;
use war_server::client::DEFAULT_CONCURRENCY;
use war_server::server::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub seed: Option<u64>,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub host: ValueSource,
    pub port: ValueSource,
    pub seed: ValueSource,
    pub concurrency: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            host: ValueSource::Default,
            port: ValueSource::Default,
            seed: ValueSource::Default,
            concurrency: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

/// Values given as command-line flags. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seed: Option<u64>,
    pub concurrency: Option<usize>,
}

impl ConfigResolved {
    pub fn apply(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(host) = overrides.host {
            self.config.host = host;
            self.sources.host = ValueSource::Cli;
        }
        if let Some(port) = overrides.port {
            self.config.port = port;
            self.sources.port = ValueSource::Cli;
        }
        if let Some(seed) = overrides.seed {
            self.config.seed = Some(seed);
            self.sources.seed = ValueSource::Cli;
        }
        if let Some(concurrency) = overrides.concurrency {
            self.config.concurrency = concurrency;
            self.sources.concurrency = ValueSource::Cli;
        }
        validate(&self.config)?;
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            seed: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Config {
    /// `host:port`, as dialed by clients.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port).with_seed(self.seed)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = env_value("WAR_CONFIG") {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.host {
            cfg.host = v;
            sources.host = ValueSource::File;
        }
        if let Some(v) = f.port {
            cfg.port = v;
            sources.port = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.concurrency {
            cfg.concurrency = v;
            sources.concurrency = ValueSource::File;
        }
    }

    if let Some(host) = env_value("WAR_HOST") {
        cfg.host = host;
        sources.host = ValueSource::Env;
    }
    if let Some(port) = env_value("WAR_PORT") {
        cfg.port = port
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid port: {port}")))?;
        sources.port = ValueSource::Env;
    }
    if let Some(seed) = env_value("WAR_SEED") {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed: {seed}")))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(concurrency) = env_value("WAR_CONCURRENCY") {
        cfg.concurrency = concurrency
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid concurrency: {concurrency}")))?;
        sources.concurrency = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

/// Unset and empty variables are treated alike.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    concurrency: Option<usize>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.host.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: host must not be empty".into(),
        ));
    }
    if cfg.concurrency == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: concurrency must be >0".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.address(), "127.0.0.1:4444");
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.concurrency, 1000);
    }

    #[test]
    fn flags_override_and_are_marked_cli() {
        let resolved = ConfigResolved {
            config: Config::default(),
            sources: ConfigSources::default(),
        }
        .apply(Overrides {
            port: Some(9000),
            seed: Some(3),
            ..Overrides::default()
        })
        .expect("valid");

        assert_eq!(resolved.config.port, 9000);
        assert_eq!(resolved.sources.port, ValueSource::Cli);
        assert_eq!(resolved.config.seed, Some(3));
        assert_eq!(resolved.sources.host, ValueSource::Default);
        assert_eq!(resolved.config.server_config().seed(), Some(3));
    }

    #[test]
    fn zero_concurrency_flag_is_rejected() {
        let result = ConfigResolved {
            config: Config::default(),
            sources: ConfigSources::default(),
        }
        .apply(Overrides {
            concurrency: Some(0),
            ..Overrides::default()
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
