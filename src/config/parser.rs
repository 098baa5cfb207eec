use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use std::path::Path;

/// Values supplied on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub website: Option<String>,
    pub replacer: Option<String>,
    pub depth: Option<u32>,
    pub output: Option<String>,
    pub changefreq: Option<String>,
    pub max_concurrent_fetches: Option<u32>,
    pub fetch_timeout_secs: Option<u64>,
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitemaper::config::load_config;
///
/// let config = load_config(Path::new("sitemaper.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Reads and parses a configuration file without validating it
fn read_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    // A blank replacer means no replacer
    config.crawler.replacer = config.crawler.replacer.filter(|r| !r.trim().is_empty());
    Ok(config)
}

/// Builds the effective configuration for a run
///
/// Starts from the file at `path` (or the defaults when no file is given),
/// layers `overrides` on top, then validates the merged result so that a bad
/// value is reported before any crawl starts.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> ConfigResult<Config> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => Config::default(),
    };

    apply_overrides(&mut config, overrides)?;
    validate(&config)?;

    Ok(config)
}

fn apply_overrides(config: &mut Config, overrides: ConfigOverrides) -> Result<(), ConfigError> {
    if let Some(website) = overrides.website {
        config.crawler.website = website;
    }
    if let Some(replacer) = overrides.replacer {
        config.crawler.replacer = Some(replacer).filter(|r| !r.trim().is_empty());
    }
    if let Some(depth) = overrides.depth {
        config.crawler.depth = depth;
    }
    if let Some(output) = overrides.output {
        config.output.path = output;
    }
    if let Some(changefreq) = overrides.changefreq {
        config.crawler.changefreq = changefreq.parse()?;
    }
    if let Some(concurrency) = overrides.max_concurrent_fetches {
        config.crawler.max_concurrent_fetches = concurrency;
    }
    if let Some(timeout) = overrides.fetch_timeout_secs {
        config.crawler.fetch_timeout_secs = timeout;
    }
    Ok(())
}
