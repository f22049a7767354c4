use std::{fs, path::Path};

use anyhow::{Context, Result};
use gridlock_system_catalog::CatalogConfig;
use gridlock_system_daily::DailyConfig;
use serde::Deserialize;

/// Tuning data loaded from an optional TOML file with `[catalog]` and
/// `[daily]` tables. Missing tables and keys keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    /// Campaign construction parameters.
    pub(crate) catalog: CatalogConfig,
    /// Daily puzzle parameters.
    pub(crate) daily: DailyConfig,
}

impl AppConfig {
    /// Loads the configuration file, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn empty_file_keeps_defaults() {
        assert_eq!(AppConfig::parse("").expect("parses"), AppConfig::default());
    }

    #[test]
    fn partial_tables_override_single_keys() {
        let config = AppConfig::parse(
            "[catalog]\nworlds = 3\n\n[daily]\narchive_days = 2\nsurvival_secs = [30, 40, 50, 60]\n",
        )
        .expect("parses");
        assert_eq!(config.catalog.worlds, 3);
        assert_eq!(config.catalog.grid_size, 8);
        assert_eq!(config.daily.archive_days, 2);
        assert_eq!(config.daily.survival_secs, [30, 40, 50, 60]);
        assert_eq!(config.daily.grid_size, 8);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let error = AppConfig::parse("[catalog]\nworlds = \"many\"\n").expect_err("rejected");
        assert!(error.to_string().contains("config toml"));
    }
}
