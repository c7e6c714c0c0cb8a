use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::cutoff::{CutoffTable, MonthDay};
use crate::filter::{LISTENING_THRESHOLD_MS, RecordFilter};
use crate::utils::{NumberFormatOptions, parse_year};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub recap: RecapConfig,
    /// Wrapped cutoff per year, as `"YYYY" = "MM-DD"`. Entries add to or
    /// replace the built-in dates.
    #[serde(deserialize_with = "deserialize_cutoffs")]
    pub cutoffs: BTreeMap<String, MonthDay>,
    pub formatting: FormattingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RecapConfig {
    pub data_dir: String,
    pub top_k: usize,
    pub listening_threshold_ms: u64,
    pub default_cutoff: MonthDay,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FormattingConfig {
    pub number_comma: bool,
    pub locale: String,
}

fn deserialize_cutoffs<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, MonthDay>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = BTreeMap::<String, MonthDay>::deserialize(deserializer)?;
    let mut dates = CutoffTable::default().dates;
    for (year, date) in entries {
        let year = parse_year(&year).map_err(serde::de::Error::custom)?;
        dates.insert(year, date);
    }
    Ok(dates)
}

impl Default for RecapConfig {
    fn default() -> Self {
        let table = CutoffTable::default();
        Self {
            data_dir: "./data".to_string(),
            top_k: 5,
            listening_threshold_ms: LISTENING_THRESHOLD_MS,
            default_cutoff: table.default,
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            number_comma: true,
            locale: "en".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recap: RecapConfig::default(),
            cutoffs: CutoffTable::default().dates,
            formatting: FormattingConfig::default(),
        }
    }
}

thread_local! {
    static TEST_CONFIG_PATH: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
}

#[cfg(test)]
pub fn set_test_config_path(path: PathBuf) {
    TEST_CONFIG_PATH.with(|p| *p.borrow_mut() = Some(path));
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(test)]
        {
            if let Some(path) = TEST_CONFIG_PATH.with(|p| p.borrow().clone()) {
                return Ok(path);
            }
        }

        Ok(dirs::home_dir()
            .context("Could not find home directory")?
            .join(".recapped.toml"))
    }

    pub fn load() -> Result<Option<Config>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(Some(config))
    }

    pub fn save(&self, silent: bool) -> Result<()> {
        let config_path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        if !silent {
            println!("✅ Configuration saved to: {}", config_path.display());
        }

        Ok(())
    }

    pub fn cutoff_table(&self) -> CutoffTable {
        CutoffTable::new(self.cutoffs.clone(), self.recap.default_cutoff.clone())
    }

    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter::new(self.cutoff_table(), self.recap.listening_threshold_ms)
    }

    pub fn format_options(&self) -> NumberFormatOptions {
        NumberFormatOptions {
            use_comma: self.formatting.number_comma,
            locale: self.formatting.locale.clone(),
        }
    }
}

// CLI helper functions
pub fn create_default_config(overwrite: bool) -> Result<()> {
    let config = Config::default();
    if !std::fs::exists(Config::config_path()?)? || overwrite {
        config.save(true)?;

        println!("📝 Created default configuration file.");
        println!("📍 Add a cutoff for a new year with:");
        println!("   recapped config set cutoff-2025 11-15");
        println!("or edit");
        println!("   {}", Config::config_path()?.display());
    } else {
        println!("Configuration already exists.  Pass `--overwrite` to overwrite.");
    }

    Ok(())
}

pub fn show_config() -> Result<()> {
    match Config::load()? {
        Some(config) => {
            println!("🔧 Current configuration:");
            println!("   Data Directory: {}", config.recap.data_dir);
            println!("   Top K: {}", config.recap.top_k);
            println!(
                "   Listening Threshold: {} ms",
                config.recap.listening_threshold_ms
            );
            println!("   Default Cutoff: {}", config.recap.default_cutoff);
            for (year, date) in &config.cutoffs {
                println!("   Cutoff {year}: {date}");
            }
            println!("   Number Comma: {}", config.formatting.number_comma);
            println!("   Locale: {}", config.formatting.locale);
        }
        None => {
            println!("❌ No configuration file found.");
            println!("   Run 'recapped config init' to create one.");
        }
    }
    Ok(())
}

pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?.unwrap_or_default();

    match key {
        "data-dir" => config.recap.data_dir = value.to_string(),
        "top-k" => {
            config.recap.top_k = value.parse::<usize>().context("Invalid number value")?;
        }
        "listening-threshold" => {
            config.recap.listening_threshold_ms =
                value.parse::<u64>().context("Invalid number value")?;
        }
        "default-cutoff" => {
            config.recap.default_cutoff = value.parse::<MonthDay>()?;
        }
        "number-comma" => {
            let enabled = value
                .parse::<bool>()
                .context("Invalid boolean value. Use 'true' or 'false'")?;
            config.formatting.number_comma = enabled;
        }
        "locale" => {
            config.formatting.locale = value.to_string();
        }
        _ => match key.strip_prefix("cutoff-") {
            Some(year) => {
                let year = parse_year(year).map_err(anyhow::Error::msg)?;
                config.cutoffs.insert(year, value.parse::<MonthDay>()?);
            }
            None => anyhow::bail!("Unknown config key: {}", key),
        },
    }

    config.save(false)?;
    Ok(())
}
