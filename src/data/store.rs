//! Local data store
//!
//! Directory of JSON files holding market snapshots and calibrated
//! volatility caches, so a valuation session can be resumed offline.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use super::snapshot::MarketSnapshot;
use crate::core::ValuationResult;
use crate::pricing::VolatilityCache;

const SNAPSHOT: &str = "snapshot";
const VOLATILITY: &str = "vols";

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store directory
    pub root_dir: PathBuf,
    /// Entries older than this are ignored (in hours); `None` keeps them forever
    pub max_age_hours: Option<i64>,
    /// Whether to use the store
    pub enabled: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./data/store"),
            max_age_hours: None,
            enabled: true,
        }
    }
}

impl StoreConfig {
    pub fn at(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }
}

/// Instrument names carry spaces and slashes; keep file names portable
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

pub struct DataStore {
    config: StoreConfig,
}

impl DataStore {
    pub fn new(config: StoreConfig) -> ValuationResult<Self> {
        if config.enabled && !config.root_dir.exists() {
            fs::create_dir_all(&config.root_dir)?;
        }
        Ok(Self { config })
    }

    fn path_for(&self, name: &str, kind: &str) -> PathBuf {
        self.config
            .root_dir
            .join(format!("{}_{}.json", file_stem(name), kind))
    }

    /// Entry exists and is not older than `max_age_hours`
    pub fn is_valid(&self, name: &str, kind: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        let path = self.path_for(name, kind);
        if !path.exists() {
            return false;
        }

        let Some(max_age) = self.config.max_age_hours else {
            return true;
        };
        if let Ok(metadata) = fs::metadata(&path) {
            if let Ok(modified) = metadata.modified() {
                let modified: DateTime<Utc> = modified.into();
                return Utc::now() - modified < Duration::hours(max_age);
            }
        }

        false
    }

    fn save<T: serde::Serialize>(&self, name: &str, kind: &str, value: &T) -> ValuationResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.path_for(name, kind);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;

        tracing::info!("Stored {} for {} at {:?}", kind, name, path);
        Ok(())
    }

    fn load<T: serde::de::DeserializeOwned>(&self, name: &str, kind: &str) -> ValuationResult<Option<T>> {
        if !self.is_valid(name, kind) {
            return Ok(None);
        }

        let json = fs::read_to_string(self.path_for(name, kind))?;
        let value = serde_json::from_str(&json)?;

        tracing::info!("Loaded {} for {} from store", kind, name);
        Ok(Some(value))
    }

    pub fn save_snapshot(&self, name: &str, snapshot: &MarketSnapshot) -> ValuationResult<()> {
        self.save(name, SNAPSHOT, snapshot)
    }

    pub fn load_snapshot(&self, name: &str) -> ValuationResult<Option<MarketSnapshot>> {
        self.load(name, SNAPSHOT)
    }

    /// Persist an option's calibrated volatilities
    pub fn save_volatilities(&self, option: &str, cache: &VolatilityCache) -> ValuationResult<()> {
        self.save(option, VOLATILITY, cache)
    }

    pub fn load_volatilities(&self, option: &str) -> ValuationResult<Option<VolatilityCache>> {
        self.load(option, VOLATILITY)
    }

    /// Remove every entry stored for `name`
    pub fn clear(&self, name: &str) -> ValuationResult<()> {
        let prefix = format!("{}_", file_stem(name));

        for entry in fs::read_dir(&self.config.root_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            if file_name.starts_with(&prefix) {
                fs::remove_file(entry.path())?;
            }
        }

        Ok(())
    }

    pub fn clear_all(&self) -> ValuationResult<()> {
        if self.config.root_dir.exists() {
            fs::remove_dir_all(&self.config.root_dir)?;
            fs::create_dir_all(&self.config.root_dir)?;
        }
        Ok(())
    }

    /// Names with a stored entry of `kind` ("snapshot" or "vols")
    pub fn list(&self, kind: &str) -> ValuationResult<Vec<String>> {
        let mut names = Vec::new();

        if !self.config.root_dir.exists() {
            return Ok(names);
        }

        let suffix = format!("_{}.json", kind);
        for entry in fs::read_dir(&self.config.root_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();

            if let Some(name) = file_name.strip_suffix(&suffix) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}
