use log::LevelFilter;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

static DEFAULT_DB_PATH: &str = "data";
static DEFAULT_LOG_LEVEL: &str = "info";

const DB_PATH_KEY: &str = "LEDGER_DB_PATH";
const LOG_LEVEL_KEY: &str = "LEDGER_LOG_LEVEL";

pub struct Config {
    inner: RwLock<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Defaults, overridden by `LEDGER_DB_PATH` and `LEDGER_LOG_LEVEL` when set.
    pub fn new() -> Config {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let mut map = HashMap::new();
        for (key, default) in [
            (DB_PATH_KEY, DEFAULT_DB_PATH),
            (LOG_LEVEL_KEY, DEFAULT_LOG_LEVEL),
        ] {
            let value = lookup(key).unwrap_or_else(|| default.to_string());
            map.insert(String::from(key), value);
        }

        Config {
            inner: RwLock::new(map),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.inner.read() {
            Ok(inner) => inner.get(key).cloned(),
            Err(_) => {
                log::error!("Failed to acquire read lock on config");
                None
            }
        }
    }

    fn set(&self, key: &str, value: String) {
        match self.inner.write() {
            Ok(mut inner) => {
                inner.insert(String::from(key), value);
            }
            Err(_) => log::error!("Failed to acquire write lock on config"),
        }
    }

    pub fn get_db_path(&self) -> PathBuf {
        PathBuf::from(
            self.get(DB_PATH_KEY)
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        )
    }

    pub fn set_db_path(&self, path: PathBuf) {
        self.set(DB_PATH_KEY, path.to_string_lossy().into_owned());
    }

    /// Configured log level; unknown names fall back to `Info`.
    pub fn get_log_level(&self) -> LevelFilter {
        self.get(LOG_LEVEL_KEY)
            .and_then(|level| LevelFilter::from_str(&level).ok())
            .unwrap_or(LevelFilter::Info)
    }

    pub fn set_log_level(&self, level: LevelFilter) {
        self.set(LOG_LEVEL_KEY, level.to_string());
    }
}
