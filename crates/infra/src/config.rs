//! Configuration loading and representation.
//!
//! Settings come from environment variables with built-in fallbacks:
//!
//! | variable | default |
//! |---|---|
//! | `EZSTOCK_DB_PATH` | `{data_dir}/ezstock/ezstock.db` (`:memory:` for a throwaway database) |
//! | `EZSTOCK_CURRENCY_SYMBOL` | `₱` |

use std::path::PathBuf;

use anyhow::Context;

pub const DB_PATH_VAR: &str = "EZSTOCK_DB_PATH";
pub const CURRENCY_SYMBOL_VAR: &str = "EZSTOCK_CURRENCY_SYMBOL";

const IN_MEMORY_MARKER: &str = ":memory:";
const DEFAULT_CURRENCY_SYMBOL: &str = "₱";

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    InMemory,
}

impl core::fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
            DatabaseLocation::InMemory => f.write_str(IN_MEMORY_MARKER),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseLocation,
    /// Symbol prefixed to prices on screen.
    pub currency_symbol: String,
}

impl AppConfig {
    /// Throwaway configuration: in-memory database, default symbol.
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseLocation::InMemory,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }

    /// Resolve settings from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup` (a stand-in for the environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = match non_blank(DB_PATH_VAR) {
            Some(raw) if raw.trim() == IN_MEMORY_MARKER => DatabaseLocation::InMemory,
            Some(raw) => DatabaseLocation::File(PathBuf::from(raw.trim())),
            None => DatabaseLocation::File(
                default_db_path().context("failed to resolve default database location")?,
            ),
        };

        let currency_symbol = non_blank(CURRENCY_SYMBOL_VAR)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

        Ok(Self {
            database,
            currency_symbol,
        })
    }
}

/// Resolve the default database path: `{app_data_dir}/ezstock/ezstock.db`.
fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut path = base;
    path.push("ezstock");
    path.push("ezstock.db");
    Ok(path)
}
