//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use maskfill_core::config::SessionSetup;
use maskfill_core::engine::EngineOptions;
use maskfill_core::traits::SurveyStore;

use crate::fixture::FixtureStore;
use crate::supabase::{
    SupabaseStore, DEFAULT_RESPONSES_TABLE, DEFAULT_SENTENCES_TABLE, DEFAULT_TIMEOUT_SECS,
};

/// Environment variable overriding the Supabase project URL.
pub const ENV_SUPABASE_URL: &str = "MASKFILL_SUPABASE_URL";
/// Environment variable overriding the Supabase anon key.
pub const ENV_SUPABASE_ANON_KEY: &str = "MASKFILL_SUPABASE_ANON_KEY";

/// Where sentences come from and responses go.
///
/// Note: Custom Debug impl masks the anon key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Supabase {
        url: String,
        anon_key: String,
        #[serde(default = "default_sentences_table")]
        sentences_table: String,
        #[serde(default = "default_responses_table")]
        responses_table: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Fixture {
        path: PathBuf,
        #[serde(default)]
        record_to: Option<PathBuf>,
    },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Supabase {
                url,
                anon_key: _,
                sentences_table,
                responses_table,
                timeout_secs,
            } => f
                .debug_struct("Supabase")
                .field("url", url)
                .field("anon_key", &"***")
                .field("sentences_table", sentences_table)
                .field("responses_table", responses_table)
                .field("timeout_secs", timeout_secs)
                .finish(),
            StoreConfig::Fixture { path, record_to } => f
                .debug_struct("Fixture")
                .field("path", path)
                .field("record_to", record_to)
                .finish(),
        }
    }
}

fn default_sentences_table() -> String {
    DEFAULT_SENTENCES_TABLE.to_string()
}
fn default_responses_table() -> String {
    DEFAULT_RESPONSES_TABLE.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level maskfill configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaskfillConfig {
    /// Store backend. Required to run a session.
    #[serde(default)]
    pub store: Option<StoreConfig>,
    /// Defaults for the setup form.
    #[serde(default)]
    pub session: SessionSetup,
    /// Deadline for each store call made by the engine.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl MaskfillConfig {
    pub fn engine_options(&self) -> EngineOptions {
        let timeout = self.request_timeout_secs.map(Duration::from_secs);
        EngineOptions {
            fetch_timeout: timeout,
            submit_timeout: timeout,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied through as-is, never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path, base: Option<&Path>) -> PathBuf {
    let resolved = PathBuf::from(resolve_env_vars(&path.to_string_lossy()));
    match base {
        Some(base) if resolved.is_relative() => base.join(resolved),
        _ => resolved,
    }
}

/// Resolve env vars in a store config; relative fixture paths are taken
/// relative to `base` (the config file's directory).
fn resolve_store_config(config: &StoreConfig, base: Option<&Path>) -> StoreConfig {
    match config {
        StoreConfig::Supabase {
            url,
            anon_key,
            sentences_table,
            responses_table,
            timeout_secs,
        } => StoreConfig::Supabase {
            url: resolve_env_vars(url),
            anon_key: resolve_env_vars(anon_key),
            sentences_table: sentences_table.clone(),
            responses_table: responses_table.clone(),
            timeout_secs: *timeout_secs,
        },
        StoreConfig::Fixture { path, record_to } => StoreConfig::Fixture {
            path: resolve_path(path, base),
            record_to: record_to.as_deref().map(|p| resolve_path(p, base)),
        },
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order when no path is given:
/// 1. `maskfill.toml` in the current directory
/// 2. `~/.config/maskfill/config.toml`
///
/// Environment variable overrides: `MASKFILL_SUPABASE_URL`, `MASKFILL_SUPABASE_ANON_KEY`.
pub fn load_config_from(path: Option<&Path>) -> Result<MaskfillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("maskfill.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<MaskfillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MaskfillConfig::default(),
    };

    apply_env_overrides(
        &mut config,
        std::env::var(ENV_SUPABASE_URL).ok(),
        std::env::var(ENV_SUPABASE_ANON_KEY).ok(),
    );

    let base = config_path
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty());
    config.store = config
        .store
        .as_ref()
        .map(|store| resolve_store_config(store, base));

    Ok(config)
}

/// A URL override switches the store to Supabase; a key override only
/// applies when the store is (or becomes) Supabase.
fn apply_env_overrides(config: &mut MaskfillConfig, url: Option<String>, key: Option<String>) {
    if let Some(url) = url {
        match &mut config.store {
            Some(StoreConfig::Supabase { url: current, .. }) => *current = url,
            _ => {
                config.store = Some(StoreConfig::Supabase {
                    url,
                    anon_key: String::new(),
                    sentences_table: default_sentences_table(),
                    responses_table: default_responses_table(),
                    timeout_secs: default_timeout_secs(),
                })
            }
        }
    }

    if let (Some(key), Some(StoreConfig::Supabase { anon_key, .. })) = (key, &mut config.store) {
        *anon_key = key;
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("maskfill"))
}

/// Create a store instance from its configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn SurveyStore>> {
    match config {
        StoreConfig::Supabase {
            url,
            anon_key,
            sentences_table,
            responses_table,
            timeout_secs,
        } => {
            anyhow::ensure!(
                !url.is_empty(),
                "supabase url is empty; set [store].url or {ENV_SUPABASE_URL}"
            );
            anyhow::ensure!(
                !anon_key.is_empty(),
                "supabase anon key is empty; set [store].anon_key or {ENV_SUPABASE_ANON_KEY}"
            );
            let store = SupabaseStore::with_options(
                url,
                anon_key,
                sentences_table,
                responses_table,
                *timeout_secs,
            )?;
            Ok(Arc::new(store))
        }
        StoreConfig::Fixture { path, record_to } => {
            let mut store = FixtureStore::from_file(path)?;
            if let Some(out) = record_to {
                store = store.recording_to(out);
            }
            Ok(Arc::new(store))
        }
    }
}
