use std::sync::OnceLock;

use serde::Deserialize;

use crate::{DataFrameError, Result};

static GLOBAL: OnceLock<EngineConfig> = OnceLock::new();

/// Engine configuration options.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Use the data-parallel paths when the `parallel` feature is compiled in.
    pub parallel: bool,
    /// Minimum number of groups before grouped verbs fan out.
    pub parallel_min_groups: usize,
    /// Minimum rows per join side before key extraction fans out.
    pub parallel_min_rows: usize,
    /// Default suffix for colliding right-side join columns.
    pub join_suffix: String,
    /// Worker threads for the parallel paths; 0 uses every available core.
    pub threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_min_groups: 64,
            parallel_min_rows: 16_384,
            join_suffix: "_right".to_string(),
            threads: 0,
        }
    }
}

impl EngineConfig {
    /// Load config from environment variables.
    ///
    /// Variables use the `TIDYFRAME__` prefix with `__` separators, e.g.
    /// `TIDYFRAME__PARALLEL_MIN_GROUPS=128`.
    pub fn load() -> Result<Self> {
        let config: EngineConfig = ::config::Config::builder()
            .add_source(
                ::config::Environment::with_prefix("TIDYFRAME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|err| DataFrameError::configuration("environment", err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    pub fn validate(&self) -> Result<()> {
        if self.parallel_min_groups == 0 {
            return Err(DataFrameError::configuration(
                "parallel_min_groups",
                "must be greater than 0",
            ));
        }
        if self.parallel_min_rows == 0 {
            return Err(DataFrameError::configuration(
                "parallel_min_rows",
                "must be greater than 0",
            ));
        }
        if self.join_suffix.is_empty() {
            return Err(DataFrameError::configuration(
                "join_suffix",
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Resolved worker count, at least 1.
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Process-wide configuration, loaded from the environment on first use.
    ///
    /// An invalid environment falls back to the defaults.
    pub fn global() -> &'static EngineConfig {
        GLOBAL.get_or_init(|| match Self::load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring invalid engine configuration");
                EngineConfig::default()
            }
        })
    }

    /// Install `config` as the process-wide configuration.
    ///
    /// Fails if a configuration is already in effect.
    pub fn install(config: EngineConfig) -> Result<()> {
        config.validate()?;
        GLOBAL.set(config).map_err(|_| {
            DataFrameError::configuration("global", "configuration is already installed")
        })
    }
}
