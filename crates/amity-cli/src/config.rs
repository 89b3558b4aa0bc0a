//! CLI configuration loaded from environment variables.
//!
//! Command-line flags take precedence over the environment; everything has a
//! default except the actor, which must come from one or the other.

use std::path::PathBuf;

use amity_store::Database;

#[derive(Debug, Clone)]
pub struct CliConfig {
    /// SQLite database file.
    /// Env: `AMITY_DB_PATH`
    /// Default: platform data directory, see [`Database::default_path`].
    pub db_path: Option<PathBuf>,

    /// Actor id to log in as.
    /// Env: `AMITY_ACTOR`
    pub actor: Option<String>,

    /// Default log filter when `RUST_LOG` is unset.
    /// Env: `AMITY_LOG`
    /// Default: `warn`
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            actor: None,
            log_level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("AMITY_DB_PATH").filter(|p| !p.is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(actor) = lookup("AMITY_ACTOR").filter(|a| !a.is_empty()) {
            config.actor = Some(actor);
        }

        if let Some(level) = lookup("AMITY_LOG").filter(|l| !l.is_empty()) {
            config.log_level = level;
        }

        config
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        db_path: Option<PathBuf>,
        actor: Option<String>,
        log_level: Option<String>,
    ) -> Self {
        if db_path.is_some() {
            self.db_path = db_path;
        }
        if actor.is_some() {
            self.actor = actor;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }

    pub fn resolve_db_path(&self) -> amity_store::Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Database::default_path(),
        }
    }
}
