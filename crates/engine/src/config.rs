use sowcycle_core::error::CoreError;
use sowcycle_core::profile::BreedingProfile;

/// Errors raised while loading [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {value}")]
    Invalid { var: &'static str, value: String },

    #[error("Failed to read breeding profile {path}: {source}")]
    ProfileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid breeding profile {path}: {source}")]
    Profile {
        path: String,
        #[source]
        source: CoreError,
    },
}

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Pool size (default: `20`).
    pub max_connections: u32,
    /// Breeding rule table (default: built-in swine profile).
    pub profile: BreedingProfile,
    /// Days past the expected birth date before a pregnancy counts as overdue
    /// (default: `3`).
    pub overdue_grace_days: i64,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `DATABASE_URL`          | required                |
    /// | `DB_MAX_CONNECTIONS`    | `20`                    |
    /// | `BREEDING_PROFILE_PATH` | built-in swine profile  |
    /// | `OVERDUE_GRACE_DAYS`    | `3`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections: u32 = parse_or("DB_MAX_CONNECTIONS", &lookup, 20)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS",
                value: "0".into(),
            });
        }

        let overdue_grace_days: i64 = parse_or("OVERDUE_GRACE_DAYS", &lookup, 3)?;
        if overdue_grace_days < 0 {
            return Err(ConfigError::Invalid {
                var: "OVERDUE_GRACE_DAYS",
                value: overdue_grace_days.to_string(),
            });
        }

        let profile = match lookup("BREEDING_PROFILE_PATH") {
            Some(path) if !path.trim().is_empty() => load_profile(&path)?,
            _ => BreedingProfile::swine(),
        };

        Ok(Self {
            database_url,
            max_connections,
            profile,
            overdue_grace_days,
        })
    }
}

fn parse_or<T, F>(var: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}

fn load_profile(path: &str) -> Result<BreedingProfile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ProfileIo {
        path: path.to_string(),
        source,
    })?;
    BreedingProfile::from_json(&raw).map_err(|source| ConfigError::Profile {
        path: path.to_string(),
        source,
    })
}
