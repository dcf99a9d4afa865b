use crate::core::{StatusError, StatusResult};
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_HISTORY_SEQUENCE: &str = "statushistory";
pub const DEFAULT_MAX_HISTORY_PER_ENTITY: usize = 100;
pub const DEFAULT_HISTORY_SIZE: usize = 20;
pub const DEFAULT_PRUNE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Status subsystem configuration for one environment.
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// Environment every document written through this config belongs to
    pub environment_uuid: String,

    /// Name of the store counter history ids are drawn from
    pub history_sequence: String,

    /// Entries kept per entity by the history pruner
    pub max_history_per_entity: usize,

    /// Entries returned by a history read when the caller does not say
    pub default_history_size: usize,

    /// Delay between background pruning runs
    pub prune_interval: Duration,
}

impl StatusConfig {
    /// Create a configuration for the given environment
    pub fn new(environment_uuid: &str) -> Self {
        Self {
            environment_uuid: environment_uuid.to_string(),
            history_sequence: DEFAULT_HISTORY_SEQUENCE.to_string(),
            max_history_per_entity: DEFAULT_MAX_HISTORY_PER_ENTITY,
            default_history_size: DEFAULT_HISTORY_SIZE,
            prune_interval: DEFAULT_PRUNE_INTERVAL,
        }
    }

    /// Set the history counter name
    pub fn history_sequence(mut self, name: &str) -> Self {
        self.history_sequence = name.to_string();
        self
    }

    /// Set the per-entity retention count
    pub fn max_history_per_entity(mut self, max: usize) -> Self {
        self.max_history_per_entity = max;
        self
    }

    /// Set the default history page size
    pub fn default_history_size(mut self, size: usize) -> Self {
        self.default_history_size = size;
        self
    }

    /// Set the pruning interval
    pub fn prune_interval(mut self, interval: Duration) -> Self {
        self.prune_interval = interval;
        self
    }

    /// Build from `STATUSDB_*` environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognised: `STATUSDB_ENV_UUID`, `STATUSDB_HISTORY_SEQUENCE`,
    /// `STATUSDB_MAX_HISTORY`, `STATUSDB_HISTORY_SIZE`,
    /// `STATUSDB_PRUNE_INTERVAL_SECS`.
    pub fn from_env() -> StatusResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StatusResult<Self> {
        let mut config = match lookup("STATUSDB_ENV_UUID") {
            Some(uuid) => Self::new(&uuid),
            None => Self::default(),
        };

        if let Some(name) = lookup("STATUSDB_HISTORY_SEQUENCE") {
            config.history_sequence = name;
        }
        if let Some(max) = lookup("STATUSDB_MAX_HISTORY") {
            config.max_history_per_entity = parse_number("STATUSDB_MAX_HISTORY", &max)?;
        }
        if let Some(size) = lookup("STATUSDB_HISTORY_SIZE") {
            config.default_history_size = parse_number("STATUSDB_HISTORY_SIZE", &size)?;
        }
        if let Some(secs) = lookup("STATUSDB_PRUNE_INTERVAL_SECS") {
            let secs: u64 = parse_number("STATUSDB_PRUNE_INTERVAL_SECS", &secs)?;
            config.prune_interval = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> StatusResult<()> {
        if self.environment_uuid.is_empty() {
            return Err(StatusError::InvalidArgument(
                "environment_uuid cannot be empty".to_string(),
            ));
        }

        if self.history_sequence.is_empty() {
            return Err(StatusError::InvalidArgument(
                "history_sequence cannot be empty".to_string(),
            ));
        }

        if self.max_history_per_entity == 0 {
            return Err(StatusError::InvalidArgument(
                "max_history_per_entity must be > 0".to_string(),
            ));
        }

        if self.prune_interval.is_zero() {
            return Err(StatusError::InvalidArgument(
                "prune_interval must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self::new(&Uuid::new_v4().to_string())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> StatusResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| StatusError::InvalidArgument(format!("{} is not a number: {:?}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StatusConfig::default();
        assert!(Uuid::parse_str(&config.environment_uuid).is_ok());
        assert_eq!(config.history_sequence, "statushistory");
        assert_eq!(config.max_history_per_entity, 100);
        assert_eq!(config.prune_interval, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = StatusConfig::new("env-1")
            .history_sequence("hist")
            .max_history_per_entity(3)
            .default_history_size(5)
            .prune_interval(Duration::from_secs(1));

        assert_eq!(config.environment_uuid, "env-1");
        assert_eq!(config.history_sequence, "hist");
        assert_eq!(config.max_history_per_entity, 3);
        assert_eq!(config.default_history_size, 5);
        assert_eq!(config.prune_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_validate() {
        assert!(StatusConfig::new("").validate().is_err());
        assert!(StatusConfig::new("env").history_sequence("").validate().is_err());
        assert!(StatusConfig::new("env").max_history_per_entity(0).validate().is_err());
        assert!(
            StatusConfig::new("env")
                .prune_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("STATUSDB_ENV_UUID", "env-9"),
            ("STATUSDB_MAX_HISTORY", "7"),
            ("STATUSDB_PRUNE_INTERVAL_SECS", " 30 "),
        ]
        .into_iter()
        .collect();

        let config = StatusConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.environment_uuid, "env-9");
        assert_eq!(config.max_history_per_entity, 7);
        assert_eq!(config.prune_interval, Duration::from_secs(30));
        assert_eq!(config.default_history_size, DEFAULT_HISTORY_SIZE);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = StatusConfig::from_lookup(|k| {
            (k == "STATUSDB_MAX_HISTORY").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(StatusError::InvalidArgument(_))));

        let result = StatusConfig::from_lookup(|k| {
            (k == "STATUSDB_MAX_HISTORY").then(|| "0".to_string())
        });
        assert!(result.is_err());
    }
}
