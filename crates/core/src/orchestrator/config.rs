//! Configuration for the orchestrator module.

use serde::{Deserialize, Serialize};

/// How collision-free output names are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Probe for a free name, then write. Concurrent tasks that want the
    /// same name may both get it.
    #[default]
    Probe,
    /// Reserve the name with an exclusive create before writing.
    Exclusive,
}

/// Configuration for the batch orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum concurrent file conversions. Defaults to the available CPU parallelism.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,

    /// Output naming policy.
    #[serde(default)]
    pub naming: NamingPolicy,
}

impl OrchestratorConfig {
    /// Sets the maximum concurrent conversions.
    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = Some(max);
        self
    }

    /// Sets the naming policy.
    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    /// Number of conversions allowed to run at once (never zero).
    pub fn effective_parallelism(&self) -> usize {
        self.max_parallel
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_parallel, None);
        assert_eq!(config.naming, NamingPolicy::Probe);
        assert!(config.effective_parallelism() >= 1);
    }

    #[test]
    fn test_config_builder() {
        let config = OrchestratorConfig::default()
            .with_max_parallel(3)
            .with_naming(NamingPolicy::Exclusive);
        assert_eq!(config.effective_parallelism(), 3);
        assert_eq!(config.naming, NamingPolicy::Exclusive);
    }

    #[test]
    fn test_zero_parallelism_is_clamped() {
        let config = OrchestratorConfig::default().with_max_parallel(0);
        assert_eq!(config.effective_parallelism(), 1);
    }

    #[test]
    fn test_naming_policy_deserialization() {
        let config: OrchestratorConfig = toml::from_str(r#"naming = "exclusive""#).unwrap();
        assert_eq!(config.naming, NamingPolicy::Exclusive);
    }
}
